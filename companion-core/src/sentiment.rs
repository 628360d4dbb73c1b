//! Sentiment estimation.
//!
//! The pipeline only needs a polarity score in [-1, 1]; anything that can
//! produce one implements [`SentimentEstimator`]. [`LexiconSentiment`] is the
//! bundled scorer: averaged word polarity with negation and intensifiers.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// Maps text to a polarity score in [-1, 1]; negative means negative feeling.
///
/// Implementations must be deterministic for identical input.
pub trait SentimentEstimator: Send + Sync {
    fn score(&self, text: &str) -> f64;
}

/// Multiplier applied to a word's polarity when preceded by a negation.
const NEGATION_FACTOR: f64 = -0.5;

lazy_static! {
    static ref LEXICON: HashMap<&'static str, f64> = {
        let entries: &[(&str, f64)] = &[
            // Positive
            ("good", 0.7),
            ("great", 0.8),
            ("fine", 0.4),
            ("okay", 0.3),
            ("ok", 0.3),
            ("happy", 0.8),
            ("glad", 0.5),
            ("calm", 0.3),
            ("relaxed", 0.4),
            ("excited", 0.4),
            ("proud", 0.8),
            ("grateful", 0.6),
            ("thankful", 0.5),
            ("love", 0.5),
            ("better", 0.5),
            ("best", 1.0),
            ("awesome", 1.0),
            ("amazing", 0.6),
            ("wonderful", 1.0),
            ("fantastic", 0.4),
            ("nice", 0.6),
            ("hopeful", 0.5),
            ("confident", 0.5),
            ("fun", 0.3),
            ("enjoy", 0.4),
            ("enjoyed", 0.4),
            ("peaceful", 0.5),
            ("motivated", 0.4),
            ("energized", 0.4),
            ("productive", 0.5),
            ("passed", 0.3),
            // Negative
            ("bad", -0.7),
            ("terrible", -1.0),
            ("awful", -1.0),
            ("horrible", -1.0),
            ("worst", -1.0),
            ("sad", -0.5),
            ("unhappy", -0.6),
            ("depressed", -0.8),
            ("miserable", -1.0),
            ("hopeless", -0.9),
            ("worthless", -0.8),
            ("lonely", -0.6),
            ("alone", -0.3),
            ("anxious", -0.4),
            ("worried", -0.4),
            ("stressed", -0.5),
            ("overwhelmed", -0.6),
            ("exhausted", -0.5),
            ("tired", -0.4),
            ("angry", -0.5),
            ("upset", -0.5),
            ("scared", -0.5),
            ("afraid", -0.6),
            ("nervous", -0.3),
            ("frustrated", -0.5),
            ("hate", -0.8),
            ("failed", -0.5),
            ("failing", -0.5),
            ("lost", -0.3),
            ("hurt", -0.5),
            ("pain", -0.6),
            ("struggling", -0.4),
            ("difficult", -0.5),
            ("hard", -0.3),
            ("heavy", -0.2),
            ("broken", -0.4),
            ("empty", -0.5),
            ("numb", -0.5),
            ("crying", -0.5),
            ("disappointed", -0.75),
            ("ashamed", -0.6),
            ("useless", -0.5),
            ("boring", -0.6),
            ("sick", -0.7),
            ("unbearable", -1.0),
            ("panic", -0.6),
            ("burnt", -0.4),
            ("burned", -0.4),
        ];
        entries.iter().copied().collect()
    };

    static ref INTENSIFIERS: HashMap<&'static str, f64> = {
        let entries: &[(&str, f64)] = &[
            ("very", 1.3),
            ("really", 1.2),
            ("so", 1.3),
            ("extremely", 1.5),
            ("incredibly", 1.4),
            ("super", 1.3),
            ("totally", 1.2),
            ("completely", 1.3),
            ("absolutely", 1.4),
            ("pretty", 1.1),
            ("quite", 1.1),
            ("slightly", 0.6),
            ("somewhat", 0.7),
            ("bit", 0.7),
        ];
        entries.iter().copied().collect()
    };
}

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "nothing", "cannot", "cant", "dont", "doesnt", "didnt", "isnt",
    "wasnt", "arent", "werent", "wont", "wouldnt", "couldnt", "shouldnt", "havent", "hasnt",
    "aint",
];

/// Lexicon-based polarity scorer.
///
/// Each lexicon word found contributes its polarity, scaled by an immediately
/// preceding intensifier and flipped/dampened by a negation within the two
/// words before it. The score is the mean contribution, clamped to [-1, 1];
/// text with no lexicon words scores 0.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconSentiment;

impl LexiconSentiment {
    pub fn new() -> Self {
        Self
    }
}

impl SentimentEstimator for LexiconSentiment {
    fn score(&self, text: &str) -> f64 {
        let tokens = tokenize(text);
        let mut total = 0.0;
        let mut hits = 0usize;

        for (i, token) in tokens.iter().enumerate() {
            let Some(&polarity) = LEXICON.get(token.as_str()) else {
                continue;
            };

            let mut value = polarity;
            if i > 0 {
                if let Some(&factor) = INTENSIFIERS.get(tokens[i - 1].as_str()) {
                    value *= factor;
                }
            }

            let window = i.saturating_sub(2)..i;
            if tokens[window].iter().any(|t| is_negation(t)) {
                value *= NEGATION_FACTOR;
            }

            total += value.clamp(-1.0, 1.0);
            hits += 1;
        }

        if hits == 0 {
            return 0.0;
        }
        (total / hits as f64).clamp(-1.0, 1.0)
    }
}

fn is_negation(token: &str) -> bool {
    NEGATIONS.contains(&token)
}

/// Lower-case words with apostrophes removed ("don't" -> "dont").
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
        .filter(|w| !w.is_empty())
        .map(|w| w.chars().filter(|c| *c != '\'' && *c != '\u{2019}').collect())
        .collect()
}
