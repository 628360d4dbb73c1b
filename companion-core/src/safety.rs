//! Crisis detection: the hard safety gate in front of the completion pipeline.
//!
//! Detection is a conservative case-insensitive substring match against a
//! fixed phrase list. It is intentionally simple and is not a risk
//! assessment; a match always wins over anything the model might say.

use crate::resources::{HELPLINE_DIRECTORY, HOTLINES};
use lazy_static::lazy_static;

/// Phrases that trigger the crisis response. All lower-case.
pub const CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "suicidal",
    "kill myself",
    "killing myself",
    "end my life",
    "ending my life",
    "hurt myself",
    "hurting myself",
    "self-harm",
    "self harm",
    "cutting",
    "overdose",
    "don't want to live",
    "don\u{2019}t want to live",
    "want to die",
];

lazy_static! {
    static ref CRISIS_RESPONSE: String = build_crisis_response();
}

/// The fixed assistant reply used when the gate fires.
pub fn crisis_response() -> &'static str {
    CRISIS_RESPONSE.as_str()
}

fn build_crisis_response() -> String {
    let mut text = String::from(
        "I'm concerned about you. It sounds like you're going through a very difficult time. \
         I am an AI, and I cannot provide the professional help you deserve right now.\n\n\
         Please reach out to someone who can help:\n",
    );
    for hotline in HOTLINES {
        text.push_str(&format!("- {}: {}\n", hotline.name, hotline.contact));
    }
    text.push_str(&format!("- Outside the US: {HELPLINE_DIRECTORY}\n\n"));
    text.push_str("I am pausing our chat for a moment. Your safety is the priority.");
    text
}

/// Keyword gate over raw user text.
#[derive(Debug, Clone, Copy)]
pub struct CrisisDetector {
    keywords: &'static [&'static str],
}

impl CrisisDetector {
    /// Create a detector over [`CRISIS_KEYWORDS`].
    pub fn new() -> Self {
        Self {
            keywords: CRISIS_KEYWORDS,
        }
    }

    /// Whether `text` contains any crisis phrase, ignoring case.
    pub fn detect(&self, text: &str) -> bool {
        self.matched_keyword(text).is_some()
    }

    /// The first crisis phrase found in `text`, if any.
    pub fn matched_keyword(&self, text: &str) -> Option<&'static str> {
        if text.is_empty() {
            return None;
        }
        let lowered = text.to_lowercase();
        self.keywords
            .iter()
            .copied()
            .find(|keyword| lowered.contains(keyword))
    }
}

impl Default for CrisisDetector {
    fn default() -> Self {
        Self::new()
    }
}
