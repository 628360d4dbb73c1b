//! Support resources shown alongside the conversation.
//!
//! The hotline list feeds both the sidebar in the front-end and the fixed
//! crisis response, so the two can never drift apart.

use std::time::Duration;

/// A place a student can reach out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hotline {
    /// Display name of the service.
    pub name: &'static str,
    /// How to reach it, e.g. "Call or text 988".
    pub contact: &'static str,
}

/// Hotlines included in the crisis response, most general first.
pub const HOTLINES: &[Hotline] = &[
    Hotline {
        name: "National Suicide Prevention Lifeline",
        contact: "Call or text 988",
    },
    Hotline {
        name: "Crisis Text Line",
        contact: "Text HOME to 741741",
    },
    Hotline {
        name: "Campus Security / Emergency",
        contact: "Call 911",
    },
];

/// Directory of hotlines outside the US.
pub const HELPLINE_DIRECTORY: &str = "https://www.findahelpline.com/";

/// Shown in the sidebar above the hotline list.
pub const EMERGENCY_NOTICE: &str =
    "If you are in immediate danger, please contact local emergency services or a campus counselor.";

/// A phase of a paced breathing exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreathPhase {
    Inhale,
    Hold,
    Exhale,
}

impl BreathPhase {
    pub fn label(&self) -> &'static str {
        match self {
            BreathPhase::Inhale => "Inhale",
            BreathPhase::Hold => "Hold",
            BreathPhase::Exhale => "Exhale",
        }
    }
}

/// A repeating inhale / hold / exhale pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreathingExercise {
    pub name: &'static str,
    pub inhale: Duration,
    pub hold: Duration,
    pub exhale: Duration,
}

/// The 4-7-8 technique: inhale 4s, hold 7s, exhale 8s.
pub const FOUR_SEVEN_EIGHT: BreathingExercise = BreathingExercise {
    name: "4-7-8 Breathing Technique",
    inhale: Duration::from_secs(4),
    hold: Duration::from_secs(7),
    exhale: Duration::from_secs(8),
};

impl BreathingExercise {
    /// Length of one full cycle.
    pub fn cycle(&self) -> Duration {
        self.inhale + self.hold + self.exhale
    }

    /// One-line summary, e.g. "Inhale for 4s | Hold for 7s | Exhale for 8s".
    pub fn summary(&self) -> String {
        format!(
            "Inhale for {}s | Hold for {}s | Exhale for {}s",
            self.inhale.as_secs(),
            self.hold.as_secs(),
            self.exhale.as_secs()
        )
    }

    /// Phase at `elapsed` since the exercise started, with whole seconds left in it.
    ///
    /// The pattern repeats, so any elapsed time maps into a cycle.
    pub fn phase_at(&self, elapsed: Duration) -> (BreathPhase, u64) {
        let cycle = self.cycle().as_millis();
        if cycle == 0 {
            return (BreathPhase::Inhale, 0);
        }
        let t = elapsed.as_millis() % cycle;
        let inhale = self.inhale.as_millis();
        let hold = self.hold.as_millis();

        let (phase, remaining_ms) = if t < inhale {
            (BreathPhase::Inhale, inhale - t)
        } else if t < inhale + hold {
            (BreathPhase::Hold, inhale + hold - t)
        } else {
            (BreathPhase::Exhale, cycle - t)
        };

        (phase, remaining_ms.div_ceil(1000) as u64)
    }
}
