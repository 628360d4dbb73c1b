//! Color theme and styling for the companion TUI

use ratatui::style::{Color, Modifier, Style};

use companion_core::BreathPhase;

/// UI color theme
#[derive(Debug, Clone)]
pub struct CompanionTheme {
    // Base colors
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,
    pub accent: Color,

    // Conversation colors
    pub user_text: Color,
    pub companion_text: Color,
    pub crisis_text: Color,
    pub notice_text: Color,
    pub system_text: Color,

    // Breathing phase colors
    pub inhale: Color,
    pub hold: Color,
    pub exhale: Color,
}

impl Default for CompanionTheme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::DarkGray,
            border_focused: Color::Green,
            accent: Color::LightGreen,

            user_text: Color::Cyan,
            companion_text: Color::White,
            crisis_text: Color::LightRed,
            notice_text: Color::Gray,
            system_text: Color::DarkGray,

            inhale: Color::LightBlue,
            hold: Color::LightMagenta,
            exhale: Color::LightGreen,
        }
    }
}

impl CompanionTheme {
    /// Get style for the student's messages
    pub fn user_style(&self) -> Style {
        Style::default()
            .fg(self.user_text)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn companion_style(&self) -> Style {
        Style::default().fg(self.companion_text)
    }

    /// Crisis resources stand out from everything else
    pub fn crisis_style(&self) -> Style {
        Style::default()
            .fg(self.crisis_text)
            .add_modifier(Modifier::BOLD)
    }

    /// Refusals and failure notices
    pub fn notice_style(&self) -> Style {
        Style::default()
            .fg(self.notice_text)
            .add_modifier(Modifier::DIM)
    }

    pub fn system_style(&self) -> Style {
        Style::default()
            .fg(self.system_text)
            .add_modifier(Modifier::DIM)
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn phase_style(&self, phase: BreathPhase) -> Style {
        let color = match phase {
            BreathPhase::Inhale => self.inhale,
            BreathPhase::Hold => self.hold,
            BreathPhase::Exhale => self.exhale,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    /// Get border style
    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }
}
