//! Animated paced-breathing display

use std::time::Duration;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use companion_core::{BreathPhase, BreathingExercise};

use crate::ui::theme::CompanionTheme;

const MAX_WIDTH: usize = 16;

/// Widget showing the current phase of a breathing exercise
pub struct BreathingWidget<'a> {
    exercise: &'a BreathingExercise,
    elapsed: Duration,
    theme: &'a CompanionTheme,
}

impl<'a> BreathingWidget<'a> {
    pub fn new(exercise: &'a BreathingExercise, theme: &'a CompanionTheme) -> Self {
        Self {
            exercise,
            elapsed: Duration::ZERO,
            theme,
        }
    }

    pub fn elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// Width of the breathing bar: grows on inhale, full on hold, shrinks on exhale.
    fn bar_width(&self, phase: BreathPhase, remaining: u64) -> usize {
        let total = match phase {
            BreathPhase::Inhale => self.exercise.inhale,
            BreathPhase::Hold => self.exercise.hold,
            BreathPhase::Exhale => self.exercise.exhale,
        }
        .as_secs()
        .max(1);
        let done = total.saturating_sub(remaining.min(total));

        match phase {
            BreathPhase::Inhale => 1 + (done as usize * (MAX_WIDTH - 1)) / total as usize,
            BreathPhase::Hold => MAX_WIDTH,
            BreathPhase::Exhale => MAX_WIDTH - (done as usize * (MAX_WIDTH - 1)) / total as usize,
        }
    }
}

impl Widget for BreathingWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" {} ", self.exercise.name))
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(true));

        let inner = block.inner(area);
        block.render(area, buf);

        let (phase, remaining) = self.exercise.phase_at(self.elapsed);
        let style = self.theme.phase_style(phase);
        let width = self.bar_width(phase, remaining);

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(phase.label(), style)),
            Line::from(Span::styled(format!("{remaining}s"), style)),
            Line::from(""),
            Line::from(Span::styled("●".repeat(width), style)),
            Line::from(""),
            Line::from(Span::styled(
                self.exercise.summary(),
                Style::default().add_modifier(Modifier::DIM),
            )),
            Line::from(Span::styled(
                "Press Esc to finish",
                Style::default().add_modifier(Modifier::DIM),
            )),
        ];

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(inner, buf);
    }
}
