//! Render orchestration for the companion TUI

use std::time::Instant;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use companion_core::FOUR_SEVEN_EIGHT;

use crate::app::{App, InputMode};
use crate::ui::widgets::conversation::EntryKind;
use crate::ui::widgets::{BreathingWidget, ConversationWidget, InputWidget, ResourcesWidget};

pub const TITLE: &str = "Student Mental Health Companion";
pub const CAPTION: &str = "A safe space to talk, breathe, and find balance.";

/// Overlay types
#[derive(Debug, Clone)]
pub enum Overlay {
    Help,
    Breathing { started: Instant },
}

/// Screen regions
struct AppLayout {
    title: Rect,
    conversation: Rect,
    sidebar: Rect,
    status: Rect,
    input: Rect,
}

impl AppLayout {
    fn calculate(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Title and caption
                Constraint::Min(6),    // Conversation and sidebar
                Constraint::Length(1), // Status line
                Constraint::Length(3), // Input
            ])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(rows[1]);

        Self {
            title: rows[0],
            conversation: columns[0],
            sidebar: columns[1],
            status: rows[2],
            input: rows[3],
        }
    }
}

/// A `width` x `height` rectangle centered in `area`, clamped to fit
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let layout = AppLayout::calculate(area);

    render_title(frame, app, layout.title);

    let conversation = ConversationWidget::new(&app.conversation, &app.theme)
        .scroll(app.scroll)
        .thinking(app.waiting.then_some(app.animation_frame));
    frame.render_widget(conversation, layout.conversation);

    let after_crisis = app
        .conversation
        .last()
        .is_some_and(|item| item.kind == EntryKind::Crisis);
    frame.render_widget(
        ResourcesWidget::new(&app.theme).highlighted(after_crisis),
        layout.sidebar,
    );

    render_status(frame, app, layout.status);
    render_input(frame, app, layout.input);

    if let Some(overlay) = app.overlay() {
        render_overlay(frame, app, overlay, area);
    }
}

fn render_title(frame: &mut Frame, app: &App, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(format!(" 🌱 {TITLE}"), app.theme.title_style())),
        Line::from(Span::styled(format!(" {CAPTION}"), app.theme.system_style())),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let (mode, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", app.theme.title_style()),
        InputMode::Insert => (" INSERT ", app.theme.user_style()),
        InputMode::Command => (" COMMAND ", Style::default().fg(Color::Yellow)),
    };

    let message = app.status_message().unwrap_or(match app.input_mode {
        InputMode::Normal => "i: type  b: breathe  ?: help  q: quit",
        InputMode::Insert => "Enter: send  ↑/↓: history  Esc: normal mode",
        InputMode::Command => ":q quit  :reset  :breathe  :help",
    });

    let line = Line::from(vec![
        Span::styled(mode, mode_style.add_modifier(Modifier::REVERSED)),
        Span::raw(" "),
        Span::styled(message, app.theme.notice_style()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let is_active = matches!(app.input_mode, InputMode::Insert | InputMode::Command);
    let is_command = matches!(app.input_mode, InputMode::Command);

    let placeholder = if app.waiting {
        "Thinking…"
    } else {
        "How are you feeling today?"
    };

    let input = InputWidget::new(app.input_buffer(), &app.theme)
        .cursor_position(app.cursor_position())
        .active(is_active)
        .command_mode(is_command)
        .placeholder(placeholder);

    frame.render_widget(input, area);
}

fn render_overlay(frame: &mut Frame, app: &App, overlay: &Overlay, area: Rect) {
    match overlay {
        Overlay::Help => render_help_overlay(frame, app, area),
        Overlay::Breathing { started } => {
            let popup = centered_rect_fixed(44, 12, area);
            frame.render_widget(Clear, popup);
            frame.render_widget(
                BreathingWidget::new(&FOUR_SEVEN_EIGHT, &app.theme).elapsed(started.elapsed()),
                popup,
            );
        }
    }
}

fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_fixed(52, 22, area);
    frame.render_widget(Clear, popup_area);

    let heading = Style::default().add_modifier(Modifier::UNDERLINED);
    let help_text = vec![
        Line::from(Span::styled(
            format!(" {TITLE} - Help "),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Input Modes:", heading)),
        Line::from("  i       Start typing a message"),
        Line::from("  :       Enter COMMAND mode"),
        Line::from("  Esc     Return to NORMAL mode"),
        Line::from(""),
        Line::from(Span::styled("Navigation (NORMAL mode):", heading)),
        Line::from("  j/k or ↑/↓     Scroll up/down"),
        Line::from("  PgUp/PgDn      Scroll by page"),
        Line::from("  g/G            Jump to top/bottom"),
        Line::from("  b              Breathing exercise"),
        Line::from("  q              Quit"),
        Line::from(""),
        Line::from(Span::styled("Commands:", heading)),
        Line::from("  :q        Quit"),
        Line::from("  :reset    Start a new conversation"),
        Line::from("  :breathe  Breathing exercise"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or q to close",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));

    frame.render_widget(
        Paragraph::new(help_text)
            .block(block)
            .wrap(Wrap { trim: false }),
        popup_area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_clamps() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered_rect_fixed(10, 4, area), Rect::new(5, 3, 10, 4));
        assert_eq!(centered_rect_fixed(50, 50, area), area);
    }

    #[test]
    fn test_layout_splits_area() {
        let layout = AppLayout::calculate(Rect::new(0, 0, 100, 30));
        assert_eq!(layout.title.height, 2);
        assert_eq!(layout.input.height, 3);
        assert_eq!(layout.status.height, 1);
        assert_eq!(layout.conversation.height, 24);
        assert!(layout.conversation.width > layout.sidebar.width);
    }
}
