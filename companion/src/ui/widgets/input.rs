//! Message input widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::ui::theme::CompanionTheme;

/// Single-line input with a visible cursor
pub struct InputWidget<'a> {
    content: &'a str,
    cursor_position: usize,
    theme: &'a CompanionTheme,
    placeholder: &'a str,
    is_active: bool,
    is_command_mode: bool,
}

impl<'a> InputWidget<'a> {
    pub fn new(content: &'a str, theme: &'a CompanionTheme) -> Self {
        Self {
            content,
            cursor_position: content.chars().count(),
            theme,
            placeholder: "How are you feeling today?",
            is_active: true,
            is_command_mode: false,
        }
    }

    pub fn cursor_position(mut self, pos: usize) -> Self {
        self.cursor_position = pos;
        self
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    pub fn command_mode(mut self, is_command: bool) -> Self {
        self.is_command_mode = is_command;
        self
    }

    fn line(&self) -> Line<'a> {
        let prompt_style = self.theme.user_style();

        if self.content.is_empty() && !self.is_command_mode {
            return Line::from(vec![
                Span::styled("> ", prompt_style),
                Span::styled(self.placeholder, Style::default().add_modifier(Modifier::DIM)),
            ]);
        }

        // Command buffers carry their leading ':' which the prompt already shows
        let (prompt, text, cursor) = match self.content.strip_prefix(':') {
            Some(rest) if self.is_command_mode => {
                (":", rest, self.cursor_position.saturating_sub(1))
            }
            _ => ("> ", self.content, self.cursor_position),
        };

        let before: String = text.chars().take(cursor).collect();
        let at: String = text
            .chars()
            .nth(cursor)
            .map(String::from)
            .unwrap_or_else(|| " ".to_string());
        let after: String = text.chars().skip(cursor + 1).collect();

        let mut spans = vec![Span::styled(prompt, prompt_style), Span::raw(before)];
        if self.is_active {
            spans.push(Span::styled(
                at,
                Style::default()
                    .fg(self.theme.user_text)
                    .add_modifier(Modifier::UNDERLINED | Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw(at));
        }
        spans.push(Span::raw(after));
        Line::from(spans)
    }
}

impl Widget for InputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.is_active));

        let inner = block.inner(area);
        block.render(area, buf);

        Paragraph::new(self.line()).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_when_empty() {
        let theme = CompanionTheme::default();
        let line = InputWidget::new("", &theme).placeholder("Thinking…").line();
        assert_eq!(line.to_string(), "> Thinking…");
    }

    #[test]
    fn test_command_prompt_strips_colon() {
        let theme = CompanionTheme::default();
        let line = InputWidget::new(":reset", &theme).command_mode(true).line();
        assert_eq!(line.to_string(), ":reset ");
    }

    #[test]
    fn test_cursor_in_middle_of_unicode() {
        let theme = CompanionTheme::default();
        let line = InputWidget::new("héllo", &theme).cursor_position(1).line();
        assert_eq!(line.to_string(), "> héllo");
    }
}
