//! Conversation display widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols::scrollbar,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
        StatefulWidget, Widget, Wrap,
    },
};

use crate::ui::theme::CompanionTheme;

/// How an entry is styled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    User,
    Companion,
    Crisis,
    /// Refusals and failure notices
    Notice,
    System,
}

/// A single entry in the conversation display
#[derive(Debug, Clone)]
pub struct ConversationItem {
    pub content: String,
    pub kind: EntryKind,
}

/// Widget for displaying the conversation
pub struct ConversationWidget<'a> {
    items: &'a [ConversationItem],
    scroll: usize,
    theme: &'a CompanionTheme,
    thinking_frame: Option<u8>,
}

impl<'a> ConversationWidget<'a> {
    pub fn new(items: &'a [ConversationItem], theme: &'a CompanionTheme) -> Self {
        Self {
            items,
            scroll: 0,
            theme,
            thinking_frame: None,
        }
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Show a typing indicator at the bottom
    pub fn thinking(mut self, frame: Option<u8>) -> Self {
        self.thinking_frame = frame;
        self
    }

    fn style_for(&self, kind: EntryKind) -> Style {
        match kind {
            EntryKind::User => self.theme.user_style(),
            EntryKind::Companion => self.theme.companion_style(),
            EntryKind::Crisis => self.theme.crisis_style(),
            EntryKind::Notice => self.theme.notice_style(),
            EntryKind::System => self.theme.system_style(),
        }
    }

    fn build_lines(&self) -> Vec<Line<'static>> {
        let mut lines: Vec<Line> = Vec::new();

        for item in self.items {
            let style = self.style_for(item.kind);
            let label = match item.kind {
                EntryKind::User => Some("You"),
                EntryKind::Companion | EntryKind::Notice => Some("Companion"),
                EntryKind::Crisis => Some("⚠ Companion"),
                EntryKind::System => None,
            };

            if let Some(label) = label {
                lines.push(Line::from(Span::styled(
                    label,
                    style.add_modifier(Modifier::UNDERLINED),
                )));
            }
            for line in item.content.lines() {
                lines.push(Line::from(Span::styled(line.to_string(), style)));
            }
            lines.push(Line::from(""));
        }

        if let Some(frame) = self.thinking_frame {
            let dots = ".".repeat(1 + (frame as usize / 3) % 3);
            lines.push(Line::from(Span::styled(
                format!("Companion is thinking{dots}"),
                self.theme.system_style(),
            )));
        }

        lines
    }
}

impl Widget for ConversationWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Conversation ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(true));

        let inner = block.inner(area);
        block.render(area, buf);

        let paragraph = Paragraph::new(self.build_lines()).wrap(Wrap { trim: false });

        // Measure after wrapping so the bottom of a long reply is reachable
        let visible_height = inner.height as usize;
        let total_lines = paragraph.line_count(inner.width);
        let max_scroll = total_lines.saturating_sub(visible_height);
        let scroll = self.scroll.min(max_scroll).min(u16::MAX as usize);

        paragraph.scroll((scroll as u16, 0)).render(inner, buf);

        if total_lines > visible_height {
            let scrollbar_area = Rect {
                x: inner.x + inner.width.saturating_sub(1),
                y: inner.y,
                width: 1,
                height: inner.height,
            };

            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .symbols(scrollbar::VERTICAL)
                .thumb_style(Style::default().fg(Color::DarkGray))
                .track_style(Style::default().fg(Color::Black))
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));

            let mut scrollbar_state = ScrollbarState::new(max_scroll).position(scroll);
            scrollbar.render(scrollbar_area, buf, &mut scrollbar_state);

            if scroll < max_scroll {
                let hint = format!(" ↓{} more ", max_scroll - scroll);
                let hint_y = inner.y + inner.height.saturating_sub(1);
                let hint_style = Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM);
                for (i, ch) in hint.chars().enumerate() {
                    let x = inner.x + (i as u16);
                    if x < inner.x + inner.width.saturating_sub(2) {
                        buf[(x, hint_y)].set_char(ch).set_style(hint_style);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use companion_core::crisis_response;

    #[test]
    fn test_lines_include_labels_and_thinking() {
        let theme = CompanionTheme::default();
        let items = vec![
            ConversationItem {
                content: "hi".into(),
                kind: EntryKind::User,
            },
            ConversationItem {
                content: "line one\nline two".into(),
                kind: EntryKind::Crisis,
            },
        ];
        let lines = ConversationWidget::new(&items, &theme)
            .thinking(Some(0))
            .build_lines();

        let text: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(text[0], "You");
        assert_eq!(text[3], "⚠ Companion");
        assert_eq!(text[5], "line two");
        assert_eq!(text.last().map(String::as_str), Some("Companion is thinking."));
    }

    fn screen_text(buf: &Buffer) -> String {
        buf.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_bottom_of_wrapped_crisis_reply_is_visible() {
        let theme = CompanionTheme::default();
        let items = vec![
            ConversationItem {
                content: "hello".into(),
                kind: EntryKind::User,
            },
            ConversationItem {
                content: crisis_response().to_string(),
                kind: EntryKind::Crisis,
            },
        ];
        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        ConversationWidget::new(&items, &theme)
            .scroll(usize::MAX / 2)
            .render(area, &mut buf);

        let screen = screen_text(&buf);
        assert!(screen.contains("priority"), "end of crisis reply not visible");
        assert!(!screen.contains("more"), "scrolled to bottom but hint shown");
    }

    #[test]
    fn test_scrolled_up_shows_remaining_hint() {
        let theme = CompanionTheme::default();
        let items = vec![ConversationItem {
            content: crisis_response().to_string(),
            kind: EntryKind::Crisis,
        }];
        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        ConversationWidget::new(&items, &theme)
            .scroll(0)
            .render(area, &mut buf);

        let screen = screen_text(&buf);
        assert!(screen.contains("more"));
        assert!(!screen.contains("priority"));
    }

    #[test]
    fn test_render_does_not_panic_when_tiny() {
        let theme = CompanionTheme::default();
        let items = vec![ConversationItem {
            content: "a long message ".repeat(20),
            kind: EntryKind::Companion,
        }];
        let area = Rect::new(0, 0, 10, 4);
        let mut buf = Buffer::empty(area);
        ConversationWidget::new(&items, &theme)
            .scroll(usize::MAX / 2)
            .render(area, &mut buf);
    }
}
