//! Sidebar with emergency resources and the relaxation shortcut

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use companion_core::resources::{EMERGENCY_NOTICE, HELPLINE_DIRECTORY};
use companion_core::{FOUR_SEVEN_EIGHT, HOTLINES};

use crate::ui::theme::CompanionTheme;

/// Emergency resources panel
pub struct ResourcesWidget<'a> {
    theme: &'a CompanionTheme,
    highlighted: bool,
}

impl<'a> ResourcesWidget<'a> {
    pub fn new(theme: &'a CompanionTheme) -> Self {
        Self {
            theme,
            highlighted: false,
        }
    }

    /// Draw attention to the panel, e.g. right after a crisis reply
    pub fn highlighted(mut self, highlighted: bool) -> Self {
        self.highlighted = highlighted;
        self
    }
}

impl Widget for ResourcesWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.highlighted {
            self.theme.crisis_style()
        } else {
            self.theme.border_style(false)
        };
        let block = Block::default()
            .title(" Emergency Resources ")
            .borders(Borders::ALL)
            .border_style(border);

        let inner = block.inner(area);
        block.render(area, buf);

        let heading = Style::default().add_modifier(Modifier::UNDERLINED);
        let mut lines = vec![
            Line::from(Span::styled(EMERGENCY_NOTICE, self.theme.crisis_style())),
            Line::from(""),
        ];

        for hotline in HOTLINES {
            lines.push(Line::from(Span::styled(
                hotline.name,
                Style::default()
                    .fg(self.theme.foreground)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(format!("  {}", hotline.contact)));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Find a Crisis Hotline", heading)));
        lines.push(Line::from(Span::styled(
            HELPLINE_DIRECTORY,
            self.theme.system_style(),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Quick Relaxation", heading)));
        lines.push(Line::from(format!("[b] {}", FOUR_SEVEN_EIGHT.name)));
        lines.push(Line::from(Span::styled(
            FOUR_SEVEN_EIGHT.summary(),
            self.theme.system_style(),
        )));

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
