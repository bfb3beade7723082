use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::IslamicDayKey;
use crate::tui::theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    location: &str,
    day_key: Option<IslamicDayKey>,
    hijri_str: &str,
) {
    let title_line = Line::from(vec![
        Span::styled("  صلاتي  ", theme::gold().add_modifier(Modifier::BOLD)),
        Span::styled("salati", theme::gold()),
        Span::styled("  ·  ", theme::dim()),
        Span::styled(location, theme::bold()),
    ]);

    let date_line = match day_key {
        Some(key) => {
            let gregorian = key.fajr_date().format("%A, %b %d, %Y").to_string();
            Line::from(vec![
                Span::styled(hijri_str.to_string(), theme::amber()),
                Span::styled("  ·  ", theme::dim()),
                Span::styled(gregorian, theme::dim()),
            ])
        }
        None => Line::from(Span::styled("…", theme::dim())),
    };

    let text = vec![title_line, Line::from(""), date_line];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
