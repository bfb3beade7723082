use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use tui_big_text::{BigText, PixelSize};

use crate::models::ActiveTiming;
use crate::tui::theme;
use crate::utils::format::format_clock;

pub fn render(frame: &mut Frame, area: Rect, timing: Option<&ActiveTiming>, loading: bool) {
    let title = match timing {
        Some(t) if t.is_elapsed() => " الصلاة الحالية ",
        _ => " الصلاة القادمة ",
    };
    let block = Block::default()
        .title(Span::styled(title, theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(timing) = timing else {
        let msg = if loading { "  جارٍ التحميل…" } else { "  لا توجد بيانات" };
        frame.render_widget(
            Paragraph::new(vec![Line::from(""), Line::from(Span::styled(msg, theme::dim()))]),
            inner,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // prayer name
            Constraint::Length(4), // big clock
            Constraint::Min(0),    // words
        ])
        .split(inner);

    let (lead, accent) = if timing.is_elapsed() {
        ("منذ", theme::green())
    } else {
        ("بعد", theme::amber())
    };

    let name = Paragraph::new(Line::from(Span::styled(
        timing.prayer.display_name(),
        theme::gold().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(name, chunks[0]);

    let clock = BigText::builder()
        .pixel_size(PixelSize::Quadrant)
        .style(accent)
        .alignment(Alignment::Center)
        .lines(vec![Line::from(format_clock(timing.seconds))])
        .build();
    frame.render_widget(clock, chunks[1]);

    let words = Paragraph::new(Line::from(vec![
        Span::styled(format!("{}  ", lead), theme::dim()),
        Span::styled(timing.duration_text.as_str(), accent.add_modifier(Modifier::BOLD)),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(words, chunks[2]);
}
