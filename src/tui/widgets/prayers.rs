use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::tui::cards::PrayerCard;
use crate::tui::theme;
use crate::utils::format::{format_time, pad_display};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    cards: &[PrayerCard],
    focused_idx: usize,
    loading: bool,
) {
    let block = Block::default()
        .title(Span::styled(" الصلوات ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(true))
        .style(theme::surface());

    if cards.is_empty() {
        let msg = if loading { "  جارٍ التحميل…" } else { "  أوقات الصلاة غير متاحة  [r]" };
        let list = List::new(vec![ListItem::new(Line::from(Span::styled(msg, theme::dim())))])
            .block(block);
        frame.render_widget(list, area);
        return;
    }

    let items: Vec<ListItem> = cards
        .iter()
        .enumerate()
        .map(|(i, card)| {
            let is_focused = i == focused_idx;

            let (icon, icon_style) = if card.is_completed {
                ("●", theme::green())
            } else if card.is_enabled {
                ("○", theme::amber())
            } else {
                ("·", theme::locked())
            };

            let name_style = match (is_focused, card.is_next, card.is_enabled) {
                (true, _, _) => theme::gold().add_modifier(Modifier::BOLD | Modifier::REVERSED),
                (false, true, _) => theme::gold().add_modifier(Modifier::BOLD),
                (false, false, true) => theme::bold(),
                (false, false, false) => theme::locked(),
            };

            let mut spans = vec![
                Span::styled(format!("  {}  ", icon), icon_style),
                Span::styled(pad_display(card.name.display_name(), 8), name_style),
                Span::styled(format!("{:<7}", format_time(card.time)), theme::dim()),
            ];

            if let Some(text) = &card.elapsed_text {
                spans.push(Span::styled(format!("منذ {}", text), theme::green()));
            } else if let Some(text) = &card.remaining_text {
                spans.push(Span::styled(format!("بعد {}", text), theme::amber()));
            }

            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
