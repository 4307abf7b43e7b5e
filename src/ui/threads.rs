//! Thread list pane: pending section on top, archived below.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use crate::api::Thread;
use crate::app::state::AppState;

use super::theme::{Theme, symbols};
use super::truncate_to_width;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState, focused: bool) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border(focused))
        .title(" Conversations ");
    let inner_width = area.width.saturating_sub(2) as usize;

    let mut items: Vec<ListItem> = Vec::new();
    // Maps the cursor (an index into threads only) onto the item list,
    // which also contains section headers.
    let mut selected_item = None;

    items.push(ListItem::new(Line::from(Span::styled(
        format!("Pending ({})", state.pending.len()),
        Theme::section_header(),
    ))));
    for (i, thread) in state.pending.iter().enumerate() {
        if i == state.cursor {
            selected_item = Some(items.len());
        }
        items.push(thread_item(thread, state, inner_width));
    }

    items.push(ListItem::new(Line::from(Span::styled(
        format!("Archived ({})", state.archived.len()),
        Theme::section_header(),
    ))));
    for (i, thread) in state.archived.iter().enumerate() {
        if state.pending.len() + i == state.cursor {
            selected_item = Some(items.len());
        }
        items.push(thread_item(thread, state, inner_width));
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(Theme::selected());
    let mut list_state = ListState::default();
    list_state.select(selected_item);

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn thread_item<'a>(thread: &'a Thread, state: &AppState, width: usize) -> ListItem<'a> {
    let is_active = state.active.as_ref().map(|t| t.user_id) == Some(thread.user_id);
    let marker = if is_active {
        symbols::ACTIVE_MARKER
    } else {
        " "
    };

    let window = if thread.window_expired {
        Span::styled(" [expired]", Theme::window_expired())
    } else if thread.window_label.is_empty() {
        Span::raw("")
    } else {
        Span::styled(format!(" [{}]", thread.window_label), Theme::window_open())
    };

    let preview = thread
        .last_message
        .as_deref()
        .map(|text| format!(" - {}", text.replace('\n', " ")))
        .unwrap_or_default();

    let head = format!("{} {}", marker, thread.name);
    let budget = width.saturating_sub(head.len() + 12);

    ListItem::new(Line::from(vec![
        Span::styled(head, Theme::text()),
        window,
        Span::styled(truncate_to_width(&preview, budget), Theme::text_muted()),
    ]))
}
