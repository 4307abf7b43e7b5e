//! Conversation pane: message history plus the reply box.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::api::{Message, SenderRole, Thread};
use crate::app::state::AppState;

use super::theme::Theme;
use super::wrap_to_width;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState, focused: bool) {
    let Some(active) = &state.active else {
        let placeholder = Paragraph::new("No conversation selected")
            .style(Theme::text_muted())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border(focused)),
            );
        frame.render_widget(placeholder, area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    render_header(frame, rows[0], active);
    render_messages(frame, rows[1], state, focused);
    render_compose(frame, rows[2], state, active, focused);
}

fn render_header(frame: &mut Frame, area: Rect, thread: &Thread) {
    let window = if thread.window_expired {
        Span::styled("window expired", Theme::window_expired())
    } else {
        Span::styled(thread.window_label.clone(), Theme::window_open())
    };

    let header = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(thread.name.clone(), Theme::text()),
            Span::styled(format!("  {}", thread.phone_number), Theme::text_muted()),
        ]),
        Line::from(vec![
            Span::styled(format!("{}  ", thread.status_label), Theme::text_muted()),
            window,
        ]),
    ]);
    frame.render_widget(header, area);
}

fn render_messages(frame: &mut Frame, area: Rect, state: &AppState, focused: bool) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border(focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width as usize;
    let height = inner.height as usize;
    if width == 0 || height == 0 {
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for message in &state.messages {
        lines.extend(message_lines(message, &state.date_format, width));
    }

    // Pinned to the bottom; `scroll` moves the window up through history.
    let visible_from = lines
        .len()
        .saturating_sub(height + state.scroll.min(lines.len().saturating_sub(height)));
    let visible: Vec<Line> = lines.into_iter().skip(visible_from).take(height).collect();

    frame.render_widget(Paragraph::new(visible), inner);
}

fn message_lines(message: &Message, date_format: &str, width: usize) -> Vec<Line<'static>> {
    let (label, style) = sender_label(message.sender_role);
    let timestamp = message.created_at.format(date_format).to_string();
    let prefix = format!("{} {}: ", timestamp, label);
    let content = message.content.as_deref().unwrap_or("[unsupported message]");

    let indent = " ".repeat(prefix.len().min(width / 2));
    let body_width = width.saturating_sub(indent.len()).max(1);

    let mut lines = Vec::new();
    for (i, wrapped) in wrap_to_width(content, body_width).into_iter().enumerate() {
        if i == 0 {
            lines.push(Line::from(vec![
                Span::styled(prefix.clone(), style),
                Span::styled(wrapped, Theme::text()),
            ]));
        } else {
            lines.push(Line::from(vec![
                Span::raw(indent.clone()),
                Span::styled(wrapped, Theme::text()),
            ]));
        }
    }
    lines
}

fn sender_label(role: SenderRole) -> (&'static str, Style) {
    match role {
        SenderRole::Customer => ("Customer", Theme::customer()),
        SenderRole::Bot => ("Bot", Theme::bot()),
        SenderRole::Agent => ("Agent", Theme::agent()),
    }
}

fn render_compose(frame: &mut Frame, area: Rect, state: &AppState, thread: &Thread, focused: bool) {
    let title = if thread.window_expired {
        " Reply (window expired) "
    } else {
        " Reply "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border(focused))
        .title(title);

    // Show the tail of the draft when it outgrows the box.
    let inner_width = area.width.saturating_sub(3) as usize;
    let draft: String = if state.compose.len() > inner_width {
        let skip = state.compose.chars().count().saturating_sub(inner_width);
        state.compose.chars().skip(skip).collect()
    } else {
        state.compose.clone()
    };

    let style = if focused {
        Theme::text()
    } else {
        Theme::text_muted()
    };
    frame.render_widget(Paragraph::new(draft).style(style).block(block), area);
}
