//! Status bar with connection indicator and transient messages.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::state::AppState;
use crate::transport::TransportEvent;

use super::theme::{Theme, symbols};
use super::truncate_to_width;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    // An unexpired error owns the whole bar.
    if let Some((error, _)) = &state.status.error {
        let bar = Paragraph::new(format!(" {} ", truncate_to_width(error, area.width as usize)))
            .style(Theme::error_bar());
        frame.render_widget(bar, area);
        return;
    }

    let style = Theme::status_bar();

    let connection = match state.connection {
        TransportEvent::Connected => format!(" {} live", symbols::CONNECTED),
        TransportEvent::Connecting => format!(" {} connecting", symbols::CONNECTING),
        TransportEvent::Disconnected => format!(" {} polling", symbols::POLLING),
    };

    let counts = format!(
        " | {} pending, {} archived",
        state.pending.len(),
        state.archived.len()
    );

    let message = if state.status.loading {
        " | syncing...".to_string()
    } else {
        state
            .status
            .message
            .as_deref()
            .map(|m| format!(" | {}", m))
            .unwrap_or_default()
    };

    let left = format!("{}{}{}", connection, counts, message);
    let right = "Tab switch | Enter open | r reload | s resolve | o reopen | q quit ";

    let available = (area.width as usize).saturating_sub(left.len() + right.len());
    let line = Line::from(vec![
        Span::styled(left, style),
        Span::styled(" ".repeat(available), style),
        Span::styled(right, style),
    ]);

    frame.render_widget(Paragraph::new(line).style(style), area);
}
