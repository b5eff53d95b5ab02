//! Top header: dish model, connection state and link status.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::dashboard::Dashboard;
use crate::ui::util::uptime;

pub fn draw_header(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    dash: &Dashboard,
    model: Option<&str>,
    offline: Option<&str>,
) {
    let mut spans = vec![Span::raw(format!("dishy — {}", model.unwrap_or("dish")))];
    if let Some(state) = dash.state() {
        let fg = if state == "CONNECTED" { Color::Green } else { Color::Yellow };
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(state.to_string(), Style::default().fg(fg)));
    }
    if let Some(sw) = dash.software_version() {
        spans.push(Span::raw(format!(" | sw {sw}")));
    }
    if let Some(up) = dash.uptime() {
        spans.push(Span::raw(format!(" | up {}", uptime(up))));
    }
    if let Some(label) = dash.last_label() {
        spans.push(Span::raw(format!(" | last {label}")));
    }
    if let Some(why) = offline {
        spans.push(Span::styled(
            format!(" | offline: {why}"),
            Style::default().fg(Color::Red),
        ));
    }
    spans.push(Span::raw("  (press 'q' to quit)"));
    f.render_widget(
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM)),
        area,
    );
}
