//! Bottom row: active alerts, obstruction map refresh, command keys.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::ui::theme::{ALERT, OK};
use crate::ui::util::human;

/// Latest obstruction map refresh, as shown to the user.
#[derive(Debug, Clone, Default)]
pub struct MapStatus {
    pub fetched_at: Option<String>,
    pub bytes: usize,
    pub saved_to: Option<String>,
    pub error: Option<String>,
}

pub fn draw_alerts(f: &mut ratatui::Frame<'_>, area: Rect, alerts: &[String]) {
    let lines: Vec<Line> = if alerts.is_empty() {
        vec![Line::from(Span::styled("no active alerts", Style::default().fg(OK)))]
    } else {
        alerts
            .iter()
            .map(|a| {
                Line::from(Span::styled(
                    format!("● {a}"),
                    Style::default().fg(ALERT).add_modifier(Modifier::BOLD),
                ))
            })
            .collect()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Alerts ({})", alerts.len()));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

pub fn draw_map_status(f: &mut ratatui::Frame<'_>, area: Rect, map: &MapStatus) {
    let mut lines = Vec::new();
    match &map.fetched_at {
        Some(at) => lines.push(Line::raw(format!("refreshed {at} ({})", human(map.bytes as u64)))),
        None => lines.push(Line::raw("waiting for first image")),
    }
    if let Some(path) = &map.saved_to {
        lines.push(Line::raw(format!("saved to {path}")));
    }
    if let Some(err) = &map.error {
        lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(ALERT))));
    }
    let block = Block::default().borders(Borders::ALL).title("Obstruction map");
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

pub fn draw_commands(f: &mut ratatui::Frame<'_>, area: Rect, last: Option<&str>) {
    let mut lines = vec![Line::raw("[R] reboot  [s] stow  [u] unstow")];
    if let Some(last) = last {
        lines.push(Line::raw(last.to_string()));
    }
    let block = Block::default().borders(Borders::ALL).title("Dish");
    f.render_widget(Paragraph::new(lines).block(block), area);
}
