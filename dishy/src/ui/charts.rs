//! Line charts drawn from each chart binding's last redrawn frame.

use ratatui::{
    layout::Rect,
    style::Style,
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart as ChartWidget, Dataset},
};

use crate::dashboard::Chart;
use crate::ui::theme::AXIS;

pub fn draw_chart(f: &mut ratatui::Frame<'_>, area: Rect, chart: &Chart) {
    let frame = chart.frame();

    let now: Vec<String> = frame
        .datasets
        .iter()
        .filter_map(|d| d.points.last().map(|&(_, v)| format!("{v:.1}")))
        .collect();
    let title = if now.is_empty() {
        chart.title().to_string()
    } else {
        format!("{} (now: {})", chart.title(), now.join(" / "))
    };

    let datasets: Vec<Dataset<'_>> = frame
        .datasets
        .iter()
        .map(|d| {
            Dataset::default()
                .name(d.name)
                .marker(Marker::Braille)
                .graph_type(chart.graph_type())
                .style(Style::default().fg(d.color))
                .data(&d.points)
        })
        .collect();

    let mut x_axis = Axis::default()
        .style(Style::default().fg(AXIS))
        .bounds([0.0, frame.x_max]);
    if chart.show_x_axis() {
        if let (Some(first), Some(last)) = (frame.labels.first(), frame.labels.last()) {
            x_axis = x_axis.labels(vec![Span::raw(first.clone()), Span::raw(last.clone())]);
        }
    }
    let y_axis = Axis::default()
        .style(Style::default().fg(AXIS))
        .bounds([0.0, frame.y_max])
        .labels(vec![
            Span::raw("0"),
            Span::raw(format!("{:.0}", frame.y_max / 2.0)),
            Span::raw(format!("{:.0}", frame.y_max)),
        ]);

    let widget = ChartWidget::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(title))
        .x_axis(x_axis)
        .y_axis(y_axis);
    f.render_widget(widget, area);
}
