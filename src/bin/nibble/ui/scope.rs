//! Per-bit oscilloscope widget

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use super::state::ScopeFrame;

const BIT_COLORS: [Color; 4] = [Color::Cyan, Color::Green, Color::Yellow, Color::Magenta];

/// Render one trace per output bit, stacked top (out8) to bottom (out1).
pub fn render_scope(frame: &mut Frame, area: Rect, frames: &[ScopeFrame]) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for (row, bit) in rows.iter().zip((0..4).rev()) {
        render_trace(frame, *row, frames, bit);
    }
}

fn render_trace(frame: &mut Frame, area: Rect, frames: &[ScopeFrame], bit: usize) {
    let block = Block::default()
        .title(format!(" out{} ", 1 << bit))
        .borders(Borders::ALL);

    let len = frames.len().max(1) as f64;
    let data: Vec<(f64, f64)> = frames
        .iter()
        .enumerate()
        .map(|(i, f)| (i as f64 / len, f.bits[bit] as f64))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(BIT_COLORS[bit]))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 11.0])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
