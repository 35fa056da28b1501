use std::time::Duration;

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::widgets::format_elapsed;

const COLOR_KEY: Color = Color::Cyan;
const COLOR_DANGER: Color = Color::LightRed;

/// Values shown in the top status bar.
pub struct StatusLine<'a> {
    pub environment: &'a str,
    pub uptime: Duration,
    pub refresh: Duration,
    pub widgets: usize,
    pub error: Option<&'a str>,
}

pub fn render_status_bar(frame: &mut Frame, area: Rect, status: &StatusLine<'_>) {
    let mut spans = vec![
        Span::styled("Env: ", Style::default().fg(Color::Gray)),
        Span::styled(status.environment.to_string(), Style::default().fg(Color::White)),
        Span::raw(" | "),
        Span::styled("Uptime: ", Style::default().fg(Color::Gray)),
        Span::styled(format_elapsed(status.uptime), Style::default().fg(Color::White)),
        Span::raw(" | "),
        Span::styled("Refresh: ", Style::default().fg(Color::Gray)),
        Span::styled(format!("{}ms", status.refresh.as_millis()), Style::default().fg(Color::White)),
        Span::raw(" | "),
        Span::styled("Widgets: ", Style::default().fg(Color::Gray)),
        Span::styled(status.widgets.to_string(), Style::default().fg(Color::White)),
        Span::raw("  "),
    ];

    if let Some(err) = status.error {
        spans.push(Span::styled(
            "ERROR: ",
            Style::default().fg(COLOR_DANGER).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(err.to_string(), Style::default().fg(COLOR_DANGER)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn render_help_bar(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(Line::from(vec![
        Span::styled("[q]", Style::default().fg(COLOR_KEY)),
        Span::raw(" quit  "),
        Span::styled("[r]", Style::default().fg(COLOR_KEY)),
        Span::raw(" reload settings"),
    ]))
    .style(Style::default().fg(Color::DarkGray));

    frame.render_widget(help, area);
}
