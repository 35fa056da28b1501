use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::panel::{self, Overflow, SharedPanel};

const COLOR_TITLE: Color = Color::Cyan;

/// Lines kept by the fixed panels; a render that needs more is a bug.
const PANEL_LINES: usize = 32;
/// Lines kept by the scrolling log panel.
const LOG_LINES: usize = 500;

/// Render targets of every widget, shared with their tasks.
#[derive(Clone)]
pub struct Panels {
    pub instance: SharedPanel,
    pub chain: SharedPanel,
    pub block: SharedPanel,
    pub log: SharedPanel,
}

impl Default for Panels {
    fn default() -> Self {
        Self {
            instance: panel::shared(PANEL_LINES, Overflow::Reject),
            chain: panel::shared(PANEL_LINES, Overflow::Reject),
            block: panel::shared(PANEL_LINES, Overflow::Reject),
            log: panel::shared(LOG_LINES, Overflow::Roll),
        }
    }
}

pub fn render_dashboard(frame: &mut Frame, area: Rect, panels: &Panels, log_title: &str) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(11), // instance + chain
            Constraint::Length(9),  // block
            Constraint::Min(5),     // log
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    render_panel(frame, top[0], " Instance ", &panels.instance, false);
    render_panel(frame, top[1], " Chain ", &panels.chain, false);
    render_panel(frame, rows[1], " Block ", &panels.block, false);
    render_panel(frame, rows[2], log_title, &panels.log, true);
}

/// Draw a panel. With `follow` the newest lines are kept in view; such
/// panels are not wrapped, so one stored line is one row.
fn render_panel(frame: &mut Frame, area: Rect, title: &str, panel: &SharedPanel, follow: bool) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .title_style(Style::default().fg(COLOR_TITLE).add_modifier(Modifier::BOLD));

    let visible = block.inner(area).height;
    let (text, lines) = {
        let panel = panel.lock();
        (panel.to_text(), panel.line_count())
    };

    let paragraph = Paragraph::new(text).block(block);
    let paragraph = if follow {
        let scroll = u16::try_from(lines).unwrap_or(u16::MAX).saturating_sub(visible);
        paragraph.scroll((scroll, 0))
    } else {
        paragraph.wrap(Wrap { trim: false })
    };

    frame.render_widget(paragraph, area);
}
