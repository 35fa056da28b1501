//! Text panels the widgets render into and the UI draws from.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use ratatui::{
    style::Style,
    text::{Line, Span, Text},
};

use crate::error::PanelError;

/// What happens when a write would go past the panel's line capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    /// Drop the oldest lines.
    Roll,
    /// Fail the write.
    Reject,
}

/// Append/reset-able styled text buffer.
#[derive(Debug, Clone)]
pub struct TextPanel {
    lines: VecDeque<Vec<(String, Style)>>,
    capacity: usize,
    overflow: Overflow,
}

impl TextPanel {
    pub fn new(capacity: usize, overflow: Overflow) -> Self {
        let mut lines = VecDeque::new();
        lines.push_back(Vec::new());
        Self {
            lines,
            capacity: capacity.max(1),
            overflow,
        }
    }

    pub fn reset(&mut self) {
        self.lines.clear();
        self.lines.push_back(Vec::new());
    }

    pub fn write(&mut self, text: &str) -> Result<(), PanelError> {
        self.write_styled(text, Style::default())
    }

    /// Append `text`; every `\n` starts a new line.
    pub fn write_styled(&mut self, text: &str, style: Style) -> Result<(), PanelError> {
        let new_lines = text.matches('\n').count();
        if self.overflow == Overflow::Reject && self.lines.len() + new_lines > self.capacity {
            return Err(PanelError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        for (i, piece) in text.split('\n').enumerate() {
            if i > 0 {
                self.lines.push_back(Vec::new());
            }
            if !piece.is_empty() {
                if let Some(line) = self.lines.back_mut() {
                    line.push((piece.to_string(), style));
                }
            }
        }

        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }

        Ok(())
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Unstyled contents, lines joined with `\n`.
    #[cfg(test)]
    pub fn contents(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.iter().map(|(s, _)| s.as_str()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_text(&self) -> Text<'static> {
        let lines: Vec<Line<'static>> = self
            .lines
            .iter()
            .map(|line| {
                Line::from(
                    line.iter()
                        .map(|(s, style)| Span::styled(s.clone(), *style))
                        .collect::<Vec<_>>(),
                )
            })
            .collect();
        Text::from(lines)
    }

    /// Spans of the given line, for inspecting styles.
    #[cfg(test)]
    pub fn spans(&self, line: usize) -> &[(String, Style)] {
        &self.lines[line]
    }
}

/// Panel shared between its widget task and the UI.
pub type SharedPanel = Arc<Mutex<TextPanel>>;

pub fn shared(capacity: usize, overflow: Overflow) -> SharedPanel {
    Arc::new(Mutex::new(TextPanel::new(capacity, overflow)))
}
