//! Dashboard widgets: the timer-driven panels, the log tail and the version probe.

pub mod block;
pub mod chain;
pub mod instance;
pub mod log_tail;
pub mod refresh;
pub mod version;

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::PanelError;
use crate::panel::TextPanel;
use crate::settings::Settings;
use crate::snapshot::Snapshot;

pub use block::BlockInfo;
pub use chain::ChainInfo;
pub use instance::InstanceInfo;
pub use log_tail::{start_tail, LogDirLocator};
pub use refresh::start_refresh;
pub use version::get_app_version;

/// Everything a renderer may look at during one tick.
pub struct RenderContext<'a> {
    pub snapshot: &'a Snapshot,
    pub settings: &'a Settings,
    pub now: DateTime<Utc>,
}

/// A panel that is fully redrawn from the snapshot on every tick.
///
/// The panel has already been reset when `render` is called. Writes must
/// happen in a fixed order; any write error is fatal for the widget.
pub trait PanelRenderer: Send + 'static {
    fn name(&self) -> &'static str;

    fn render(&mut self, ctx: &RenderContext<'_>, panel: &mut TextPanel) -> Result<(), PanelError>;
}

/// Whole number with no decimals, e.g. `3` for `2.6`.
fn whole(value: f64) -> String {
    format!("{:.0}", value)
}

/// Elapsed time rounded to the nearest second: `1h 2m 3s`, `4m 5s` or `6s`.
pub fn format_elapsed(duration: Duration) -> String {
    let secs = (duration.as_millis() + 500) / 1000;
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
