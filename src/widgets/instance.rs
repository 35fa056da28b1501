use chrono::{DateTime, NaiveDateTime, Utc};
use ratatui::style::{Color, Style};

use super::{format_elapsed, whole, PanelRenderer, RenderContext};
use crate::error::PanelError;
use crate::panel::TextPanel;

const COLOR_VERSION: Color = Color::Green;
const COLOR_OUT_OF_SYNC: Color = Color::Rgb(255, 127, 80);

/// App/version panel: version, shard, time since the last bingo and the
/// earning rate.
#[derive(Debug)]
pub struct InstanceInfo {
    version: String,
    /// Latched once the earning rate is first nonzero.
    show_earning_rate: bool,
}

impl InstanceInfo {
    /// `version` is the label returned by the version probe.
    pub fn new(version: String) -> Self {
        Self {
            version,
            show_earning_rate: false,
        }
    }
}

/// Parse `value` with `layout`. Layouts without an offset are taken as UTC.
pub fn parse_timestamp(value: &str, layout: &str) -> Option<DateTime<Utc>> {
    if value.is_empty() {
        return None;
    }
    if let Ok(t) = DateTime::parse_from_str(value, layout) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, layout)
        .ok()
        .map(|t| t.and_utc())
}

impl PanelRenderer for InstanceInfo {
    fn name(&self) -> &'static str {
        "instance"
    }

    fn render(&mut self, ctx: &RenderContext<'_>, panel: &mut TextPanel) -> Result<(), PanelError> {
        let s = ctx.snapshot;

        panel.write_styled(&self.version, Style::default().fg(COLOR_VERSION))?;
        panel.write(&format!("\n ShardID    : {}\n", whole(s.shard_id)))?;

        if let Some(bingo) = parse_timestamp(&s.bingo, &ctx.settings.timestamp_layout) {
            // a bingo in the future counts as just now
            let elapsed = (ctx.now - bingo).to_std().unwrap_or_default();
            panel.write(&format!(" BINGO      : {} ago\n", format_elapsed(elapsed)))?;

            if elapsed.as_secs_f64() / 60.0 >= ctx.settings.out_of_sync_minutes {
                panel.write(" ")?;
                panel.write_styled(" Node out of sync ", Style::default().bg(COLOR_OUT_OF_SYNC))?;
            }
        }

        if self.show_earning_rate || s.earning_rate != 0.0 {
            self.show_earning_rate = true;
            panel.write(&format!(
                "\n Earning rate : {:.4}/{:.0}s",
                s.earning_rate,
                ctx.settings.earning_rate_interval.as_secs_f64()
            ))?;
        }

        panel.write(&format!("\n\n {}", s.balance))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::Overflow;
    use crate::settings::Settings;
    use crate::snapshot::Snapshot;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        parse_timestamp("2024-05-01T12:30:00+00:00", "%+").unwrap()
    }

    fn render(widget: &mut InstanceInfo, snapshot: &Snapshot, settings: &Settings) -> TextPanel {
        let mut panel = TextPanel::new(32, Overflow::Reject);
        let ctx = RenderContext {
            snapshot,
            settings,
            now: now(),
        };
        widget.render(&ctx, &mut panel).unwrap();
        panel
    }

    #[test]
    fn test_basic_layout() {
        let mut widget = InstanceInfo::new("App version: v7174-v1.2.0".into());
        let snapshot = Snapshot {
            shard_id: 1.0,
            balance: "Balance: 10.5 ONE".into(),
            ..Default::default()
        };

        let panel = render(&mut widget, &snapshot, &Settings::default());
        assert_eq!(
            panel.contents(),
            "App version: v7174-v1.2.0\n ShardID    : 1\n\n\n Balance: 10.5 ONE"
        );
        assert_eq!(panel.spans(0)[0].1, Style::default().fg(COLOR_VERSION));
    }

    #[test]
    fn test_bingo_elapsed() {
        let mut widget = InstanceInfo::new("v".into());
        let snapshot = Snapshot {
            bingo: "2024-05-01T12:29:15+00:00".into(),
            ..Default::default()
        };

        let panel = render(&mut widget, &snapshot, &Settings::default());
        let contents = panel.contents();
        assert!(contents.contains(" BINGO      : 45s ago\n"), "{}", contents);
        assert!(!contents.contains("out of sync"));
    }

    #[test]
    fn test_out_of_sync_boundary_is_inclusive() {
        let mut widget = InstanceInfo::new("v".into());
        let settings = Settings {
            out_of_sync_minutes: 30.0,
            ..Default::default()
        };
        let snapshot = Snapshot {
            bingo: "2024-05-01T12:00:00+00:00".into(),
            ..Default::default()
        };

        let panel = render(&mut widget, &snapshot, &settings);
        let contents = panel.contents();
        assert!(contents.contains(" BINGO      : 30m 0s ago\n"), "{}", contents);
        assert!(contents.contains("  Node out of sync "));

        let flagged = panel.spans(3).last().unwrap();
        assert_eq!(flagged.0, " Node out of sync ");
        assert_eq!(flagged.1, Style::default().bg(COLOR_OUT_OF_SYNC));

        // one second short of the threshold
        let snapshot = Snapshot {
            bingo: "2024-05-01T12:00:01+00:00".into(),
            ..Default::default()
        };
        let panel = render(&mut widget, &snapshot, &settings);
        assert!(!panel.contents().contains("out of sync"));
    }

    #[test]
    fn test_unparseable_bingo_only_suppresses_its_line() {
        let mut widget = InstanceInfo::new("App version: v1".into());
        let snapshot = Snapshot {
            shard_id: 2.0,
            bingo: "yesterday-ish".into(),
            earning_rate: 0.25,
            balance: "Balance: 1 ONE".into(),
            ..Default::default()
        };

        let panel = render(&mut widget, &snapshot, &Settings::default());
        let contents = panel.contents();
        assert!(!contents.contains("BINGO"));
        assert!(!contents.contains("out of sync"));
        assert_eq!(
            contents,
            "App version: v1\n ShardID    : 2\n\n Earning rate : 0.2500/60s\n\n Balance: 1 ONE"
        );
    }

    #[test]
    fn test_earning_rate_is_sticky() {
        let mut widget = InstanceInfo::new("v".into());
        let settings = Settings::default();
        let mut snapshot = Snapshot::default();

        let panel = render(&mut widget, &snapshot, &settings);
        assert!(!panel.contents().contains("Earning rate"));

        snapshot.earning_rate = 0.5;
        let panel = render(&mut widget, &snapshot, &settings);
        assert!(panel.contents().contains("\n Earning rate : 0.5000/60s"));

        snapshot.earning_rate = 0.0;
        let panel = render(&mut widget, &snapshot, &settings);
        assert!(panel.contents().contains("\n Earning rate : 0.0000/60s"));
    }

    #[test]
    fn test_future_bingo_counts_as_now() {
        let mut widget = InstanceInfo::new("v".into());
        let bingo = (now() + Duration::minutes(5)).to_rfc3339();
        let snapshot = Snapshot {
            bingo,
            ..Default::default()
        };

        let panel = render(&mut widget, &snapshot, &Settings::default());
        assert!(panel.contents().contains(" BINGO      : 0s ago\n"));
    }

    #[test]
    fn test_parse_timestamp_layouts() {
        assert!(parse_timestamp("", "%+").is_none());
        assert!(parse_timestamp("garbage", "%+").is_none());

        let naive = parse_timestamp("2024-05-01 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(naive, parse_timestamp("2024-05-01T12:00:00+00:00", "%+").unwrap());

        let offset = parse_timestamp("2024-05-01T14:00:00+02:00", "%+").unwrap();
        assert_eq!(offset, naive);
    }
}
