use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::{PanelRenderer, RenderContext};
use crate::error::WidgetError;
use crate::panel::SharedPanel;
use crate::settings::SharedSettings;
use crate::snapshot::SharedSnapshot;

fn ticker(start: Instant, period: Duration) -> Interval {
    let mut interval = time::interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Redraw `panel` with `renderer` every widget interval until `cancel` fires.
///
/// The first redraw happens immediately. The interval is re-read after every
/// tick so a settings reload takes effect without restarting the task. A
/// render error ends the task with that error.
pub fn start_refresh<R: PanelRenderer>(
    mut renderer: R,
    snapshot: SharedSnapshot,
    settings: SharedSettings,
    panel: SharedPanel,
    cancel: CancellationToken,
) -> JoinHandle<Result<(), WidgetError>> {
    tokio::spawn(async move {
        let widget = renderer.name();
        let mut period = settings.widget_interval();
        let mut interval = ticker(Instant::now(), period);
        debug!(widget, ?period, "Refresh loop started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(widget, "Refresh loop cancelled");
                    return Ok(());
                }
                _ = interval.tick() => {}
            }

            let current = settings.current();
            let state = snapshot.load();
            let ctx = RenderContext {
                snapshot: &state,
                settings: &current,
                now: Utc::now(),
            };

            {
                let mut target = panel.lock();
                target.reset();
                if let Err(source) = renderer.render(&ctx, &mut target) {
                    error!(widget, error = %source, "Render failed");
                    return Err(WidgetError::Render { widget, source });
                }
            }

            if current.widget_interval != period {
                debug!(widget, old = ?period, new = ?current.widget_interval, "Refresh interval changed");
                period = current.widget_interval;
                interval = ticker(Instant::now() + period, period);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PanelError;
    use crate::panel::{self, Overflow};
    use crate::settings::Settings;
    use crate::widgets::{ChainInfo, InstanceInfo};

    fn fast_settings() -> SharedSettings {
        SharedSettings::fixed(Settings {
            widget_interval: Duration::from_millis(10),
            ..Default::default()
        })
    }

    async fn wait_for<F: Fn() -> bool>(check: F) -> bool {
        for _ in 0..200 {
            if check() {
                return true;
            }
            time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_renders_latest_snapshot() {
        let snapshot = SharedSnapshot::default();
        let target = panel::shared(16, Overflow::Reject);
        let cancel = CancellationToken::new();

        let handle = start_refresh(
            ChainInfo,
            snapshot.clone(),
            fast_settings(),
            target.clone(),
            cancel.clone(),
        );

        assert!(wait_for(|| target.lock().contents().contains("connected to 0 peers")).await);

        snapshot.update(|s| s.peer_count = 7);
        assert!(wait_for(|| target.lock().contents().contains("connected to 7 peers")).await);

        // the panel is reset each tick, never accumulated
        assert_eq!(target.lock().contents().matches("connected to").count(), 1);

        cancel.cancel();
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_sticky_flag_survives_ticks() {
        let snapshot = SharedSnapshot::default();
        let target = panel::shared(16, Overflow::Reject);
        let cancel = CancellationToken::new();

        let handle = start_refresh(
            InstanceInfo::new("App version: test".into()),
            snapshot.clone(),
            fast_settings(),
            target.clone(),
            cancel.clone(),
        );

        snapshot.update(|s| s.earning_rate = 0.5);
        assert!(wait_for(|| target.lock().contents().contains("Earning rate : 0.5000")).await);

        snapshot.update(|s| s.earning_rate = 0.0);
        assert!(wait_for(|| target.lock().contents().contains("Earning rate : 0.0000")).await);

        cancel.cancel();
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_render_failure_ends_task() {
        let target = panel::shared(2, Overflow::Reject);

        let handle = start_refresh(
            ChainInfo,
            SharedSnapshot::default(),
            fast_settings(),
            target,
            CancellationToken::new(),
        );

        match handle.await.unwrap() {
            Err(WidgetError::Render { widget, source }) => {
                assert_eq!(widget, "chain");
                assert_eq!(source, PanelError::CapacityExceeded { capacity: 2 });
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
