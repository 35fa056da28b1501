use super::{whole, PanelRenderer, RenderContext};
use crate::error::PanelError;
use crate::panel::TextPanel;

/// Chain/consensus panel: peers, leader, epoch and the consensus phases.
#[derive(Debug, Default)]
pub struct ChainInfo;

impl PanelRenderer for ChainInfo {
    fn name(&self) -> &'static str {
        "chain"
    }

    fn render(&mut self, ctx: &RenderContext<'_>, panel: &mut TextPanel) -> Result<(), PanelError> {
        let s = ctx.snapshot;

        panel.write(&format!(" This node is connected to {} peers", s.peer_count))?;
        panel.write(&format!("\n Leader: {}", s.leader))?;
        panel.write(&format!("\n Epoch: {}", whole(s.epoch)))?;
        panel.write(&format!("\n\n Announce    : {}", s.announce))?;
        panel.write(&format!("\n OnAnnounce  : {}", s.on_announce))?;
        panel.write(&format!("\n OnPrepared  : {}", s.on_prepared))?;
        panel.write(&format!("\n OnCommitted : {}", s.on_committed))?;
        panel.write(&format!("\n Block Reward: {}", s.block_reward))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::Overflow;
    use crate::settings::Settings;
    use crate::snapshot::Snapshot;
    use chrono::Utc;

    fn render(snapshot: &Snapshot) -> String {
        let settings = Settings::default();
        let mut panel = TextPanel::new(16, Overflow::Reject);
        let ctx = RenderContext {
            snapshot,
            settings: &settings,
            now: Utc::now(),
        };
        ChainInfo.render(&ctx, &mut panel).unwrap();
        panel.contents()
    }

    #[test]
    fn test_full_snapshot() {
        let snapshot = Snapshot {
            peer_count: 42,
            leader: "one1abc".into(),
            epoch: 117.0,
            announce: "12:00:01".into(),
            on_announce: "12:00:02".into(),
            on_prepared: "12:00:03".into(),
            on_committed: "12:00:04".into(),
            block_reward: "28 ONE".into(),
            ..Default::default()
        };

        assert_eq!(
            render(&snapshot),
            " This node is connected to 42 peers\n Leader: one1abc\n Epoch: 117\n\n \
             Announce    : 12:00:01\n OnAnnounce  : 12:00:02\n OnPrepared  : 12:00:03\n \
             OnCommitted : 12:00:04\n Block Reward: 28 ONE"
        );
    }

    #[test]
    fn test_empty_fields_render_blank() {
        let contents = render(&Snapshot::default());
        let lines: Vec<&str> = contents.lines().collect();

        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], " This node is connected to 0 peers");
        assert_eq!(lines[1], " Leader: ");
        assert_eq!(lines[4], " Announce    : ");
        assert_eq!(lines[8], " Block Reward: ");
    }
}
