use super::{whole, PanelRenderer, RenderContext};
use crate::error::PanelError;
use crate::panel::TextPanel;

const NO_DATA: &str = "no data";

/// Block panel: latest block header fields and its optional metadata.
#[derive(Debug, Default)]
pub struct BlockInfo;

impl PanelRenderer for BlockInfo {
    fn name(&self) -> &'static str {
        "block"
    }

    fn render(&mut self, ctx: &RenderContext<'_>, panel: &mut TextPanel) -> Result<(), PanelError> {
        let s = ctx.snapshot;

        panel.write(&format!(
            " BlockNumber: {}, BlockSize: {}",
            whole(s.block_number),
            s.block_size
        ))?;
        panel.write(&format!("\n Num transactions in block: {}", s.transaction_count))?;
        panel.write(&format!("\n BlockHash: {}", s.block_hash))?;
        panel.write(&format!("\n StateRoot: {}", s.state_root))?;

        let meta = s.block_data.as_ref();
        let epoch = meta.and_then(|m| m.epoch).map(whole);
        let signers = meta.and_then(|m| m.signers.clone());
        let shard = meta.and_then(|m| m.shard).map(whole);

        panel.write(&format!("\n BlockEpoch: {}", epoch.as_deref().unwrap_or(NO_DATA)))?;
        panel.write(&format!(
            "\n Number of signers: {}",
            signers.as_deref().unwrap_or(NO_DATA)
        ))?;
        panel.write(&format!("\n BlockShard: {}", shard.as_deref().unwrap_or(NO_DATA)))?;
        Ok(())
    }
}
