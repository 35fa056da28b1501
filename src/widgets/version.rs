use tracing::{info, warn};

use crate::exec;
use crate::settings::Settings;
use crate::snapshot::{SharedSnapshot, COLLECTION_ERROR};

const VERSION_LABEL: &str = "App version: ";

/// Ask the node binary for its version.
///
/// Always returns a labelled string; a failed probe yields the collection
/// error placeholder instead of an error. The bare version (or placeholder)
/// is also stored in `snapshot.app_version`.
pub async fn get_app_version(settings: &Settings, snapshot: &SharedSnapshot) -> String {
    let binary = settings.node_binary();

    let version = match exec::run(&binary, ["-version"], settings.exec_timeout).await {
        Ok(output) => {
            // Go's flag handling prints the version on stderr
            let text = if output.stdout.trim().is_empty() {
                output.stderr
            } else {
                output.stdout
            };
            let version = text.trim().to_string();
            info!(binary = %binary.display(), %version, "Node version collected");
            version
        }
        Err(e) => {
            warn!(binary = %binary.display(), error = %e, "Cannot collect node version");
            COLLECTION_ERROR.to_string()
        }
    };

    snapshot.update(|s| s.app_version = version.clone());
    format!("{}{}", VERSION_LABEL, version)
}
