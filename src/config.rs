//! Static configuration selected once at startup by an environment tag.

use std::path::PathBuf;
use std::time::Duration;

/// Variable naming the node's development workspace under the `local` tag.
pub const WORKSPACE_ENV: &str = "GOPATH";

/// Location of the node sources inside the workspace.
const NODE_SOURCE_DIR: &str = "src/github.com/harmony-one/harmony";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Ec2,
    Default,
}

impl Environment {
    /// Unrecognized tags, including the empty one, are the default environment.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "local" => Self::Local,
            "ec2" => Self::Ec2,
            _ => Self::Default,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Ec2 => "ec2",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub environment: Environment,
    pub log_path: PathBuf,
    pub node_binary_path: PathBuf,
    pub blockchain_poll_interval: Duration,
    pub system_stats_poll_interval: Duration,
    pub widget_refresh_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Default,
            log_path: PathBuf::from("./"),
            node_binary_path: PathBuf::from("./"),
            blockchain_poll_interval: Duration::from_millis(3000),
            system_stats_poll_interval: Duration::from_millis(500),
            widget_refresh_interval: Duration::from_millis(1000),
        }
    }
}

impl Config {
    /// Select the configuration for `tag`, reading the workspace root from
    /// the environment. Never fails.
    pub fn select(tag: &str) -> Self {
        let workspace = std::env::var(WORKSPACE_ENV).ok();
        Self::select_with(tag, workspace.as_deref())
    }

    /// Same as [`Config::select`] with the workspace variable supplied.
    pub fn select_with(tag: &str, workspace: Option<&str>) -> Self {
        let mut config = Self::default();

        match Environment::from_tag(tag) {
            Environment::Local => {
                let root = match workspace {
                    Some(root) if !root.is_empty() => PathBuf::from(root),
                    _ => default_workspace_root(),
                };
                let node_dir = root.join(NODE_SOURCE_DIR);

                config.environment = Environment::Local;
                config.log_path = node_dir.join("tmp_log");
                config.node_binary_path = node_dir.join("bin");
                config.blockchain_poll_interval = Duration::from_millis(3000);
                config.system_stats_poll_interval = Duration::from_millis(250);
            }
            Environment::Ec2 => {
                config.environment = Environment::Ec2;
                config.log_path = PathBuf::from("./latest/");
                config.node_binary_path = PathBuf::from("./");
                config.blockchain_poll_interval = Duration::from_millis(5000);
                config.system_stats_poll_interval = Duration::from_millis(500);
            }
            Environment::Default => {}
        }

        config
    }
}

/// The Go toolchain's own fallback when GOPATH is unset: `$HOME/go`.
pub fn default_workspace_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("go")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tags_use_defaults() {
        for tag in ["", "prod", "LOCAL", "ec3", " local"] {
            assert_eq!(Config::select_with(tag, Some("/ws")), Config::default(), "tag {:?}", tag);
        }
    }

    #[test]
    fn test_local_uses_workspace_root() {
        let config = Config::select_with("local", Some("/home/dev/go"));

        assert_eq!(config.environment, Environment::Local);
        assert_eq!(
            config.log_path,
            PathBuf::from("/home/dev/go/src/github.com/harmony-one/harmony/tmp_log")
        );
        assert_eq!(
            config.node_binary_path,
            PathBuf::from("/home/dev/go/src/github.com/harmony-one/harmony/bin")
        );
        assert_eq!(config.system_stats_poll_interval, Duration::from_millis(250));
        assert_eq!(config.blockchain_poll_interval, Duration::from_millis(3000));
        assert_eq!(config.widget_refresh_interval, Duration::from_millis(1000));
    }

    #[test]
    fn test_local_without_workspace_falls_back() {
        let root = default_workspace_root();
        for workspace in [None, Some("")] {
            let config = Config::select_with("local", workspace);
            assert!(config.log_path.starts_with(&root));
            assert!(config.node_binary_path.starts_with(&root));
            assert!(config.log_path.ends_with("harmony-one/harmony/tmp_log"));
        }
    }

    #[test]
    fn test_ec2_uses_relative_paths() {
        let config = Config::select_with("ec2", Some("/ignored"));

        assert_eq!(config.environment, Environment::Ec2);
        assert_eq!(config.log_path, PathBuf::from("./latest/"));
        assert_eq!(config.node_binary_path, PathBuf::from("./"));
        assert_eq!(config.blockchain_poll_interval, Duration::from_millis(5000));
        assert_eq!(config.system_stats_poll_interval, Duration::from_millis(500));
    }

    #[test]
    fn test_environment_names() {
        assert_eq!(Environment::from_tag("local").name(), "local");
        assert_eq!(Environment::from_tag("ec2").name(), "ec2");
        assert_eq!(Environment::from_tag("").name(), "default");
    }
}
