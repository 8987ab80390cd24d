//! YAML configuration for inboxctl.
//!
//! # Example config file:
//! ```yaml
//! socket_path: /tmp/inboxctl-bridge.sock
//! assistant_id: agent
//! thread_id: 6f1c2a
//! reject_all_message: Rejected during batch review.
//! log_filter: inboxctl=debug
//! ```
//!
//! Lookup order: an explicit path, then `.inboxctl.yaml` walking up from the
//! current directory, then `~/.inboxctl/config.yaml`, then built-in
//! defaults. `INBOXCTL_*` environment variables override file values.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name searched for in the working directory and its parents.
pub const CONFIG_FILE_NAME: &str = ".inboxctl.yaml";

pub const DEFAULT_ASSISTANT_ID: &str = "agent";

/// Reason sent with every decision when a reviewer rejects a whole batch.
pub const DEFAULT_REJECT_ALL_MESSAGE: &str = "The user rejected all pending actions.";

pub const DEFAULT_LOG_FILTER: &str = "inboxctl=warn";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InboxConfig {
    /// Unix socket of the run-stream bridge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket_path: Option<PathBuf>,
    pub assistant_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    pub reject_all_message: String,
    pub log_filter: String,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            socket_path: None,
            assistant_id: DEFAULT_ASSISTANT_ID.to_string(),
            thread_id: None,
            reject_all_message: DEFAULT_REJECT_ALL_MESSAGE.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl InboxConfig {
    /// Apply `INBOXCTL_SOCKET`, `INBOXCTL_ASSISTANT_ID` and
    /// `INBOXCTL_THREAD_ID` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any variable lookup.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(socket) = non_empty("INBOXCTL_SOCKET") {
            self.socket_path = Some(PathBuf::from(socket));
        }
        if let Some(assistant_id) = non_empty("INBOXCTL_ASSISTANT_ID") {
            self.assistant_id = assistant_id;
        }
        if let Some(thread_id) = non_empty("INBOXCTL_THREAD_ID") {
            self.thread_id = Some(thread_id);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.assistant_id.trim().is_empty() {
            bail!("Config must have a non-empty 'assistant_id'");
        }
        if self.reject_all_message.trim().is_empty() {
            bail!("Config must have a non-empty 'reject_all_message'");
        }
        Ok(())
    }
}

/// Parse a YAML config string. Missing fields take their defaults.
pub fn parse_config_str(yaml: &str) -> Result<InboxConfig> {
    if yaml.trim().is_empty() {
        return Ok(InboxConfig::default());
    }
    let config: InboxConfig =
        serde_yaml::from_str(yaml).context("Invalid YAML syntax in config file")?;
    config.validate()?;
    Ok(config)
}

/// Parse a YAML config file from a path.
pub fn parse_config_file(path: impl AsRef<Path>) -> Result<InboxConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Find `.inboxctl.yaml` walking up the directory tree.
pub fn find_config_walking_up(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// The per-user config path (~/.inboxctl/config.yaml).
pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".inboxctl").join("config.yaml"))
}

/// Load configuration using the lookup order, then apply env overrides.
pub fn load_config(explicit: Option<&Path>) -> Result<InboxConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let cwd = std::env::current_dir().context("Could not determine current directory")?;
            find_config_walking_up(&cwd).or_else(|| user_config_path().filter(|p| p.exists()))
        }
    };

    let mut config = match path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            parse_config_file(&path)?
        }
        None => InboxConfig::default(),
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
socket_path: /tmp/bridge.sock
assistant_id: mail-agent
thread_id: t-123
reject_all_message: Nope.
log_filter: inboxctl=debug
"#;
        let config = parse_config_str(yaml).unwrap();
        assert_eq!(config.socket_path, Some(PathBuf::from("/tmp/bridge.sock")));
        assert_eq!(config.assistant_id, "mail-agent");
        assert_eq!(config.thread_id.as_deref(), Some("t-123"));
        assert_eq!(config.reject_all_message, "Nope.");
        assert_eq!(config.log_filter, "inboxctl=debug");
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let config = parse_config_str("assistant_id: other\n").unwrap();
        assert_eq!(config.assistant_id, "other");
        assert_eq!(config.reject_all_message, DEFAULT_REJECT_ALL_MESSAGE);
        assert!(config.socket_path.is_none());

        assert_eq!(parse_config_str("").unwrap(), InboxConfig::default());
    }

    #[test]
    fn test_reject_empty_assistant_id() {
        assert!(parse_config_str("assistant_id: \"  \"\n").is_err());
        assert!(parse_config_str("reject_all_message: \"\"\n").is_err());
    }

    #[test]
    fn test_reject_invalid_yaml() {
        assert!(parse_config_str("assistant_id: [unclosed").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("INBOXCTL_SOCKET", "/run/bridge.sock"),
            ("INBOXCTL_ASSISTANT_ID", "from-env"),
            ("INBOXCTL_THREAD_ID", ""),
        ]
        .into_iter()
        .collect();

        let mut config = InboxConfig::default();
        config.thread_id = Some("kept".to_string());
        config.apply_overrides_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.socket_path, Some(PathBuf::from("/run/bridge.sock")));
        assert_eq!(config.assistant_id, "from-env");
        // Empty values do not override
        assert_eq!(config.thread_id.as_deref(), Some("kept"));
    }

    #[test]
    fn test_find_config_walking_up() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE_NAME), "assistant_id: found\n").unwrap();

        let found = find_config_walking_up(&nested).unwrap();
        assert_eq!(found, tmp.path().join(CONFIG_FILE_NAME));
        assert_eq!(parse_config_file(&found).unwrap().assistant_id, "found");
    }
}
