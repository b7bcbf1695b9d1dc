//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Location
//!
//! Searched in order:
//! 1. `$DEX_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/dex/config.toml`
//! 3. `~/.dex/config.toml` (canonical write location)
//!
//! # Validation
//!
//! Values are validated after parsing: `history_limit` must be at least one,
//! `log_filter` must not be blank, and locked view groups must be valid
//! view-group ids.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::ViewGroupId;

/// Editor configuration (user scope).
///
/// # Example
///
/// ```toml
/// user = "alice"
/// history_limit = 50
/// log_filter = "dexedit=debug"
///
/// [actions]
/// minor_version_additions = true
///
/// [view_groups]
/// locked = ["details"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DexConfig {
    /// User id consulted by repository lock checks
    pub user: Option<String>,

    /// Bound on the navigation back stack
    pub history_limit: Option<usize>,

    /// `tracing` filter directive used by the `dex` binary
    pub log_filter: Option<String>,

    /// Action policy settings
    pub actions: Option<ActionsConfig>,

    /// View-group settings
    pub view_groups: Option<ViewGroupsConfig>,
}

impl DexConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_limit == Some(0) {
            return Err(ConfigError::InvalidValue(
                "history_limit must be at least 1".into(),
            ));
        }

        if let Some(filter) = &self.log_filter {
            if filter.trim().is_empty() {
                return Err(ConfigError::InvalidValue("log_filter cannot be empty".into()));
            }
        }

        if let Some(user) = &self.user {
            if user.trim().is_empty() {
                return Err(ConfigError::InvalidValue("user cannot be empty".into()));
            }
        }

        if let Some(groups) = &self.view_groups {
            groups.validate()?;
        }

        Ok(())
    }

    /// Write this configuration to `path` atomically.
    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        super::write_config_atomic(path, self)
    }
}

/// Action policy settings.
///
/// ```toml
/// [actions]
/// minor_version_additions = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ActionsConfig {
    /// Allow non-breaking additions to members carried forward into a minor
    /// version (default: true)
    pub minor_version_additions: Option<bool>,
}

/// View-group settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ViewGroupsConfig {
    /// Groups whose navigation lock is engaged at startup
    pub locked: Vec<String>,
}

impl ViewGroupsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ids().map(|_| ())
    }

    /// Locked groups as validated ids.
    pub fn ids(&self) -> Result<Vec<ViewGroupId>, ConfigError> {
        self.locked
            .iter()
            .map(|g| {
                ViewGroupId::new(g.as_str()).map_err(|e| {
                    ConfigError::InvalidValue(format!("invalid view group '{g}': {e}"))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_example() {
        let config: DexConfig = toml::from_str(
            r#"
            user = "alice"
            history_limit = 10
            log_filter = "dexedit=debug"

            [actions]
            minor_version_additions = false

            [view_groups]
            locked = ["details", "tree"]
            "#,
        )
        .unwrap();

        config.validate().unwrap();
        assert_eq!(config.user.as_deref(), Some("alice"));
        assert_eq!(config.history_limit, Some(10));
        assert_eq!(
            config.actions.unwrap().minor_version_additions,
            Some(false)
        );
        assert_eq!(config.view_groups.unwrap().locked.len(), 2);
    }

    #[test]
    fn zero_history_limit_rejected() {
        let config = DexConfig {
            history_limit: Some(0),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn invalid_view_group_rejected() {
        let config = DexConfig {
            view_groups: Some(ViewGroupsConfig {
                locked: vec!["has space".into()],
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_fields_rejected() {
        let result: Result<DexConfig, _> = toml::from_str("colour = \"blue\"");
        assert!(result.is_err());

        let result: Result<DexConfig, _> = toml::from_str("[actions]\nbogus = true");
        assert!(result.is_err());
    }
}
