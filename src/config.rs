//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/satbench/satbench.toml`
//! 3. Environment variables: `SATBENCH_*` prefix

use std::path::PathBuf;

use clap::ValueEnum;
use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// One worksheet tool, each with its own root directory and server port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ToolKind {
    Hypothesis,
    Circleboard,
    Ach,
    Timeline,
    CausalMap,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::Hypothesis,
        ToolKind::Circleboard,
        ToolKind::Ach,
        ToolKind::Timeline,
        ToolKind::CausalMap,
    ];

    /// Directory name under `data_dir`.
    pub fn dir_name(self) -> &'static str {
        match self {
            ToolKind::Hypothesis => "hypothesis",
            ToolKind::Circleboard => "circleboard",
            ToolKind::Ach => "ach",
            ToolKind::Timeline => "timeline",
            ToolKind::CausalMap => "causal-map",
        }
    }

    /// Historical default port per tool.
    pub fn default_port(self) -> u16 {
        match self {
            ToolKind::Hypothesis => 8083,
            ToolKind::Circleboard => 8082,
            ToolKind::Ach => 8084,
            ToolKind::Timeline => 8080,
            ToolKind::CausalMap => 8765,
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Per-tool port overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PortConfig {
    pub hypothesis: u16,
    pub circleboard: u16,
    pub ach: u16,
    pub timeline: u16,
    pub causal_map: u16,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            hypothesis: ToolKind::Hypothesis.default_port(),
            circleboard: ToolKind::Circleboard.default_port(),
            ach: ToolKind::Ach.default_port(),
            timeline: ToolKind::Timeline.default_port(),
            causal_map: ToolKind::CausalMap.default_port(),
        }
    }
}

impl PortConfig {
    pub fn port(&self, tool: ToolKind) -> u16 {
        match tool {
            ToolKind::Hypothesis => self.hypothesis,
            ToolKind::Circleboard => self.circleboard,
            ToolKind::Ach => self.ach,
            ToolKind::Timeline => self.timeline,
            ToolKind::CausalMap => self.causal_map,
        }
    }
}

/// Unified configuration for satbench.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Base directory for tool data (default: ~/.satbench)
    pub data_dir: PathBuf,
    /// Bind address for the servers
    pub bind: String,
    /// Per-tool server ports
    pub ports: PortConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            bind: "127.0.0.1".to_string(),
            ports: PortConfig::default(),
        }
    }
}

/// Get the default data directory (~/.satbench).
fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".satbench"))
        .unwrap_or_else(|| PathBuf::from("~/.satbench"))
}

/// Get the XDG config directory for satbench.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "satbench").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("satbench.toml"))
}

impl Settings {
    /// Root directory for one tool's artifacts.
    pub fn tool_root(&self, tool: ToolKind) -> PathBuf {
        self.data_dir.join(tool.dir_name())
    }

    /// Expand shell variables and tilde in path-like fields.
    ///
    /// Handles `~`, `$VAR`, and `${VAR}` syntax.
    fn expand_paths(&mut self) {
        let raw = self.data_dir.to_string_lossy().to_string();
        match shellexpand::full(&raw) {
            Ok(expanded) => self.data_dir = PathBuf::from(expanded.as_ref()),
            Err(_) => {
                // Leave the unexpandable path as-is; downstream I/O reports it.
            }
        }
    }

    /// Load settings with layered precedence.
    pub fn load() -> Result<Self, ApplicationError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("data_dir", defaults.data_dir.to_string_lossy().to_string())
            .map_err(config_err)?
            .set_default("bind", defaults.bind.clone())
            .map_err(config_err)?
            .set_default("ports.hypothesis", i64::from(defaults.ports.hypothesis))
            .map_err(config_err)?
            .set_default("ports.circleboard", i64::from(defaults.ports.circleboard))
            .map_err(config_err)?
            .set_default("ports.ach", i64::from(defaults.ports.ach))
            .map_err(config_err)?
            .set_default("ports.timeline", i64::from(defaults.ports.timeline))
            .map_err(config_err)?
            .set_default("ports.causal_map", i64::from(defaults.ports.causal_map))
            .map_err(config_err)?;

        if let Some(global_path) = global_config_path() {
            builder = builder.add_source(File::from(global_path).required(false));
        }

        builder = builder.add_source(Environment::with_prefix("SATBENCH").separator("__"));

        let config = builder.build().map_err(config_err)?;
        let mut settings: Self = config.try_deserialize().map_err(config_err)?;
        settings.expand_paths();
        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# satbench configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/satbench/satbench.toml
#   Env:    SATBENCH_* environment variables (explicit overrides,
#           nested keys use "__", e.g. SATBENCH_PORTS__ACH=9084)

# Base directory for tool data (one subdirectory per tool)
# data_dir = "~/.satbench"

# Bind address for the save servers
# bind = "127.0.0.1"

[ports]
# hypothesis = 8083
# circleboard = 8082
# ach = 8084
# timeline = 8080
# causal_map = 8765
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load().expect("load defaults");
        assert!(settings.data_dir.to_string_lossy().contains(".satbench"));
        assert_eq!(settings.ports.port(ToolKind::Hypothesis), 8083);
        assert_eq!(settings.ports.port(ToolKind::CausalMap), 8765);
    }

    #[test]
    fn given_tool_kind_when_resolving_root_then_under_data_dir() {
        let settings = Settings {
            data_dir: PathBuf::from("/tmp/bench"),
            ..Settings::default()
        };
        assert_eq!(
            settings.tool_root(ToolKind::CausalMap),
            PathBuf::from("/tmp/bench/causal-map")
        );
    }

    #[test]
    fn given_tilde_in_data_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            data_dir: PathBuf::from("~/.satbench"),
            ..Settings::default()
        };
        settings.expand_paths();
        let home = std::env::var("HOME").expect("HOME should be set");
        let data_str = settings.data_dir.to_string_lossy();
        assert!(data_str.starts_with(&home), "data_dir: {}", data_str);
        assert!(!data_str.contains('~'));
    }

    #[test]
    fn given_defaults_when_rendering_toml_then_ports_present() {
        let toml = Settings::default().to_toml().expect("toml");
        assert!(toml.contains("causal_map = 8765"));
    }
}
