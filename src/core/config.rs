//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.greengarden/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::core::animation::{
    AnimationTimings, DEFAULT_COUNTER_DURATION, DEFAULT_INDICATOR_DURATION,
    DEFAULT_TYPING_INTERVAL,
};
use crate::core::characters::DEFAULT_ROLE_KEY;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GardenConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GameConfig {
    pub default_role: Option<String>,
    pub default_slot: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub typing_interval_ms: Option<u64>,
    pub counter_duration_ms: Option<u64>,
    pub indicator_duration_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub file: Option<String>,
}

/// Values supplied on the command line (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub server: Option<String>,
    pub role: Option<String>,
    pub log_level: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_SLOT: &str = "1";
pub const DEFAULT_LOG_FILE: &str = "greengarden.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub server_url: String,
    pub timeout: Duration,
    pub default_role: String,
    pub default_slot: String,
    pub timings: AnimationTimings,
    pub log_level: LevelFilter,
    pub log_file: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve(&GardenConfig::default(), &CliOverrides::default())
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.greengarden/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".greengarden").join("config.toml"))
}

/// Load config from `~/.greengarden/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `GardenConfig::default()`.
pub fn load_config() -> Result<GardenConfig, ConfigError> {
    let Some(path) = config_path() else {
        warn!("Could not determine home directory, using default config");
        return Ok(GardenConfig::default());
    };
    load_config_from(&path)
}

/// Load config from an explicit path, generating the default file if absent.
pub fn load_config_from(path: &Path) -> Result<GardenConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(GardenConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: GardenConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# Green Garden client configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [server]
# base_url = "http://127.0.0.1:5000"   # Or set GREENGARDEN_SERVER_URL
# timeout_secs = 120

# [game]
# default_role = "su_tang"             # su_tang, lin_yuhan, luo_yimo, gu_pan, xia_xingwan
# default_slot = "1"

# [ui]
# typing_interval_ms = 50              # Delay between revealed characters
# counter_duration_ms = 800            # Affection counter / meter animation
# indicator_duration_ms = 1500         # Floating +N/-N indicator

# [logging]
# level = "info"                       # off, error, warn, info, debug, trace
# file = "greengarden.log"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &GardenConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Server URL: CLI → env → config → default
    let server_url = cli
        .server
        .clone()
        .or_else(|| std::env::var("GREENGARDEN_SERVER_URL").ok())
        .or_else(|| config.server.base_url.clone())
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

    // Role: CLI → env → config → default
    let default_role = cli
        .role
        .clone()
        .or_else(|| std::env::var("GREENGARDEN_ROLE").ok())
        .or_else(|| config.game.default_role.clone())
        .unwrap_or_else(|| DEFAULT_ROLE_KEY.to_string())
        .to_lowercase();

    let log_level = cli
        .log_level
        .as_deref()
        .or(config.logging.level.as_deref())
        .and_then(|level| match LevelFilter::from_str(level) {
            Ok(filter) => Some(filter),
            Err(_) => {
                warn!("Unknown log level '{}', using {}", level, DEFAULT_LOG_LEVEL);
                None
            }
        })
        .unwrap_or(DEFAULT_LOG_LEVEL);

    let ms_or = |value: Option<u64>, default: Duration| {
        value.map(Duration::from_millis).unwrap_or(default)
    };

    ResolvedConfig {
        server_url,
        timeout: Duration::from_secs(config.server.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        default_role,
        default_slot: config
            .game
            .default_slot
            .clone()
            .unwrap_or_else(|| DEFAULT_SLOT.to_string()),
        timings: AnimationTimings {
            counter: ms_or(config.ui.counter_duration_ms, DEFAULT_COUNTER_DURATION),
            indicator: ms_or(config.ui.indicator_duration_ms, DEFAULT_INDICATOR_DURATION),
            typing_interval: ms_or(config.ui.typing_interval_ms, DEFAULT_TYPING_INTERVAL),
        },
        log_level,
        log_file: PathBuf::from(
            config
                .logging
                .file
                .clone()
                .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = GardenConfig::default();
        assert!(config.server.base_url.is_none());
        assert!(config.game.default_role.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve(&GardenConfig::default(), &CliOverrides::default());
        assert_eq!(resolved.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(resolved.default_slot, DEFAULT_SLOT);
        assert_eq!(resolved.timings, AnimationTimings::default());
        assert_eq!(resolved.log_file, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = GardenConfig {
            server: ServerConfig {
                base_url: Some("http://game.local:8080".to_string()),
                timeout_secs: Some(10),
            },
            game: GameConfig {
                default_role: Some("Lin_Yuhan".to_string()),
                default_slot: Some("happy_ending".to_string()),
            },
            ui: UiConfig {
                typing_interval_ms: Some(20),
                counter_duration_ms: Some(400),
                indicator_duration_ms: None,
            },
            logging: LoggingConfig {
                level: Some("debug".to_string()),
                file: Some("/tmp/gg.log".to_string()),
            },
        };
        let resolved = resolve(&config, &CliOverrides::default());
        // Env vars may be set on a developer machine; only assert what they can't touch.
        assert_eq!(resolved.timeout, Duration::from_secs(10));
        assert_eq!(resolved.default_slot, "happy_ending");
        assert_eq!(resolved.timings.typing_interval, Duration::from_millis(20));
        assert_eq!(resolved.timings.counter, Duration::from_millis(400));
        assert_eq!(resolved.timings.indicator, DEFAULT_INDICATOR_DURATION);
        assert_eq!(resolved.log_level, LevelFilter::Debug);
        assert_eq!(resolved.log_file, PathBuf::from("/tmp/gg.log"));
    }

    #[test]
    fn test_resolve_cli_wins() {
        let config = GardenConfig {
            server: ServerConfig {
                base_url: Some("http://from-config".to_string()),
                ..Default::default()
            },
            game: GameConfig {
                default_role: Some("gu_pan".to_string()),
                ..Default::default()
            },
            logging: LoggingConfig {
                level: Some("debug".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            server: Some("http://from-cli".to_string()),
            role: Some("XIA_XINGWAN".to_string()),
            log_level: Some("warn".to_string()),
        };
        let resolved = resolve(&config, &cli);
        assert_eq!(resolved.server_url, "http://from-cli");
        assert_eq!(resolved.default_role, "xia_xingwan");
        assert_eq!(resolved.log_level, LevelFilter::Warn);
    }

    #[test]
    fn test_bad_log_level_falls_back() {
        let cli = CliOverrides {
            log_level: Some("chatty".to_string()),
            ..Default::default()
        };
        let resolved = resolve(&GardenConfig::default(), &cli);
        assert_eq!(resolved.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[server]
base_url = "http://127.0.0.1:5000"
timeout_secs = 30

[game]
default_role = "luo_yimo"
default_slot = "2"

[ui]
typing_interval_ms = 10

[logging]
level = "trace"
"#;
        let config: GardenConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.server.base_url.as_deref(),
            Some("http://127.0.0.1:5000")
        );
        assert_eq!(config.server.timeout_secs, Some(30));
        assert_eq!(config.game.default_role.as_deref(), Some("luo_yimo"));
        assert_eq!(config.ui.typing_interval_ms, Some(10));
        assert!(config.ui.counter_duration_ms.is_none());
        assert_eq!(config.logging.level.as_deref(), Some("trace"));
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing; everything else stays default
        let toml_str = r#"
[game]
default_slot = "3"
"#;
        let config: GardenConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.game.default_slot.as_deref(), Some("3"));
        assert!(config.server.base_url.is_none());
        assert!(config.logging.level.is_none());
    }

    #[test]
    fn test_missing_file_generates_default() {
        let dir = std::env::temp_dir().join(format!("greengarden-cfg-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");
        let config = load_config_from(&path).unwrap();
        assert!(config.server.base_url.is_none());
        let generated = fs::read_to_string(&path).unwrap();
        assert!(generated.contains("# [server]"));
        // The generated file is all comments, so it parses back to defaults.
        let reparsed = load_config_from(&path).unwrap();
        assert!(reparsed.game.default_role.is_none());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = std::env::temp_dir().join(format!("greengarden-cfg-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "[server\nbase_url = 1").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
        let _ = fs::remove_dir_all(dir);
    }
}
