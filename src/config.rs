use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Shared secret gating `/api/simulate` (required, no default - must be set via env var)
    pub cron_secret: String,

    /// Database URL (default: local sqlite file)
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Season pacing and timeout tunables
    #[serde(default)]
    pub season: SeasonConfig,

    /// Broadcast (SSE) tunables
    #[serde(default)]
    pub broadcast: BroadcastConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to (default: 0.0.0.0)
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct SeasonConfig {
    /// Rest gap between consecutive games in the same week, in seconds
    #[serde(default = "default_inter_game_gap_secs")]
    pub inter_game_gap_secs: i64,

    /// Gap between the last game of a week and the first game of the next
    #[serde(default = "default_inter_week_gap_secs")]
    pub inter_week_gap_secs: i64,

    /// Gap between a season's final game and the next season's opener
    #[serde(default = "default_offseason_gap_secs")]
    pub offseason_gap_secs: i64,

    /// Wall-clock budget given to any single `tick` action
    #[serde(default = "default_action_timeout_secs")]
    pub action_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct BroadcastConfig {
    /// Interval between heartbeat comments on an idle stream
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,

    /// How long a client's `Last-Event-ID` is honored for catch-up replay
    #[serde(default = "default_reconnect_timeout_secs")]
    pub reconnect_timeout_secs: i64,

    /// Maximum age of the most recent event before a stream is considered stalled
    #[serde(default = "default_max_event_delay_secs")]
    pub max_event_delay_secs: i64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_database_url() -> String {
    "sqlite://gridblitz.db?mode=rwc".to_string()
}

fn default_inter_game_gap_secs() -> i64 {
    900
}

fn default_inter_week_gap_secs() -> i64 {
    1800
}

fn default_offseason_gap_secs() -> i64 {
    1800
}

fn default_action_timeout_secs() -> u64 {
    60
}

fn default_heartbeat_interval_secs() -> u64 {
    15
}

fn default_reconnect_timeout_secs() -> i64 {
    270
}

fn default_max_event_delay_secs() -> i64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            inter_game_gap_secs: default_inter_game_gap_secs(),
            inter_week_gap_secs: default_inter_week_gap_secs(),
            offseason_gap_secs: default_offseason_gap_secs(),
            action_timeout_secs: default_action_timeout_secs(),
        }
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
            reconnect_timeout_secs: default_reconnect_timeout_secs(),
            max_event_delay_secs: default_max_event_delay_secs(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        Config::builder()
            // 1. Base config file (committed - non-secret defaults)
            .add_source(File::with_name("config/default").required(false))
            // 2. Local config file (gitignored - secrets and local overrides)
            .add_source(File::with_name("config/local").required(false))
            // 3. Environment variables (highest priority - for production/CI)
            //    APP_CRON_SECRET → cron_secret
            //    APP_SERVER__PORT → server.port (double underscore = nesting)
            //    APP_SEASON__ACTION_TIMEOUT_SECS → season.action_timeout_secs
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .expect("Failed to build configuration")
            .try_deserialize()
            .expect("Failed to deserialize configuration - is APP_CRON_SECRET set?")
    }

    /// Get the server bind address as "host:port"
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
