use crate::core::DiscoveryOptions;
use crate::models::{UnsetLocationPolicy, DEFAULT_CANDIDATE_CAP, DEFAULT_RADIUS_KM};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub store: StoreSettings,
    #[serde(default)]
    pub supabase: Option<SupabaseSettings>,
    #[serde(default)]
    pub database: Option<DatabaseSettings>,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub discovery: DiscoverySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Which profile store backs discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Supabase,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    #[serde(default = "default_profiles_table")]
    pub profiles_table: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseSettings {
    pub url: String,
    pub service_key: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_viewer_capacity")]
    pub viewer_capacity: u64,
    #[serde(default = "default_feed_capacity")]
    pub feed_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
            viewer_capacity: default_viewer_capacity(),
            feed_capacity: default_feed_capacity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverySettings {
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,
    #[serde(default = "default_max_radius_km")]
    pub max_radius_km: f64,
    #[serde(default = "default_candidate_cap")]
    pub candidate_cap: usize,
    #[serde(default = "default_max_candidate_cap")]
    pub max_candidate_cap: usize,
    #[serde(default)]
    pub unset_location: UnsetLocationPolicy,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            default_radius_km: default_radius_km(),
            max_radius_km: default_max_radius_km(),
            candidate_cap: default_candidate_cap(),
            max_candidate_cap: default_max_candidate_cap(),
            unset_location: UnsetLocationPolicy::default(),
        }
    }
}

impl DiscoverySettings {
    /// Reject defaults that would make every feed empty or exceed the request limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        let radius_ok = |r: f64| r.is_finite() && r > 0.0;

        if !radius_ok(self.max_radius_km) {
            return Err(ConfigError::Message(format!(
                "discovery.max_radius_km must be a positive number, got {}",
                self.max_radius_km
            )));
        }
        if !radius_ok(self.default_radius_km) || self.default_radius_km > self.max_radius_km {
            return Err(ConfigError::Message(format!(
                "discovery.default_radius_km must be in (0, {}], got {}",
                self.max_radius_km, self.default_radius_km
            )));
        }
        if self.max_candidate_cap == 0 {
            return Err(ConfigError::Message("discovery.max_candidate_cap must be at least 1".into()));
        }
        if self.candidate_cap == 0 || self.candidate_cap > self.max_candidate_cap {
            return Err(ConfigError::Message(format!(
                "discovery.candidate_cap must be in 1..={}, got {}",
                self.max_candidate_cap, self.candidate_cap
            )));
        }

        Ok(())
    }

    pub fn engine_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            default_radius_km: self.default_radius_km,
            candidate_cap: self.candidate_cap,
            unset_location: self.unset_location,
        }
    }
}

fn default_profiles_table() -> String { "profiles".to_string() }
fn default_request_timeout_secs() -> u64 { 30 }
fn default_cache_ttl_secs() -> u64 { 300 }
fn default_viewer_capacity() -> u64 { 10_000 }
fn default_feed_capacity() -> u64 { 10_000 }
fn default_radius_km() -> f64 { DEFAULT_RADIUS_KM }
fn default_max_radius_km() -> f64 { 500.0 }
fn default_candidate_cap() -> usize { DEFAULT_CANDIDATE_CAP }
fn default_max_candidate_cap() -> usize { 1000 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with DISCOVERY__)
    /// 5. SUPABASE_URL, SUPABASE_SERVICE_KEY and DATABASE_URL
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., DISCOVERY__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?;

        let settings: Self = apply_platform_env(settings)?.try_deserialize()?;
        settings.discovery.validate()?;
        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        let settings: Self = settings.try_deserialize()?;
        settings.discovery.validate()?;
        Ok(settings)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("DISCOVERY")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Apply the backend's conventional environment variables on top
fn apply_platform_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = env::var("SUPABASE_URL") {
        builder = builder.set_override("supabase.url", url)?;
    }
    if let Ok(key) = env::var("SUPABASE_SERVICE_KEY") {
        builder = builder.set_override("supabase.service_key", key)?;
    }
    if let Ok(url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", url)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_discovery_settings() {
        let discovery = DiscoverySettings::default();
        assert_eq!(discovery.default_radius_km, 50.0);
        assert_eq!(discovery.candidate_cap, 200);
        assert_eq!(discovery.unset_location, UnsetLocationPolicy::DefaultToOrigin);

        let options = discovery.engine_options();
        assert_eq!(options.default_params().radius_km, 50.0);
        assert_eq!(options.default_params().limit, 200);
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "compact");
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("discovery-{}.toml", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
host = "127.0.0.1"
port = 8080

[store]
backend = "postgres"

[database]
url = "postgres://localhost/discovery"

[discovery]
default_radius_km = 25.0
unset_location = "exclude_viewer"
"#
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.store.backend, StoreBackend::Postgres);
        assert_eq!(settings.store.profiles_table, "profiles");
        assert_eq!(settings.discovery.default_radius_km, 25.0);
        assert_eq!(settings.discovery.candidate_cap, 200);
        assert_eq!(settings.discovery.unset_location, UnsetLocationPolicy::ExcludeViewer);
        assert_eq!(settings.cache.ttl_secs, 300);
        assert!(settings.supabase.is_none());
    }

    #[test]
    fn test_discovery_settings_validation() {
        assert!(DiscoverySettings::default().validate().is_ok());

        let invalid = [
            DiscoverySettings { default_radius_km: 0.0, ..DiscoverySettings::default() },
            DiscoverySettings { default_radius_km: -5.0, ..DiscoverySettings::default() },
            DiscoverySettings { default_radius_km: 600.0, ..DiscoverySettings::default() },
            DiscoverySettings { default_radius_km: f64::NAN, ..DiscoverySettings::default() },
            DiscoverySettings { max_radius_km: 0.0, ..DiscoverySettings::default() },
            DiscoverySettings { candidate_cap: 0, ..DiscoverySettings::default() },
            DiscoverySettings { candidate_cap: 5000, ..DiscoverySettings::default() },
            DiscoverySettings { max_candidate_cap: 0, ..DiscoverySettings::default() },
        ];
        for discovery in invalid {
            assert!(
                matches!(discovery.validate(), Err(ConfigError::Message(_))),
                "accepted {:?}",
                discovery
            );
        }

        let edge = DiscoverySettings {
            default_radius_km: 500.0,
            candidate_cap: 1000,
            ..DiscoverySettings::default()
        };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_load_from_rejects_out_of_range_defaults() {
        let path = std::env::temp_dir().join(format!("discovery-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"
[server]
host = "127.0.0.1"
port = 8080

[store]
backend = "supabase"

[discovery]
default_radius_km = 800.0
"#,
        )
        .unwrap();

        let result = Settings::load_from(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ConfigError::Message(_))));
    }
}
