use std::env;
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub remote: RemoteConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub api_key: SecretString,
    pub base_url: String,
    /// Local IPs to bind one outbound client each to.
    pub local_addresses: Vec<String>,
    /// Extra local IPs, one per line. Read only when the file exists.
    pub local_addresses_file: PathBuf,
    pub max_attempts: u32,
    pub throttle_backoff_ms: u64,
    pub request_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub remote_api_key: Option<String>,
    pub remote_base_url: Option<String>,
    pub server_port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

pub const DEFAULT_BASE_URL: &str = "https://www.bungie.net/Platform";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://warmind.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            remote: RemoteConfig {
                api_key: String::new().into(),
                base_url: DEFAULT_BASE_URL.to_string(),
                local_addresses: Vec::new(),
                local_addresses_file: PathBuf::from("local_clients.txt"),
                max_attempts: 5,
                throttle_backoff_ms: 1_000,
                request_timeout_secs: 30,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("warmind.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(remote) = patch.remote {
            if let Some(remote_api_key_value) = remote.api_key {
                self.remote.api_key = secret_value(remote_api_key_value);
            }
            if let Some(base_url) = remote.base_url {
                self.remote.base_url = base_url;
            }
            if let Some(local_addresses) = remote.local_addresses {
                self.remote.local_addresses = local_addresses;
            }
            if let Some(local_addresses_file) = remote.local_addresses_file {
                self.remote.local_addresses_file = local_addresses_file;
            }
            if let Some(max_attempts) = remote.max_attempts {
                self.remote.max_attempts = max_attempts;
            }
            if let Some(throttle_backoff_ms) = remote.throttle_backoff_ms {
                self.remote.throttle_backoff_ms = throttle_backoff_ms;
            }
            if let Some(request_timeout_secs) = remote.request_timeout_secs {
                self.remote.request_timeout_secs = request_timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("WARMIND_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("WARMIND_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_u32("WARMIND_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("WARMIND_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("WARMIND_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("WARMIND_REMOTE_API_KEY") {
            self.remote.api_key = secret_value(value);
        }
        if let Some(value) = read_env("WARMIND_REMOTE_BASE_URL") {
            self.remote.base_url = value;
        }
        if let Some(value) = read_env("WARMIND_REMOTE_LOCAL_ADDRESSES") {
            self.remote.local_addresses = value
                .split(',')
                .map(str::trim)
                .filter(|address| !address.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(value) = read_env("WARMIND_REMOTE_LOCAL_ADDRESSES_FILE") {
            self.remote.local_addresses_file = PathBuf::from(value);
        }
        if let Some(value) = read_env("WARMIND_REMOTE_MAX_ATTEMPTS") {
            self.remote.max_attempts = parse_u32("WARMIND_REMOTE_MAX_ATTEMPTS", &value)?;
        }
        if let Some(value) = read_env("WARMIND_REMOTE_THROTTLE_BACKOFF_MS") {
            self.remote.throttle_backoff_ms = parse_u64("WARMIND_REMOTE_THROTTLE_BACKOFF_MS", &value)?;
        }
        if let Some(value) = read_env("WARMIND_REMOTE_REQUEST_TIMEOUT_SECS") {
            self.remote.request_timeout_secs =
                parse_u64("WARMIND_REMOTE_REQUEST_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("WARMIND_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("WARMIND_SERVER_PORT") {
            self.server.port = parse_u16("WARMIND_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("WARMIND_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("WARMIND_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level = read_env("WARMIND_LOGGING_LEVEL").or_else(|| read_env("WARMIND_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("WARMIND_LOGGING_FORMAT").or_else(|| read_env("WARMIND_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(remote_api_key) = overrides.remote_api_key {
            self.remote.api_key = secret_value(remote_api_key);
        }
        if let Some(remote_base_url) = overrides.remote_base_url {
            self.remote.base_url = remote_base_url;
        }
        if let Some(server_port) = overrides.server_port {
            self.server.port = server_port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_remote(&self.remote)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("warmind.toml"), PathBuf::from("config/warmind.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_remote(remote: &RemoteConfig) -> Result<(), ConfigError> {
    if remote.api_key.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "remote.api_key is required. Register an application at https://www.bungie.net/en/Application to get one".to_string(),
        ));
    }

    if !remote.base_url.starts_with("http://") && !remote.base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "remote.base_url must start with http:// or https://".to_string(),
        ));
    }

    if let Some(bad) = remote.local_addresses.iter().find(|address| address.parse::<IpAddr>().is_err()) {
        return Err(ConfigError::Validation(format!(
            "remote.local_addresses contains `{bad}`, which is not an IP address"
        )));
    }

    if remote.max_attempts == 0 || remote.max_attempts > 10 {
        return Err(ConfigError::Validation(
            "remote.max_attempts must be in range 1..=10".to_string(),
        ));
    }

    if remote.request_timeout_secs == 0 || remote.request_timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "remote.request_timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    remote: Option<RemotePatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RemotePatch {
    api_key: Option<String>,
    base_url: Option<String>,
    local_addresses: Option<Vec<String>>,
    local_addresses_file: Option<PathBuf>,
    max_attempts: Option<u32>,
    throttle_backoff_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
