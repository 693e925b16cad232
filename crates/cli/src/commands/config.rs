use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use toml::Value;
use warmind_core::config::{AppConfig, LoadOptions};

/// One rendered setting: dotted key, value, and the env var that overrides it.
struct Setting {
    key: &'static str,
    value: String,
    env_key: &'static str,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for setting in settings(&config) {
        let source = field_source(
            setting.key,
            setting.env_key,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(format!("- {} = {} (source: {source})", setting.key, setting.value));
    }

    lines.join("\n")
}

fn settings(config: &AppConfig) -> Vec<Setting> {
    let setting = |key, value: String, env_key| Setting { key, value, env_key };
    let remote = &config.remote;
    let local_addresses =
        if remote.local_addresses.is_empty() { "<none>".to_string() } else { remote.local_addresses.join(", ") };

    vec![
        setting("database.url", config.database.url.clone(), "WARMIND_DATABASE_URL"),
        setting(
            "database.max_connections",
            config.database.max_connections.to_string(),
            "WARMIND_DATABASE_MAX_CONNECTIONS",
        ),
        setting("database.timeout_secs", config.database.timeout_secs.to_string(), "WARMIND_DATABASE_TIMEOUT_SECS"),
        setting("remote.api_key", redact_key(remote.api_key.expose_secret()), "WARMIND_REMOTE_API_KEY"),
        setting("remote.base_url", remote.base_url.clone(), "WARMIND_REMOTE_BASE_URL"),
        setting("remote.local_addresses", local_addresses, "WARMIND_REMOTE_LOCAL_ADDRESSES"),
        setting(
            "remote.local_addresses_file",
            remote.local_addresses_file.display().to_string(),
            "WARMIND_REMOTE_LOCAL_ADDRESSES_FILE",
        ),
        setting("remote.max_attempts", remote.max_attempts.to_string(), "WARMIND_REMOTE_MAX_ATTEMPTS"),
        setting(
            "remote.throttle_backoff_ms",
            remote.throttle_backoff_ms.to_string(),
            "WARMIND_REMOTE_THROTTLE_BACKOFF_MS",
        ),
        setting(
            "remote.request_timeout_secs",
            remote.request_timeout_secs.to_string(),
            "WARMIND_REMOTE_REQUEST_TIMEOUT_SECS",
        ),
        setting("server.bind_address", config.server.bind_address.clone(), "WARMIND_SERVER_BIND_ADDRESS"),
        setting("server.port", config.server.port.to_string(), "WARMIND_SERVER_PORT"),
        setting(
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            "WARMIND_SERVER_GRACEFUL_SHUTDOWN_SECS",
        ),
        setting("logging.level", config.logging.level.clone(), "WARMIND_LOGGING_LEVEL"),
        setting("logging.format", format!("{:?}", config.logging.format), "WARMIND_LOGGING_FORMAT"),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("warmind.toml"), PathBuf::from("config/warmind.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if env::var_os(env_key).is_some() {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

/// API keys are opaque hex strings; only the last four characters are shown.
fn redact_key(key: &str) -> String {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    let chars: Vec<char> = trimmed.chars().collect();
    if chars.len() <= 8 {
        return "<redacted>".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("***{tail}")
}
