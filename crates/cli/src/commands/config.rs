use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use fournee_core::config::{AppConfig, LoadOptions};
use toml::Value;

const REDACTED: &str = "<redacted>";
const UNSET: &str = "<unset>";

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let api_key = if config.weather.api_key.is_some() { REDACTED } else { UNSET };
    let fields: [(&str, String, &[&str]); 12] = [
        ("database.url", config.database.url.clone(), &["FOURNEE_DATABASE_URL"]),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["FOURNEE_DATABASE_MAX_CONNECTIONS"],
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["FOURNEE_DATABASE_TIMEOUT_SECS"],
        ),
        (
            "weather.forecast_url",
            config.weather.forecast_url.clone(),
            &["FOURNEE_WEATHER_FORECAST_URL"],
        ),
        (
            "weather.archive_url",
            config.weather.archive_url.clone(),
            &["FOURNEE_WEATHER_ARCHIVE_URL"],
        ),
        (
            "weather.timeout_secs",
            config.weather.timeout_secs.to_string(),
            &["FOURNEE_WEATHER_TIMEOUT_SECS"],
        ),
        ("weather.api_key", api_key.to_string(), &["FOURNEE_WEATHER_API_KEY"]),
        (
            "server.bind_address",
            config.server.bind_address.clone(),
            &["FOURNEE_SERVER_BIND_ADDRESS"],
        ),
        ("server.port", config.server.port.to_string(), &["FOURNEE_SERVER_PORT"]),
        (
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["FOURNEE_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            &["FOURNEE_LOGGING_LEVEL", "FOURNEE_LOG_LEVEL"],
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format).to_ascii_lowercase(),
            &["FOURNEE_LOGGING_FORMAT", "FOURNEE_LOG_FORMAT"],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_keys) in fields {
        let source =
            field_source(key, env_keys, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(render_line(key, &value, source));
    }

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("fournee.toml"), PathBuf::from("config/fournee.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
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

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
