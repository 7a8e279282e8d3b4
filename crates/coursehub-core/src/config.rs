//! Configuration resolution for CourseHub.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/coursehub/settings.json)
//! 3. Explicit config file (`--config`)
//! 4. Environment variables
//! 5. CLI arguments (applied by the binary, highest priority)
//!
//! The resolved [`Config`] is built once at process start and treated as
//! read-only afterwards.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Complete CourseHub configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub teachers: TeacherConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub database_path: Option<PathBuf>,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 3000)),
            database_path: None,
            log_level: "info".to_string(),
        }
    }
}

/// Identities allowed to author courses.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TeacherConfig {
    pub allow_list: Vec<String>,
}

/// Shared secrets for the identity provider and payment callbacks.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret used to verify session bearer tokens.
    pub session_secret: Option<String>,
    /// Secret expected in the `x-webhook-secret` header of purchase callbacks.
    pub webhook_secret: Option<String>,
}

/// One config file as written on disk. Fields left out of the file stay
/// `None` so they never replace a value from an earlier layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    server: ServerLayer,
    teachers: TeacherConfig,
    auth: AuthConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ServerLayer {
    addr: Option<SocketAddr>,
    database_path: Option<PathBuf>,
    log_level: Option<String>,
}

/// Load configuration with hierarchical resolution.
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            let global = load_config_file(&global_path)?;
            merge_config(&mut config, global);
        }
    }

    if let Some(path) = explicit_path {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file {} does not exist",
                path.display()
            )));
        }
        let explicit = load_config_file(path)?;
        merge_config(&mut config, explicit);
    }

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("settings.json"))
}

/// Get the default database path for the server.
pub fn database_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("coursehub.db"))
}

fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|h| PathBuf::from(h).join(".coursehub"))
    }
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library/Application Support/coursehub"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
            .map(|p| p.join("coursehub"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

fn load_config_file(path: &Path) -> Result<ConfigLayer> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn merge_config(base: &mut Config, overlay: ConfigLayer) {
    if let Some(addr) = overlay.server.addr {
        base.server.addr = addr;
    }
    if let Some(level) = overlay.server.log_level {
        base.server.log_level = level;
    }
    if overlay.server.database_path.is_some() {
        base.server.database_path = overlay.server.database_path;
    }

    merge_teachers(&mut base.teachers.allow_list, overlay.teachers.allow_list);

    if overlay.auth.session_secret.is_some() {
        base.auth.session_secret = overlay.auth.session_secret;
    }
    if overlay.auth.webhook_secret.is_some() {
        base.auth.webhook_secret = overlay.auth.webhook_secret;
    }
}

/// Union of allow-lists, keeping first-seen order.
pub fn merge_teachers(base: &mut Vec<String>, extra: impl IntoIterator<Item = String>) {
    for id in extra {
        let id = id.trim().to_string();
        if !id.is_empty() && !base.contains(&id) {
            base.push(id);
        }
    }
}

fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("COURSEHUB_ADDR") {
        if let Ok(addr) = val.parse() {
            config.server.addr = addr;
        }
    }
    if let Some(val) = lookup("COURSEHUB_DB_PATH") {
        config.server.database_path = Some(PathBuf::from(val));
    }
    if let Some(val) = lookup("COURSEHUB_LOG_LEVEL") {
        config.server.log_level = val;
    }
    if let Some(val) = lookup("COURSEHUB_TEACHER_IDS") {
        merge_teachers(
            &mut config.teachers.allow_list,
            val.split(',').map(str::to_string),
        );
    }
    if let Some(val) = lookup("COURSEHUB_SESSION_SECRET") {
        config.auth.session_secret = Some(val);
    }
    if let Some(val) = lookup("COURSEHUB_WEBHOOK_SECRET") {
        config.auth.webhook_secret = Some(val);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_listens_on_3000() {
        let config = Config::default();
        assert_eq!(config.server.addr.port(), 3000);
        assert!(config.teachers.allow_list.is_empty());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"teachers": {"allow_list": []}, "auth": {}}"#).unwrap();
        assert_eq!(config.server.log_level, "info");
        assert!(config.auth.session_secret.is_none());
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"server": {"addr": "127.0.0.1:8080"}, "teachers": {"allow_list": ["user_1"]}}"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.server.addr.port(), 8080);
        assert!(config.teachers.allow_list.contains(&"user_1".to_string()));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn env_overrides_extend_allow_list() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("COURSEHUB_TEACHER_IDS", "user_2, user_1,,"),
            ("COURSEHUB_WEBHOOK_SECRET", "whsec"),
            ("COURSEHUB_ADDR", "not-an-addr"),
        ]);
        let mut config = Config::default();
        config.teachers.allow_list.push("user_1".into());

        apply_env_overrides(&mut config, |k| env.get(k).map(|v| (*v).to_string()));

        assert_eq!(config.teachers.allow_list, vec!["user_1", "user_2"]);
        assert_eq!(config.auth.webhook_secret.as_deref(), Some("whsec"));
        assert_eq!(config.server.addr.port(), 3000);
    }

    #[test]
    fn overlay_secrets_only_replace_when_set() {
        let mut base = Config::default();
        base.auth.session_secret = Some("a".into());
        merge_config(&mut base, ConfigLayer::default());
        assert_eq!(base.auth.session_secret.as_deref(), Some("a"));
    }

    #[test]
    fn later_layer_keeps_fields_it_omits() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.json");
        let explicit = dir.path().join("explicit.json");
        std::fs::write(
            &global,
            r#"{"server": {"addr": "127.0.0.1:8080", "log_level": "debug"}}"#,
        )
        .unwrap();
        std::fs::write(&explicit, r#"{"teachers": {"allow_list": ["user_1"]}}"#).unwrap();

        let mut config = Config::default();
        merge_config(&mut config, load_config_file(&global).unwrap());
        merge_config(&mut config, load_config_file(&explicit).unwrap());

        assert_eq!(config.server.addr.port(), 8080);
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.teachers.allow_list, vec!["user_1"]);
    }

    #[test]
    fn later_layer_replaces_fields_it_sets() {
        let mut config = Config::default();
        config.server.log_level = "debug".into();
        let overlay: ConfigLayer =
            serde_json::from_str(r#"{"server": {"log_level": "warn"}}"#).unwrap();
        merge_config(&mut config, overlay);
        assert_eq!(config.server.log_level, "warn");
        assert_eq!(config.server.addr.port(), 3000);
    }

    #[test]
    fn malformed_file_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn unreadable_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory exists but cannot be read as a file.
        let err = load_config_file(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
