//! Configuration loading
//!
//! Two INI-style files feed one run: a notification file (SMTP credentials and
//! the chat webhook URL) and a database file (connection parameters). Each is
//! read once into a section map, then parsed into typed settings.

use std::collections::HashMap;
use std::path::Path;

use ::config::{Config, File, FileFormat};

/// Default section name in the notification config file
pub const EMAIL_SECTION: &str = "email_config";
/// Default section name in the database config file
pub const DATABASE_SECTION: &str = "database";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file {path} unreadable: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Section {section} not found in {path}")]
    SectionNotFound { section: String, path: String },

    #[error("Missing key {key} in section {section}")]
    MissingKey { key: String, section: String },

    #[error("Invalid value for key {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Read one section of an INI file into a map of lowercase keys.
///
/// Values are returned as strings exactly as written; numeric parsing is the
/// caller's concern.
pub fn load_section(
    path: impl AsRef<Path>,
    section: &str,
) -> Result<HashMap<String, String>, ConfigError> {
    let path_str = path.as_ref().display().to_string();

    let cfg = Config::builder()
        .add_source(File::new(&path_str, FileFormat::Ini))
        .build()
        .map_err(|e| ConfigError::Unreadable {
            path: path_str.clone(),
            reason: e.to_string(),
        })?;

    let table = cfg
        .get_table(section)
        .map_err(|_| ConfigError::SectionNotFound {
            section: section.to_string(),
            path: path_str.clone(),
        })?;

    let mut out = HashMap::with_capacity(table.len());
    for (key, value) in table {
        let value = value
            .into_string()
            .map_err(|e| ConfigError::InvalidValue {
                key: key.clone(),
                reason: e.to_string(),
            })?;
        out.insert(key.to_lowercase(), value);
    }
    Ok(out)
}

fn require(map: &HashMap<String, String>, section: &str, key: &str) -> Result<String, ConfigError> {
    map.get(key).cloned().ok_or_else(|| ConfigError::MissingKey {
        key: key.to_string(),
        section: section.to_string(),
    })
}

fn parse_port(key: &str, raw: &str) -> Result<u16, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: format!("expected a port number, got {:?}", raw),
    })
}

/// SMTP relay settings
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender: String,
}

impl SmtpSettings {
    /// Build from a notification section map
    pub fn from_section(
        section: &str,
        map: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let raw_port = require(map, section, "smtp_port")?;
        Ok(Self {
            host: require(map, section, "smtp_host")?,
            port: parse_port("smtp_port", &raw_port)?,
            username: require(map, section, "smtp_username")?,
            password: require(map, section, "smtp_password")?,
            sender: require(map, section, "sender_email")?,
        })
    }
}

/// Database connection settings
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl DatabaseSettings {
    /// Build from a database section map
    pub fn from_section(
        section: &str,
        map: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let raw_port = require(map, section, "port")?;
        Ok(Self {
            host: require(map, section, "host")?,
            port: parse_port("port", &raw_port)?,
            database: require(map, section, "database")?,
            user: require(map, section, "user")?,
            password: require(map, section, "password")?,
        })
    }
}

/// Monitoring policy: lookback window, excluded user, alert recipient.
///
/// Defaults match the long-standing production values; any of them can be
/// overridden from the notification config section.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Trailing window for "still running" queries, in minutes
    pub lookback_minutes: i64,
    /// System user id whose queries never alert
    pub excluded_user_id: i32,
    /// Single recipient for alert emails
    pub recipient: String,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            lookback_minutes: 30,
            excluded_user_id: 100,
            recipient: "dba-alerts@example.com".to_string(),
        }
    }
}

impl MonitorSettings {
    /// Apply overrides from a section map on top of the defaults
    pub fn from_section(map: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        if let Some(raw) = map.get("lookback_minutes") {
            settings.lookback_minutes =
                raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: "lookback_minutes".to_string(),
                    reason: format!("expected minutes, got {:?}", raw),
                })?;
        }
        if let Some(raw) = map.get("excluded_userid") {
            settings.excluded_user_id =
                raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: "excluded_userid".to_string(),
                    reason: format!("expected a user id, got {:?}", raw),
                })?;
        }
        if let Some(recipient) = map.get("recipient") {
            settings.recipient = recipient.clone();
        }
        Ok(settings)
    }
}

/// Everything one run needs, loaded up front
#[derive(Debug, Clone)]
pub struct Settings {
    pub smtp: SmtpSettings,
    pub webhook_url: String,
    pub database: DatabaseSettings,
    pub monitor: MonitorSettings,
}

impl Settings {
    /// Load both config files using the default section names
    pub fn load(
        email_path: impl AsRef<Path>,
        db_path: impl AsRef<Path>,
    ) -> Result<Self, ConfigError> {
        Self::load_with_sections(email_path, EMAIL_SECTION, db_path, DATABASE_SECTION)
    }

    /// Load both config files with explicit section names
    pub fn load_with_sections(
        email_path: impl AsRef<Path>,
        email_section: &str,
        db_path: impl AsRef<Path>,
        db_section: &str,
    ) -> Result<Self, ConfigError> {
        let email_map = load_section(email_path, email_section)?;
        let db_map = load_section(db_path, db_section)?;

        Ok(Self {
            smtp: SmtpSettings::from_section(email_section, &email_map)?,
            webhook_url: require(&email_map, email_section, "slack_webhook_url")?,
            database: DatabaseSettings::from_section(db_section, &db_map)?,
            monitor: MonitorSettings::from_section(&email_map)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_ini(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".ini").unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_section_returns_exact_pairs() {
        let file = write_ini("[s]\na = 1\nb = 2\n");
        let map = load_section(file.path(), "s").unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(&"1".to_string()));
        assert_eq!(map.get("b"), Some(&"2".to_string()));
    }

    #[test]
    fn test_load_section_lowercases_keys() {
        let file = write_ini("[s]\nSMTP_Host = mail.example.com\n");
        let map = load_section(file.path(), "s").unwrap();
        assert_eq!(map.get("smtp_host"), Some(&"mail.example.com".to_string()));
    }

    #[test]
    fn test_missing_section() {
        let file = write_ini("[present]\na = 1\n");
        let err = load_section(file.path(), "absent").unwrap_err();
        assert!(matches!(err, ConfigError::SectionNotFound { .. }));
    }

    #[test]
    fn test_unreadable_file() {
        let err = load_section("/nonexistent/path/config.ini", "s").unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));
    }

    #[test]
    fn test_smtp_settings_from_section() {
        let file = write_ini(
            "[email_config]\n\
             smtp_host = mail.example.com\n\
             smtp_port = 465\n\
             smtp_username = alerts\n\
             smtp_password = secret\n\
             sender_email = alerts@example.com\n\
             slack_webhook_url = https://hooks.example.com/T/B/x\n",
        );
        let map = load_section(file.path(), "email_config").unwrap();
        let smtp = SmtpSettings::from_section("email_config", &map).unwrap();
        assert_eq!(smtp.host, "mail.example.com");
        assert_eq!(smtp.port, 465);
        assert_eq!(smtp.sender, "alerts@example.com");
    }

    #[test]
    fn test_smtp_settings_missing_key() {
        let file = write_ini("[email_config]\nsmtp_host = mail.example.com\n");
        let map = load_section(file.path(), "email_config").unwrap();
        let err = SmtpSettings::from_section("email_config", &map).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { .. }));
    }

    #[test]
    fn test_monitor_settings_defaults() {
        let settings = MonitorSettings::from_section(&HashMap::new()).unwrap();
        assert_eq!(settings.lookback_minutes, 30);
        assert_eq!(settings.excluded_user_id, 100);
    }

    #[test]
    fn test_monitor_settings_overrides() {
        let mut map = HashMap::new();
        map.insert("lookback_minutes".to_string(), "45".to_string());
        map.insert("excluded_userid".to_string(), "7".to_string());
        map.insert("recipient".to_string(), "oncall@example.com".to_string());
        let settings = MonitorSettings::from_section(&map).unwrap();
        assert_eq!(settings.lookback_minutes, 45);
        assert_eq!(settings.excluded_user_id, 7);
        assert_eq!(settings.recipient, "oncall@example.com");
    }

    #[test]
    fn test_monitor_settings_bad_override() {
        let mut map = HashMap::new();
        map.insert("lookback_minutes".to_string(), "soon".to_string());
        let err = MonitorSettings::from_section(&map).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_bad_port() {
        let mut map = HashMap::new();
        map.insert("host".to_string(), "db.example.com".to_string());
        map.insert("port".to_string(), "not-a-port".to_string());
        map.insert("database".to_string(), "analytics".to_string());
        map.insert("user".to_string(), "monitor".to_string());
        map.insert("password".to_string(), "secret".to_string());
        let err = DatabaseSettings::from_section("database", &map).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
