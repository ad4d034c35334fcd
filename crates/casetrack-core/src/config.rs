//! Runtime settings: built-in defaults, then an optional TOML file, then the
//! environment (including a `.env` file).

use std::env;
use std::path::Path;

use casetrack_import::ParseOptions;
use serde::Deserialize;

use crate::error::{CoreError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "casetrack.toml";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub bind_address: String,
    pub csv_delimiter: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            csv_delimiter: b',',
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    database_url: Option<String>,
    max_connections: Option<u32>,
    bind_address: Option<String>,
    csv_delimiter: Option<String>,
}

impl Settings {
    /// Loads settings from `path` (or `casetrack.toml` in the working
    /// directory when it exists) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let contents = match path {
            Some(path) => Some(std::fs::read_to_string(path)?),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Some(std::fs::read_to_string(default_path)?)
                } else {
                    None
                }
            }
        };

        Self::from_sources(contents.as_deref(), |key| env::var(key).ok())
    }

    pub fn from_sources<F>(file_contents: Option<&str>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(contents) = file_contents {
            let file: SettingsFile = toml::from_str(contents)?;
            if let Some(url) = file.database_url {
                settings.database_url = Some(url);
            }
            if let Some(max) = file.max_connections {
                settings.max_connections = max;
            }
            if let Some(bind) = file.bind_address {
                settings.bind_address = bind;
            }
            if let Some(delimiter) = file.csv_delimiter {
                settings.csv_delimiter = parse_delimiter(&delimiter)?;
            }
        }

        if let Some(url) = lookup("DATABASE_URL").or_else(|| lookup("CASETRACK_DATABASE_URL")) {
            settings.database_url = Some(url);
        }
        if let Some(max) = lookup("CASETRACK_MAX_CONNECTIONS") {
            settings.max_connections = max.trim().parse().map_err(|_| {
                CoreError::Config(format!("CASETRACK_MAX_CONNECTIONS must be a number, got '{max}'"))
            })?;
        }
        if let Some(bind) = lookup("CASETRACK_BIND") {
            settings.bind_address = bind;
        }
        if let Some(delimiter) = lookup("CASETRACK_CSV_DELIMITER") {
            settings.csv_delimiter = parse_delimiter(&delimiter)?;
        }

        if settings.max_connections == 0 {
            return Err(CoreError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }

        Ok(settings)
    }

    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url.as_deref().ok_or_else(|| {
            CoreError::Config("DATABASE_URL (or CASETRACK_DATABASE_URL) must be set".to_string())
        })
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            delimiter: self.csv_delimiter,
        }
    }
}

fn parse_delimiter(raw: &str) -> Result<u8> {
    let value = if raw == "\\t" { "\t" } else { raw };
    match value.as_bytes() {
        [byte] if byte.is_ascii() && *byte != b'"' && *byte != b'\n' => Ok(*byte),
        _ => Err(CoreError::Config(format!(
            "csv_delimiter must be a single ASCII character, got '{raw}'"
        ))),
    }
}
