//! Database credentials.
//!
//! Credentials live in a MySQL-style option file whose location is taken from
//! the `XSECCONF` environment variable:
//!
//! ```ini
//! [mysql-crosssec-reader]
//! host = db.example.org
//! user = reader
//! password = secret
//! ```

use ini::{Ini, ParseOption};
use std::env;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "XSECCONF";
pub const DEFAULT_CONFIG_PATH: &str = "/home/dabercro/xsec.cnf";
pub const READER_SECTION: &str = "mysql-crosssec-reader";
pub const DEFAULT_DATABASE: &str = "cross_sections";
pub const DEFAULT_PORT: u16 = 3306;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("cannot parse credentials: {0}")]
    Parse(#[from] ini::ParseError),

    #[error("missing section [{0}]")]
    MissingSection(&'static str),

    #[error("missing key '{key}' in section [{section}]")]
    MissingKey {
        section: &'static str,
        key: &'static str,
    },

    #[error("invalid port '{0}'")]
    InvalidPort(String),
}

/// Read-only credentials for the cross section database.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub port: u16,
    pub database: String,
}

impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"***")
            .field("port", &self.port)
            .field("database", &self.database)
            .finish()
    }
}

/// Location of the credentials file: `$XSECCONF`, or the shared default.
pub fn config_path() -> PathBuf {
    env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Backslashes in values are kept literally, as MySQL option files do.
fn parse_option() -> ParseOption {
    ParseOption {
        enabled_escape: false,
        ..Default::default()
    }
}

impl DbConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file_opt(path, parse_option()).map_err(|source| {
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_ini(&ini)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Self::from_ini(&Ini::load_from_str_opt(content, parse_option())?)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let section = ini
            .section(Some(READER_SECTION))
            .ok_or(ConfigError::MissingSection(READER_SECTION))?;
        let required = |key: &'static str| {
            section
                .get(key)
                .map(str::to_string)
                .ok_or(ConfigError::MissingKey {
                    section: READER_SECTION,
                    key,
                })
        };

        let port = match section.get("port") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.to_string()))?,
            None => DEFAULT_PORT,
        };

        Ok(DbConfig {
            host: required("host")?,
            user: required("user")?,
            password: required("password")?,
            port,
            database: section
                .get("database")
                .unwrap_or(DEFAULT_DATABASE)
                .to_string(),
        })
    }
}
