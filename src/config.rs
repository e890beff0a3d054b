//! Startup configuration, read from the environment.
//!
//! Mirrors the original client's `Config::load()` shape (a fallible loader
//! returning `anyhow::Result<Config>` with documented defaults) but reads
//! from environment variables instead of a TOML file, since this binary has
//! no interactive install step to seed a config file during.

use std::path::PathBuf;

use crate::error::ServerError;

const DEFAULT_PORT: u16 = 7865;
const DEFAULT_STATIC_DIR: &str = "./public";

#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port the HTTP/WebSocket listener binds to.
    pub port: u16,
    /// Directory of static assets served for non-upgrade requests.
    pub static_dir: PathBuf,
    /// When set, debug-level logs are additionally written to this file.
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_env(std::env::vars())
    }

    /// Build a `Config` from an arbitrary key/value iterator, so the parsing
    /// rules can be exercised without touching real process environment
    /// variables.
    pub fn from_env<I, K, V>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut port = DEFAULT_PORT;
        let mut static_dir = PathBuf::from(DEFAULT_STATIC_DIR);
        let mut log_file = None;

        for (key, value) in vars {
            match key.as_ref() {
                "PORT" => {
                    let value = value.as_ref();
                    port = value
                        .parse()
                        .map_err(|e| ServerError::InvalidPort(value.to_string(), e))?;
                }
                "STATIC_DIR" => static_dir = PathBuf::from(value.as_ref()),
                "LOG_FILE" => log_file = Some(PathBuf::from(value.as_ref())),
                _ => {}
            }
        }

        Ok(Config {
            port,
            static_dir,
            log_file,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let cfg = Config::from_env(Vec::<(&str, &str)>::new()).unwrap();
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.static_dir, PathBuf::from(DEFAULT_STATIC_DIR));
        assert!(cfg.log_file.is_none());
    }

    #[test]
    fn reads_port_and_static_dir_overrides() {
        let cfg = Config::from_env(vec![("PORT", "9000"), ("STATIC_DIR", "/srv/assets")]).unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.static_dir, PathBuf::from("/srv/assets"));
    }

    #[test]
    fn rejects_non_numeric_port() {
        let result = Config::from_env(vec![("PORT", "not-a-port")]);
        assert!(result.is_err());
    }

    #[test]
    fn reads_optional_log_file() {
        let cfg = Config::from_env(vec![("LOG_FILE", "/var/log/roomwire.log")]).unwrap();
        assert_eq!(cfg.log_file, Some(PathBuf::from("/var/log/roomwire.log")));
    }
}
