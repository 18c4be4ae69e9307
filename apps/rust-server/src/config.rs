// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind IP address (IPv4 or IPv6) | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `CLIENT_ID` | Google OAuth client id; the only accepted token audience | Required |
//! | `TOKENINFO_URL` | Token introspection endpoint | Google `tokeninfo` |
//! | `DATABASE_PATH` | redb database file | `./data/stride.redb` |
//! | `TLS_CERT_PATH` | PEM certificate chain (enables HTTPS with `TLS_KEY_PATH`) | Unset |
//! | `TLS_KEY_PATH` | PEM private key | Unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use url::Url;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const CLIENT_ID_ENV: &str = "CLIENT_ID";
pub const TOKENINFO_URL_ENV: &str = "TOKENINFO_URL";
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Google's ID token introspection endpoint.
pub const DEFAULT_TOKENINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/tokeninfo";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_PATH: &str = "./data/stride.redb";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} should not be empty")]
    Missing(&'static str),

    #[error("environment variable {name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{TLS_CERT_PATH_ENV} and {TLS_KEY_PATH_ENV} must be set together")]
    PartialTls,
}

/// PEM files used to terminate TLS in-process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub client_id: String,
    pub tokeninfo_url: Url,
    pub database_path: PathBuf,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let ip = host.parse::<IpAddr>().map_err(|e| ConfigError::Invalid {
            name: HOST_ENV,
            value: host.clone(),
            reason: e.to_string(),
        })?;
        let bind_addr = SocketAddr::new(ip, port);

        let client_id = get(CLIENT_ID_ENV).ok_or(ConfigError::Missing(CLIENT_ID_ENV))?;

        let raw_url = get(TOKENINFO_URL_ENV).unwrap_or_else(|| DEFAULT_TOKENINFO_URL.to_string());
        let tokeninfo_url = Url::parse(&raw_url).map_err(|e| ConfigError::Invalid {
            name: TOKENINFO_URL_ENV,
            value: raw_url.clone(),
            reason: e.to_string(),
        })?;

        let database_path = PathBuf::from(
            get(DATABASE_PATH_ENV).unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
        );

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialTls),
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref().map(str::to_lowercase).as_deref() {
            Some("json") => LogFormat::Json,
            Some("pretty") | None => LogFormat::Pretty,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    value: other.to_string(),
                    reason: "expected `json` or `pretty`".to_string(),
                })
            }
        };

        Ok(Self {
            bind_addr,
            client_id,
            tokeninfo_url,
            database_path,
            tls,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_client_id_is_set() {
        let config = Config::from_lookup(lookup(&[(CLIENT_ID_ENV, "cid")])).unwrap();
        assert_eq!(config.client_id, "cid");
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.tokeninfo_url.as_str(), DEFAULT_TOKENINFO_URL);
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert!(config.tls.is_none());
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn missing_client_id_is_an_error() {
        let err = Config::from_lookup(lookup(&[(CLIENT_ID_ENV, "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(CLIENT_ID_ENV)));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup(&[(CLIENT_ID_ENV, "cid"), (PORT_ENV, "http")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: PORT_ENV, .. }));
    }

    #[test]
    fn ipv6_host_binds() {
        let config = Config::from_lookup(lookup(&[
            (CLIENT_ID_ENV, "cid"),
            (HOST_ENV, "::"),
            (PORT_ENV, "9000"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "[::]:9000".parse().unwrap());
        assert!(config.bind_addr.is_ipv6());
    }

    #[test]
    fn hostname_is_not_an_ip_address() {
        let err = Config::from_lookup(lookup(&[(CLIENT_ID_ENV, "cid"), (HOST_ENV, "localhost")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: HOST_ENV, .. }));
    }

    #[test]
    fn tls_requires_both_paths() {
        let err = Config::from_lookup(lookup(&[
            (CLIENT_ID_ENV, "cid"),
            (TLS_CERT_PATH_ENV, "/certs/server.pem"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::PartialTls));

        let config = Config::from_lookup(lookup(&[
            (CLIENT_ID_ENV, "cid"),
            (TLS_CERT_PATH_ENV, "/certs/server.pem"),
            (TLS_KEY_PATH_ENV, "/certs/server.key"),
        ]))
        .unwrap();
        assert_eq!(
            config.tls,
            Some(TlsPaths {
                cert: "/certs/server.pem".into(),
                key: "/certs/server.key".into(),
            })
        );
    }

    #[test]
    fn log_format_is_case_insensitive() {
        let config =
            Config::from_lookup(lookup(&[(CLIENT_ID_ENV, "cid"), (LOG_FORMAT_ENV, "JSON")]))
                .unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
