use crate::errors::ConfigError;
use reqwest::Url;
use std::{env, time::Duration};

pub const FALLBACK_ORIGIN: &str = "https://student-attendance-api-zv6y.onrender.com";
pub const DEFAULT_PRODUCTION_HOST: &str = "onrender.com";

/// Whether backend requests carry the browser's session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialsPolicy {
    Include,
    #[default]
    Omit,
}

impl CredentialsPolicy {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "include" | "true" | "1" => Ok(Self::Include),
            "omit" | "false" | "0" | "" => Ok(Self::Omit),
            other => Err(ConfigError::Credentials(other.to_string())),
        }
    }

    /// Picks the cookie to forward for one request, if the policy allows it.
    pub fn forward(self, cookie: Option<&str>) -> Option<String> {
        match self {
            Self::Include => cookie.map(str::to_string),
            Self::Omit => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub public_origin: String,
    pub production_host: String,
    pub backend_origin: Url,
    pub credentials: CredentialsPolicy,
    pub faculty_id: String,
    pub course_id: String,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::Number { key: "PORT", value })?,
            None => 8080,
        };

        let public_origin =
            lookup("APP_PUBLIC_ORIGIN").unwrap_or_else(|| format!("http://localhost:{port}"));
        let production_host = lookup("APP_PRODUCTION_HOST")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PRODUCTION_HOST.to_string());
        let backend_origin = resolve_backend_origin(&public_origin, &production_host)?;

        let credentials = match lookup("APP_INCLUDE_CREDENTIALS") {
            Some(value) => CredentialsPolicy::parse(&value)?,
            None => CredentialsPolicy::default(),
        };

        let request_timeout = match lookup("APP_REQUEST_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(value.parse::<u64>().map_err(|_| {
                ConfigError::Number {
                    key: "APP_REQUEST_TIMEOUT_SECS",
                    value,
                }
            })?),
            None => Duration::from_secs(30),
        };

        Ok(Self {
            port,
            public_origin,
            production_host,
            backend_origin,
            credentials,
            faculty_id: lookup("APP_FACULTY_ID").unwrap_or_else(|| "F001".to_string()),
            course_id: lookup("APP_COURSE_ID").unwrap_or_else(|| "CS101".to_string()),
            request_timeout,
        })
    }
}

/// A page served from a production host talks to its own origin; anything
/// else talks to the fixed production API.
pub fn resolve_backend_origin(public_origin: &str, production_host: &str) -> Result<Url, ConfigError> {
    let chosen = if public_origin.contains(production_host) {
        public_origin.trim_end_matches('/')
    } else {
        FALLBACK_ORIGIN
    };

    let url = Url::parse(chosen).map_err(|err| ConfigError::Origin {
        origin: chosen.to_string(),
        reason: err.to_string(),
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Origin {
            origin: chosen.to_string(),
            reason: "origin must be an http(s) base URL".to_string(),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn production_origin_targets_itself() {
        let url = resolve_backend_origin("https://attendance-ui.onrender.com", "onrender.com").unwrap();
        assert_eq!(url.as_str(), "https://attendance-ui.onrender.com/");
    }

    #[test]
    fn other_origins_fall_back_to_production_api() {
        let url = resolve_backend_origin("http://localhost:8080", "onrender.com").unwrap();
        assert_eq!(url.as_str(), format!("{FALLBACK_ORIGIN}/"));
    }

    #[test]
    fn defaults_apply_when_env_is_empty() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.credentials, CredentialsPolicy::Omit);
        assert_eq!(config.faculty_id, "F001");
        assert_eq!(config.course_id, "CS101");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.backend_origin.as_str(), format!("{FALLBACK_ORIGIN}/"));
    }

    #[test]
    fn credentials_policy_is_explicit() {
        let config =
            Config::from_lookup(lookup_from(&[("APP_INCLUDE_CREDENTIALS", "Include")])).unwrap();
        assert_eq!(config.credentials, CredentialsPolicy::Include);
        assert_eq!(
            CredentialsPolicy::Include.forward(Some("session=abc")),
            Some("session=abc".to_string())
        );
        assert_eq!(CredentialsPolicy::Omit.forward(Some("session=abc")), None);
        assert!(CredentialsPolicy::parse("sometimes").is_err());
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
