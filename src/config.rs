/*
 * Responsibility
 * - Read settings from the environment (.env honoured via dotenvy)
 * - Validate them; missing or malformed values fail startup
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // Service-provider private key, shared with the SAML engine
    pub sp_private_key_pem: String,

    pub session_lifetime: Duration,
    pub token_leeway_seconds: u64,
    pub allow_idp_initiated: bool,
    pub max_pending_logins: usize,
    pub default_redirect_uri: String,

    pub request_timeout: Duration,
    pub request_body_limit_bytes: usize,

    // Abort the process on any panic instead of answering 500
    pub abort_on_panic: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("session_lifetime", &self.session_lifetime)
            .field("token_leeway_seconds", &self.token_leeway_seconds)
            .field("allow_idp_initiated", &self.allow_idp_initiated)
            .field("max_pending_logins", &self.max_pending_logins)
            .field("default_redirect_uri", &self.default_redirect_uri)
            .field("request_timeout", &self.request_timeout)
            .field("request_body_limit_bytes", &self.request_body_limit_bytes)
            .field("abort_on_panic", &self.abort_on_panic)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Defaults for everything except the listen address and the key.
    pub fn new(addr: SocketAddr, sp_private_key_pem: impl Into<String>) -> Self {
        Self {
            addr,
            app_env: AppEnv::Development,
            sp_private_key_pem: sp_private_key_pem.into(),
            session_lifetime: Duration::from_secs(3600),
            token_leeway_seconds: 0,
            allow_idp_initiated: false,
            max_pending_logins: 5,
            default_redirect_uri: "/".to_string(),
            request_timeout: Duration::from_secs(30),
            request_body_limit_bytes: 1024 * 1024,
            abort_on_panic: false,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let sp_private_key_pem = std::env::var("SAML_SP_PRIVATE_KEY_PEM")
            .map_err(|_| ConfigError::Missing("SAML_SP_PRIVATE_KEY_PEM"))?
            .replace("\\n", "\n");

        let mut config = Self::new(addr, sp_private_key_pem);
        config.app_env = AppEnv::from_env();

        if let Some(secs) = parse_var::<u64>("SESSION_LIFETIME_SECONDS")? {
            if secs == 0 {
                return Err(ConfigError::Invalid("SESSION_LIFETIME_SECONDS"));
            }
            config.session_lifetime = Duration::from_secs(secs);
        }

        if let Some(secs) = parse_var::<u64>("TOKEN_LEEWAY_SECONDS")? {
            config.token_leeway_seconds = secs;
        }

        if let Ok(v) = std::env::var("SAML_ALLOW_IDP_INITIATED") {
            config.allow_idp_initiated =
                parse_bool(&v).ok_or(ConfigError::Invalid("SAML_ALLOW_IDP_INITIATED"))?;
        }

        if let Some(n) = parse_var::<usize>("SAML_MAX_PENDING_LOGINS")? {
            if n == 0 {
                return Err(ConfigError::Invalid("SAML_MAX_PENDING_LOGINS"));
            }
            config.max_pending_logins = n;
        }

        if let Ok(uri) = std::env::var("SAML_DEFAULT_REDIRECT_URI") {
            // local paths only
            if !uri.starts_with('/') || uri.starts_with("//") {
                return Err(ConfigError::Invalid("SAML_DEFAULT_REDIRECT_URI"));
            }
            config.default_redirect_uri = uri;
        }

        if let Some(secs) = parse_var::<u64>("REQUEST_TIMEOUT_SECONDS")? {
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(bytes) = parse_var::<usize>("REQUEST_BODY_LIMIT_BYTES")? {
            config.request_body_limit_bytes = bytes;
        }

        if let Ok(v) = std::env::var("ABORT_ON_PANIC") {
            config.abort_on_panic =
                parse_bool(&v).ok_or(ConfigError::Invalid("ABORT_ON_PANIC"))?;
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(None),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_env_parsing() {
        assert_eq!(AppEnv::parse("PROD"), AppEnv::Production);
        assert_eq!(AppEnv::parse("production"), AppEnv::Production);
        assert_eq!(AppEnv::parse("staging"), AppEnv::Development);
    }

    #[test]
    fn bool_parsing() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn defaults() {
        let config = Config::new("127.0.0.1:3000".parse().unwrap(), "pem");
        assert_eq!(config.session_lifetime, Duration::from_secs(3600));
        assert_eq!(config.max_pending_logins, 5);
        assert_eq!(config.default_redirect_uri, "/");
        assert!(!config.allow_idp_initiated);
        assert!(!config.abort_on_panic);
    }

    #[test]
    fn debug_hides_private_key() {
        let config = Config::new("127.0.0.1:3000".parse().unwrap(), "SECRET-PEM");
        assert!(!format!("{config:?}").contains("SECRET-PEM"));
    }
}
