//! Server configuration from the environment

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::AuthConfig;
use axum::http::HeaderValue;
use base64::Engine;
use base64::engine::general_purpose;
use platform::rate_limit::RateLimitConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// None selects the in-memory stores
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<HeaderValue>,
    pub auth: AuthConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());

        let bind_addr = parse_or("BIND_ADDR", DEFAULT_BIND_ADDR.parse::<SocketAddr>()?)?;

        let frontend_origins = env::var("FRONTEND_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .filter_map(|origin| origin.trim().parse().ok())
            .collect();

        Ok(Self {
            database_url,
            bind_addr,
            frontend_origins,
            auth: auth_config()?,
        })
    }
}

fn auth_config() -> anyhow::Result<AuthConfig> {
    let base = match env::var("AUTH_TOKEN_SECRET") {
        Ok(secret_b64) => AuthConfig {
            token_secret: decode_secret(&secret_b64)?,
            ..AuthConfig::default()
        },
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("AUTH_TOKEN_SECRET not set, using a random secret");
            AuthConfig::development()
        }
        Err(_) => bail!("AUTH_TOKEN_SECRET must be set in production"),
    };

    let config = AuthConfig {
        code_ttl: Duration::from_secs(parse_or("AUTH_CODE_TTL_SECS", base.code_ttl.as_secs())?),
        max_attempts: parse_or("AUTH_MAX_ATTEMPTS", base.max_attempts)?,
        rate_limit: RateLimitConfig::new(
            parse_or("AUTH_RATE_LIMIT_MAX", base.rate_limit.max_requests)?,
            parse_or("AUTH_RATE_LIMIT_WINDOW_SECS", base.rate_limit.window.as_secs())?,
        ),
        store_timeout: Duration::from_millis(parse_or(
            "AUTH_STORE_TIMEOUT_MS",
            base.store_timeout.as_millis() as u64,
        )?),
        ..base
    };

    if let Err(reason) = config.validate() {
        bail!("invalid auth configuration: {reason}");
    }
    Ok(config)
}

fn decode_secret(secret_b64: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = general_purpose::STANDARD
        .decode(secret_b64.trim())
        .context("AUTH_TOKEN_SECRET is not valid base64")?;
    <[u8; 32]>::try_from(bytes.as_slice())
        .map_err(|_| {
            anyhow::anyhow!("AUTH_TOKEN_SECRET must decode to 32 bytes, got {}", bytes.len())
        })
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}
