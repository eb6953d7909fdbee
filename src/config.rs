//! Process configuration.
//!
//! All runtime settings are gathered into an [`AppConfig`] once at startup
//! and passed into the components that need them. Misconfiguration is a
//! startup failure, never a request-time one.

use anyhow::{bail, Context, Result};
use axum::http::HeaderValue;
use std::env;

/// Minimum signing key length in bytes. HS256 with anything shorter is
/// trivially brute-forceable.
pub const MIN_SECRET_BYTES: usize = 16;

/// Application configuration, built from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Symmetric JWT signing key.
    pub jwt_secret: String,
    /// Token lifetime in hours.
    pub token_ttl_hours: i64,
    /// When set, tokens carry an `iss` claim and validation enforces it.
    pub jwt_issuer: Option<String>,
    /// When set, tokens carry an `aud` claim and validation enforces it.
    pub jwt_audience: Option<String>,
    /// Origin allowed by the CORS layer.
    pub client_origin: String,
    /// SQLite database path for the user store.
    pub auth_db_path: String,
    /// Listen address for the HTTP server.
    pub bind_addr: String,
}

impl AppConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Tests use this to avoid mutating process-wide environment state.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET is not set")?;
        if jwt_secret.len() < MIN_SECRET_BYTES {
            bail!(
                "JWT_SECRET must be at least {} bytes, got {}",
                MIN_SECRET_BYTES,
                jwt_secret.len()
            );
        }

        let token_ttl_hours = lookup("JWT_TTL_HOURS")
            .unwrap_or_else(|| "24".to_string())
            .parse::<i64>()
            .context("Invalid JWT_TTL_HOURS")?;
        if token_ttl_hours <= 0 {
            bail!("JWT_TTL_HOURS must be positive");
        }

        let jwt_issuer = lookup("JWT_ISSUER").filter(|v| !v.trim().is_empty());
        let jwt_audience = lookup("JWT_AUDIENCE").filter(|v| !v.trim().is_empty());

        let client_origin = lookup("CLIENT_ORIGIN").context("CLIENT_ORIGIN is not set")?;
        client_origin
            .parse::<HeaderValue>()
            .context("CLIENT_ORIGIN is not a valid header value")?;

        let auth_db_path =
            lookup("AUTH_DB_PATH").unwrap_or_else(|| "userhub_auth.db".to_string());
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());

        Ok(Self {
            jwt_secret,
            token_ttl_hours,
            jwt_issuer,
            jwt_audience,
            client_origin,
            auth_db_path,
            bind_addr,
        })
    }
}
