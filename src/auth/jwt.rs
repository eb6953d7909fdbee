//! JWT Token Handler
//! Mission: Generate and validate JWT tokens securely

use crate::auth::models::{Claims, User};
use crate::config::AppConfig;
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// JWT Handler for token operations
pub struct JwtHandler {
    secret: String,
    ttl_hours: i64,
    issuer: Option<String>,
    audience: Option<String>,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key and token lifetime.
    /// Issuer/audience checks stay off unless configured.
    pub fn new(secret: String, ttl_hours: i64) -> Self {
        Self {
            secret,
            ttl_hours,
            issuer: None,
            audience: None,
        }
    }

    /// Create a handler from the startup configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            ttl_hours: config.token_ttl_hours,
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
        }
    }

    /// Issue a JWT for a user, embedding identity and role claims.
    pub fn issue(&self, user: &User) -> Result<(String, usize)> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::hours(self.ttl_hours))
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let expires_in = (self.ttl_hours * 3600) as usize;

        let claims = Claims {
            sub: user.id.to_string(),
            roles: user.roles.clone(),
            iat: now.timestamp() as usize,
            exp: expiration,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        debug!(
            "Issuing JWT for user {} ({}), expires in {}h",
            user.username, user.id, self.ttl_hours
        );

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to generate JWT")?;

        Ok((token, expires_in))
    }

    /// Validate a JWT token and extract claims.
    ///
    /// Expiry is checked with zero leeway; issuer and audience only when
    /// the handler was configured with them.
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.leeway = 0; // no clock-skew grace window

        if let Some(iss) = &self.issuer {
            validation.set_issuer(std::slice::from_ref(iss));
        }
        match &self.audience {
            Some(aud) => validation.set_audience(std::slice::from_ref(aud)),
            None => validation.validate_aud = false,
        }

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .context("Invalid or expired token")?;

        debug!("Validated JWT for subject {}", decoded.claims.sub);

        Ok(decoded.claims)
    }
}
