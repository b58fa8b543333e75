//! Admin session tokens.
//!
//! Tokens are compact HS256 JWS values:
//! `base64url(header) . base64url(claims) . base64url(hmac)`.
//! Verification is a pure function of the token bytes, the signing secret
//! and the current time. There is no server-side session store.
//!
//! # Design Decisions
//! - The signature is checked (constant time) before any claim is decoded
//! - A token is valid strictly before `exp`
//! - A guard cannot exist without a signing secret

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::config::{EnvConfig, Secret, SessionConfig};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";
const SUBJECT: &str = "admin";

/// Why a token was rejected or could not be produced.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature mismatch")]
    BadSignature,

    #[error("unsupported token algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    #[error("token expired at {0}")]
    Expired(u64),

    #[error("signing key rejected")]
    Key,

    #[error("token encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Startup failures of the guard.
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("JWT_SECRET is not set; the admin session guard cannot start without a signing secret")]
    MissingSecret,
}

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    /// Issued at, seconds since epoch.
    pub iat: u64,
    /// Expiry, seconds since epoch.
    pub exp: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

/// A freshly signed token and what it says.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: SessionClaims,
}

/// Issues and validates admin session tokens.
#[derive(Debug)]
pub struct SessionGuard {
    key: Secret<Vec<u8>>,
    ttl: Duration,
}

impl SessionGuard {
    /// Create a guard. Fails when no signing secret is available.
    pub fn new(secret: Option<&Secret<String>>, ttl: Duration) -> Result<Self, GuardError> {
        let secret = secret.ok_or(GuardError::MissingSecret)?;
        Ok(Self {
            key: Secret::new(secret.expose_secret().as_bytes().to_vec()),
            ttl,
        })
    }

    pub fn from_env(env: &EnvConfig, session: &SessionConfig) -> Result<Self, GuardError> {
        Self::new(env.jwt_secret.as_ref(), Duration::from_secs(session.ttl_secs))
    }

    /// Validity window of issued tokens.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self) -> Result<IssuedToken, TokenError> {
        self.issue_at(unix_now())
    }

    /// Issue a token as if the current time were `now` (seconds since epoch).
    pub fn issue_at(&self, now: u64) -> Result<IssuedToken, TokenError> {
        let claims = SessionClaims {
            sub: SUBJECT.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl.as_secs()),
        };
        let header = TokenHeader {
            alg: ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        };

        let header = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);

        let mut mac = self.mac()?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(IssuedToken {
            token: format!("{}.{}.{}", header, payload, signature),
            claims,
        })
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.verify_at(token, unix_now())
    }

    /// Verify a token as if the current time were `now` (seconds since epoch).
    pub fn verify_at(&self, token: &str, now: u64) -> Result<SessionClaims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac()?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let header: TokenHeader = decode_segment(header)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm(header.alg));
        }

        let claims: SessionClaims = decode_segment(payload)?;
        if now >= claims.exp {
            return Err(TokenError::Expired(claims.exp));
        }
        Ok(claims)
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.key.expose_secret()).map_err(|_| TokenError::Key)
    }
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}

/// Seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
