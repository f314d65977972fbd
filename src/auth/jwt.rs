use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};

use crate::auth::{AuthError, Claims, RESERVED_CLAIMS};

/// Lifetime of every issued token
pub const TOKEN_TTL_SECONDS: i64 = 60 * 60;

/// Signs and verifies HS256 tokens with the server secret
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expires_in: Duration::seconds(TOKEN_TTL_SECONDS),
        }
    }

    /// Issue a token for `email` that expires one TTL from now
    pub fn issue(&self, email: &str, extra: Map<String, Value>) -> Result<String, AuthError> {
        self.issue_at(email, extra, Utc::now())
    }

    /// Issue a token as if the current instant were `issued_at`
    pub fn issue_at(
        &self,
        email: &str,
        mut extra: Map<String, Value>,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        for reserved in RESERVED_CLAIMS {
            extra.remove(reserved);
        }

        let claims = Claims {
            email: email.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.expires_in).timestamp(),
            extra,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::TokenCreation)
    }

    /// Validate signature and expiry against the current instant
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Validate signature and expiry against `now`.
    ///
    /// A token is expired from its `exp` second onwards; no leeway applies.
    /// Registered claims other than `exp` (`aud`, `iss`, `sub`, `nbf`) are
    /// carried as plain payload and not validated.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|_| AuthError::InvalidToken)?;

        if now.timestamp() >= claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }

    pub fn expires_in_seconds(&self) -> i64 {
        self.expires_in.num_seconds()
    }
}

/// Extract bearer token from authorization header
pub fn extract_bearer_token(auth_header: &str) -> Result<&str, AuthError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeaderFormat)?;

    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeaderFormat);
    }

    Ok(token)
}
