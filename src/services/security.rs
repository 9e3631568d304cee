use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::CONFIG;
use crate::error::{AppError, Result};
use crate::models::user;

/// Kind of signed token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
    /// Forgot-password flow; carries the email and unlocks OTP verification
    Reset,
}

/// JWT token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User id
    pub role: String,
    pub otp_verified: bool,
    pub exp: i64,
    pub iat: i64,
    /// Issue instant in milliseconds, compared against logout/password-change stamps
    pub iat_ms: i64,
    pub jti: String,
    pub token_type: TokenType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64> {
        self.sub
            .parse()
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))
    }

    /// True when the session was invalidated after this token was issued
    pub fn is_revoked_for(&self, user: &user::Model) -> bool {
        user.revoked_before()
            .map(|cutoff| self.iat_ms < cutoff.timestamp_millis())
            .unwrap_or(false)
    }
}

/// Access + refresh token pair returned on login
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

fn secret_for(token_type: TokenType) -> &'static [u8] {
    match token_type {
        TokenType::Refresh => CONFIG.auth.refresh_secret.as_bytes(),
        TokenType::Access | TokenType::Reset => CONFIG.auth.access_secret.as_bytes(),
    }
}

fn issue(user: &user::Model, token_type: TokenType, ttl_secs: i64) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role.to_string(),
        otp_verified: user.otp_verified,
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        iat: now.timestamp(),
        iat_ms: now.timestamp_millis(),
        jti: uuid::Uuid::new_v4().to_string(),
        token_type,
        email: match token_type {
            TokenType::Reset => user.email.clone(),
            _ => None,
        },
    };

    let key = EncodingKey::from_secret(secret_for(token_type));
    encode(&Header::default(), &claims, &key).map_err(|e| e.into())
}

/// Create a short-lived access token
pub fn create_access_token(user: &user::Model) -> Result<String> {
    issue(user, TokenType::Access, CONFIG.auth.access_token_ttl_secs)
}

/// Create a refresh token (signed with the refresh secret)
pub fn create_refresh_token(user: &user::Model) -> Result<String> {
    issue(user, TokenType::Refresh, CONFIG.auth.refresh_token_ttl_secs)
}

/// Create a forgot-password token
pub fn create_reset_token(user: &user::Model) -> Result<String> {
    issue(user, TokenType::Reset, CONFIG.auth.reset_token_ttl_secs)
}

pub fn create_token_pair(user: &user::Model) -> Result<TokenPair> {
    Ok(TokenPair {
        access_token: create_access_token(user)?,
        refresh_token: create_refresh_token(user)?,
    })
}

/// Decode and validate a token that must be of the given type
pub fn decode_token(token: &str, expected: TokenType) -> Result<Claims> {
    let key = DecodingKey::from_secret(secret_for(expected));

    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.leeway = 0;

    let claims = decode::<Claims>(token, &key, &validation)?.claims;
    if claims.token_type != expected {
        return Err(AppError::Unauthorized("Wrong token type".to_string()));
    }
    Ok(claims)
}

/// Decode a token that is either an access or a reset token (both share a secret)
pub fn decode_access_or_reset(token: &str) -> Result<Claims> {
    let key = DecodingKey::from_secret(CONFIG.auth.access_secret.as_bytes());

    let mut validation = Validation::default();
    validation.leeway = 0;

    let claims = decode::<Claims>(token, &key, &validation)?.claims;
    match claims.token_type {
        TokenType::Access | TokenType::Reset => Ok(claims),
        TokenType::Refresh => Err(AppError::Unauthorized("Wrong token type".to_string())),
    }
}

/// Hash a password using bcrypt off the async executor
pub async fn hash_password(password: &str) -> Result<String> {
    let password = password.to_string();
    let cost = CONFIG.auth.bcrypt_cost;
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
        .map_err(AppError::from)
}

/// Verify a password against its hash
pub async fn verify_password(password: &str, hash: &str) -> bool {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}

/// Six-digit one-time code
pub fn generate_otp() -> String {
    rand::rng().random_range(100_000..=999_999).to_string()
}
