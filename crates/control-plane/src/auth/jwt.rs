// JWT token service
// Decision: HS256 with a symmetric key
// Decision: Access tokens only; sign-out revokes by jti

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use gatherly_core::Role;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::JwtConfig;

const ACCESS_TOKEN_TYPE: &str = "access";

/// 32 hex characters
fn generate_jti() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    hex::encode(bytes)
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessTokenClaims {
    /// User id
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub token_type: String,
    /// Unique token id, used for revocation
    pub jti: String,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl AccessTokenClaims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

/// Signed token plus its expiry
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn issue_access_token(&self, user_id: Uuid, email: &str, role: Role) -> Result<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + Duration::from_std(self.config.access_token_lifetime)?;
        let jti = generate_jti();

        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            token_type: ACCESS_TOKEN_TYPE.to_string(),
            jti: jti.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .context("Failed to encode access token")?;

        Ok(IssuedToken {
            token,
            jti,
            expires_at,
        })
    }

    /// Checks signature, expiry and token type. Revocation is checked by the caller.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .context("Invalid access token")?;

        if token_data.claims.token_type != ACCESS_TOKEN_TYPE {
            anyhow::bail!("Invalid token type");
        }

        Ok(token_data.claims)
    }

    pub fn access_token_lifetime_secs(&self) -> i64 {
        self.config.access_token_lifetime.as_secs() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    fn service(secret: &str) -> JwtService {
        JwtService::new(JwtConfig {
            secret: secret.to_string(),
            access_token_lifetime: StdDuration::from_secs(900),
        })
    }

    #[test]
    fn test_issue_and_validate() {
        let service = service("test-secret");
        let user_id = Uuid::now_v7();
        let issued = service
            .issue_access_token(user_id, "asha@example.com", Role::Provider)
            .unwrap();

        let claims = service.validate_access_token(&issued.token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "asha@example.com");
        assert_eq!(claims.role, Role::Provider);
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(claims.expires_at().timestamp(), issued.expires_at.timestamp());
    }

    #[test]
    fn test_each_token_has_its_own_jti() {
        let service = service("test-secret");
        let a = service
            .issue_access_token(Uuid::nil(), "a@example.com", Role::Customer)
            .unwrap();
        let b = service
            .issue_access_token(Uuid::nil(), "a@example.com", Role::Customer)
            .unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let issued = service("one")
            .issue_access_token(Uuid::nil(), "a@example.com", Role::Admin)
            .unwrap();
        assert!(service("two").validate_access_token(&issued.token).is_err());
        assert!(service("one").validate_access_token("garbage").is_err());
    }
}
