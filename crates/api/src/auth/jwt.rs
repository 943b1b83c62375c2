//! JWT issuance and verification
//!
//! Tokens carry the principal id and kind; the kind is re-checked by the
//! auth middleware so an admin token can never act as a tenant or vice
//! versa. HS256, single shared secret, expiry from configuration.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gymstack_shared::types::PrincipalKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Principal id
    pub sub: Uuid,
    /// Principal kind: "admin" or "gym_manager"
    pub typ: String,
    /// Token id, for log correlation
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn principal_kind(&self) -> Option<PrincipalKind> {
        PrincipalKind::parse(&self.typ)
    }
}

#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: i64,
}

impl JwtManager {
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        }
    }

    pub fn generate_token(
        &self,
        id: Uuid,
        kind: PrincipalKind,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: id,
            typ: kind.as_str().to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + TimeDelta::hours(self.expiry_hours)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    /// Single verification attempt; expired or tampered tokens fail here.
    pub fn validate_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation).map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_claims() {
        let manager = JwtManager::new("test-jwt-secret-key-for-testing-only", 24);
        let id = Uuid::new_v4();

        let token = manager.generate_token(id, PrincipalKind::GymManager).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.sub, id);
        assert_eq!(claims.principal_kind(), Some(PrincipalKind::GymManager));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let manager = JwtManager::new("secret-one", 24);
        let other = JwtManager::new("secret-two", 24);

        let token = manager
            .generate_token(Uuid::new_v4(), PrincipalKind::Admin)
            .unwrap();
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Negative expiry puts exp in the past.
        let manager = JwtManager::new("test-secret", -1);
        let token = manager
            .generate_token(Uuid::new_v4(), PrincipalKind::Admin)
            .unwrap();
        assert!(manager.validate_token(&token).is_err());
    }

    #[test]
    fn admin_and_tenant_tokens_carry_distinct_kinds() {
        let manager = JwtManager::new("test-secret", 24);
        let admin = manager
            .generate_token(Uuid::new_v4(), PrincipalKind::Admin)
            .unwrap();
        let gym = manager
            .generate_token(Uuid::new_v4(), PrincipalKind::GymManager)
            .unwrap();

        assert_eq!(
            manager.validate_token(&admin).unwrap().principal_kind(),
            Some(PrincipalKind::Admin)
        );
        assert_eq!(
            manager.validate_token(&gym).unwrap().principal_kind(),
            Some(PrincipalKind::GymManager)
        );
    }
}
