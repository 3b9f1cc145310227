use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::{Claims, TokenType};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

fn issue_token(
    token_type: TokenType,
    user_id: u64,
    username: String,
    role: u8,
    employee_id: Option<u64>,
    secret: &str,
    ttl: usize,
) -> (String, Claims) {
    let claims = Claims {
        user_id,
        sub: username,
        role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
        employee_id,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("HS256 encoding of serializable claims cannot fail");

    (token, claims)
}

pub fn generate_access_token(
    user_id: u64,
    username: String,
    role: u8,
    employee_id: Option<u64>,
    secret: &str,
    ttl: usize,
) -> String {
    issue_token(
        TokenType::Access,
        user_id,
        username,
        role,
        employee_id,
        secret,
        ttl,
    )
    .0
}

pub fn generate_refresh_token(
    user_id: u64,
    username: String,
    role: u8,
    employee_id: Option<u64>,
    secret: &str,
    ttl: usize,
) -> (String, Claims) {
    issue_token(
        TokenType::Refresh,
        user_id,
        username,
        role,
        employee_id,
        secret,
        ttl,
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_round_trip() {
        let token = generate_access_token(7, "arun.kumar".to_string(), 3, Some(1000), "secret", 900);
        let claims = verify_token(&token, "secret").unwrap();

        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.sub, "arun.kumar");
        assert_eq!(claims.role, 3);
        assert_eq!(claims.employee_id, Some(1000));
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn refresh_token_carries_its_own_jti() {
        let (token, claims) =
            generate_refresh_token(7, "arun.kumar".to_string(), 3, None, "secret", 3600);
        let decoded = verify_token(&token, "secret").unwrap();

        assert_eq!(decoded.jti, claims.jti);
        assert_eq!(decoded.token_type, TokenType::Refresh);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_access_token(7, "arun.kumar".to_string(), 3, None, "secret", 900);
        assert!(verify_token(&token, "other-secret").is_err());
    }
}
