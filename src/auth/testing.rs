use crate::config::Config;
use crate::models::{Claims, TokenType};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub const SECRET: &str = "test-secret";

pub fn config() -> Config {
    Config {
        server_addr: "127.0.0.1:0".into(),
        database_url: "mysql://unused".into(),
        jwt_secret: SECRET.into(),
        rate_protected_per_min: 1000,
        api_prefix: "/api".into(),
        log_dir: "logs".into(),
        log_level: tracing::Level::DEBUG,
    }
}

/// Signed token for `role`, valid for ten minutes.
pub fn token(role: u8, token_type: TokenType, employee_id: Option<u64>) -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as usize;
    let claims = Claims {
        user_id: 1,
        sub: "jdoe".into(),
        role,
        exp: now + 600,
        jti: Uuid::new_v4().to_string(),
        token_type,
        employee_id,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

pub fn bearer(role: u8, employee_id: Option<u64>) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token(role, TokenType::Access, employee_id)))
}
