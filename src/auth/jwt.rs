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

/// Profile links carried in every token so handlers can resolve the
/// caller's Student/Supervisor/Employer row without a user lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileLinks {
    pub student_id: Option<u64>,
    pub supervisor_id: Option<u64>,
    pub employer_id: Option<u64>,
}

fn build_claims(
    user_id: u64,
    username: String,
    role: u8,
    links: ProfileLinks,
    token_type: TokenType,
    ttl: usize,
) -> Claims {
    Claims {
        user_id,
        sub: username,
        role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
        student_id: links.student_id,
        supervisor_id: links.supervisor_id,
        employer_id: links.employer_id,
    }
}

fn sign(claims: &Claims, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("JWT encoding cannot fail with HS256")
}

pub fn generate_access_token(
    user_id: u64,
    username: String,
    role: u8,
    links: ProfileLinks,
    secret: &str,
    ttl: usize,
) -> (String, Claims) {
    let claims = build_claims(user_id, username, role, links, TokenType::Access, ttl);
    (sign(&claims, secret), claims)
}

pub fn generate_refresh_token(
    user_id: u64,
    username: String,
    role: u8,
    links: ProfileLinks,
    secret: &str,
    ttl: usize,
) -> (String, Claims) {
    let claims = build_claims(user_id, username, role, links, TokenType::Refresh, ttl);
    (sign(&claims, secret), claims)
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
