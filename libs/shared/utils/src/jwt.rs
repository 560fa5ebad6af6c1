use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use shared_models::auth::{SessionClaims, TokenHeader, User};

type HmacSha256 = Hmac<Sha256>;

/// Signs a session token for `user`. Returns the token and its expiry
/// timestamp.
pub fn issue_token(user: &User, secret: &str, ttl_hours: i64) -> Result<(String, i64), String> {
    if secret.is_empty() {
        return Err("Session secret is not set".to_string());
    }

    let now = Utc::now();
    let exp = (now + Duration::hours(ttl_hours)).timestamp();

    let header = TokenHeader {
        alg: "HS256".to_string(),
        typ: "JWT".to_string(),
    };
    let claims = SessionClaims {
        sub: user.id,
        username: user.username.clone(),
        role: user.role,
        entity_id: user.entity_id,
        iat: now.timestamp(),
        exp,
    };

    let header_json = serde_json::to_vec(&header).map_err(|e| e.to_string())?;
    let claims_json = serde_json::to_vec(&claims).map_err(|e| e.to_string())?;
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    );

    let signature = sign(&signing_input, secret)?;
    Ok((format!("{}.{}", signing_input, signature), exp))
}

fn sign(signing_input: &str, secret: &str) -> Result<String, String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(signing_input.as_bytes());
    Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}

pub fn validate_token(token: &str, secret: &str) -> Result<User, String> {
    if secret.is_empty() {
        return Err("Session secret is not set".to_string());
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let header_b64 = parts[0];
    let claims_b64 = parts[1];
    let signature_b64 = parts[2];

    let signature = match URL_SAFE_NO_PAD.decode(signature_b64) {
        Ok(sig) => sig,
        Err(e) => {
            debug!("Failed to decode signature: {}", e);
            return Err("Invalid signature encoding".to_string());
        }
    };

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(format!("{}.{}", header_b64, claims_b64).as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    let header: TokenHeader = URL_SAFE_NO_PAD
        .decode(header_b64)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .ok_or_else(|| "Invalid token header".to_string())?;
    if header.alg != "HS256" {
        return Err(format!("Unsupported token algorithm: {}", header.alg));
    }

    let claims_json = URL_SAFE_NO_PAD
        .decode(claims_b64)
        .map_err(|_| "Invalid claims encoding".to_string())?;

    let claims: SessionClaims = match serde_json::from_slice(&claims_json) {
        Ok(c) => c,
        Err(e) => {
            debug!("Failed to parse claims: {}", e);
            return Err("Invalid claims format".to_string());
        }
    };

    let now = Utc::now().timestamp();
    if claims.exp < now {
        debug!("Token expired at {} (now: {})", claims.exp, now);
        return Err("Token expired".to_string());
    }

    let user = User::from(claims);
    debug!("Token validated successfully for user: {}", user.username);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::auth::Role;

    const SECRET: &str = "unit-test-secret";

    fn pharmacist() -> User {
        User {
            id: 7,
            username: "pharm".to_string(),
            role: Role::Pharmacist,
            entity_id: Some(3),
        }
    }

    #[test]
    fn issued_token_validates_back_to_the_same_user() {
        let (token, exp) = issue_token(&pharmacist(), SECRET, 1).unwrap();
        assert!(exp > Utc::now().timestamp());

        let user = validate_token(&token, SECRET).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.role, Role::Pharmacist);
        assert_eq!(user.entity_id, Some(3));
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let (token, _) = issue_token(&pharmacist(), "another-secret", 1).unwrap();
        assert_eq!(
            validate_token(&token, SECRET).unwrap_err(),
            "Invalid token signature"
        );
    }

    #[test]
    fn rejects_expired_token() {
        let (token, _) = issue_token(&pharmacist(), SECRET, -1).unwrap();
        assert_eq!(validate_token(&token, SECRET).unwrap_err(), "Token expired");
    }

    #[test]
    fn rejects_malformed_token() {
        assert_eq!(
            validate_token("not-a-token", SECRET).unwrap_err(),
            "Invalid token format"
        );
    }

    #[test]
    fn refuses_to_work_without_secret() {
        assert!(issue_token(&pharmacist(), "", 1).is_err());
        assert!(validate_token("a.b.c", "").is_err());
    }
}
