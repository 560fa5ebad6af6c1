use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Doctor,
    Patient,
    Pharmacist,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Patient => "patient",
            Role::Pharmacist => "pharmacist",
        }
    }

    /// Landing page the login flow points each role at.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Doctor => "/doctor_dashboard",
            Role::Patient => "/patient_dashboard",
            Role::Pharmacist => "/pharmacist_dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "doctor" => Ok(Role::Doctor),
            "patient" => Ok(Role::Patient),
            "pharmacist" => Ok(Role::Pharmacist),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

/// Claims carried by a signed session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: i64,
    pub username: String,
    pub role: Role,
    /// Id of the doctor, patient or pharmacist row this account is linked to.
    pub entity_id: Option<i64>,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated principal, inserted into request extensions by the guards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub entity_id: Option<i64>,
}

impl User {
    pub fn require_entity(&self) -> Result<i64, crate::error::AppError> {
        self.entity_id.ok_or_else(|| {
            crate::error::AppError::Forbidden(format!(
                "Account {} is not linked to a {} record",
                self.username, self.role
            ))
        })
    }
}

impl From<SessionClaims> for User {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
            entity_id: claims.entity_id,
        }
    }
}

/// Row of the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub role: String,
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub pharmacist_id: Option<i64>,
}

impl UserRecord {
    pub fn role(&self) -> Result<Role, String> {
        self.role.parse()
    }

    pub fn entity_id(&self) -> Option<i64> {
        match self.role() {
            Ok(Role::Doctor) => self.doctor_id,
            Ok(Role::Patient) => self.patient_id,
            Ok(Role::Pharmacist) => self.pharmacist_id,
            Err(_) => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub expires_at: i64,
    pub dashboard: String,
}
