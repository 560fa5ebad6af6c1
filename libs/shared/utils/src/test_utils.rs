use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use shared_config::AppConfig;
use shared_database::{pool::connect_in_memory, AppState};
use shared_models::auth::{Role, User};

use crate::jwt::issue_token;

/// Small seed used across the test suites: 1 doctor, 3 patients, 2 drugs,
/// 2 prescriptions and 2 scheduled orders. The leading `USE` line and the
/// `;` inside a quoted address are deliberate.
pub const FIXTURE_SEED: &str = r#"
USE pharmacy_testing;

CREATE TABLE doctor (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    dob TEXT NOT NULL
);

CREATE TABLE patient (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    dob TEXT NOT NULL,
    balance REAL NOT NULL DEFAULT 0,
    doctor_id INTEGER REFERENCES doctor(id),
    address TEXT
);

CREATE TABLE patient_history (
    patient_id INTEGER PRIMARY KEY REFERENCES patient(id),
    allergies TEXT,
    family_history TEXT,
    notes TEXT
);

CREATE TABLE drug (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    common_ailment TEXT
);

CREATE TABLE prescription (
    id INTEGER PRIMARY KEY,
    patient_id INTEGER NOT NULL REFERENCES patient(id),
    doctor_id INTEGER NOT NULL REFERENCES doctor(id),
    drug_id INTEGER NOT NULL REFERENCES drug(id),
    dosage TEXT NOT NULL
);

CREATE TABLE pharmacy (
    id INTEGER PRIMARY KEY,
    address TEXT NOT NULL,
    name TEXT NOT NULL
);

CREATE TABLE pharmacist (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    pharmacy_id INTEGER REFERENCES pharmacy(id)
);

CREATE TABLE orders (
    id INTEGER PRIMARY KEY,
    request_date TEXT NOT NULL,
    pharmacy_id INTEGER NOT NULL REFERENCES pharmacy(id),
    patient_id INTEGER NOT NULL REFERENCES patient(id),
    prescript_id INTEGER NOT NULL REFERENCES prescription(id),
    pharmacist_id INTEGER REFERENCES pharmacist(id),
    status TEXT NOT NULL DEFAULT 'Scheduled'
        CHECK (status IN ('Cancelled', 'Scheduled', 'Completed'))
);

CREATE TABLE users (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('doctor', 'patient', 'pharmacist')),
    patient_id INTEGER REFERENCES patient(id),
    doctor_id INTEGER REFERENCES doctor(id),
    pharmacist_id INTEGER REFERENCES pharmacist(id)
);

INSERT INTO doctor (id, name, dob) VALUES (1, 'Gregory House', '1959-06-11');

INSERT INTO patient (id, name, dob, balance, doctor_id, address) VALUES
    (1, 'Alice Moreau', '1988-02-14', 25.50, 1, '12 Elm St; Apt 4'),
    (2, 'Dana O''Neil', '1975-09-30', 0, 1, '3 Harbour Rd'),
    (3, 'Sam Okafor', '2001-12-01', 112.00, 1, NULL);

INSERT INTO patient_history (patient_id, allergies, family_history, notes) VALUES
    (1, 'Penicillin', 'Diabetes', 'Annual check-up due');

INSERT INTO drug (id, name, common_ailment) VALUES
    (1, 'Amoxicillin', 'Bacterial infection'),
    (2, 'Lisinopril', 'Hypertension');

INSERT INTO prescription (id, patient_id, doctor_id, drug_id, dosage) VALUES
    (1, 1, 1, 2, '10mg daily'),
    (2, 2, 1, 1, '500mg three times daily');

INSERT INTO pharmacy (id, address, name) VALUES (1, '99 Market St', 'Corner Pharmacy');

INSERT INTO pharmacist (id, name, pharmacy_id) VALUES (1, 'Priya Shah', 1);

INSERT INTO orders (id, request_date, pharmacy_id, patient_id, prescript_id, pharmacist_id, status) VALUES
    (1, '2024-03-01', 1, 1, 1, NULL, 'Scheduled'),
    (2, '2024-03-02', 1, 2, 2, NULL, 'Scheduled');
"#;

pub struct TestConfig {
    pub secret_key: String,
    pub seed_script_path: PathBuf,
    pub reset_requires_auth: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            secret_key: "test-secret-key-for-session-signing".to_string(),
            seed_script_path: PathBuf::from("insert_create.sql"),
            reset_requires_auth: false,
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".to_string(),
            database_schema: "pharmacy_testing".to_string(),
            database_max_connections: 1,
            secret_key: self.secret_key.clone(),
            session_ttl_hours: 1,
            seed_script_path: self.seed_script_path.clone(),
            reset_requires_auth: self.reset_requires_auth,
            bind_addr: ([127, 0, 0, 1], 0).into(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// In-memory database whose seed script lives in a temporary directory.
/// Nothing is loaded until a test runs the reseed engine against it.
pub struct TestDatabase {
    pub state: AppState,
    pub seed_dir: TempDir,
}

impl TestDatabase {
    pub async fn with_seed(seed: &str) -> Self {
        Self::with_config(seed, TestConfig::default()).await
    }

    pub async fn with_config(seed: &str, mut config: TestConfig) -> Self {
        let seed_dir = tempfile::tempdir().expect("create temp dir");
        let seed_path = seed_dir.path().join("insert_create.sql");
        std::fs::write(&seed_path, seed).expect("write seed script");
        config.seed_script_path = seed_path;

        let pool = connect_in_memory().await.expect("open in-memory database");
        Self {
            state: AppState::new(config.to_arc(), pool),
            seed_dir,
        }
    }

    pub async fn fixture() -> Self {
        Self::with_seed(FIXTURE_SEED).await
    }

    pub fn seed_path(&self) -> PathBuf {
        self.state.config.seed_script_path.clone()
    }
}

pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub entity_id: Option<i64>,
}

impl TestUser {
    pub fn new(username: &str, role: Role, entity_id: Option<i64>) -> Self {
        Self {
            id: 1000 + entity_id.unwrap_or(0),
            username: username.to_string(),
            role,
            entity_id,
        }
    }

    pub fn doctor(doctor_id: i64) -> Self {
        Self::new("dr.house", Role::Doctor, Some(doctor_id))
    }

    pub fn patient(patient_id: i64) -> Self {
        Self::new("patient", Role::Patient, Some(patient_id))
    }

    pub fn pharmacist(pharmacist_id: i64) -> Self {
        Self::new("pharmacist", Role::Pharmacist, Some(pharmacist_id))
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
            entity_id: self.entity_id,
        }
    }
}

pub struct TokenTestUtils;

impl TokenTestUtils {
    pub fn create_test_token(user: &TestUser, config: &AppConfig) -> String {
        let (token, _) = issue_token(&user.to_user(), &config.secret_key, config.session_ttl_hours)
            .expect("issue test token");
        token
    }

    pub fn bearer(user: &TestUser, config: &AppConfig) -> String {
        format!("Bearer {}", Self::create_test_token(user, config))
    }
}
