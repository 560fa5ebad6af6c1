//! Read queries shared by several cells. Each returns plain rows; nothing is
//! fetched lazily behind the caller's back.

use tracing::debug;

use shared_models::pharmacy::{OrderDetail, Patient, PatientHistory, PrescriptionDetail};

use crate::pool::DbPool;

pub const PRESCRIPTION_DETAIL_SELECT: &str = r#"
    SELECT p.id, p.patient_id, pt.name AS patient_name,
           p.doctor_id, d.name AS doctor_name,
           p.drug_id, dr.name AS drug_name, dr.common_ailment,
           p.dosage
    FROM prescription p
    JOIN patient pt ON pt.id = p.patient_id
    JOIN doctor d ON d.id = p.doctor_id
    JOIN drug dr ON dr.id = p.drug_id
"#;

pub const ORDER_DETAIL_SELECT: &str = r#"
    SELECT o.id, o.request_date, o.status,
           o.pharmacy_id, ph.name AS pharmacy_name,
           o.patient_id, pt.name AS patient_name,
           o.prescript_id, dr.name AS drug_name, p.dosage,
           o.pharmacist_id
    FROM orders o
    JOIN pharmacy ph ON ph.id = o.pharmacy_id
    JOIN patient pt ON pt.id = o.patient_id
    JOIN prescription p ON p.id = o.prescript_id
    JOIN drug dr ON dr.id = p.drug_id
"#;

pub async fn find_patient(pool: &DbPool, patient_id: i64) -> Result<Option<Patient>, sqlx::Error> {
    sqlx::query_as::<_, Patient>(
        "SELECT id, name, dob, balance, doctor_id, address FROM patient WHERE id = ?",
    )
    .bind(patient_id)
    .fetch_optional(pool)
    .await
}

/// Name lookups are case-insensitive; the lowest id wins on duplicates.
pub async fn find_patient_by_name(pool: &DbPool, name: &str) -> Result<Option<Patient>, sqlx::Error> {
    debug!("Looking up patient by name: {}", name);

    sqlx::query_as::<_, Patient>(
        "SELECT id, name, dob, balance, doctor_id, address FROM patient \
         WHERE name = ? COLLATE NOCASE ORDER BY id LIMIT 1",
    )
    .bind(name.trim())
    .fetch_optional(pool)
    .await
}

pub async fn find_history(
    pool: &DbPool,
    patient_id: i64,
) -> Result<Option<PatientHistory>, sqlx::Error> {
    sqlx::query_as::<_, PatientHistory>(
        "SELECT patient_id, allergies, family_history, notes FROM patient_history WHERE patient_id = ?",
    )
    .bind(patient_id)
    .fetch_optional(pool)
    .await
}

pub async fn prescriptions_for_patient(
    pool: &DbPool,
    patient_id: i64,
) -> Result<Vec<PrescriptionDetail>, sqlx::Error> {
    let sql = format!("{} WHERE p.patient_id = ? ORDER BY p.id", PRESCRIPTION_DETAIL_SELECT);
    sqlx::query_as::<_, PrescriptionDetail>(&sql)
        .bind(patient_id)
        .fetch_all(pool)
        .await
}

pub async fn orders_for_patient(
    pool: &DbPool,
    patient_id: i64,
) -> Result<Vec<OrderDetail>, sqlx::Error> {
    let sql = format!(
        "{} WHERE o.patient_id = ? ORDER BY o.request_date DESC, o.id DESC",
        ORDER_DETAIL_SELECT
    );
    sqlx::query_as::<_, OrderDetail>(&sql)
        .bind(patient_id)
        .fetch_all(pool)
        .await
}

pub async fn count_rows(pool: &DbPool, table: &str) -> Result<i64, sqlx::Error> {
    let sql = format!("SELECT COUNT(*) FROM \"{}\"", table.replace('"', "\"\""));
    sqlx::query_scalar(&sql).fetch_one(pool).await
}
