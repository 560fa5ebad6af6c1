use chrono::Utc;
use tracing::{debug, info, instrument};

use shared_database::repository::{
    find_history, find_patient, orders_for_patient, prescriptions_for_patient,
};
use shared_database::DbPool;
use shared_models::error::AppError;
use shared_models::pharmacy::{Order, OrderStatus, Pharmacy};

use crate::models::{PatientDashboard, RefillRequest};

pub struct PatientService {
    pool: DbPool,
}

impl PatientService {
    pub fn new(pool: &DbPool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn dashboard(&self, patient_id: i64) -> Result<PatientDashboard, AppError> {
        debug!("Fetching dashboard for patient: {}", patient_id);

        let patient = find_patient(&self.pool, patient_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Patient {} not found", patient_id)))?;

        let history = find_history(&self.pool, patient_id).await?;
        let prescriptions = prescriptions_for_patient(&self.pool, patient_id).await?;
        let orders = orders_for_patient(&self.pool, patient_id).await?;
        let pharmacies = sqlx::query_as::<_, Pharmacy>("SELECT id, address, name FROM pharmacy ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(PatientDashboard {
            patient,
            history,
            prescriptions,
            orders,
            pharmacies,
        })
    }

    /// Schedules a new order for one of the patient's own prescriptions.
    #[instrument(skip(self, request), fields(pharmacy_id = request.pharmacy_id))]
    pub async fn request_refill(
        &self,
        patient_id: i64,
        prescription_id: i64,
        request: RefillRequest,
    ) -> Result<Order, AppError> {
        request.validate()?;

        let owned: Option<i64> =
            sqlx::query_scalar("SELECT id FROM prescription WHERE id = ? AND patient_id = ?")
                .bind(prescription_id)
                .bind(patient_id)
                .fetch_optional(&self.pool)
                .await?;
        if owned.is_none() {
            return Err(AppError::NotFound(format!(
                "Prescription {} not found",
                prescription_id
            )));
        }

        let pharmacy: Option<i64> = sqlx::query_scalar("SELECT id FROM pharmacy WHERE id = ?")
            .bind(request.pharmacy_id)
            .fetch_optional(&self.pool)
            .await?;
        if pharmacy.is_none() {
            return Err(AppError::NotFound(format!(
                "Pharmacy {} not found",
                request.pharmacy_id
            )));
        }

        let order = sqlx::query_as::<_, Order>(
            "INSERT INTO orders (request_date, pharmacy_id, patient_id, prescript_id, pharmacist_id, status) \
             VALUES (?, ?, ?, ?, NULL, ?) \
             RETURNING id, request_date, pharmacy_id, patient_id, prescript_id, pharmacist_id, status",
        )
        .bind(Utc::now().date_naive())
        .bind(request.pharmacy_id)
        .bind(patient_id)
        .bind(prescription_id)
        .bind(OrderStatus::Scheduled.as_str())
        .fetch_one(&self.pool)
        .await?;

        info!(
            "Patient {} requested refill of prescription {} (order {})",
            patient_id, prescription_id, order.id
        );
        Ok(order)
    }
}
