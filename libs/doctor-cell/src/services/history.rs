use tracing::{debug, info};

use shared_database::repository::{find_history, find_patient, find_patient_by_name};
use shared_database::DbPool;
use shared_models::error::AppError;
use shared_models::pharmacy::PatientHistory;

use crate::models::{PatientHistoryView, UpdateHistoryRequest};

pub struct HistoryService {
    pool: DbPool,
}

impl HistoryService {
    pub fn new(pool: &DbPool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn for_patient_name(&self, name: &str) -> Result<PatientHistoryView, AppError> {
        debug!("Fetching history for patient: {}", name);

        let patient = find_patient_by_name(&self.pool, name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Patient {} not found", name)))?;
        let history = find_history(&self.pool, patient.id).await?;

        Ok(PatientHistoryView { patient, history })
    }

    /// Creates the history row on first write.
    pub async fn upsert(
        &self,
        patient_id: i64,
        request: UpdateHistoryRequest,
    ) -> Result<PatientHistory, AppError> {
        if request.is_empty() {
            return Err(AppError::ValidationError(
                "Provide at least one of allergies, family_history or notes".to_string(),
            ));
        }

        if find_patient(&self.pool, patient_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Patient {} not found", patient_id)));
        }

        let history = sqlx::query_as::<_, PatientHistory>(
            "INSERT INTO patient_history (patient_id, allergies, family_history, notes) \
             VALUES (?, ?, ?, ?) \
             ON CONFLICT (patient_id) DO UPDATE SET \
                 allergies = COALESCE(excluded.allergies, patient_history.allergies), \
                 family_history = COALESCE(excluded.family_history, patient_history.family_history), \
                 notes = COALESCE(excluded.notes, patient_history.notes) \
             RETURNING patient_id, allergies, family_history, notes",
        )
        .bind(patient_id)
        .bind(request.allergies)
        .bind(request.family_history)
        .bind(request.notes)
        .fetch_one(&self.pool)
        .await?;

        info!("Updated history for patient {}", patient_id);
        Ok(history)
    }
}
