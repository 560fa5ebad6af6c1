use tracing::{debug, info, instrument};

use shared_database::repository::{find_patient, find_patient_by_name, prescriptions_for_patient};
use shared_database::DbPool;
use shared_models::error::AppError;
use shared_models::pharmacy::Prescription;

use crate::models::{CreatePrescriptionRequest, PatientPrescriptions};

pub struct PrescriptionService {
    pool: DbPool,
}

impl PrescriptionService {
    pub fn new(pool: &DbPool) -> Self {
        Self { pool: pool.clone() }
    }

    /// Prescriptions of the patient called `name`
    pub async fn for_patient_name(&self, name: &str) -> Result<PatientPrescriptions, AppError> {
        debug!("Fetching prescriptions for patient: {}", name);

        let patient = find_patient_by_name(&self.pool, name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Patient {} not found", name)))?;
        let prescriptions = prescriptions_for_patient(&self.pool, patient.id).await?;

        Ok(PatientPrescriptions {
            patient,
            prescriptions,
        })
    }

    #[instrument(skip(self, request), fields(patient_id = request.patient_id, drug_id = request.drug_id))]
    pub async fn create(
        &self,
        doctor_id: i64,
        request: CreatePrescriptionRequest,
    ) -> Result<Prescription, AppError> {
        request.validate()?;

        if find_patient(&self.pool, request.patient_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Patient {} not found",
                request.patient_id
            )));
        }

        let drug_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM drug WHERE id = ?")
            .bind(request.drug_id)
            .fetch_optional(&self.pool)
            .await?;
        if drug_exists.is_none() {
            return Err(AppError::NotFound(format!("Drug {} not found", request.drug_id)));
        }

        let prescription = sqlx::query_as::<_, Prescription>(
            "INSERT INTO prescription (patient_id, doctor_id, drug_id, dosage) \
             VALUES (?, ?, ?, ?) \
             RETURNING id, patient_id, doctor_id, drug_id, dosage",
        )
        .bind(request.patient_id)
        .bind(doctor_id)
        .bind(request.drug_id)
        .bind(request.dosage.trim())
        .fetch_one(&self.pool)
        .await?;

        info!("Doctor {} created prescription {}", doctor_id, prescription.id);
        Ok(prescription)
    }
}
