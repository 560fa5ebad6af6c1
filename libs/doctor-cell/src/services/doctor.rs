use tracing::{debug, instrument};

use shared_database::repository::{count_rows, PRESCRIPTION_DETAIL_SELECT};
use shared_database::DbPool;
use shared_models::error::AppError;
use shared_models::pharmacy::{Doctor, Drug, Patient, PrescriptionDetail};

use crate::models::{DashboardCounts, DoctorDashboard};

pub struct DoctorService {
    pool: DbPool,
}

impl DoctorService {
    pub fn new(pool: &DbPool) -> Self {
        Self { pool: pool.clone() }
    }

    /// Everything the doctor landing page shows.
    #[instrument(skip(self))]
    pub async fn dashboard(&self, doctor_id: i64) -> Result<DoctorDashboard, AppError> {
        let doctor = sqlx::query_as::<_, Doctor>("SELECT id, name, dob FROM doctor WHERE id = ?")
            .bind(doctor_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Doctor {} not found", doctor_id)))?;

        let patients = sqlx::query_as::<_, Patient>(
            "SELECT id, name, dob, balance, doctor_id, address FROM patient \
             WHERE doctor_id = ? ORDER BY name",
        )
        .bind(doctor_id)
        .fetch_all(&self.pool)
        .await?;

        let sql = format!("{} WHERE p.doctor_id = ? ORDER BY p.id", PRESCRIPTION_DETAIL_SELECT);
        let prescriptions = sqlx::query_as::<_, PrescriptionDetail>(&sql)
            .bind(doctor_id)
            .fetch_all(&self.pool)
            .await?;

        let drugs = sqlx::query_as::<_, Drug>("SELECT id, name, common_ailment FROM drug ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        let counts = self.counts().await?;
        debug!(
            "Dashboard for doctor {}: {} patients, {} prescriptions",
            doctor_id,
            patients.len(),
            prescriptions.len()
        );

        Ok(DoctorDashboard {
            doctor,
            counts,
            patients,
            prescriptions,
            drugs,
        })
    }

    pub async fn counts(&self) -> Result<DashboardCounts, AppError> {
        Ok(DashboardCounts {
            doctors: count_rows(&self.pool, "doctor").await?,
            patients: count_rows(&self.pool, "patient").await?,
            prescriptions: count_rows(&self.pool, "prescription").await?,
        })
    }
}
