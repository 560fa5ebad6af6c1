use serde::{Deserialize, Serialize};

use shared_models::error::AppError;
use shared_models::pharmacy::{OrderDetail, Patient, PatientHistory, Pharmacy, PrescriptionDetail};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientDashboard {
    pub patient: Patient,
    pub history: Option<PatientHistory>,
    pub prescriptions: Vec<PrescriptionDetail>,
    pub orders: Vec<OrderDetail>,
    /// Pharmacies a refill can be sent to.
    pub pharmacies: Vec<Pharmacy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefillRequest {
    pub pharmacy_id: i64,
}

impl RefillRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.pharmacy_id <= 0 {
            return Err(AppError::ValidationError("pharmacy_id must be positive".to_string()));
        }
        Ok(())
    }
}
