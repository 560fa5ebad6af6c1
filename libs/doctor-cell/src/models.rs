use serde::{Deserialize, Serialize};

use shared_models::error::AppError;
use shared_models::pharmacy::{Doctor, Drug, Patient, PatientHistory, PrescriptionDetail};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardCounts {
    pub doctors: i64,
    pub patients: i64,
    pub prescriptions: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorDashboard {
    pub doctor: Doctor,
    pub counts: DashboardCounts,
    pub patients: Vec<Patient>,
    pub prescriptions: Vec<PrescriptionDetail>,
    /// Drug list for the prescription form.
    pub drugs: Vec<Drug>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientPrescriptions {
    pub patient: Patient,
    pub prescriptions: Vec<PrescriptionDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientHistoryView {
    pub patient: Patient,
    pub history: Option<PatientHistory>,
}

/// Fields left out keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateHistoryRequest {
    pub allergies: Option<String>,
    pub family_history: Option<String>,
    pub notes: Option<String>,
}

impl UpdateHistoryRequest {
    pub fn is_empty(&self) -> bool {
        self.allergies.is_none() && self.family_history.is_none() && self.notes.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePrescriptionRequest {
    pub patient_id: i64,
    pub drug_id: i64,
    pub dosage: String,
}

impl CreatePrescriptionRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.patient_id <= 0 || self.drug_id <= 0 {
            return Err(AppError::ValidationError(
                "patient_id and drug_id must be positive".to_string(),
            ));
        }
        if self.dosage.trim().is_empty() {
            return Err(AppError::ValidationError("Dosage is required".to_string()));
        }
        Ok(())
    }
}
