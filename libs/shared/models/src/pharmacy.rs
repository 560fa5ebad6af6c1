use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub dob: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub dob: NaiveDate,
    pub balance: f64,
    pub doctor_id: Option<i64>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PatientHistory {
    pub patient_id: i64,
    pub allergies: Option<String>,
    pub family_history: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Drug {
    pub id: i64,
    pub name: String,
    pub common_ailment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Prescription {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub drug_id: i64,
    pub dosage: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Pharmacy {
    pub id: i64,
    pub address: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Pharmacist {
    pub id: i64,
    pub name: String,
    pub pharmacy_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Cancelled,
    Scheduled,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Scheduled => "Scheduled",
            OrderStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown order status: {0}")]
pub struct UnknownOrderStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cancelled" => Ok(OrderStatus::Cancelled),
            "Scheduled" => Ok(OrderStatus::Scheduled),
            "Completed" => Ok(OrderStatus::Completed),
            other => Err(UnknownOrderStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = UnknownOrderStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub request_date: NaiveDate,
    pub pharmacy_id: i64,
    pub patient_id: i64,
    pub prescript_id: i64,
    pub pharmacist_id: Option<i64>,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
}

/// Prescription joined with the names a dashboard shows next to it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PrescriptionDetail {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub drug_id: i64,
    pub drug_name: String,
    pub common_ailment: Option<String>,
    pub dosage: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderDetail {
    pub id: i64,
    pub request_date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    pub pharmacy_id: i64,
    pub pharmacy_name: String,
    pub patient_id: i64,
    pub patient_name: String,
    pub prescript_id: i64,
    pub drug_name: String,
    pub dosage: String,
    pub pharmacist_id: Option<i64>,
}
