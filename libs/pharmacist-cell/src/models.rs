use serde::{Deserialize, Serialize};

use shared_models::pharmacy::{OrderDetail, Pharmacist, Pharmacy};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PharmacistDashboard {
    pub pharmacist: Pharmacist,
    /// Pharmacy the pharmacist works at, if assigned.
    pub pharmacy: Option<Pharmacy>,
    pub pending_orders: Vec<OrderDetail>,
}
