pub mod doctor;
pub mod history;
pub mod prescription;

pub use doctor::DoctorService;
pub use history::HistoryService;
pub use prescription::PrescriptionService;
