pub mod auth;
pub mod error;
pub mod flash;
pub mod pharmacy;
