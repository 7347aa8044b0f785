pub mod license;
pub mod secrets;
