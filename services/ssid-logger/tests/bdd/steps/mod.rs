//! BDD step definitions for the SSID logger

pub mod delivery_steps;
pub mod lifecycle_steps;
pub mod tracker_steps;
