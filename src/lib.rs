//! CareBow Triage - the Ask CareBow conversational triage engine
//!
//! This crate gathers symptom information turn by turn, watches for
//! emergencies, estimates urgency and routes the user toward bookable
//! in-home care services. It never asserts a diagnosis.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
