//! Core library for the event/company lifecycle dashboard backend.
//!
//! The interesting part lives in [`lifecycle`]: given a subject (an event or
//! a company) it reconstructs a deduplicated, chronologically ordered history
//! of everything that happened to it and reduces that history to a weighted
//! completion percentage.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod telemetry;
