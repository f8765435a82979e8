//! Four-Way Stop Simulation Library
//!
//! Simulates vehicles negotiating an unsignaled four-way stop. The core runs
//! headless; an optional Bevy UI draws it.

pub mod simulation;

#[cfg(feature = "ui")]
pub mod ui;
