//! High-level operations.
//!
//! This module contains the implementation of acfgen commands.

pub mod doctor;
pub mod generate;
pub mod verify;

pub use doctor::{doctor, format_report as format_doctor_report, CheckResult, DoctorReport};
pub use generate::{fetch, generate, run_generator, GenerateOutcome};
pub use verify::{format_report, verify, ArtifactStatus, VerificationReport};
