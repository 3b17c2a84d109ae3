//! acfgen - a wrapper around SKSAppManifestGenerator
//!
//! This crate acquires the prebuilt generator when it is missing (ordered
//! download sources, ordered transport and extraction strategies), invokes
//! it with normalized App IDs, and verifies the expected `appmanifest_*.acf`
//! artifacts were produced.

pub mod acquire;
pub mod core;
pub mod ops;
pub mod util;

pub use crate::core::{
    app_ids::AppIdSet, errors::PipelineError, run::ExecutionResult, run::RunRequest,
    tool::DownloadSource, tool::ToolReference,
};

pub use crate::util::context::GlobalContext;
