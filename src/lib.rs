pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::cli::LocalStorage;
pub use crate::config::session_config::SessionConfig;
pub use crate::core::{
    engine::SessionEngine, pipeline::StimulusPipeline, runner::BundleRunner,
    sequence_file::FileSequenceSource,
};
pub use crate::utils::error::{Result, StimError};
