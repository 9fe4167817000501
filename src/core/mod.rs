pub mod engine;
pub mod phase;
pub mod pipeline;
pub mod runner;
pub mod sequence_file;
pub mod session;
pub mod stimuli;
pub mod sweep_table;

pub use crate::domain::model::{SequenceData, SessionInputs, SessionPlan};
pub use crate::domain::ports::{
    ConfigProvider, SequenceSource, SessionPipeline, Storage, StimulusRunner,
};
pub use crate::utils::error::Result;
