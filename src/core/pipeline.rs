use crate::config::session_config::SessionConfig;
use crate::core::session::build_session;
use crate::core::{
    SequenceSource, SessionInputs, SessionPipeline, SessionPlan, StimulusRunner,
};
use crate::utils::error::Result;

/// 讀序列檔 -> 組 session -> 交給 runner
pub struct StimulusPipeline<Src: SequenceSource, R: StimulusRunner> {
    source: Src,
    runner: R,
    config: SessionConfig,
    session_id: String,
}

impl<Src: SequenceSource, R: StimulusRunner> StimulusPipeline<Src, R> {
    pub fn new(source: Src, runner: R, config: SessionConfig, session_id: String) -> Self {
        Self {
            source,
            runner,
            config,
            session_id,
        }
    }
}

impl<Src: SequenceSource, R: StimulusRunner> SessionPipeline for StimulusPipeline<Src, R> {
    fn extract(&self) -> Result<SessionInputs> {
        let mut inputs = SessionInputs::default();

        for name in &self.config.files.sequences {
            inputs.sequences.push(self.source.load_sequence(name)?);
        }

        if self.config.stimuli.add_drift {
            if let Some(name) = &self.config.files.drift_sequence {
                // 已經讀過的檔案不再讀一次
                let loaded = inputs.sequences.iter().find(|s| &s.name == name).cloned();
                let sequence = match loaded {
                    Some(sequence) => sequence,
                    None => self.source.load_sequence(name)?,
                };
                inputs.drift_sequence = Some(sequence);
            }
        }

        Ok(inputs)
    }

    fn transform(&self, inputs: SessionInputs) -> Result<SessionPlan> {
        build_session(&self.config, &self.session_id, &inputs)
    }

    fn load(&self, plan: SessionPlan) -> Result<String> {
        self.runner.run(&plan)
    }
}
