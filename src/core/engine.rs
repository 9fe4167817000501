use crate::core::{SessionPipeline, SessionPlan};
use crate::utils::error::Result;

pub struct SessionEngine<P: SessionPipeline> {
    pipeline: P,
}

impl<P: SessionPipeline> SessionEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// 只做 extract + transform，不交給 runner
    pub fn plan(&self) -> Result<SessionPlan> {
        tracing::info!("📥 Reading stimulus sequences...");
        let inputs = self.pipeline.extract()?;
        tracing::info!(
            "Read {} sequence file(s){}",
            inputs.sequences.len(),
            if inputs.drift_sequence.is_some() {
                " plus a drift sequence"
            } else {
                ""
            }
        );

        tracing::info!("🧮 Building stimulus session...");
        let plan = self.pipeline.transform(inputs)?;
        tracing::info!(
            "Built {} stimuli, total {:.3} min",
            plan.stimuli.len(),
            plan.total_duration / 60.0
        );

        Ok(plan)
    }

    pub fn run(&self) -> Result<String> {
        let plan = self.plan()?;

        tracing::info!("🎬 Handing session to the stimulus runner...");
        let location = self.pipeline.load(plan)?;
        tracing::info!("Session handed off: {}", location);

        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SessionInputs;
    use crate::domain::model::{MonitorSpec, SyncSpec, Warp, WindowSpec};
    use crate::utils::error::StimError;
    use std::cell::Cell;

    struct FakePipeline {
        fail_extract: bool,
        loaded: Cell<bool>,
    }

    impl SessionPipeline for FakePipeline {
        fn extract(&self) -> Result<SessionInputs> {
            if self.fail_extract {
                return Err(StimError::NoUsableData {
                    source_name: "x.txt".to_string(),
                });
            }
            Ok(SessionInputs::default())
        }

        fn transform(&self, _inputs: SessionInputs) -> Result<SessionPlan> {
            Ok(SessionPlan {
                name: "fake".to_string(),
                session_id: "id".to_string(),
                window: WindowSpec {
                    fullscreen: false,
                    screen: 0,
                    warp: Warp::None,
                    monitor: MonitorSpec::Calibrated {
                        name: "m".to_string(),
                    },
                },
                sync: SyncSpec::default(),
                pre_blank_sec: 0.0,
                post_blank_sec: 0.0,
                foraging: false,
                stimuli: vec![],
                total_duration: 0.0,
            })
        }

        fn load(&self, plan: SessionPlan) -> Result<String> {
            self.loaded.set(true);
            Ok(plan.session_id)
        }
    }

    #[test]
    fn test_run_goes_through_all_stages() {
        let engine = SessionEngine::new(FakePipeline {
            fail_extract: false,
            loaded: Cell::new(false),
        });
        assert_eq!(engine.run().unwrap(), "id");
        assert!(engine.pipeline.loaded.get());
    }

    #[test]
    fn test_plan_does_not_load() {
        let engine = SessionEngine::new(FakePipeline {
            fail_extract: false,
            loaded: Cell::new(false),
        });
        engine.plan().unwrap();
        assert!(!engine.pipeline.loaded.get());
    }

    #[test]
    fn test_extract_failure_stops_run() {
        let engine = SessionEngine::new(FakePipeline {
            fail_extract: true,
            loaded: Cell::new(false),
        });
        assert!(engine.run().is_err());
        assert!(!engine.pipeline.loaded.get());
    }
}
