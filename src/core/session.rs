use crate::config::session_config::SessionConfig;
use crate::core::sequence_file::dilate;
use crate::core::stimuli::{create_drift, create_flashes, create_static, Timing};
use crate::domain::model::{SequenceData, SessionInputs, SessionPlan, StimulusDescriptor};
use crate::utils::error::{Result, StimError};

fn dilated(sequence: &SequenceData, factor: usize) -> SequenceData {
    SequenceData {
        name: sequence.name.clone(),
        values: dilate(&sequence.values, factor),
    }
}

/// 依序排好 flashes、靜態光柵、漂移光柵，每段的結束時間就是下一段的開始
pub fn build_session(
    config: &SessionConfig,
    session_id: &str,
    inputs: &SessionInputs,
) -> Result<SessionPlan> {
    let n_repeats = config.repeat_policy().resolve();
    let timing = Timing::new(config.session.fps, n_repeats)?;
    let factor = config.time_dilation();

    tracing::info!(
        "Building session '{}' at {} fps, {} repeat(s), time dilation {}",
        config.session.name,
        timing.fps,
        n_repeats,
        factor
    );

    let sequences: Vec<SequenceData> = inputs
        .sequences
        .iter()
        .map(|s| dilated(s, factor))
        .collect();

    let mut current_start_time = 0.0;
    let mut stimuli: Vec<StimulusDescriptor> = Vec::new();

    if config.stimuli.add_flashes {
        for (index, sequence) in sequences.iter().enumerate() {
            let name = format!("flash_{}", index + 1);
            let (stimulus, end) = create_flashes(&name, sequence, &timing, current_start_time)?;
            stimuli.push(stimulus);
            current_start_time = end;
        }
        tracing::info!("Flashes end at : {:.3} min", current_start_time / 60.0);
    }

    if config.stimuli.add_static {
        let sequence = sequences.first().ok_or_else(|| StimError::MissingConfigError {
            field: "files.sequences".to_string(),
        })?;
        let (stimulus, end) = create_static(
            "static_gratings",
            sequence,
            &config.gratings,
            &timing,
            current_start_time,
        )?;
        stimuli.push(stimulus);
        current_start_time = end;
        tracing::info!("Static gratings end at : {:.3} min", current_start_time / 60.0);
    }

    if config.stimuli.add_drift {
        let drift_sequence = inputs
            .drift_sequence
            .as_ref()
            .map(|s| dilated(s, factor))
            .or_else(|| sequences.first().cloned())
            .ok_or_else(|| StimError::MissingConfigError {
                field: "files.drift_sequence".to_string(),
            })?;
        let (stimulus, end) = create_drift(
            "drifting_gratings",
            &drift_sequence,
            &config.gratings,
            &timing,
            current_start_time,
        )?;
        stimuli.push(stimulus);
        current_start_time = end;
        tracing::info!("Drifting gratings end at : {:.3} min", current_start_time / 60.0);
    }

    if stimuli.is_empty() {
        tracing::warn!("All stimulus blocks are disabled, the session is empty");
    }

    tracing::info!(
        "Total duration of stimulus sequence: {:.3} min",
        current_start_time / 60.0
    );

    Ok(SessionPlan {
        name: config.session.name.clone(),
        session_id: session_id.to_string(),
        window: config.window_spec(),
        sync: config.sync.clone(),
        pre_blank_sec: config.session.pre_blank_sec.unwrap_or(0.0),
        post_blank_sec: config.session.post_blank_sec.unwrap_or(0.0),
        foraging: config.session.foraging.unwrap_or(true),
        stimuli,
        total_duration: current_start_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::StimulusKind;

    const CONFIG: &str = r#"
[session]
name = "glo-production"
fps = 60.0
n_repeats = 1

[display]
monitor_name = "testMonitor"

[gratings]
spatial_freqs = [0.02, 0.04, 0.08]
orientations = [0.0, 90.0]
phases = [0.0, 90.0]
drift_rates = [12.0, 24.0]

[files]
data_folder = "."
sequences = ["a.txt", "b.txt", "c.txt"]

[output]
output_path = "./output"
"#;

    fn inputs() -> SessionInputs {
        let seq = |name: &str, n: usize| SequenceData {
            name: name.to_string(),
            values: vec![1.0; n],
        };
        SessionInputs {
            sequences: vec![seq("a.txt", 60), seq("b.txt", 120), seq("c.txt", 180)],
            drift_sequence: None,
        }
    }

    #[test]
    fn test_blocks_chain_in_order() {
        let config = SessionConfig::from_toml_str(CONFIG).unwrap();
        let plan = build_session(&config, "test", &inputs()).unwrap();

        let kinds: Vec<StimulusKind> = plan.stimuli.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StimulusKind::Flash,
                StimulusKind::Flash,
                StimulusKind::Flash,
                StimulusKind::StaticGrating,
                StimulusKind::DriftingGrating,
            ]
        );

        // 1s + 2s + 3s 的閃光
        assert!((plan.stimuli[2].end_time() - 6.0).abs() < 1e-9);
        // 靜態：3*2*2*60 = 720 幀
        assert!((plan.stimuli[3].end_time() - 18.0).abs() < 1e-9);
        // 漂移：3*2*(60*2) = 720 幀
        assert!((plan.stimuli[4].end_time() - 30.0).abs() < 1e-9);
        assert!((plan.total_duration - 30.0).abs() < 1e-9);

        for pair in plan.stimuli.windows(2) {
            assert_eq!(pair[0].end_time(), pair[1].display_sequence[0].start);
        }
    }

    #[test]
    fn test_disabled_blocks_are_skipped() {
        let content = CONFIG.replace(
            "[files]",
            "[stimuli]\nadd_flashes = false\nadd_static = false\nadd_drift = true\n\n[files]",
        );
        let config = SessionConfig::from_toml_str(&content).unwrap();
        let plan = build_session(&config, "test", &inputs()).unwrap();

        assert_eq!(plan.stimuli.len(), 1);
        assert_eq!(plan.stimuli[0].display_sequence[0].start, 0.0);
    }

    #[test]
    fn test_time_dilation_repeats_values() {
        let content = CONFIG.replace("n_repeats = 1", "n_repeats = 1\ntime_dilation = 2");
        let config = SessionConfig::from_toml_str(&content).unwrap();
        let plan = build_session(&config, "test", &inputs()).unwrap();

        let colors = &plan.stimuli[0].sweep_params.get("Color").unwrap().values;
        assert_eq!(colors.len(), 120);
        assert!((plan.stimuli[0].end_time() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_sequences_fail() {
        let config = SessionConfig::from_toml_str(CONFIG).unwrap();
        let result = build_session(&config, "test", &SessionInputs::default());
        assert!(matches!(result, Err(StimError::MissingConfigError { .. })));
    }
}
