use crate::core::phase::{accumulate_phases, wrap_degrees};
use crate::domain::model::{
    DisplayWindow, GratingSet, GratingSpec, GratingTexture, SequenceData, StimulusDescriptor,
    StimulusKind, SweepParams,
};
use crate::utils::error::{Result, StimError};

/// 所有 builder 共用的播放設定
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub fps: f64,
    pub n_repeats: usize,
}

impl Timing {
    pub fn new(fps: f64, n_repeats: usize) -> Result<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(StimError::StimulusError {
                message: format!("Frame rate must be positive, got {}", fps),
            });
        }
        if n_repeats == 0 {
            return Err(StimError::StimulusError {
                message: "Repeat count must be at least 1".to_string(),
            });
        }
        Ok(Self { fps, n_repeats })
    }

    /// 每一幀就是一個 sweep
    pub fn sweep_length(&self) -> f64 {
        1.0 / self.fps
    }

    fn duration(&self, conditions: usize) -> f64 {
        (conditions * self.n_repeats) as f64 / self.fps
    }
}

fn require_non_empty(field: &str, values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(StimError::StimulusError {
            message: format!("'{}' cannot be empty", field),
        });
    }
    Ok(())
}

fn descriptor(
    name: &str,
    kind: StimulusKind,
    grating: GratingSpec,
    sweep_params: SweepParams,
    timing: &Timing,
    current_start: f64,
) -> (StimulusDescriptor, f64) {
    let conditions = sweep_params.condition_count();
    let end = current_start + timing.duration(conditions);

    tracing::debug!(
        "{}: {} conditions x {} runs, {:.3}s -> {:.3}s",
        name,
        conditions,
        timing.n_repeats,
        current_start,
        end
    );

    let stimulus = StimulusDescriptor {
        name: name.to_string(),
        kind,
        grating,
        sweep_params,
        sweep_length: timing.sweep_length(),
        start_time: 0.0,
        blank_length: 0.0,
        blank_sweeps: 0,
        runs: timing.n_repeats,
        shuffle: false,
        save_sweep_table: true,
        display_sequence: vec![DisplayWindow::new(current_start, end)],
    };

    (stimulus, end)
}

/// 全視野閃光：sf=0 的光柵，每一幀依序列更新顏色
pub fn create_flashes(
    name: &str,
    sequence: &SequenceData,
    timing: &Timing,
    current_start: f64,
) -> Result<(StimulusDescriptor, f64)> {
    require_non_empty(&sequence.name, &sequence.values)?;

    let sweep_params = SweepParams::new()
        .with("Contrast", vec![1.0], 0)
        .with("Color", sequence.values.clone(), 1);

    Ok(descriptor(
        name,
        StimulusKind::Flash,
        GratingSpec::full_field(GratingTexture::None, 0.0),
        sweep_params,
        timing,
        current_start,
    ))
}

/// 靜態正弦光柵：固定 sf/ori/phase 的組合下，每一幀依序列更新對比
///
/// 相位以度數設定，會折回 [0, 360) 後換算成 [0, 1)。
pub fn create_static(
    name: &str,
    sequence: &SequenceData,
    gratings: &GratingSet,
    timing: &Timing,
    current_start: f64,
) -> Result<(StimulusDescriptor, f64)> {
    require_non_empty(&sequence.name, &sequence.values)?;
    require_non_empty("spatial_freqs", &gratings.spatial_freqs)?;
    require_non_empty("orientations", &gratings.orientations)?;
    require_non_empty("phases", &gratings.phases)?;

    let phases = gratings
        .phases
        .iter()
        .map(|&p| wrap_degrees(p) / 360.0)
        .collect();

    let sweep_params = SweepParams::new()
        .with("SF", gratings.spatial_freqs.clone(), 0)
        .with("Ori", gratings.orientations.clone(), 1)
        .with("Phase", phases, 2)
        .with("Contrast", sequence.values.clone(), 3);

    tracing::info!(
        "Number of conditions for static gratings: {}",
        sweep_params.condition_count()
    );

    Ok(descriptor(
        name,
        StimulusKind::StaticGrating,
        GratingSpec::full_field(GratingTexture::Sin, 0.1),
        sweep_params,
        timing,
        current_start,
    ))
}

/// 漂移方波光柵
///
/// 序列值在 -1..1 之間，代表每一幀的漂移方向與速度；每個漂移速率（度/秒）
/// 先換算成度/幀，再各自累加出一段相位軌跡。
pub fn create_drift(
    name: &str,
    drift_sequence: &SequenceData,
    gratings: &GratingSet,
    timing: &Timing,
    current_start: f64,
) -> Result<(StimulusDescriptor, f64)> {
    require_non_empty(&drift_sequence.name, &drift_sequence.values)?;
    require_non_empty("spatial_freqs", &gratings.spatial_freqs)?;
    require_non_empty("orientations", &gratings.orientations)?;
    require_non_empty("drift_rates", &gratings.drift_rates)?;

    let per_frame_rates: Vec<f64> = gratings
        .drift_rates
        .iter()
        .map(|rate| rate / timing.fps)
        .collect();
    let phases = accumulate_phases(&drift_sequence.values, &per_frame_rates);

    let sweep_params = SweepParams::new()
        .with("Contrast", vec![1.0], 0)
        .with("SF", gratings.spatial_freqs.clone(), 1)
        .with("Ori", gratings.orientations.clone(), 2)
        .with("Phase", phases, 3);

    tracing::info!(
        "Number of conditions for drifting gratings: {}",
        sweep_params.condition_count()
    );

    Ok(descriptor(
        name,
        StimulusKind::DriftingGrating,
        GratingSpec::full_field(GratingTexture::Sqr, 0.1),
        sweep_params,
        timing,
        current_start,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(values: Vec<f64>) -> SequenceData {
        SequenceData {
            name: "RepeatStim1.txt".to_string(),
            values,
        }
    }

    fn gratings() -> GratingSet {
        GratingSet {
            spatial_freqs: vec![0.02, 0.04, 0.08],
            orientations: vec![0.0, 90.0],
            phases: vec![0.0, 90.0],
            drift_rates: vec![12.0, 24.0],
        }
    }

    #[test]
    fn test_timing_rejects_bad_values() {
        assert!(Timing::new(0.0, 1).is_err());
        assert!(Timing::new(60.0, 0).is_err());
        assert!(Timing::new(60.0, 1).is_ok());
    }

    #[test]
    fn test_flashes_duration_and_window() {
        let timing = Timing::new(60.0, 2).unwrap();
        let seq = sequence(vec![1.0; 120]);

        let (stim, end) = create_flashes("flash_1", &seq, &timing, 10.0).unwrap();

        assert_eq!(stim.kind, StimulusKind::Flash);
        assert_eq!(stim.grating.sf, 0.0);
        assert_eq!(stim.runs, 2);
        assert!((stim.sweep_length - 1.0 / 60.0).abs() < 1e-12);
        assert!((end - 14.0).abs() < 1e-9);
        assert_eq!(stim.display_sequence, vec![DisplayWindow::new(10.0, end)]);
        assert_eq!(stim.sweep_params.get("Color").unwrap().values.len(), 120);
    }

    #[test]
    fn test_static_conditions() {
        let timing = Timing::new(60.0, 1).unwrap();
        let seq = sequence(vec![0.5; 10]);

        let (stim, end) = create_static("static", &seq, &gratings(), &timing, 0.0).unwrap();

        assert_eq!(stim.condition_count(), 3 * 2 * 2 * 10);
        assert!((end - 120.0 / 60.0).abs() < 1e-9);
        assert_eq!(stim.grating.texture, GratingTexture::Sin);
        assert_eq!(stim.sweep_params.get("Phase").unwrap().values, vec![0.0, 0.25]);
    }

    #[test]
    fn test_drift_phases_per_rate() {
        let timing = Timing::new(60.0, 1).unwrap();
        let seq = sequence(vec![1.0, 1.0, 1.0]);

        let (stim, end) = create_drift("drift", &seq, &gratings(), &timing, 5.0).unwrap();

        let phases = &stim.sweep_params.get("Phase").unwrap().values;
        assert_eq!(phases.len(), 6);
        // 12 度/秒 / 60fps = 0.2 度/幀
        assert!((phases[0] - 0.2 / 360.0).abs() < 1e-12);
        // 第二個速率重新從 0 開始
        assert!((phases[3] - 0.4 / 360.0).abs() < 1e-12);

        assert_eq!(stim.condition_count(), 3 * 2 * 6);
        assert!((end - (5.0 + 36.0 / 60.0)).abs() < 1e-9);
        assert_eq!(stim.grating.texture, GratingTexture::Sqr);
    }

    #[test]
    fn test_empty_lists_rejected() {
        let timing = Timing::new(60.0, 1).unwrap();
        let seq = sequence(vec![1.0]);
        let mut set = gratings();
        set.drift_rates.clear();

        assert!(create_drift("drift", &seq, &set, &timing, 0.0).is_err());
        assert!(create_flashes("flash", &sequence(vec![]), &timing, 0.0).is_err());
    }
}
