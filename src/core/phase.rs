//! 漂移光柵的相位累加
//!
//! 每一幀的漂移係數乘上漂移速率後累加成絕對相位（度），
//! 每一步都折回 [0, 360)，最後除以 360 轉成 psychopy 使用的 [0, 1) 相位。

const FULL_CYCLE_DEG: f64 = 360.0;

/// 折回 [0, 360)，負值也會回到正區間
pub fn wrap_degrees(phase: f64) -> f64 {
    let wrapped = phase.rem_euclid(FULL_CYCLE_DEG);
    // rem_euclid 對極小的負數可能捨入成 360.0
    if wrapped >= FULL_CYCLE_DEG {
        0.0
    } else {
        wrapped
    }
}

/// 單一漂移速率的相位軌跡，累加器從 0 開始
pub fn accumulate_phase(coefficients: &[f64], rate: f64) -> Vec<f64> {
    let mut phase = 0.0;
    coefficients
        .iter()
        .map(|coefficient| {
            phase = wrap_degrees(phase + coefficient * rate);
            phase / FULL_CYCLE_DEG
        })
        .collect()
}

/// 多個漂移速率：每個速率各自從 0 累加，結果依速率順序串接
pub fn accumulate_phases(coefficients: &[f64], rates: &[f64]) -> Vec<f64> {
    let mut phases = Vec::with_capacity(coefficients.len() * rates.len());
    for &rate in rates {
        phases.extend(accumulate_phase(coefficients, rate));
    }
    phases
}
