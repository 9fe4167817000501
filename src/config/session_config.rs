use crate::config::mtrain::MtrainParams;
use crate::core::ConfigProvider;
use crate::domain::model::{GratingSet, MonitorSpec, SyncSpec, WindowSpec, Warp};
use crate::utils::error::{Result, StimError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const TEST_MONITOR: &str = "testMonitor";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub session: SessionInfo,
    pub display: DisplayConfig,
    #[serde(default)]
    pub sync: SyncSpec,
    #[serde(default)]
    pub stimuli: StimuliConfig,
    #[serde(default)]
    pub gratings: GratingSet,
    pub files: FilesConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub name: String,
    pub fps: f64,
    pub test_mode: Option<bool>,
    pub n_repeats: Option<usize>,
    pub max_repeats: Option<usize>,
    /// 分鐘
    pub session_duration: Option<f64>,
    pub time_dilation: Option<usize>,
    pub pre_blank_sec: Option<f64>,
    pub post_blank_sec: Option<f64>,
    pub foraging: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub monitor_name: String,
    pub distance_cm: Option<f64>,
    pub width_cm: Option<f64>,
    pub fullscreen: Option<bool>,
    pub screen: Option<u32>,
    pub warp: Option<Warp>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StimuliConfig {
    pub add_flashes: bool,
    pub add_static: bool,
    pub add_drift: bool,
}

impl Default for StimuliConfig {
    fn default() -> Self {
        Self {
            add_flashes: true,
            add_static: true,
            add_drift: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    pub data_folder: String,
    /// 依序播放閃光；第一個檔案同時是靜態光柵的對比序列
    pub sequences: Vec<String>,
    /// 未設定時使用 `sequences` 的第一個檔案
    pub drift_sequence: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub output_path: String,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: String,
}

/// 重複次數的決定方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepeatPolicy {
    pub test_mode: bool,
    pub n_repeats: Option<usize>,
    pub max_repeats: usize,
    pub session_duration: f64,
    pub time_dilation: usize,
}

impl RepeatPolicy {
    /// 明確的 `n_repeats` 優先；測試模式只跑一次；
    /// 否則依 session 長度換算，基準是 120 分鐘跑滿 `max_repeats` 次
    pub fn resolve(&self) -> usize {
        if let Some(n) = self.n_repeats {
            return n;
        }
        if self.test_mode {
            return 1;
        }
        let scaled =
            self.max_repeats as f64 * self.session_duration / (120.0 * self.time_dilation as f64);
        (scaled.round() as usize).max(1)
    }
}

impl SessionConfig {
    /// 從 TOML 檔案載入設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(StimError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析設定
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| StimError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${STIM_DATA})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| StimError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// mtrain 提供的參數覆蓋本地設定
    pub fn apply_mtrain(&mut self, params: &MtrainParams) {
        if let Some(folder) = &params.data_folder {
            tracing::info!("Using data folder from mtrain: {}", folder);
            self.files.data_folder = folder.clone();
        }
        if let Some(monitor) = &params.monitor_name {
            tracing::info!("Using monitor from mtrain: {}", monitor);
            self.display.monitor_name = monitor.clone();
        }
    }

    /// 沒寫 `test_mode` 時當作測試模式（只跑一次），並提醒一聲
    pub fn test_mode(&self) -> bool {
        match self.session.test_mode {
            Some(test_mode) => test_mode,
            None => {
                tracing::warn!(
                    "⚠️ session.test_mode not set, defaulting to test mode (1 repeat); set test_mode = false for a full session"
                );
                true
            }
        }
    }

    pub fn repeat_policy(&self) -> RepeatPolicy {
        RepeatPolicy {
            test_mode: self.test_mode(),
            n_repeats: self.session.n_repeats,
            max_repeats: self.session.max_repeats.unwrap_or(32),
            session_duration: self.session.session_duration.unwrap_or(120.0),
            time_dilation: self.time_dilation(),
        }
    }

    pub fn time_dilation(&self) -> usize {
        self.session.time_dilation.unwrap_or(1)
    }

    /// 用 `testMonitor` 時建立自訂螢幕，其他名稱視為已校正的 profile
    pub fn window_spec(&self) -> WindowSpec {
        let monitor = if self.display.monitor_name == TEST_MONITOR {
            MonitorSpec::Custom {
                name: self.display.monitor_name.clone(),
                distance_cm: self.display.distance_cm.unwrap_or(15.0),
                width_cm: self.display.width_cm.unwrap_or(52.0),
            }
        } else {
            MonitorSpec::Calibrated {
                name: self.display.monitor_name.clone(),
            }
        };

        WindowSpec {
            fullscreen: self.display.fullscreen.unwrap_or(true),
            screen: self.display.screen.unwrap_or(0),
            warp: self.display.warp.unwrap_or_default(),
            monitor,
        }
    }

    pub fn drift_sequence_name(&self) -> Option<&str> {
        self.files
            .drift_sequence
            .as_deref()
            .or_else(|| self.files.sequences.first().map(String::as_str))
    }

    pub fn compression(&self) -> Option<&CompressionConfig> {
        self.output.compression.as_ref().filter(|c| c.enabled)
    }

    /// 驗證設定的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("session.name", &self.session.name)?;
        validation::validate_positive_float("session.fps", self.session.fps)?;

        if let Some(n) = self.session.n_repeats {
            validation::validate_positive_number("session.n_repeats", n, 1)?;
        }
        if let Some(max) = self.session.max_repeats {
            validation::validate_positive_number("session.max_repeats", max, 1)?;
        }
        if let Some(duration) = self.session.session_duration {
            validation::validate_positive_float("session.session_duration", duration)?;
        }
        validation::validate_positive_number("session.time_dilation", self.time_dilation(), 1)?;

        validation::validate_non_empty_string("display.monitor_name", &self.display.monitor_name)?;
        if let Some(distance) = self.display.distance_cm {
            validation::validate_positive_float("display.distance_cm", distance)?;
        }
        if let Some(width) = self.display.width_cm {
            validation::validate_positive_float("display.width_cm", width)?;
        }

        validation::validate_range(
            "sync.trigger_delay_sec",
            self.sync.trigger_delay_sec,
            0.0,
            60.0,
        )?;

        validation::validate_path("files.data_folder", &self.files.data_folder)?;
        for name in &self.files.sequences {
            validation::validate_path("files.sequences", name)?;
        }

        if self.stimuli.add_flashes || self.stimuli.add_static {
            let first = self.files.sequences.first();
            validation::validate_required_field("files.sequences", &first)?;
        }

        if self.stimuli.add_static || self.stimuli.add_drift {
            validation::validate_finite_list("gratings.spatial_freqs", &self.gratings.spatial_freqs)?;
            validation::validate_finite_list("gratings.orientations", &self.gratings.orientations)?;
        }
        if self.stimuli.add_static {
            validation::validate_finite_list("gratings.phases", &self.gratings.phases)?;
        }
        if self.stimuli.add_drift {
            validation::validate_finite_list("gratings.drift_rates", &self.gratings.drift_rates)?;
            let drift = self.drift_sequence_name();
            validation::validate_required_field("files.drift_sequence", &drift)?;
        }

        validation::validate_path("output.output_path", &self.output.output_path)?;
        if let Some(compression) = self.compression() {
            validation::validate_path("output.compression.filename", &compression.filename)?;
        }

        Ok(())
    }
}

impl ConfigProvider for SessionConfig {
    fn data_folder(&self) -> &str {
        &self.files.data_folder
    }

    fn output_path(&self) -> &str {
        &self.output.output_path
    }
}

impl Validate for SessionConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
