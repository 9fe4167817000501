use serde::{Deserialize, Serialize};

/// 一個 sweep 軸，例如空間頻率或方位角
///
/// `order` 決定巢狀迴圈的位置：0 是最外層。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepParam {
    pub name: String,
    pub values: Vec<f64>,
    pub order: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SweepParams {
    params: Vec<SweepParam>,
}

impl SweepParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一個 sweep 軸；同名的軸會被取代，並維持依 `order` 排序
    pub fn with(mut self, name: &str, values: Vec<f64>, order: usize) -> Self {
        self.params.retain(|p| p.name != name);
        self.params.push(SweepParam {
            name: name.to_string(),
            values,
            order,
        });
        self.params.sort_by_key(|p| p.order);
        self
    }

    pub fn get(&self, name: &str) -> Option<&SweepParam> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SweepParam> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// 所有軸長度的乘積，即 runner 會播放的 sweep 數
    pub fn condition_count(&self) -> usize {
        if self.params.is_empty() {
            return 0;
        }
        self.params.iter().map(|p| p.values.len()).product()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GratingTexture {
    Sin,
    Sqr,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GratingSpec {
    pub texture: GratingTexture,
    pub pos: (f64, f64),
    pub units: String,
    pub size_deg: (f64, f64),
    pub mask: String,
    pub tex_res: u32,
    pub sf: f64,
}

impl GratingSpec {
    pub fn full_field(texture: GratingTexture, sf: f64) -> Self {
        Self {
            texture,
            pos: (0.0, 0.0),
            units: "deg".to_string(),
            size_deg: (250.0, 250.0),
            mask: "None".to_string(),
            tex_res: 256,
            sf,
        }
    }
}

/// session 時間軸上的一段播放區間（秒）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayWindow {
    pub start: f64,
    pub end: f64,
}

impl DisplayWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StimulusKind {
    Flash,
    StaticGrating,
    DriftingGrating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StimulusDescriptor {
    pub name: String,
    pub kind: StimulusKind,
    pub grating: GratingSpec,
    pub sweep_params: SweepParams,
    pub sweep_length: f64,
    pub start_time: f64,
    pub blank_length: f64,
    pub blank_sweeps: usize,
    pub runs: usize,
    pub shuffle: bool,
    pub save_sweep_table: bool,
    pub display_sequence: Vec<DisplayWindow>,
}

impl StimulusDescriptor {
    pub fn condition_count(&self) -> usize {
        self.sweep_params.condition_count()
    }

    pub fn end_time(&self) -> f64 {
        self.display_sequence
            .iter()
            .map(|w| w.end)
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitorSpec {
    Custom {
        name: String,
        distance_cm: f64,
        width_cm: f64,
    },
    /// 已由 MPE 校正過 gamma 的 profile，只傳名稱
    Calibrated { name: String },
}

impl MonitorSpec {
    pub fn name(&self) -> &str {
        match self {
            MonitorSpec::Custom { name, .. } | MonitorSpec::Calibrated { name } => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Warp {
    #[default]
    Spherical,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub fullscreen: bool,
    pub screen: u32,
    pub warp: Warp,
    pub monitor: MonitorSpec,
}

/// 同步脈衝、sync square 與眼動儀設定，原樣交給 runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSpec {
    pub syncpulse: bool,
    pub syncpulseport: u32,
    pub syncpulselines: Vec<u32>,
    pub trigger_delay_sec: f64,
    pub bgcolor: (f64, f64, f64),
    pub eyetracker: bool,
    pub eyetrackerip: String,
    pub eyetrackerport: u32,
    pub syncsqr: bool,
    pub syncsqrloc: (f64, f64),
    pub syncsqrfreq: u32,
    pub syncsqrsize: (f64, f64),
    pub showmouse: bool,
}

impl Default for SyncSpec {
    fn default() -> Self {
        Self {
            syncpulse: true,
            syncpulseport: 1,
            syncpulselines: vec![4, 7],
            trigger_delay_sec: 0.0,
            bgcolor: (-1.0, -1.0, -1.0),
            eyetracker: false,
            eyetrackerip: String::new(),
            eyetrackerport: 1000,
            syncsqr: true,
            syncsqrloc: (0.0, 0.0),
            syncsqrfreq: 60,
            syncsqrsize: (100.0, 100.0),
            showmouse: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPlan {
    pub name: String,
    pub session_id: String,
    pub window: WindowSpec,
    pub sync: SyncSpec,
    pub pre_blank_sec: f64,
    pub post_blank_sec: f64,
    pub foraging: bool,
    pub stimuli: Vec<StimulusDescriptor>,
    pub total_duration: f64,
}

/// 光柵的 sweep 軸設定；漂移速率單位是每秒的度數
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GratingSet {
    pub spatial_freqs: Vec<f64>,
    pub orientations: Vec<f64>,
    pub phases: Vec<f64>,
    pub drift_rates: Vec<f64>,
}

/// 從序列檔讀出的參數向量
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceData {
    pub name: String,
    pub values: Vec<f64>,
}

/// extract 階段的產出：依設定順序讀入的所有序列
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionInputs {
    pub sequences: Vec<SequenceData>,
    pub drift_sequence: Option<SequenceData>,
}
