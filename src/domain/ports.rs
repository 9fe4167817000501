use crate::domain::model::{SequenceData, SessionInputs, SessionPlan};
use crate::utils::error::Result;

pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider {
    fn data_folder(&self) -> &str;
    fn output_path(&self) -> &str;
}

/// 以名稱取得一組序列參數（通常是資料夾中的一個 .txt 檔）
pub trait SequenceSource {
    fn load_sequence(&self, name: &str) -> Result<SequenceData>;
}

/// 外部刺激播放器的交接點；回傳交接後的位置描述
pub trait StimulusRunner {
    fn run(&self, plan: &SessionPlan) -> Result<String>;
}

pub trait SessionPipeline {
    fn extract(&self) -> Result<SessionInputs>;
    fn transform(&self, inputs: SessionInputs) -> Result<SessionPlan>;
    fn load(&self, plan: SessionPlan) -> Result<String>;
}
