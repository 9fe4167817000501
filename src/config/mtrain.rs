use crate::utils::error::{Result, StimError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// mtrain 傳入的 JSON 參數檔；只用得到資料夾與螢幕名稱，其他欄位保留不處理
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MtrainParams {
    pub data_folder: Option<String>,
    pub monitor_name: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl MtrainParams {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| StimError::ConfigValidationError {
            field: "mtrain_params".to_string(),
            message: format!("JSON parsing error: {}", e),
        })
    }

    /// 沒有參數檔時使用本地預設值，正式錄製時不應發生
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path.filter(|p| !p.is_empty()) {
            Some(path) => {
                let params = Self::from_file(path)?;
                tracing::info!("Loaded json parameters from mtrain");
                Ok(params)
            }
            None => {
                tracing::warn!(
                    "No json path provided, using default parameters. THIS IS NOT THE EXPECTED BEHAVIOR FOR PRODUCTION RUNS"
                );
                Ok(Self::default())
            }
        }
    }
}
