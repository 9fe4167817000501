use crate::config::session_config::CompressionConfig;
use crate::core::sweep_table;
use crate::core::{SessionPlan, Storage, StimulusRunner};
use crate::utils::error::Result;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const PLAN_FILENAME: &str = "session_plan.json";

pub fn sweep_table_filename(stimulus_name: &str) -> String {
    format!("{}_sweep_table.csv", stimulus_name)
}

/// 把 session plan 與 sweep tables 寫成一包檔案，交給外部播放器讀取
pub struct BundleRunner<S: Storage> {
    storage: S,
    output_path: String,
    compression: Option<CompressionConfig>,
}

impl<S: Storage> BundleRunner<S> {
    pub fn new(storage: S, output_path: String) -> Self {
        Self {
            storage,
            output_path,
            compression: None,
        }
    }

    pub fn with_compression(mut self, compression: Option<CompressionConfig>) -> Self {
        self.compression = compression.filter(|c| c.enabled);
        self
    }

    fn bundle_files(&self, plan: &SessionPlan) -> Result<Vec<(String, Vec<u8>)>> {
        let mut files = vec![(
            PLAN_FILENAME.to_string(),
            serde_json::to_vec_pretty(plan)?,
        )];

        for stimulus in plan.stimuli.iter().filter(|s| s.save_sweep_table) {
            let table = sweep_table::to_csv(&stimulus.sweep_params)?;
            tracing::debug!(
                "Sweep table for {}: {} sweeps",
                stimulus.name,
                stimulus.condition_count()
            );
            files.push((sweep_table_filename(&stimulus.name), table));
        }

        Ok(files)
    }

    fn zip_files(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        for (name, data) in files {
            zip.start_file(name.as_str(), SimpleFileOptions::default())?;
            zip.write_all(data)?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl<S: Storage> StimulusRunner for BundleRunner<S> {
    fn run(&self, plan: &SessionPlan) -> Result<String> {
        let files = self.bundle_files(plan)?;

        for (name, data) in &files {
            self.storage.write_file(name, data)?;
        }
        tracing::info!("💾 Wrote {} file(s) for session {}", files.len(), plan.session_id);

        if let Some(compression) = &self.compression {
            let zip_data = Self::zip_files(&files)?;
            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(&compression.filename, &zip_data)?;
            return Ok(format!("{}/{}", self.output_path, compression.filename));
        }

        Ok(format!("{}/{}", self.output_path, PLAN_FILENAME))
    }
}
