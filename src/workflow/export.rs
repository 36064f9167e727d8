//! 导出选中的题目

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ExportError;
use crate::models::question::GeneratedQuestion;

pub const DEFAULT_EXPORT_FILE_NAME: &str = "test_questions.json";
pub const EXPORT_MIME_TYPE: &str = "application/json";

/// 导出文件内容 `{"questions": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub questions: Vec<GeneratedQuestion>,
}

/// 可供下载或写盘的导出文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// 写入目录，返回文件路径
    pub async fn write_to_dir(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(&self.file_name);
        let write_failed = |source| ExportError::WriteFailed {
            path: path.display().to_string(),
            source,
        };

        tokio::fs::create_dir_all(dir).await.map_err(write_failed)?;
        tokio::fs::write(&path, &self.bytes)
            .await
            .map_err(write_failed)?;

        info!("💾 已导出到: {}", path.display());
        Ok(path)
    }
}

/// 序列化为带缩进的 JSON
pub fn export_questions(questions: Vec<GeneratedQuestion>) -> Result<ExportArtifact, ExportError> {
    if questions.is_empty() {
        return Err(ExportError::NothingSelected);
    }

    let bytes = serde_json::to_vec_pretty(&ExportDocument { questions })?;
    Ok(ExportArtifact {
        file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
        mime_type: EXPORT_MIME_TYPE,
        bytes,
    })
}
