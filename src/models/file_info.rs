use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::analysis::LectureContentItem;

/// 用户选择的原始文件
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    /// 声明的 MIME 类型，可能为空
    pub mime_type: String,
    pub bytes: Vec<u8>,
    /// 声明的大小（字节），在解码前用于大小检查
    pub size: u64,
}

impl RawFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        let size = bytes.len() as u64;
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
            size,
        }
    }

    /// 小写的扩展名（不含点）
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.name.rsplit_once('.')?;
        Some(ext.to_ascii_lowercase())
    }
}

/// 发送给模型的内容类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
    Pdf,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Image => "image",
            ContentKind::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 提取后的文件信息
///
/// `text_content`、`data_uri`、仅 `error` 三者只会出现一种。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFileInfo {
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadedFileInfo {
    fn empty(file: &RawFile) -> Self {
        Self {
            file_name: file.name.clone(),
            file_type: file.mime_type.clone(),
            file_size: file.size,
            text_content: None,
            data_uri: None,
            error: None,
        }
    }

    pub fn with_text(file: &RawFile, text: String) -> Self {
        Self {
            text_content: Some(text),
            ..Self::empty(file)
        }
    }

    pub fn with_data_uri(file: &RawFile, data_uri: String) -> Self {
        Self {
            data_uri: Some(data_uri),
            ..Self::empty(file)
        }
    }

    pub fn with_error(file: &RawFile, error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::empty(file)
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn content_kind(&self) -> Option<ContentKind> {
        if self.error.is_some() {
            return None;
        }
        if self.text_content.is_some() {
            return Some(ContentKind::Text);
        }
        match &self.data_uri {
            Some(uri) if uri.starts_with("data:application/pdf") => Some(ContentKind::Pdf),
            Some(_) => Some(ContentKind::Image),
            None => None,
        }
    }

    /// 转换为分析请求中的内容项；出错的文件返回 `None`
    pub fn to_content_item(&self) -> Option<LectureContentItem> {
        let content_type = self.content_kind()?;
        Some(LectureContentItem {
            file_name: self.file_name.clone(),
            content_type,
            raw_text_content: self.text_content.clone(),
            content_data_uri: self.data_uri.clone(),
        })
    }

    pub fn size_kb(&self) -> f64 {
        self.file_size as f64 / 1024.0
    }
}

impl fmt::Display for UploadedFileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2} KB)", self.file_name, self.size_kb())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased() {
        let file = RawFile::new("Lecture.DOCX", "", vec![]);
        assert_eq!(file.extension().as_deref(), Some("docx"));
        assert_eq!(RawFile::new("README", "", vec![]).extension(), None);
    }

    #[test]
    fn test_content_kind_and_item() {
        let file = RawFile::new("slides.pdf", "application/pdf", vec![1, 2, 3]);
        let info = UploadedFileInfo::with_data_uri(&file, "data:application/pdf;base64,AQID".into());
        assert_eq!(info.content_kind(), Some(ContentKind::Pdf));
        let item = info.to_content_item().unwrap();
        assert_eq!(item.content_type, ContentKind::Pdf);
        assert!(item.raw_text_content.is_none());

        let failed = UploadedFileInfo::with_error(&file, "broken");
        assert_eq!(failed.content_kind(), None);
        assert!(failed.to_content_item().is_none());
    }

    #[test]
    fn test_display_shows_kilobytes() {
        let file = RawFile::new("notes.txt", "text/plain", vec![b'a'; 2048]);
        let info = UploadedFileInfo::with_text(&file, "a".repeat(2048));
        assert_eq!(info.to_string(), "notes.txt (2.00 KB)");
    }
}
