//! 内容提取服务 - 业务能力层
//!
//! 把用户上传的原始字节转换为文本或 data URI，不访问网络

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::FileError;
use crate::models::file_info::{RawFile, UploadedFileInfo};
use crate::models::loaders::guess_mime_type;
use crate::services::docx_reader::extract_docx_text;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const DOC_MIME: &str = "application/msword";
const PDF_MIME: &str = "application/pdf";

/// 提取方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    PlainText,
    Docx,
    ImageDataUri,
    PdfDataUri,
    LegacyWord,
    Unsupported,
}

impl Strategy {
    /// 按 MIME 类型和扩展名决定提取方式，优先级固定
    fn detect(file: &RawFile) -> Self {
        let mime = file.mime_type.to_ascii_lowercase();
        let ext = file.extension().unwrap_or_default();

        if mime == "text/plain" || mime == "text/markdown" || ext == "txt" || ext == "md" {
            Strategy::PlainText
        } else if ext == "docx" || mime == DOCX_MIME {
            Strategy::Docx
        } else if mime.starts_with("image/") {
            Strategy::ImageDataUri
        } else if ext == "pdf" || mime == PDF_MIME {
            Strategy::PdfDataUri
        } else if ext == "doc" || mime == DOC_MIME {
            Strategy::LegacyWord
        } else if mime.is_empty() && guess_mime_type(&file.name).is_some_and(|m| m.starts_with("image/")) {
            Strategy::ImageDataUri
        } else {
            Strategy::Unsupported
        }
    }
}

/// 单个文件在批处理中的结果
#[derive(Debug)]
pub enum FileOutcome {
    Processed(UploadedFileInfo),
    Failed { file_name: String, error: FileError },
}

impl FileOutcome {
    pub fn file_name(&self) -> &str {
        match self {
            FileOutcome::Processed(info) => &info.file_name,
            FileOutcome::Failed { file_name, .. } => file_name,
        }
    }
}

/// 批量提取结果
#[derive(Debug, Default)]
pub struct BatchExtraction {
    /// 按输入顺序排列的成功结果
    pub processed: Vec<UploadedFileInfo>,
    /// 按输入顺序累积的失败
    pub errors: Vec<(String, FileError)>,
}

impl BatchExtraction {
    /// 最后一个成功处理的文件
    pub fn last_success(&self) -> Option<&UploadedFileInfo> {
        self.processed.last()
    }

    pub fn total(&self) -> usize {
        self.processed.len() + self.errors.len()
    }
}

/// 内容提取器
///
/// 职责：
/// - 检查大小上限（解码之前）
/// - 按文件类型提取文本或编码为 data URI
/// - 不调用模型
pub struct ContentExtractor {
    max_upload_bytes: u64,
}

impl ContentExtractor {
    pub fn new(max_upload_bytes: u64) -> Self {
        Self { max_upload_bytes }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_upload_bytes)
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// 提取单个文件
    ///
    /// 超过大小上限或格式不支持时返回错误；文本/docx 解码失败时返回附带 `error` 的文件信息。
    pub fn extract(&self, file: &RawFile) -> Result<UploadedFileInfo, FileError> {
        match self.try_extract(file) {
            Err(e @ FileError::ExtractionFailed { .. }) => {
                warn!("文件内容提取失败: {}", e);
                Ok(UploadedFileInfo::with_error(file, e))
            }
            other => other,
        }
    }

    fn try_extract(&self, file: &RawFile) -> Result<UploadedFileInfo, FileError> {
        if file.size > self.max_upload_bytes {
            return Err(FileError::SizeExceeded {
                file_name: file.name.clone(),
                size: file.size,
                limit: self.max_upload_bytes,
            });
        }

        let strategy = Strategy::detect(file);
        debug!("文件 {} 使用提取方式 {:?}", file.name, strategy);

        match strategy {
            Strategy::PlainText => std::str::from_utf8(&file.bytes)
                .map(|text| UploadedFileInfo::with_text(file, text.to_owned()))
                .map_err(|e| {
                    FileError::extraction_failed(&file.name, format!("不是有效的 UTF-8 文本: {}", e))
                }),
            Strategy::Docx => extract_docx_text(&file.bytes)
                .map(|text| UploadedFileInfo::with_text(file, text))
                .map_err(|e| FileError::extraction_failed(&file.name, e)),
            Strategy::ImageDataUri => {
                let mime = effective_mime(file, "image/png");
                Ok(UploadedFileInfo::with_data_uri(file, to_data_uri(&mime, &file.bytes)))
            }
            Strategy::PdfDataUri => Ok(UploadedFileInfo::with_data_uri(
                file,
                to_data_uri(PDF_MIME, &file.bytes),
            )),
            Strategy::LegacyWord | Strategy::Unsupported => Err(FileError::unsupported(
                &file.name,
                effective_mime(file, "unknown"),
            )),
        }
    }

    /// 按顺序提取多个文件，单个文件失败不影响后续文件
    pub fn extract_batch(&self, files: &[RawFile]) -> BatchExtraction {
        self.extract_batch_with(files, |_, _, _| {})
    }

    /// 同 `extract_batch`，每处理完一个文件回调一次 `(序号, 总数, 结果)`
    pub fn extract_batch_with<F>(&self, files: &[RawFile], mut on_file: F) -> BatchExtraction
    where
        F: FnMut(usize, usize, &FileOutcome),
    {
        let total = files.len();
        let mut batch = BatchExtraction::default();

        for (index, file) in files.iter().enumerate() {
            let outcome = match self.try_extract(file) {
                Ok(info) => FileOutcome::Processed(info),
                Err(error) => FileOutcome::Failed {
                    file_name: file.name.clone(),
                    error,
                },
            };

            on_file(index + 1, total, &outcome);

            match outcome {
                FileOutcome::Processed(info) => {
                    info!("[{}/{}] ✓ {}", index + 1, total, info);
                    batch.processed.push(info);
                }
                FileOutcome::Failed { file_name, error } => {
                    warn!("[{}/{}] ❌ {}: {}", index + 1, total, file_name, error);
                    batch.errors.push((file_name, error));
                }
            }
        }

        batch
    }
}

fn effective_mime(file: &RawFile, fallback: &str) -> String {
    if !file.mime_type.is_empty() {
        return file.mime_type.clone();
    }
    guess_mime_type(&file.name).unwrap_or(fallback).to_string()
}

/// 编码为 `data:<mime>;base64,<payload>`
pub fn to_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, BASE64.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::docx_reader::tests::build_docx;

    fn extractor() -> ContentExtractor {
        ContentExtractor::new(5 * 1024 * 1024)
    }

    #[test]
    fn test_plain_text_and_markdown() {
        let txt = RawFile::new("notes.txt", "text/plain", b"The cell.".to_vec());
        let info = extractor().extract(&txt).unwrap();
        assert_eq!(info.text_content.as_deref(), Some("The cell."));
        assert!(info.data_uri.is_none());

        // 浏览器有时不给 .md 提供 MIME 类型
        let md = RawFile::new("README.md", "", "# Заголовок".as_bytes().to_vec());
        let info = extractor().extract(&md).unwrap();
        assert_eq!(info.text_content.as_deref(), Some("# Заголовок"));
    }

    #[test]
    fn test_text_like_inputs_never_fill_both_fields() {
        let docx = build_docx(&["Para"]);
        let files = [
            RawFile::new("a.txt", "text/plain", b"a".to_vec()),
            RawFile::new("b.md", "text/markdown", b"b".to_vec()),
            RawFile::new("c.docx", DOCX_MIME, docx),
            RawFile::new("d.docx", DOCX_MIME, b"broken".to_vec()),
        ];
        for file in &files {
            let info = extractor().extract(file).unwrap();
            assert!(
                !(info.text_content.is_some() && info.data_uri.is_some()),
                "{} has both fields",
                file.name
            );
        }
    }

    #[test]
    fn test_oversize_rejected_before_decode() {
        let mut file = RawFile::new("huge.txt", "text/plain", b"tiny".to_vec());
        file.size = 6 * 1024 * 1024;
        let err = extractor().extract(&file).unwrap_err();
        assert!(matches!(
            err,
            FileError::SizeExceeded { size, limit, .. } if size == 6 * 1024 * 1024 && limit == 5 * 1024 * 1024
        ));
    }

    #[test]
    fn test_docx_success_and_failure() {
        let ok = RawFile::new("lecture.docx", "", build_docx(&["Line one", "Line two"]));
        let info = extractor().extract(&ok).unwrap();
        assert_eq!(info.text_content.as_deref(), Some("Line one\nLine two"));

        let broken = RawFile::new("broken.docx", DOCX_MIME, b"not a zip".to_vec());
        let info = extractor().extract(&broken).unwrap();
        assert!(info.text_content.is_none());
        assert!(info.data_uri.is_none());
        assert!(info.error.unwrap().contains("broken.docx"));
    }

    #[test]
    fn test_image_and_pdf_become_data_uris() {
        let png = RawFile::new("slide.png", "image/png", vec![0x89, b'P', b'N', b'G']);
        let info = extractor().extract(&png).unwrap();
        assert_eq!(info.data_uri.as_deref(), Some("data:image/png;base64,iVBORw=="));
        assert!(info.text_content.is_none());

        let pdf = RawFile::new("handout.pdf", "", b"%PDF".to_vec());
        let info = extractor().extract(&pdf).unwrap();
        assert!(info.data_uri.unwrap().starts_with("data:application/pdf;base64,"));

        let jpg = RawFile::new("photo.JPG", "", vec![1, 2, 3]);
        let info = extractor().extract(&jpg).unwrap();
        assert!(info.data_uri.unwrap().starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_legacy_word_and_unknown_unsupported() {
        let doc = RawFile::new("old.doc", DOC_MIME, vec![0xD0, 0xCF]);
        assert!(matches!(
            extractor().extract(&doc),
            Err(FileError::UnsupportedFormat { .. })
        ));

        let zip = RawFile::new("archive.zip", "application/zip", vec![]);
        assert!(matches!(
            extractor().extract(&zip),
            Err(FileError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_invalid_utf8_attaches_error() {
        let file = RawFile::new("bad.txt", "text/plain", vec![0xff, 0xfe, 0xfd]);
        let info = extractor().extract(&file).unwrap();
        assert!(info.text_content.is_none());
        assert!(info.error.is_some());
    }

    #[test]
    fn test_batch_continues_after_failures() {
        let files = vec![
            RawFile::new("first.txt", "text/plain", b"one".to_vec()),
            RawFile::new("old.doc", DOC_MIME, vec![1]),
            RawFile::new("broken.docx", DOCX_MIME, b"nope".to_vec()),
            RawFile::new("last.md", "text/markdown", b"two".to_vec()),
        ];

        let mut progress = Vec::new();
        let batch = extractor().extract_batch_with(&files, |i, total, outcome| {
            progress.push((i, total, outcome.file_name().to_string()));
        });

        assert_eq!(batch.total(), 4);
        assert_eq!(batch.processed.len(), 2);
        assert_eq!(
            batch.errors.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
            vec!["old.doc", "broken.docx"]
        );
        assert!(matches!(batch.errors[1].1, FileError::ExtractionFailed { .. }));
        assert_eq!(batch.last_success().unwrap().file_name, "last.md");
        assert_eq!(progress.len(), 4);
        assert_eq!(progress[3], (4, 4, "last.md".to_string()));
    }
}
