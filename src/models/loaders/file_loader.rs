use crate::error::FileError;
use crate::models::file_info::RawFile;
use phf::phf_map;
use std::path::Path;
use tokio::fs;

/// 扩展名到 MIME 类型的映射（浏览器未提供类型时使用）
static MIME_BY_EXTENSION: phf::Map<&'static str, &'static str> = phf_map! {
    "txt" => "text/plain",
    "md" => "text/markdown",
    "markdown" => "text/markdown",
    "pdf" => "application/pdf",
    "doc" => "application/msword",
    "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "png" => "image/png",
    "jpg" => "image/jpeg",
    "jpeg" => "image/jpeg",
    "gif" => "image/gif",
    "webp" => "image/webp",
    "bmp" => "image/bmp",
    "svg" => "image/svg+xml",
};

/// 根据文件名推断 MIME 类型，未知扩展名返回 `None`
pub fn guess_mime_type(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    MIME_BY_EXTENSION
        .get(ext.to_ascii_lowercase().as_str())
        .copied()
}

/// 从磁盘读取文件为 `RawFile`
///
/// 文件大小超过 `max_upload_bytes` 时不读取内容，只返回声明的大小，
/// 由提取器在解码前拒绝。
pub async fn load_raw_file(path: &Path, max_upload_bytes: u64) -> Result<RawFile, FileError> {
    let display = path.display().to_string();
    let read_failed = |source| FileError::ReadFailed {
        path: display.clone(),
        source,
    };

    let metadata = fs::metadata(path).await.map_err(read_failed)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| display.clone());
    let mime_type = guess_mime_type(&name).unwrap_or_default().to_string();

    let bytes = if metadata.len() > max_upload_bytes {
        tracing::warn!("文件 {} 超过大小上限，跳过读取", name);
        Vec::new()
    } else {
        fs::read(path).await.map_err(read_failed)?
    };

    Ok(RawFile {
        name,
        mime_type,
        bytes,
        size: metadata.len(),
    })
}

/// 按顺序读取多个文件，读取失败的文件单独记录，不影响其余文件
pub async fn load_raw_files(
    paths: &[impl AsRef<Path>],
    max_upload_bytes: u64,
) -> (Vec<RawFile>, Vec<FileError>) {
    let mut files = Vec::new();
    let mut errors = Vec::new();

    for path in paths {
        let path = path.as_ref();
        tracing::info!("正在加载: {}", path.display());

        match load_raw_file(path, max_upload_bytes).await {
            Ok(file) => {
                tracing::debug!("成功加载 {} ({} 字节)", file.name, file.size);
                files.push(file);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
                errors.push(e);
            }
        }
    }

    (files, errors)
}
