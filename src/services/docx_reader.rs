//! Word (.docx) 文本提取
//!
//! .docx 是 zip 容器，正文在 `word/document.xml` 中。

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("不是有效的 docx 压缩包: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("读取文档正文失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("文档 XML 解析失败: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// 提取 docx 的纯文本，每个段落一行
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, DocxError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;
    document_xml_to_text(&xml)
}

fn document_xml_to_text(xml: &str) -> Result<String, DocxError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => in_text_run = true,
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text_run => {
                let unescaped = e.unescape()?;
                text.push_str(&unescaped);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text.trim().to_string())
}
