use serde::{Deserialize, Serialize};

use crate::models::file_info::ContentKind;

/// 分析请求中的一个内容项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureContentItem {
    pub file_name: String,
    pub content_type: ContentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_data_uri: Option<String>,
}

impl LectureContentItem {
    pub fn text(file_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: ContentKind::Text,
            raw_text_content: Some(text.into()),
            content_data_uri: None,
        }
    }

    pub fn media(
        file_name: impl Into<String>,
        content_type: ContentKind,
        data_uri: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            raw_text_content: None,
            content_data_uri: Some(data_uri.into()),
        }
    }
}

/// 讲义分析结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureAnalysisResult {
    #[serde(default)]
    pub key_concepts: Vec<String>,
    #[serde(default)]
    pub themes: Vec<String>,
    pub summary: String,
}

impl LectureAnalysisResult {
    /// 生成题目时作为讲义内容发送的文本
    pub fn generation_context(&self) -> String {
        let mut context = self.summary.trim().to_string();
        if !self.key_concepts.is_empty() {
            context.push_str(&format!("\n\nKey concepts: {}", self.key_concepts.join(", ")));
        }
        if !self.themes.is_empty() {
            context.push_str(&format!("\nThemes: {}", self.themes.join(", ")));
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_themes_default_when_missing() {
        let result: LectureAnalysisResult =
            serde_json::from_str(r#"{"keyConcepts": ["ATP"], "summary": "Energy."}"#).unwrap();
        assert!(result.themes.is_empty());
        assert_eq!(result.generation_context(), "Energy.\n\nKey concepts: ATP");
    }

    #[test]
    fn test_content_item_wire_names() {
        let item = LectureContentItem::media("slide.png", ContentKind::Image, "data:image/png;base64,AA");
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["contentType"], "image");
        assert_eq!(value["contentDataUri"], "data:image/png;base64,AA");
        assert!(value.get("rawTextContent").is_none());
    }
}
