//! 内容分析服务 - 业务能力层
//!
//! 只负责"讲义 → 关键概念 / 主题 / 摘要"这一能力，不关心流程

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::AnalysisError;
use crate::infrastructure::{ChatModel, ChatPrompt, MediaPart};
use crate::models::analysis::{LectureAnalysisResult, LectureContentItem};
use crate::models::file_info::ContentKind;
use crate::services::response_parser::extract_json_object;

const SYSTEM_MESSAGE: &str = "You are an expert in analyzing lecture materials and synthesizing information. \
Ensure that all outputs (key concepts, themes, and summary) are in the same language as the predominant \
language of the input content. If multiple languages are present, use the language of the first content item. \
Reply with a single JSON object and nothing else.";

/// 内容分析客户端
///
/// 职责：
/// - 调用模型之前检查每个内容项是否完整
/// - 把所有内容项放进同一个请求，让模型综合分析
/// - 解析 `{keyConcepts, themes, summary}`
/// - 不重试
pub struct AnalysisClient<M: ChatModel> {
    model: Arc<M>,
}

impl<M: ChatModel> AnalysisClient<M> {
    pub fn new(model: Arc<M>) -> Self {
        Self { model }
    }

    /// 分析单个内容项
    pub async fn analyze_single(
        &self,
        item: &LectureContentItem,
    ) -> Result<LectureAnalysisResult, AnalysisError> {
        self.analyze(std::slice::from_ref(item)).await
    }

    /// 综合分析多个内容项
    pub async fn analyze(
        &self,
        items: &[LectureContentItem],
    ) -> Result<LectureAnalysisResult, AnalysisError> {
        validate_items(items)?;

        info!(
            "🔍 正在分析 {} 个文件，模型: {}",
            items.len(),
            self.model.model_name()
        );

        let prompt = build_prompt(items);
        let response = self
            .model
            .complete(&prompt)
            .await
            .map_err(|e| AnalysisError::AnalysisFailed(e.to_string()))?;

        debug!("分析响应长度: {} 字符", response.len());

        let result = parse_analysis(&response)?;
        info!(
            "✓ 分析完成: {} 个关键概念, {} 个主题",
            result.key_concepts.len(),
            result.themes.len()
        );
        Ok(result)
    }
}

/// 在产生任何网络开销之前检查请求
fn validate_items(items: &[LectureContentItem]) -> Result<(), AnalysisError> {
    if items.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    for item in items {
        match item.content_type {
            ContentKind::Text => {
                let has_text = item
                    .raw_text_content
                    .as_deref()
                    .is_some_and(|t| !t.trim().is_empty());
                if !has_text {
                    return Err(AnalysisError::invalid_input(
                        &item.file_name,
                        "text 类型的内容缺少 rawTextContent",
                    ));
                }
            }
            ContentKind::Image | ContentKind::Pdf => {
                let has_uri = item
                    .content_data_uri
                    .as_deref()
                    .is_some_and(|u| u.starts_with("data:"));
                if !has_uri {
                    return Err(AnalysisError::invalid_input(
                        &item.file_name,
                        format!("{} 类型的内容缺少 contentDataUri", item.content_type),
                    ));
                }
            }
        }
    }

    Ok(())
}

fn build_prompt(items: &[LectureContentItem]) -> ChatPrompt {
    let mut user = String::from(
        "Analyze the following lecture contents. Identify the key concepts and themes that span across \
all materials, and provide a single, coherent summary that integrates information from all provided content.\n\n",
    );
    let mut media = Vec::new();

    for item in items {
        user.push_str(&format!(
            "--- START FILE: {} (Type: {}) ---\n",
            item.file_name, item.content_type
        ));
        match (&item.content_type, &item.raw_text_content, &item.content_data_uri) {
            (ContentKind::Text, Some(text), _) => {
                user.push_str(text);
                user.push('\n');
            }
            (_, _, Some(data_uri)) => {
                media.push(MediaPart {
                    file_name: item.file_name.clone(),
                    data_uri: data_uri.clone(),
                });
                user.push_str(&format!("[attached media #{}]\n", media.len()));
            }
            // validate_items 已排除
            _ => {}
        }
        user.push_str(&format!("--- END FILE: {} ---\n\n", item.file_name));
    }

    user.push_str(
        r#"Output the combined result as JSON: {"keyConcepts": ["..."], "themes": ["..."], "summary": "..."}"#,
    );

    ChatPrompt::new(user)
        .with_system(SYSTEM_MESSAGE)
        .with_media(media)
}

fn parse_analysis(response: &str) -> Result<LectureAnalysisResult, AnalysisError> {
    let value = extract_json_object(response).map_err(AnalysisError::AnalysisFailed)?;
    serde_json::from_value(value).map_err(|e| {
        warn!("分析结果结构不符合预期: {}", e);
        AnalysisError::AnalysisFailed(format!("分析结果结构不符合预期: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedModel;

    const REPLY: &str = r#"```json
{"keyConcepts": ["mitochondria"], "themes": ["cell biology"], "summary": "Mitochondria produce energy."}
```"#;

    #[tokio::test]
    async fn test_analyze_text_item() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(REPLY.to_string())]));
        let client = AnalysisClient::new(model.clone());

        let item = LectureContentItem::text("bio.txt", "The mitochondria is the powerhouse of the cell.");
        let result = client.analyze_single(&item).await.unwrap();

        assert_eq!(result.key_concepts, vec!["mitochondria"]);
        assert_eq!(result.themes, vec!["cell biology"]);

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].user.contains("--- START FILE: bio.txt (Type: text) ---"));
        assert!(prompts[0].user.contains("powerhouse of the cell"));
        assert!(prompts[0].media.is_empty());
    }

    #[tokio::test]
    async fn test_batch_prompt_attaches_media_in_order() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(REPLY.to_string())]));
        let client = AnalysisClient::new(model.clone());

        let items = vec![
            LectureContentItem::text("intro.md", "# Cells"),
            LectureContentItem::media("slide.png", ContentKind::Image, "data:image/png;base64,AAAA"),
            LectureContentItem::media("handout.pdf", ContentKind::Pdf, "data:application/pdf;base64,JVBE"),
        ];
        client.analyze(&items).await.unwrap();

        let prompt = &model.prompts()[0];
        assert_eq!(prompt.media.len(), 2);
        assert_eq!(prompt.media[0].file_name, "slide.png");
        assert_eq!(prompt.media[1].file_name, "handout.pdf");
        assert!(prompt.user.contains("(Type: pdf)"));
    }

    #[tokio::test]
    async fn test_invalid_input_rejected_before_remote_call() {
        let model = Arc::new(ScriptedModel::new(vec![]));
        let client = AnalysisClient::new(model.clone());

        let missing_text = LectureContentItem {
            file_name: "empty.txt".to_string(),
            content_type: ContentKind::Text,
            raw_text_content: None,
            content_data_uri: None,
        };
        let err = client.analyze_single(&missing_text).await.unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput { ref file_name, .. } if file_name == "empty.txt"));

        let missing_uri = LectureContentItem {
            file_name: "scan.png".to_string(),
            content_type: ContentKind::Image,
            raw_text_content: Some("ignored".to_string()),
            content_data_uri: None,
        };
        let err = client.analyze_single(&missing_uri).await.unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput { ref file_name, .. } if file_name == "scan.png"));

        assert!(matches!(client.analyze(&[]).await, Err(AnalysisError::EmptyInput)));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_remote_and_parse_failures() {
        let model = Arc::new(ScriptedModel::new(vec![
            Err("connection reset".to_string()),
            Ok("Sorry, I can't do that.".to_string()),
            Ok(r#"{"keyConcepts": ["x"]}"#.to_string()),
        ]));
        let client = AnalysisClient::new(model.clone());
        let item = LectureContentItem::text("a.txt", "content");

        for _ in 0..3 {
            let err = client.analyze_single(&item).await.unwrap_err();
            assert!(matches!(err, AnalysisError::AnalysisFailed(_)));
        }
        // 不重试：每次调用只请求一次
        assert_eq!(model.call_count(), 3);
    }
}
