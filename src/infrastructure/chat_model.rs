//! 模型网关 - 基础设施层
//!
//! 持有唯一的 LLM 客户端资源，只暴露"发送一次对话请求"的能力

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageDetail,
        ImageUrl,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;

/// 随用户消息一起发送的媒体（图片或 PDF 的 data URI）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPart {
    pub file_name: String,
    pub data_uri: String,
}

/// 一次对话请求
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: Option<String>,
    pub user: String,
    pub media: Vec<MediaPart>,
}

impl ChatPrompt {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ..Default::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_media(mut self, media: Vec<MediaPart>) -> Self {
        self.media = media;
        self
    }
}

/// 远程模型边界
///
/// 职责：
/// - 把提示词发给模型，返回原始文本
/// - 不认识题目 / 分析结果
/// - 不做重试
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String>;

    /// 模型名称（仅用于日志）
    fn model_name(&self) -> &str;
}

/// 兼容 OpenAI API 的模型（OpenAI、Gemini、Doubao 等网关）
pub struct OpenAiChatModel {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiChatModel {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        }
    }

    fn build_user_message(prompt: &ChatPrompt) -> Result<ChatCompletionRequestMessage> {
        let message = if prompt.media.is_empty() {
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.user.as_str())
                .build()?
        } else {
            // Vision API：文本在前，媒体按文件顺序追加
            let mut parts = vec![ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartText {
                    text: prompt.user.clone(),
                },
            )];
            for media in &prompt.media {
                parts.push(ChatCompletionRequestUserMessageContentPart::ImageUrl(
                    ChatCompletionRequestMessageContentPartImage {
                        image_url: ImageUrl {
                            url: media.data_uri.clone(),
                            detail: Some(ImageDetail::Auto),
                        },
                    },
                ));
            }
            ChatCompletionRequestUserMessageArgs::default()
                .content(ChatCompletionRequestUserMessageContent::Array(parts))
                .build()?
        };
        Ok(ChatCompletionRequestMessage::User(message))
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!(
            "用户消息长度: {} 字符，媒体: {} 个",
            prompt.user.len(),
            prompt.media.len()
        );

        let mut messages = Vec::new();
        if let Some(system) = &prompt.system {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(system.as_str())
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }
        messages.push(Self::build_user_message(prompt)?);

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            anyhow::anyhow!("LLM API 调用失败: {}", e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("LLM 返回内容为空"))?;

        Ok(content.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_builder() {
        let prompt = ChatPrompt::new("summarize").with_system("be brief").with_media(vec![
            MediaPart {
                file_name: "slide.png".to_string(),
                data_uri: "data:image/png;base64,AAAA".to_string(),
            },
        ]);
        assert_eq!(prompt.system.as_deref(), Some("be brief"));
        assert_eq!(prompt.media.len(), 1);
    }

    #[test]
    fn test_user_message_with_media_is_multipart() {
        let prompt = ChatPrompt::new("describe").with_media(vec![MediaPart {
            file_name: "slide.png".to_string(),
            data_uri: "data:image/png;base64,AAAA".to_string(),
        }]);
        let message = OpenAiChatModel::build_user_message(&prompt).unwrap();
        match message {
            ChatCompletionRequestMessage::User(user) => match user.content {
                ChatCompletionRequestUserMessageContent::Array(parts) => assert_eq!(parts.len(), 2),
                other => panic!("unexpected content: {:?}", other),
            },
            other => panic!("unexpected message: {:?}", other),
        }
    }

    /// 真实模型连通性测试
    ///
    /// 运行方式：
    /// ```bash
    /// LLM_API_KEY=... cargo test test_live_completion -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_live_completion() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::default().apply_env().unwrap();
        let model = OpenAiChatModel::new(&config);
        let reply = model
            .complete(&ChatPrompt::new("Reply with the single word: pong"))
            .await
            .unwrap();
        println!("LLM 响应: {}", reply);
        assert!(!reply.is_empty());
    }
}
