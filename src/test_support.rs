//! 单元测试用的脚本化模型，按顺序返回预设回复并记录收到的提示词

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::infrastructure::{ChatModel, ChatPrompt};

pub(crate) struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<ChatPrompt>>,
    hang_on: Option<usize>,
}

impl ScriptedModel {
    pub(crate) fn new(replies: Vec<Result<String, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
            hang_on: None,
        }
    }

    /// 第 `call` 次调用（从 0 开始）永远不返回
    pub(crate) fn hang_on(mut self, call: usize) -> Self {
        self.hang_on = Some(call);
        self
    }

    pub(crate) fn prompts(&self) -> Vec<ChatPrompt> {
        self.prompts.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String> {
        let call = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.clone());
            prompts.len() - 1
        };
        if self.hang_on == Some(call) {
            std::future::pending::<()>().await;
        }
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("scripted model has no reply left")),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
