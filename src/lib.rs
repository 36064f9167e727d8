//! # Lecture Quiz
//!
//! 讲义分析与测验题生成：上传讲义文件，提取内容交给模型分析，
//! 再根据分析结果生成题目，编辑后导出为 JSON。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（模型客户端），只暴露能力
//! - `ChatModel` - 远程模型边界，`OpenAiChatModel` 是唯一的客户端持有者
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `ContentExtractor` - 文件 → 文本或 data URI
//! - `AnalysisClient` - 内容 → 关键概念 / 主题 / 摘要
//! - `GenerationClient` - 摘要 → 指定题型的题目
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 题目的编辑与导出
//! - `QuestionEdit` - 单次编辑，纯函数应用
//! - `QuestionEditor` - 题目列表、选择、删除、导出
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/pipeline_state` - 全部流程状态与事件
//! - `orchestrator/lecture_pipeline` - 上传 → 分析 → 生成
//! - `orchestrator/app` - 应用入口
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_support;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{ChatModel, ChatPrompt, MediaPart, OpenAiChatModel};
pub use models::{
    Difficulty, EditableQuestionItem, GeneratedQuestion, LectureAnalysisResult, QuestionType,
    RawFile, UploadedFileInfo,
};
pub use orchestrator::{App, LecturePipeline, PipelineState, RunStats, Stage};
pub use services::{AnalysisClient, ContentExtractor, GenerationClient, GenerationOutcome};
pub use workflow::{EditNotice, EditOutcome, ExportArtifact, QuestionEdit, QuestionEditor};
