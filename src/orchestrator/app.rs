//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：创建模型客户端和流程
//! 2. **文件加载**：从磁盘读取待处理的讲义
//! 3. **流程驱动**：上传 → 分析 → 按默认参数生成题目
//! 4. **导出**：把全部生成的题目写入输出目录
//! 5. **统计**：输出本次运行的汇总

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::infrastructure::{ChatModel, OpenAiChatModel};
use crate::models::load_raw_files;
use crate::orchestrator::lecture_pipeline::LecturePipeline;
use crate::utils::logging::{log_analysis, log_run_summary, log_startup};

/// 一次运行的统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub files_total: usize,
    pub files_failed: usize,
    pub questions_generated: usize,
    pub questions_dropped: usize,
    pub export_path: Option<PathBuf>,
}

/// 应用主结构
pub struct App<M: ChatModel = OpenAiChatModel> {
    config: Config,
    pipeline: LecturePipeline<M>,
}

impl App<OpenAiChatModel> {
    /// 使用配置中的 OpenAI 兼容接口初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        if config.llm_api_key.is_empty() {
            warn!("⚠️ 未设置 LLM_API_KEY，模型请求可能失败");
        }
        let model = Arc::new(OpenAiChatModel::new(&config));
        Ok(Self::with_model(config, model))
    }
}

impl<M: ChatModel> App<M> {
    pub fn with_model(config: Config, model: Arc<M>) -> Self {
        log_startup(&config, model.model_name());
        let pipeline = LecturePipeline::new(model, &config);
        Self { config, pipeline }
    }

    pub fn pipeline(&self) -> &LecturePipeline<M> {
        &self.pipeline
    }

    /// 运行应用主逻辑
    pub async fn run(&mut self, paths: &[PathBuf]) -> Result<RunStats> {
        if paths.is_empty() {
            warn!("⚠️ 没有指定待处理的文件，程序结束");
            return Ok(RunStats::default());
        }

        info!("\n📁 正在读取 {} 个文件...", paths.len());
        let (files, load_errors) = load_raw_files(paths, self.config.max_upload_bytes).await;
        for e in &load_errors {
            warn!("⚠️ {}", e);
        }
        if files.is_empty() {
            bail!("没有可读取的文件");
        }

        let mut stats = RunStats {
            files_total: paths.len(),
            ..Default::default()
        };

        let analysis = self.pipeline.process_files(files).await;
        stats.files_failed = load_errors.len() + self.pipeline.state().file_errors().len();
        let analysis = analysis?;
        log_analysis(&analysis);

        let editor = self
            .pipeline
            .generate(
                self.config.default_question_count,
                self.config.default_difficulty,
                self.config.default_question_type,
            )
            .await?;
        stats.questions_generated = editor.len();
        stats.questions_dropped = self.pipeline.state().dropped_questions().len();

        let artifact = self
            .pipeline
            .export_selected()?
            .with_file_name(&self.config.export_file_name);
        let path = artifact.write_to_dir(&self.config.output_dir).await?;
        stats.export_path = Some(path);

        log_run_summary(&stats);
        Ok(stats)
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }
}
