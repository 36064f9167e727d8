//! 讲义处理流程 - 编排层
//!
//! ## 职责
//!
//! 把提取、分析、生成三个能力串成一条流程，并维护 `PipelineState`。
//!
//! ## 流程
//!
//! 1. **上传**：批量提取文件，单个文件失败只记录，不中断
//! 2. **分析**：上传结束后自动分析本批最后一个成功的文件
//! 3. **生成**：按数量 / 难度 / 题型生成题目，结果进入编辑器
//! 4. **导出**：导出编辑器中选中的题目
//!
//! 所有失败既写入状态中对应阶段的字段，也以类型化错误返回给调用方。

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, ExportError, PipelineError};
use crate::infrastructure::ChatModel;
use crate::models::analysis::{LectureAnalysisResult, LectureContentItem};
use crate::models::file_info::{RawFile, UploadedFileInfo};
use crate::models::question::{Difficulty, GenerationRequest, QuestionType};
use crate::orchestrator::pipeline_state::{Epoch, PipelineEvent, PipelineState};
use crate::services::{AnalysisClient, ContentExtractor, FileOutcome, GenerationClient};
use crate::workflow::{ExportArtifact, QuestionEditor};

pub struct LecturePipeline<M: ChatModel> {
    extractor: ContentExtractor,
    analysis_client: AnalysisClient<M>,
    generation_client: GenerationClient<M>,
    state: PipelineState,
}

impl<M: ChatModel> LecturePipeline<M> {
    pub fn new(model: Arc<M>, config: &Config) -> Self {
        Self {
            extractor: ContentExtractor::from_config(config),
            analysis_client: AnalysisClient::new(model.clone()),
            generation_client: GenerationClient::new(model),
            state: PipelineState::default(),
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn editor(&self) -> &QuestionEditor {
        self.state.editor()
    }

    pub fn editor_mut(&mut self) -> &mut QuestionEditor {
        self.state.editor_mut()
    }

    /// 上传单个文件
    pub async fn process_file(&mut self, file: RawFile) -> Result<LectureAnalysisResult, AppError> {
        self.process_files(vec![file]).await
    }

    /// 上传一批文件，随后自动分析最后一个成功提取的文件
    ///
    /// 新的上传总是覆盖进行中的阶段，旧阶段的结果按 epoch 丢弃。
    /// 没有任何文件提取成功时返回第一个文件错误，不调用模型。
    pub async fn process_files(
        &mut self,
        files: Vec<RawFile>,
    ) -> Result<LectureAnalysisResult, AppError> {
        if let Some(stage) = self.state.begin_upload() {
            warn!("⚠️ 新的上传覆盖进行中的阶段: {}", stage);
        }
        self.state.apply(PipelineEvent::UploadStarted);
        let epoch = self.state.epoch();

        info!("📂 开始处理 {} 个文件", files.len());

        let state = &mut self.state;
        let batch = self.extractor.extract_batch_with(&files, |_, _, outcome| {
            let event = match outcome {
                FileOutcome::Processed(info) => PipelineEvent::FileProcessed {
                    epoch,
                    info: info.clone(),
                },
                FileOutcome::Failed { file_name, error } => PipelineEvent::FileFailed {
                    epoch,
                    file_name: file_name.clone(),
                    error: error.to_string(),
                },
            };
            state.apply(event);
        });
        self.state.apply(PipelineEvent::UploadFinished { epoch });

        if !batch.errors.is_empty() {
            warn!("⚠️ {} 个文件处理失败", batch.errors.len());
        }

        // 只有最后一个成功处理的文件进入分析
        let item: Option<LectureContentItem> = batch
            .last_success()
            .and_then(UploadedFileInfo::to_content_item);
        let Some(item) = item else {
            warn!("⚠️ 没有可分析的文件");
            return Err(match batch.errors.into_iter().next() {
                Some((_, file_error)) => file_error.into(),
                None => PipelineError::NoUsableFile.into(),
            });
        };

        self.state.apply(PipelineEvent::AnalysisStarted { epoch });
        let in_flight = InFlight::new(&mut self.state, epoch);
        let analyzed = self.analysis_client.analyze_single(&item).await;
        in_flight.finish();

        match analyzed {
            Ok(result) => {
                self.state.apply(PipelineEvent::AnalysisCompleted {
                    epoch,
                    result: result.clone(),
                });
                Ok(result)
            }
            Err(e) => {
                error!("❌ 内容分析失败: {}", e);
                self.state.apply(PipelineEvent::AnalysisFailed {
                    epoch,
                    error: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    /// 基于当前分析结果生成题目，新题目替换编辑器中的旧题目
    pub async fn generate(
        &mut self,
        count: u32,
        difficulty: Difficulty,
        question_type: QuestionType,
    ) -> Result<&QuestionEditor, AppError> {
        self.state.begin_generation()?;
        let epoch = self.state.epoch();

        let content = self
            .state
            .analysis()
            .map(LectureAnalysisResult::generation_context)
            .ok_or(PipelineError::AnalysisMissing)?;
        let request = GenerationRequest::new(content, question_type)
            .with_count(count)
            .with_difficulty(difficulty);

        self.state.apply(PipelineEvent::GenerationStarted { epoch });
        let in_flight = InFlight::new(&mut self.state, epoch);
        let generated = self.generation_client.generate(&request).await;
        in_flight.finish();

        match generated {
            Ok(outcome) => {
                self.state
                    .apply(PipelineEvent::GenerationCompleted { epoch, outcome });
                Ok(self.state.editor())
            }
            Err(e) => {
                error!("❌ 题目生成失败: {}", e);
                self.state.apply(PipelineEvent::GenerationFailed {
                    epoch,
                    error: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    pub fn export_selected(&self) -> Result<ExportArtifact, ExportError> {
        self.state.editor().export_selected()
    }
}

/// 等待模型期间 future 被丢弃（超时、select! 等）时，把卡住的阶段恢复为空闲
struct InFlight<'a> {
    state: &'a mut PipelineState,
    epoch: Epoch,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn new(state: &'a mut PipelineState, epoch: Epoch) -> Self {
        Self {
            state,
            epoch,
            finished: false,
        }
    }

    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("⚠️ 阶段 {} 未完成即被取消", self.state.stage());
            self.state
                .apply(PipelineEvent::StageAbandoned { epoch: self.epoch });
        }
    }
}
