//! 流程状态 - 编排层
//!
//! 上传 → 分析 → 生成 三个阶段共享的全部状态放在一个 `PipelineState` 中，
//! 只能通过 `PipelineEvent` 修改。
//!
//! 每次上传都会递增 `epoch`。带结果的事件都标记了所属的 epoch，
//! 旧 epoch 的事件（例如新上传之后才返回的分析结果）直接丢弃。

use std::fmt;

use tracing::debug;

use crate::error::PipelineError;
use crate::models::analysis::LectureAnalysisResult;
use crate::models::file_info::UploadedFileInfo;
use crate::services::generation_client::{DroppedQuestion, GenerationOutcome};
use crate::workflow::question_editor::QuestionEditor;

/// 当前进行中的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Idle,
    FileProcessing,
    Analyzing,
    QuestionGenerating,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::FileProcessing => "file-processing",
            Stage::Analyzing => "analyzing",
            Stage::QuestionGenerating => "question-generating",
        }
    }

    pub fn is_busy(self) -> bool {
        self != Stage::Idle
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Epoch = u64;

#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// 新的上传，清空所有下游状态
    UploadStarted,
    FileProcessed { epoch: Epoch, info: UploadedFileInfo },
    FileFailed { epoch: Epoch, file_name: String, error: String },
    UploadFinished { epoch: Epoch },
    AnalysisStarted { epoch: Epoch },
    AnalysisCompleted { epoch: Epoch, result: LectureAnalysisResult },
    AnalysisFailed { epoch: Epoch, error: String },
    GenerationStarted { epoch: Epoch },
    GenerationCompleted { epoch: Epoch, outcome: GenerationOutcome },
    GenerationFailed { epoch: Epoch, error: String },
    /// 进行中的分析或生成被取消（future 被丢弃），阶段回到空闲
    StageAbandoned { epoch: Epoch },
}

impl PipelineEvent {
    fn epoch(&self) -> Option<Epoch> {
        match self {
            PipelineEvent::UploadStarted => None,
            PipelineEvent::FileProcessed { epoch, .. }
            | PipelineEvent::FileFailed { epoch, .. }
            | PipelineEvent::UploadFinished { epoch }
            | PipelineEvent::AnalysisStarted { epoch }
            | PipelineEvent::AnalysisCompleted { epoch, .. }
            | PipelineEvent::AnalysisFailed { epoch, .. }
            | PipelineEvent::GenerationStarted { epoch }
            | PipelineEvent::GenerationCompleted { epoch, .. }
            | PipelineEvent::GenerationFailed { epoch, .. }
            | PipelineEvent::StageAbandoned { epoch } => Some(*epoch),
        }
    }
}

/// 流程的全部状态
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    stage: Stage,
    epoch: Epoch,
    last_file: Option<UploadedFileInfo>,
    file_errors: Vec<String>,
    analysis: Option<LectureAnalysisResult>,
    analysis_error: Option<String>,
    generation_error: Option<String>,
    editor: QuestionEditor,
    dropped_questions: Vec<DroppedQuestion>,
}

impl PipelineState {
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// 最后一个成功处理的文件
    pub fn last_file(&self) -> Option<&UploadedFileInfo> {
        self.last_file.as_ref()
    }

    pub fn file_errors(&self) -> &[String] {
        &self.file_errors
    }

    pub fn analysis(&self) -> Option<&LectureAnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn analysis_error(&self) -> Option<&str> {
        self.analysis_error.as_deref()
    }

    pub fn generation_error(&self) -> Option<&str> {
        self.generation_error.as_deref()
    }

    pub fn editor(&self) -> &QuestionEditor {
        &self.editor
    }

    pub(crate) fn editor_mut(&mut self) -> &mut QuestionEditor {
        &mut self.editor
    }

    pub fn dropped_questions(&self) -> &[DroppedQuestion] {
        &self.dropped_questions
    }

    /// 新的上传总是允许；返回被它覆盖的进行中阶段
    pub fn begin_upload(&self) -> Option<Stage> {
        self.stage.is_busy().then_some(self.stage)
    }

    /// 检查是否可以开始生成题目
    pub fn begin_generation(&self) -> Result<(), PipelineError> {
        self.ensure_idle()?;
        if self.analysis.is_none() {
            return Err(PipelineError::AnalysisMissing);
        }
        Ok(())
    }

    fn ensure_idle(&self) -> Result<(), PipelineError> {
        if self.stage.is_busy() {
            return Err(PipelineError::StageBusy {
                stage: self.stage.to_string(),
            });
        }
        Ok(())
    }

    /// 应用一个事件；旧 epoch 的事件被丢弃，返回 `false`
    pub fn apply(&mut self, event: PipelineEvent) -> bool {
        if let Some(epoch) = event.epoch() {
            if epoch != self.epoch {
                debug!("丢弃过期事件 (epoch {} != {}): {:?}", epoch, self.epoch, event);
                return false;
            }
        }

        match event {
            PipelineEvent::UploadStarted => {
                *self = Self {
                    stage: Stage::FileProcessing,
                    epoch: self.epoch + 1,
                    ..Self::default()
                };
            }
            PipelineEvent::FileProcessed { info, .. } => match &info.error {
                Some(error) => self
                    .file_errors
                    .push(format!("{}: {}", info.file_name, error)),
                None => self.last_file = Some(info),
            },
            PipelineEvent::FileFailed {
                file_name, error, ..
            } => self.file_errors.push(format!("{}: {}", file_name, error)),
            PipelineEvent::UploadFinished { .. } => self.stage = Stage::Idle,
            PipelineEvent::AnalysisStarted { .. } => {
                self.stage = Stage::Analyzing;
                self.analysis = None;
                self.analysis_error = None;
            }
            PipelineEvent::AnalysisCompleted { result, .. } => {
                self.stage = Stage::Idle;
                self.analysis = Some(result);
            }
            PipelineEvent::AnalysisFailed { error, .. } => {
                self.stage = Stage::Idle;
                self.analysis_error = Some(error);
            }
            PipelineEvent::GenerationStarted { .. } => {
                self.stage = Stage::QuestionGenerating;
                self.generation_error = None;
            }
            PipelineEvent::GenerationCompleted { outcome, .. } => {
                self.stage = Stage::Idle;
                self.editor = QuestionEditor::from_generated(outcome.questions);
                self.dropped_questions = outcome.dropped;
            }
            PipelineEvent::GenerationFailed { error, .. } => {
                self.stage = Stage::Idle;
                self.generation_error = Some(error);
            }
            PipelineEvent::StageAbandoned { .. } => self.stage = Stage::Idle,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::GeneratedQuestion;

    fn analysis() -> LectureAnalysisResult {
        LectureAnalysisResult {
            key_concepts: vec!["mitochondria".into()],
            themes: vec!["cell biology".into()],
            summary: "Mitochondria produce ATP.".into(),
        }
    }

    fn outcome() -> GenerationOutcome {
        GenerationOutcome {
            questions: vec![GeneratedQuestion::FillInTheBlank {
                question_text: "Mitochondria produce ___.".into(),
                correct_answer: "ATP".into(),
            }],
            dropped: vec![DroppedQuestion {
                index: 1,
                reason: "题干为空".into(),
            }],
        }
    }

    /// 走完一次 上传 → 分析 → 生成
    fn completed_state() -> PipelineState {
        let mut state = PipelineState::default();
        state.apply(PipelineEvent::UploadStarted);
        let epoch = state.epoch();
        state.apply(PipelineEvent::FileFailed {
            epoch,
            file_name: "old.doc".into(),
            error: "不支持".into(),
        });
        state.apply(PipelineEvent::UploadFinished { epoch });
        state.apply(PipelineEvent::AnalysisStarted { epoch });
        state.apply(PipelineEvent::AnalysisCompleted {
            epoch,
            result: analysis(),
        });
        state.apply(PipelineEvent::GenerationStarted { epoch });
        state.apply(PipelineEvent::GenerationCompleted {
            epoch,
            outcome: outcome(),
        });
        state
    }

    #[test]
    fn test_full_flow() {
        let state = completed_state();
        assert_eq!(state.stage(), Stage::Idle);
        assert_eq!(state.analysis(), Some(&analysis()));
        assert_eq!(state.editor().len(), 1);
        assert_eq!(state.dropped_questions().len(), 1);
        assert_eq!(state.file_errors(), ["old.doc: 不支持"]);
    }

    #[test]
    fn test_new_upload_clears_downstream_state() {
        let mut state = completed_state();
        let previous = state.epoch();

        assert!(state.apply(PipelineEvent::UploadStarted));
        assert_eq!(state.epoch(), previous + 1);
        assert_eq!(state.stage(), Stage::FileProcessing);
        assert!(state.analysis().is_none());
        assert!(state.last_file().is_none());
        assert!(state.file_errors().is_empty());
        assert!(state.editor().is_empty());
        assert!(state.dropped_questions().is_empty());
    }

    #[test]
    fn test_stale_results_are_ignored() {
        let mut state = PipelineState::default();
        state.apply(PipelineEvent::UploadStarted);
        let stale = state.epoch();
        state.apply(PipelineEvent::UploadFinished { epoch: stale });
        state.apply(PipelineEvent::AnalysisStarted { epoch: stale });

        // 分析返回之前用户又上传了新文件
        state.apply(PipelineEvent::UploadStarted);
        assert!(!state.apply(PipelineEvent::AnalysisCompleted {
            epoch: stale,
            result: analysis(),
        }));
        assert!(state.analysis().is_none());
        assert_eq!(state.stage(), Stage::FileProcessing);
    }

    #[test]
    fn test_guards() {
        let mut state = PipelineState::default();
        assert_eq!(state.begin_generation(), Err(PipelineError::AnalysisMissing));
        assert_eq!(state.begin_upload(), None);

        state.apply(PipelineEvent::UploadStarted);
        assert_eq!(state.begin_upload(), Some(Stage::FileProcessing));
        assert_eq!(
            state.begin_generation(),
            Err(PipelineError::StageBusy {
                stage: "file-processing".into()
            })
        );

        let state = completed_state();
        assert_eq!(state.begin_generation(), Ok(()));
    }

    #[test]
    fn test_abandoned_stage_returns_to_idle() {
        let mut state = PipelineState::default();
        state.apply(PipelineEvent::UploadStarted);
        let epoch = state.epoch();
        state.apply(PipelineEvent::UploadFinished { epoch });
        state.apply(PipelineEvent::AnalysisStarted { epoch });

        // 卡在分析中也不会阻止新的上传
        assert_eq!(state.begin_upload(), Some(Stage::Analyzing));
        assert!(state.apply(PipelineEvent::StageAbandoned { epoch }));
        assert_eq!(state.stage(), Stage::Idle);
        assert!(state.analysis().is_none());

        // 旧 epoch 的取消不影响新一轮上传
        state.apply(PipelineEvent::UploadStarted);
        assert!(!state.apply(PipelineEvent::StageAbandoned { epoch }));
        assert_eq!(state.stage(), Stage::FileProcessing);
    }

    #[test]
    fn test_failures_land_in_their_own_field() {
        let mut state = PipelineState::default();
        state.apply(PipelineEvent::UploadStarted);
        let epoch = state.epoch();
        state.apply(PipelineEvent::UploadFinished { epoch });
        state.apply(PipelineEvent::AnalysisStarted { epoch });
        state.apply(PipelineEvent::AnalysisFailed {
            epoch,
            error: "timeout".into(),
        });

        assert_eq!(state.stage(), Stage::Idle);
        assert_eq!(state.analysis_error(), Some("timeout"));
        assert!(state.generation_error().is_none());
    }
}
