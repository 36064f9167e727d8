//! 题目生成服务 - 业务能力层
//!
//! 只负责"讲义内容 → 若干道指定题型的题目"，不关心后续编辑

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::error::GenerationError;
use crate::infrastructure::{ChatModel, ChatPrompt};
use crate::models::question::{
    GeneratedQuestion, GenerationRequest, QuestionType, MAX_QUESTIONS, MIN_QUESTIONS,
};
use crate::services::response_parser::extract_json_object;

const SYSTEM_MESSAGE: &str = "You are an experienced educator who writes assessment questions from lecture material. \
Always write the questions in the same language as the lecture content. Reply with a single JSON object and nothing else.";

/// 被丢弃的题目：在模型回复 `questions` 数组中的下标和原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedQuestion {
    pub index: usize,
    pub reason: String,
}

/// 一次生成的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub questions: Vec<GeneratedQuestion>,
    pub dropped: Vec<DroppedQuestion>,
}

impl GenerationOutcome {
    pub fn has_dropped(&self) -> bool {
        !self.dropped.is_empty()
    }
}

/// 题目生成客户端
///
/// 职责：
/// - 调用模型之前检查数量范围和内容
/// - 逐题解码，不合格的题目单独丢弃并记录原因
/// - 不重试
pub struct GenerationClient<M: ChatModel> {
    model: Arc<M>,
}

impl<M: ChatModel> GenerationClient<M> {
    pub fn new(model: Arc<M>) -> Self {
        Self { model }
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, GenerationError> {
        check_request(request)?;

        info!(
            "📝 正在生成 {} 道{} (难度: {})",
            request.number_of_questions,
            request.question_type.label(),
            request.difficulty
        );

        let prompt = build_prompt(request);
        let response = self
            .model
            .complete(&prompt)
            .await
            .map_err(|e| GenerationError::GenerationFailed(e.to_string()))?;

        debug!("生成响应长度: {} 字符", response.len());

        let outcome = parse_questions(
            &response,
            request.question_type,
            request.number_of_questions as usize,
        )?;

        if outcome.questions.len() != request.number_of_questions as usize {
            warn!(
                "请求 {} 道题，实际可用 {} 道",
                request.number_of_questions,
                outcome.questions.len()
            );
        }
        info!(
            "✓ 生成完成: {} 道可用, {} 道丢弃",
            outcome.questions.len(),
            outcome.dropped.len()
        );
        Ok(outcome)
    }
}

fn check_request(request: &GenerationRequest) -> Result<(), GenerationError> {
    if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&request.number_of_questions) {
        return Err(GenerationError::QuestionCountOutOfRange {
            requested: request.number_of_questions,
            min: MIN_QUESTIONS,
            max: MAX_QUESTIONS,
        });
    }
    if request.lecture_content.trim().is_empty() {
        return Err(GenerationError::EmptyContent);
    }
    Ok(())
}

fn shape_example(question_type: QuestionType) -> &'static str {
    match question_type {
        QuestionType::FillInTheBlank => {
            r#"{"type": "fill-in-the-blank", "questionText": "The capital of France is ___.", "correctAnswer": "Paris"}
The question text MUST contain "___" where the answer belongs."#
        }
        QuestionType::SingleChoice => {
            r#"{"type": "single-choice", "questionText": "What is the chemical symbol for water?", "options": ["O2", "H2O", "CO2", "NaCl"], "correctAnswer": "H2O"}
Give 3 to 5 distinct options; correctAnswer must be exactly one of the options."#
        }
        QuestionType::MultipleChoice => {
            r#"{"type": "multiple-choice", "questionText": "Which of the following are primary colors?", "options": ["Red", "Green", "Blue", "Yellow"], "correctAnswers": ["Red", "Blue", "Yellow"]}
Give 3 to 5 distinct options; correctAnswers must be a non-empty subset of the options."#
        }
    }
}

fn build_prompt(request: &GenerationRequest) -> ChatPrompt {
    let user = format!(
        "Based on the following lecture content, generate {count} {difficulty} {kind} questions.\n\
All questions must be of type \"{kind}\".\n\
Each question must look like this:\n{example}\n\n\
Return JSON of the form {{\"questions\": [ ... ]}}.\n\n\
Lecture content:\n{content}",
        count = request.number_of_questions,
        difficulty = request.difficulty,
        kind = request.question_type,
        example = shape_example(request.question_type),
        content = request.lecture_content,
    );

    ChatPrompt::new(user).with_system(SYSTEM_MESSAGE)
}

/// 解析 `{"questions": [...]}`，逐题过滤
///
/// 可用题目最多保留 `limit` 道，多出的记入 `dropped`
fn parse_questions(
    response: &str,
    expected: QuestionType,
    limit: usize,
) -> Result<GenerationOutcome, GenerationError> {
    let mut root = extract_json_object(response).map_err(GenerationError::GenerationFailed)?;

    let items = match root.get_mut("questions").map(JsonValue::take) {
        Some(JsonValue::Array(items)) => items,
        _ => {
            return Err(GenerationError::GenerationFailed(
                "模型回复缺少 questions 数组".to_string(),
            ))
        }
    };

    let mut outcome = GenerationOutcome::default();
    for (index, item) in items.into_iter().enumerate() {
        match accept_question(item, expected) {
            Ok(_) if outcome.questions.len() >= limit => {
                let reason = format!("超出请求数量 {}", limit);
                warn!("丢弃第 {} 道题: {}", index + 1, reason);
                outcome.dropped.push(DroppedQuestion { index, reason });
            }
            Ok(question) => outcome.questions.push(question),
            Err(reason) => {
                warn!("丢弃第 {} 道题: {}", index + 1, reason);
                outcome.dropped.push(DroppedQuestion { index, reason });
            }
        }
    }
    Ok(outcome)
}

fn accept_question(item: JsonValue, expected: QuestionType) -> Result<GeneratedQuestion, String> {
    let question: GeneratedQuestion =
        serde_json::from_value(item).map_err(|e| format!("结构无法解析: {}", e))?;

    if question.question_type() != expected {
        return Err(format!(
            "题型为 {}，请求的是 {}",
            question.question_type(),
            expected
        ));
    }

    question.validate().map_err(|defect| defect.to_string())?;
    Ok(question)
}
