use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::question::{GeneratedQuestion, QuestionType};

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// 可编辑的选项，`id` 在文字修改后保持不变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditableOption {
    pub id: String,
    pub text: String,
}

impl EditableOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
        }
    }
}

/// 与题型相关的可编辑字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EditableBody {
    #[serde(rename_all = "camelCase")]
    FillInTheBlank { edited_correct_answer: String },
    #[serde(rename_all = "camelCase")]
    SingleChoice {
        edited_options: Vec<EditableOption>,
        edited_correct_answer: String,
    },
    #[serde(rename_all = "camelCase")]
    MultipleChoice {
        edited_options: Vec<EditableOption>,
        edited_correct_answers: Vec<String>,
    },
}

/// 可编辑的题目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditableQuestionItem {
    pub id: String,
    pub selected: bool,
    pub edited_question_text: String,
    /// 生成时的原始题目，用于重置
    pub original: GeneratedQuestion,
    pub body: EditableBody,
}

fn wrap_options(options: &[String]) -> Vec<EditableOption> {
    options.iter().map(EditableOption::new).collect()
}

impl EditableQuestionItem {
    /// 由生成的题目创建，分配新的 id，默认选中
    pub fn from_generated(question: GeneratedQuestion) -> Self {
        let body = Self::body_from(&question);
        Self {
            id: new_id(),
            selected: true,
            edited_question_text: question.question_text().to_string(),
            original: question,
            body,
        }
    }

    pub(crate) fn body_from(question: &GeneratedQuestion) -> EditableBody {
        match question {
            GeneratedQuestion::FillInTheBlank { correct_answer, .. } => {
                EditableBody::FillInTheBlank {
                    edited_correct_answer: correct_answer.clone(),
                }
            }
            GeneratedQuestion::SingleChoice {
                options,
                correct_answer,
                ..
            } => EditableBody::SingleChoice {
                edited_options: wrap_options(options),
                edited_correct_answer: correct_answer.clone(),
            },
            GeneratedQuestion::MultipleChoice {
                options,
                correct_answers,
                ..
            } => EditableBody::MultipleChoice {
                edited_options: wrap_options(options),
                edited_correct_answers: correct_answers.clone(),
            },
        }
    }

    pub fn question_type(&self) -> QuestionType {
        match self.body {
            EditableBody::FillInTheBlank { .. } => QuestionType::FillInTheBlank,
            EditableBody::SingleChoice { .. } => QuestionType::SingleChoice,
            EditableBody::MultipleChoice { .. } => QuestionType::MultipleChoice,
        }
    }

    pub fn options(&self) -> Option<&[EditableOption]> {
        match &self.body {
            EditableBody::FillInTheBlank { .. } => None,
            EditableBody::SingleChoice { edited_options, .. }
            | EditableBody::MultipleChoice { edited_options, .. } => Some(edited_options),
        }
    }

    /// 还原为导出格式，丢弃编辑器专用字段
    pub fn to_generated(&self) -> GeneratedQuestion {
        let question_text = self.edited_question_text.clone();
        match &self.body {
            EditableBody::FillInTheBlank {
                edited_correct_answer,
            } => GeneratedQuestion::FillInTheBlank {
                question_text,
                correct_answer: edited_correct_answer.clone(),
            },
            EditableBody::SingleChoice {
                edited_options,
                edited_correct_answer,
            } => GeneratedQuestion::SingleChoice {
                question_text,
                options: edited_options.iter().map(|o| o.text.clone()).collect(),
                correct_answer: edited_correct_answer.clone(),
            },
            EditableBody::MultipleChoice {
                edited_options,
                edited_correct_answers,
            } => GeneratedQuestion::MultipleChoice {
                question_text,
                options: edited_options.iter().map(|o| o.text.clone()).collect(),
                correct_answers: edited_correct_answers.clone(),
            },
        }
    }
}
