use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 填空题中表示空位的标记
pub const BLANK_MARKER: &str = "___";
/// 模型生成的选择题最少选项数
pub const MIN_GENERATED_OPTIONS: usize = 3;
/// 选择题最多选项数
pub const MAX_OPTIONS: usize = 5;
/// 单次生成的题目数量范围
pub const MIN_QUESTIONS: u32 = 1;
pub const MAX_QUESTIONS: u32 = 20;

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    FillInTheBlank,
    SingleChoice,
    MultipleChoice,
}

impl QuestionType {
    pub const ALL: [QuestionType; 3] = [
        QuestionType::FillInTheBlank,
        QuestionType::SingleChoice,
        QuestionType::MultipleChoice,
    ];

    /// 线上格式中使用的标识
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::FillInTheBlank => "fill-in-the-blank",
            QuestionType::SingleChoice => "single-choice",
            QuestionType::MultipleChoice => "multiple-choice",
        }
    }

    /// 展示用名称
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::FillInTheBlank => "填空题",
            QuestionType::SingleChoice => "单选题",
            QuestionType::MultipleChoice => "多选题",
        }
    }

    pub fn has_options(self) -> bool {
        !matches!(self, QuestionType::FillInTheBlank)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuestionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| format!("未知题型: {}", s))
    }
}

/// 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("未知难度: {}", other)),
        }
    }
}

/// 模型生成的题目
///
/// 以 `type` 字段区分题型，与导出文件格式一致。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GeneratedQuestion {
    #[serde(rename_all = "camelCase")]
    FillInTheBlank {
        question_text: String,
        correct_answer: String,
    },
    #[serde(rename_all = "camelCase")]
    SingleChoice {
        question_text: String,
        options: Vec<String>,
        correct_answer: String,
    },
    #[serde(rename_all = "camelCase")]
    MultipleChoice {
        question_text: String,
        options: Vec<String>,
        correct_answers: Vec<String>,
    },
}

/// 题目结构上的缺陷（用于说明为什么丢弃某道生成的题目）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionDefect {
    EmptyQuestionText,
    MissingBlankMarker,
    OptionCount(usize),
    DuplicateOption(String),
    AnswerNotInOptions(String),
    NoCorrectAnswer,
}

impl fmt::Display for QuestionDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionDefect::EmptyQuestionText => write!(f, "题干为空"),
            QuestionDefect::MissingBlankMarker => {
                write!(f, "填空题题干缺少空位标记 '{}'", BLANK_MARKER)
            }
            QuestionDefect::OptionCount(n) => write!(
                f,
                "选项数量为 {}，应在 {} 到 {} 之间",
                n, MIN_GENERATED_OPTIONS, MAX_OPTIONS
            ),
            QuestionDefect::DuplicateOption(o) => write!(f, "选项重复: {}", o),
            QuestionDefect::AnswerNotInOptions(a) => write!(f, "正确答案不在选项中: {}", a),
            QuestionDefect::NoCorrectAnswer => write!(f, "没有正确答案"),
        }
    }
}

impl GeneratedQuestion {
    pub fn question_type(&self) -> QuestionType {
        match self {
            GeneratedQuestion::FillInTheBlank { .. } => QuestionType::FillInTheBlank,
            GeneratedQuestion::SingleChoice { .. } => QuestionType::SingleChoice,
            GeneratedQuestion::MultipleChoice { .. } => QuestionType::MultipleChoice,
        }
    }

    pub fn question_text(&self) -> &str {
        match self {
            GeneratedQuestion::FillInTheBlank { question_text, .. }
            | GeneratedQuestion::SingleChoice { question_text, .. }
            | GeneratedQuestion::MultipleChoice { question_text, .. } => question_text,
        }
    }

    /// 选项列表（填空题没有选项）
    pub fn options(&self) -> Option<&[String]> {
        match self {
            GeneratedQuestion::FillInTheBlank { .. } => None,
            GeneratedQuestion::SingleChoice { options, .. }
            | GeneratedQuestion::MultipleChoice { options, .. } => Some(options),
        }
    }

    /// 检查模型输出的结构约束
    ///
    /// - 填空题题干包含 `___`
    /// - 选择题有 3 到 5 个互不相同的选项
    /// - 正确答案必须来自本题的选项
    pub fn validate(&self) -> Result<(), QuestionDefect> {
        if self.question_text().trim().is_empty() {
            return Err(QuestionDefect::EmptyQuestionText);
        }

        match self {
            GeneratedQuestion::FillInTheBlank { question_text, .. } => {
                if !question_text.contains(BLANK_MARKER) {
                    return Err(QuestionDefect::MissingBlankMarker);
                }
                Ok(())
            }
            GeneratedQuestion::SingleChoice {
                options,
                correct_answer,
                ..
            } => {
                check_options(options)?;
                if !options.contains(correct_answer) {
                    return Err(QuestionDefect::AnswerNotInOptions(correct_answer.clone()));
                }
                Ok(())
            }
            GeneratedQuestion::MultipleChoice {
                options,
                correct_answers,
                ..
            } => {
                check_options(options)?;
                if correct_answers.is_empty() {
                    return Err(QuestionDefect::NoCorrectAnswer);
                }
                if let Some(missing) = correct_answers.iter().find(|a| !options.contains(a)) {
                    return Err(QuestionDefect::AnswerNotInOptions(missing.clone()));
                }
                Ok(())
            }
        }
    }
}

fn check_options(options: &[String]) -> Result<(), QuestionDefect> {
    if !(MIN_GENERATED_OPTIONS..=MAX_OPTIONS).contains(&options.len()) {
        return Err(QuestionDefect::OptionCount(options.len()));
    }
    for (i, option) in options.iter().enumerate() {
        if options[..i].contains(option) {
            return Err(QuestionDefect::DuplicateOption(option.clone()));
        }
    }
    Ok(())
}

/// 题目生成参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub lecture_content: String,
    pub number_of_questions: u32,
    pub difficulty: Difficulty,
    pub question_type: QuestionType,
}

impl GenerationRequest {
    pub fn new(lecture_content: impl Into<String>, question_type: QuestionType) -> Self {
        Self {
            lecture_content: lecture_content.into(),
            number_of_questions: 5,
            difficulty: Difficulty::default(),
            question_type,
        }
    }

    pub fn with_count(mut self, number_of_questions: u32) -> Self {
        self.number_of_questions = number_of_questions;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }
}
