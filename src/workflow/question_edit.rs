//! 单道题目的编辑操作
//!
//! 每个编辑是一个 `QuestionEdit` 值，`EditableQuestionItem::apply` 是纯函数：
//! 输入旧记录和编辑，返回新记录，不修改原记录。

use std::fmt;

use crate::error::EditError;
use crate::models::editable::{EditableBody, EditableOption, EditableQuestionItem};
use crate::models::question::MAX_OPTIONS;

/// 编辑器中选择题至少保留的选项数
pub const MIN_EDITABLE_OPTIONS: usize = 2;

/// 新增选项的占位文字前缀
const OPTION_PLACEHOLDER: &str = "新选项";

/// 对单道题目的一次编辑
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionEdit {
    SetQuestionText(String),
    SetSelected(bool),
    /// 填空题答案
    SetBlankAnswer(String),
    /// 修改选项文字，已记录的正确答案随之更新
    SetOptionText { option_id: String, text: String },
    /// 单选题：设为正确答案
    SetCorrectOption { option_id: String },
    /// 多选题：勾选 / 取消勾选正确答案
    ToggleCorrectOption { option_id: String, checked: bool },
    AddOption,
    RemoveOption { option_id: String },
    /// 还原为生成时的内容
    Reset,
}

impl QuestionEdit {
    pub fn name(&self) -> &'static str {
        match self {
            QuestionEdit::SetQuestionText(_) => "修改题干",
            QuestionEdit::SetSelected(_) => "选择题目",
            QuestionEdit::SetBlankAnswer(_) => "修改填空答案",
            QuestionEdit::SetOptionText { .. } => "修改选项",
            QuestionEdit::SetCorrectOption { .. } => "设置正确选项",
            QuestionEdit::ToggleCorrectOption { .. } => "勾选正确选项",
            QuestionEdit::AddOption => "添加选项",
            QuestionEdit::RemoveOption { .. } => "删除选项",
            QuestionEdit::Reset => "重置",
        }
    }
}

/// 编辑被忽略时给用户的提示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditNotice {
    MaxOptionsReached,
    MinOptionsReached,
}

impl fmt::Display for EditNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditNotice::MaxOptionsReached => write!(f, "最多只能有 {} 个选项", MAX_OPTIONS),
            EditNotice::MinOptionsReached => {
                write!(f, "至少需要保留 {} 个选项", MIN_EDITABLE_OPTIONS)
            }
        }
    }
}

/// `apply` 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Updated(EditableQuestionItem),
    /// 编辑被忽略，记录不变
    Rejected(EditNotice),
}

/// 编辑器对外返回的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    Rejected(EditNotice),
}

fn position(options: &[EditableOption], option_id: &str) -> Option<usize> {
    options.iter().position(|o| o.id == option_id)
}

impl EditableQuestionItem {
    /// 应用一次编辑，返回新记录（id 和题型保持不变）
    pub fn apply(&self, edit: &QuestionEdit) -> Result<Applied, EditError> {
        let mut next = self.clone();

        match edit {
            QuestionEdit::SetQuestionText(text) => next.edited_question_text = text.clone(),

            QuestionEdit::SetSelected(selected) => next.selected = *selected,

            QuestionEdit::SetBlankAnswer(answer) => match &mut next.body {
                EditableBody::FillInTheBlank {
                    edited_correct_answer,
                } => *edited_correct_answer = answer.clone(),
                _ => return Err(self.unsupported(edit)),
            },

            QuestionEdit::SetOptionText { option_id, text } => match &mut next.body {
                EditableBody::SingleChoice {
                    edited_options,
                    edited_correct_answer,
                } => {
                    let index = position(edited_options, option_id)
                        .ok_or_else(|| self.option_not_found(option_id))?;
                    let old = std::mem::replace(&mut edited_options[index].text, text.clone());
                    if *edited_correct_answer == old {
                        *edited_correct_answer = text.clone();
                    }
                }
                EditableBody::MultipleChoice {
                    edited_options,
                    edited_correct_answers,
                } => {
                    let index = position(edited_options, option_id)
                        .ok_or_else(|| self.option_not_found(option_id))?;
                    let old = std::mem::replace(&mut edited_options[index].text, text.clone());
                    for answer in edited_correct_answers.iter_mut().filter(|a| **a == old) {
                        *answer = text.clone();
                    }
                }
                EditableBody::FillInTheBlank { .. } => return Err(self.unsupported(edit)),
            },

            QuestionEdit::SetCorrectOption { option_id } => match &mut next.body {
                EditableBody::SingleChoice {
                    edited_options,
                    edited_correct_answer,
                } => {
                    let index = position(edited_options, option_id)
                        .ok_or_else(|| self.option_not_found(option_id))?;
                    *edited_correct_answer = edited_options[index].text.clone();
                }
                _ => return Err(self.unsupported(edit)),
            },

            QuestionEdit::ToggleCorrectOption { option_id, checked } => match &mut next.body {
                EditableBody::MultipleChoice {
                    edited_options,
                    edited_correct_answers,
                } => {
                    let index = position(edited_options, option_id)
                        .ok_or_else(|| self.option_not_found(option_id))?;
                    let text = &edited_options[index].text;
                    let present = edited_correct_answers.contains(text);
                    if *checked && !present {
                        edited_correct_answers.push(text.clone());
                    } else if !*checked {
                        edited_correct_answers.retain(|a| a != text);
                    }
                }
                _ => return Err(self.unsupported(edit)),
            },

            QuestionEdit::AddOption => match &mut next.body {
                EditableBody::SingleChoice { edited_options, .. }
                | EditableBody::MultipleChoice { edited_options, .. } => {
                    if edited_options.len() >= MAX_OPTIONS {
                        return Ok(Applied::Rejected(EditNotice::MaxOptionsReached));
                    }
                    let label = format!("{} {}", OPTION_PLACEHOLDER, edited_options.len() + 1);
                    edited_options.push(EditableOption::new(label));
                }
                EditableBody::FillInTheBlank { .. } => return Err(self.unsupported(edit)),
            },

            QuestionEdit::RemoveOption { option_id } => match &mut next.body {
                EditableBody::SingleChoice {
                    edited_options,
                    edited_correct_answer,
                } => {
                    let index = position(edited_options, option_id)
                        .ok_or_else(|| self.option_not_found(option_id))?;
                    if edited_options.len() <= MIN_EDITABLE_OPTIONS {
                        return Ok(Applied::Rejected(EditNotice::MinOptionsReached));
                    }
                    let removed = edited_options.remove(index);
                    if *edited_correct_answer == removed.text {
                        // 正确答案被删除时改为第一个剩余选项
                        *edited_correct_answer = edited_options
                            .first()
                            .map(|o| o.text.clone())
                            .unwrap_or_default();
                    }
                }
                EditableBody::MultipleChoice {
                    edited_options,
                    edited_correct_answers,
                } => {
                    let index = position(edited_options, option_id)
                        .ok_or_else(|| self.option_not_found(option_id))?;
                    if edited_options.len() <= MIN_EDITABLE_OPTIONS {
                        return Ok(Applied::Rejected(EditNotice::MinOptionsReached));
                    }
                    let removed = edited_options.remove(index);
                    edited_correct_answers.retain(|a| *a != removed.text);
                }
                EditableBody::FillInTheBlank { .. } => return Err(self.unsupported(edit)),
            },

            QuestionEdit::Reset => {
                next.edited_question_text = self.original.question_text().to_string();
                next.body = Self::body_from(&self.original);
            }
        }

        Ok(Applied::Updated(next))
    }

    fn unsupported(&self, edit: &QuestionEdit) -> EditError {
        EditError::UnsupportedEdit {
            question_type: self.question_type().to_string(),
            edit: edit.name(),
        }
    }

    fn option_not_found(&self, option_id: &str) -> EditError {
        EditError::OptionNotFound {
            question_id: self.id.clone(),
            option_id: option_id.to_string(),
        }
    }
}
