//! 题目编辑器 - 流程层
//!
//! 持有本轮生成的全部可编辑题目，负责选择、编辑、删除和导出

use tracing::{debug, info};

use crate::error::{EditError, ExportError};
use crate::models::editable::EditableQuestionItem;
use crate::models::question::GeneratedQuestion;
use crate::workflow::export::{export_questions, ExportArtifact};
use crate::workflow::question_edit::{Applied, EditOutcome, QuestionEdit};

/// 可编辑题目列表
///
/// - 题目顺序即生成顺序
/// - 每次编辑都通过 `EditableQuestionItem::apply` 产生新记录再替换
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionEditor {
    items: Vec<EditableQuestionItem>,
}

impl QuestionEditor {
    pub fn from_generated(questions: Vec<GeneratedQuestion>) -> Self {
        let mut editor = Self::default();
        editor.extend_generated(questions);
        editor
    }

    /// 追加一批生成的题目
    pub fn extend_generated(&mut self, questions: Vec<GeneratedQuestion>) {
        self.items
            .extend(questions.into_iter().map(EditableQuestionItem::from_generated));
    }

    pub fn items(&self) -> &[EditableQuestionItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&EditableQuestionItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selected_count(&self) -> usize {
        self.items.iter().filter(|item| item.selected).count()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn index_of(&self, id: &str) -> Result<usize, EditError> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| EditError::QuestionNotFound { id: id.to_string() })
    }

    /// 对一道题目应用编辑
    pub fn update(&mut self, id: &str, edit: QuestionEdit) -> Result<EditOutcome, EditError> {
        let index = self.index_of(id)?;
        match self.items[index].apply(&edit)? {
            Applied::Updated(next) => {
                debug!("题目 {} 已{}", id, edit.name());
                self.items[index] = next;
                Ok(EditOutcome::Applied)
            }
            Applied::Rejected(notice) => {
                info!("⚠️ 忽略{}: {}", edit.name(), notice);
                Ok(EditOutcome::Rejected(notice))
            }
        }
    }

    pub fn add_option(&mut self, id: &str) -> Result<EditOutcome, EditError> {
        self.update(id, QuestionEdit::AddOption)
    }

    pub fn remove_option(&mut self, id: &str, option_id: &str) -> Result<EditOutcome, EditError> {
        self.update(
            id,
            QuestionEdit::RemoveOption {
                option_id: option_id.to_string(),
            },
        )
    }

    pub fn toggle_selected(&mut self, id: &str, selected: bool) -> Result<(), EditError> {
        self.update(id, QuestionEdit::SetSelected(selected))
            .map(|_| ())
    }

    pub fn select_all(&mut self, selected: bool) {
        for item in &mut self.items {
            item.selected = selected;
        }
    }

    /// 删除题目，返回被删除的记录
    pub fn delete(&mut self, id: &str) -> Result<EditableQuestionItem, EditError> {
        let index = self.index_of(id)?;
        Ok(self.items.remove(index))
    }

    /// 选中的题目（导出格式）
    pub fn selected_questions(&self) -> Vec<GeneratedQuestion> {
        self.items
            .iter()
            .filter(|item| item.selected)
            .map(EditableQuestionItem::to_generated)
            .collect()
    }

    pub fn export_selected(&self) -> Result<ExportArtifact, ExportError> {
        let questions = self.selected_questions();
        info!("📤 导出 {} / {} 道题目", questions.len(), self.len());
        export_questions(questions)
    }
}
