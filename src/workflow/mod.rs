pub mod export;
pub mod question_edit;
pub mod question_editor;

pub use export::{export_questions, ExportArtifact, ExportDocument};
pub use question_edit::{Applied, EditNotice, EditOutcome, QuestionEdit};
pub use question_editor::QuestionEditor;
