pub mod analysis;
pub mod editable;
pub mod file_info;
pub mod loaders;
pub mod question;

pub use analysis::{LectureAnalysisResult, LectureContentItem};
pub use editable::{EditableBody, EditableOption, EditableQuestionItem};
pub use file_info::{ContentKind, RawFile, UploadedFileInfo};
pub use loaders::{guess_mime_type, load_raw_file, load_raw_files};
pub use question::{Difficulty, GeneratedQuestion, GenerationRequest, QuestionDefect, QuestionType};
