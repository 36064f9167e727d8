pub mod analysis_client;
pub mod docx_reader;
pub mod extractor;
pub mod generation_client;
pub mod response_parser;

pub use analysis_client::AnalysisClient;
pub use extractor::{BatchExtraction, ContentExtractor, FileOutcome};
pub use generation_client::{DroppedQuestion, GenerationClient, GenerationOutcome};
