pub mod file_loader;

pub use file_loader::{guess_mime_type, load_raw_file, load_raw_files};
