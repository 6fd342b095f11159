pub mod json;

pub use json::{JsonFileStore, export_history_to_path, import_history};
