mod json;

pub use json::{export_json, ExportOptions};
