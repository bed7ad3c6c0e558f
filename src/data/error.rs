use thiserror::Error;

/// Failures that prevent a report document from loading at all.
///
/// Malformed entries deeper in the tree are not errors; the loader skips them.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("reading report file: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing report JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("report has no \"data\" object")]
    MissingData,
    #[error("report meta is missing measurement name \"{key}\"")]
    MissingMeta { key: &'static str },
    #[error("expected a JSON object at {path}")]
    NotAnObject { path: String },
}
