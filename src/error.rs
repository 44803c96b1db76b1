use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MelaninError>;

#[derive(Error, Debug)]
pub enum MelaninError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed: {url}")]
    DownloadError { url: String },

    #[error("Extraction failed: {path}")]
    ExtractionError { path: PathBuf },

    #[error("Installation cancelled")]
    Cancelled,

    #[error("{software} installation did not complete")]
    InstallFailed { software: String },

    #[error("{software} is already being installed")]
    AlreadyInstalling { software: String },

    #[error(
        "Insufficient disk space: {available_gb:.2} GB available, need at least {required_gb} GB"
    )]
    InsufficientSpace { available_gb: f64, required_gb: u64 },

    #[error("Binary not found: {name}")]
    BinaryNotFound { name: String },

    #[error("Failed to start process: {message}")]
    ProcessError { message: String },

    #[error("Node not responding: {output}")]
    StatusError { output: String },

    #[error("Invalid address: '{address}'")]
    InvalidAddress { address: String },

    #[error("Missing input: {name}")]
    MissingInput { name: String },

    #[error("Unknown mining pool: '{name}'")]
    UnknownPool { name: String },

    #[error("Prompt error: {message}")]
    Prompt { message: String },

    #[error("No suitable terminal emulator found")]
    TerminalNotFound,

    #[error("Home directory not found")]
    HomeDirectoryNotFound,
}

impl MelaninError {
    pub fn process_error<S: Into<String>>(message: S) -> Self {
        MelaninError::ProcessError {
            message: message.into(),
        }
    }
}
