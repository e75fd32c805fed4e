use thiserror::Error;

#[derive(Error, Debug)]
pub enum MunimError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No daybook configured. Run `munim load <file>` or pass --file.")]
    NoDaybook,

    #[error("Daybook not found: {0}")]
    MissingDaybook(String),

    #[error("Daybook is empty: {0}")]
    EmptyDaybook(String),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Unknown company: {0}")]
    UnknownCompany(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MunimError>;
