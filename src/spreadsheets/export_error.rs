use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("XLSX error: {0}")]
    Xlsx(String),
}
