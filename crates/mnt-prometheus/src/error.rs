use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("metric registration failed: {0}")]
    Registration(#[from] prometheus::Error),
    #[error("metrics text is not valid utf-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}
