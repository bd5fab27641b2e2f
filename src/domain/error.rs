use thiserror::Error;

/// PromptCom unified error type
#[derive(Error, Debug)]
pub enum PromptComError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Timed out waiting for terminator")]
    Timeout,

    #[error("Channel is not open")]
    ChannelClosed,

    #[error("Channel is already open")]
    ChannelAlreadyOpen,

    #[error("Unknown device: {0}")]
    UnknownDevice(String),
}

pub type PromptComResult<T> = Result<T, PromptComError>;
