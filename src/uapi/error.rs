#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid protocol")]
    InvalidProtocol,
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("device returned errno {0}")]
    Errno(i64),
    #[error("no response within {0:?}")]
    Timeout(std::time::Duration),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}
