use crate::device::ParseKeyError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to parse {0:?} as a valid public key and peer name")]
    InvalidPair(String),
    #[error("invalid public key {key:?}: {source}")]
    InvalidKey { key: String, source: ParseKeyError },
    #[error("no name set for peer with public key {0:?}")]
    EmptyName(String),
    #[error("line {line}: {source}")]
    Line { line: usize, source: Box<Error> },
    #[error(r#"invalid syntax, expected "<PUBKEY> <name>""#)]
    InvalidSyntax,
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}
