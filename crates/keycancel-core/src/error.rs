use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("line {line}: unknown keycode `{name}`")]
    UnknownKeycode { line: usize, name: String },

    #[error("line {line}: expected `PRESS -> UNPRESS` or `A <-> B`, got `{text}`")]
    MalformedPair { line: usize, text: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
