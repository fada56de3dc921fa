use std::result;

/// Error types for tui-proximity.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

pub type Result<T> = result::Result<T, Error>;
