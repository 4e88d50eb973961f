use std::error::Error as StdError;

use thiserror::Error;

/// Unified error type for the tile post-processing core.
#[derive(Error, Debug)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("datasource error: {0}")]
    Datasource(#[source] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn datasource(source: impl StdError + Send + Sync + 'static) -> Self {
        Error::Datasource(Box::new(source))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
