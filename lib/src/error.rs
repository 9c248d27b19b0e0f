use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("identifier type `{id_type}` is not in the chromosome category")]
    IncompatibleIdType { id_type: String },

    #[error("cannot map between `{from}` and `{to}`: different categories")]
    CrossCategoryMapping { from: String, to: String },

    #[error("unknown identifier type: {0}")]
    UnknownIdType(String),

    #[error("none of the identifiers are located on a known chromosome")]
    NoDefaultChromosome,

    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn parse(
        path: impl Into<PathBuf>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}
