use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}.")]
    Io(#[from] std::io::Error),

    #[error("Templates require a non-empty name.")]
    MissingName,

    #[error("{0} is not a primitive value.")]
    NotPrimitive(String),

    #[error("Segment count must exceed value count by one: got {segments} segments and {values} values.")]
    Arity { segments: usize, values: usize },

    /// Malformed placeholder expression in a file-backed template.
    #[error("Syntax error in template '{path}' at offset {offset}: {message}.")]
    Syntax { path: String, offset: usize, message: String },

    /// A placeholder path that no scope could resolve.
    #[error("Reference '{name}' not found while rendering '{template}'.")]
    ReferenceNotFound { name: String, template: String },
}

/// Convenience type alias for Results with this crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
