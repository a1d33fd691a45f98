use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    /// A clock token did not match `H+:MM:SS,mmm`.
    #[error("Invalid time code: '{token}'")]
    InvalidTimeCode { token: String },

    /// An SRT block failed structural scanning. `block` is the 1-based
    /// position of the block in the source.
    #[error("Invalid SRT block {block}: {reason}")]
    InvalidFormat {
        block: usize,
        reason: String,
        #[source]
        source: Option<Box<ParseError>>,
    },

    #[error("Failed to read subtitle source")]
    Io(#[from] std::io::Error),
}
