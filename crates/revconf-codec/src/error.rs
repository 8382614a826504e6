use revconf_types::ConfigValue;
use thiserror::Error;

/// Errors from encoding or decoding configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Every encoding strategy was exhausted without a verified round-trip.
    #[error("no encoding strategy could represent value {value:?}")]
    Unencodable { value: ConfigValue },

    /// Stored property text failed to decode.
    #[error("undecodable property text {text:?}: {reason}")]
    Undecodable { text: String, reason: String },
}

/// Convenience type alias for codec operations.
pub type CodecResult<T> = std::result::Result<T, CodecError>;
