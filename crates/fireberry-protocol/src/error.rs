//! Error types for registry payloads.

/// Errors raised while decoding payloads produced by this crate.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("build for component {id} is not valid base64: {source}")]
    InvalidBase64 {
        id: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("build for component {id} has digest {actual}, expected {expected}")]
    DigestMismatch {
        id: String,
        expected: String,
        actual: String,
    },
}
