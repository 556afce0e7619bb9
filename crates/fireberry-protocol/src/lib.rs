//! Fireberry registry payloads
//!
//! Defines the JSON bodies the CLI hands to the app registry. Nothing in this
//! crate performs I/O; callers own delivery.

pub mod error;
pub mod request;

pub use error::ProtocolError;
pub use request::{ComponentBuild, DebugRequest, PushRequest};

/// Archive format advertised for every component build.
pub const BUILD_FORMAT: &str = "tar+gzip";

/// Version of the payload layout produced by this crate.
pub const PAYLOAD_VERSION: u32 = 1;
