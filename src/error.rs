//! Error types for the identity facade.
//!
//! There are no fatal errors in this crate: every failure degrades to
//! "capability passes through unmodified", because a visible exception is a
//! stronger detection signal than a missed override. The variants below
//! exist so call sites can log precisely and so the JS boundary gets a
//! readable message.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug, Clone)]
pub enum FacadeError {
    /// The supplied configuration object could not be deserialized.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The targeted native capability does not exist in this environment
    /// (e.g. WebGL2 on a browser without it). Tasks skip these silently.
    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(&'static str),
}

impl From<FacadeError> for JsValue {
    fn from(err: FacadeError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_stable() {
        assert_eq!(
            FacadeError::Config("bad mode".into()).to_string(),
            "Invalid configuration: bad mode"
        );
        assert_eq!(
            FacadeError::CapabilityUnavailable("WebGL2RenderingContext").to_string(),
            "Capability unavailable: WebGL2RenderingContext"
        );
    }
}
