use thiserror::Error;

/// Failures while wiring the page up. All of them are fatal: the page is
/// malformed and there is no fallback surface or selector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BootError {
    #[error("no global `window` exists")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("no element with id `{0}`")]
    ElementNotFound(String),
    #[error("element `{id}` is not a {expected}")]
    WrongElement { id: String, expected: &'static str },
    #[error("2d drawing context unavailable on `{0}`")]
    ContextUnavailable(String),
    #[error("invalid boot configuration: {0}")]
    Config(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to read `{file}`: {reason}")]
pub struct ReadError {
    pub file: String,
    pub reason: String,
}

impl ReadError {
    pub fn new(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("engine failed: {0}")]
pub struct EngineError(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("no read in flight")]
    NoReadInFlight,
}

#[cfg(target_arch = "wasm32")]
mod js {
    use wasm_bindgen::{JsError, JsValue};

    use super::{BootError, LoadError};

    impl From<BootError> for JsValue {
        fn from(value: BootError) -> Self {
            JsError::new(&value.to_string()).into()
        }
    }

    impl From<LoadError> for JsValue {
        fn from(value: LoadError) -> Self {
            JsError::new(&value.to_string()).into()
        }
    }
}

#[test]
fn test_messages() {
    assert_eq!(
        BootError::ElementNotFound("display".into()).to_string(),
        "no element with id `display`"
    );
    assert_eq!(
        BootError::WrongElement { id: "rom_selector".into(), expected: "file input" }.to_string(),
        "element `rom_selector` is not a file input"
    );
    let err: LoadError = ReadError::new("pong.ch8", "NotReadableError").into();
    assert_eq!(err.to_string(), "failed to read `pong.ch8`: NotReadableError");
    let err: LoadError = EngineError("unreachable".into()).into();
    assert_eq!(err.to_string(), "engine failed: unreachable");
    assert_eq!(LoadError::NoReadInFlight.to_string(), "no read in flight");
}
