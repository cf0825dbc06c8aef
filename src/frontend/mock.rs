//! Host-free stand-ins for the page elements and the engine, used to drive
//! the bootstrap natively. Test support only; compiled with the `mock`
//! feature (on by default) or under `cfg(test)`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::errors::{EngineError, ReadError};
use crate::loader::{Engine, FileSelector, SelectedFile};
use crate::rom::Rom;

#[derive(Debug, Default)]
pub struct MockSelector {
    hide_calls: usize,
}

impl MockSelector {
    pub fn is_hidden(&self) -> bool {
        self.hide_calls > 0
    }

    pub fn hide_calls(&self) -> usize {
        self.hide_calls
    }
}

impl FileSelector for MockSelector {
    fn hide(&mut self) {
        self.hide_calls += 1;
    }
}

#[derive(Clone, Debug)]
pub struct MockFile {
    name: String,
    contents: Result<Vec<u8>, String>,
}

impl MockFile {
    pub fn new(name: &str, bytes: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            contents: Ok(bytes),
        }
    }

    /// A file whose read always fails with `reason`.
    pub fn unreadable(name: &str, reason: &str) -> Self {
        Self {
            name: name.to_string(),
            contents: Err(reason.to_string()),
        }
    }
}

impl SelectedFile for MockFile {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn size(&self) -> u64 {
        self.contents.as_ref().map_or(0, |bytes| bytes.len() as u64)
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, ReadError> {
        self.contents
            .clone()
            .map_err(|reason| ReadError::new(&self.name, reason))
    }
}

/// Engine that keeps every image it is given. Clones share the record, so a
/// test can keep one handle after the other is handed off.
#[derive(Clone, Debug, Default)]
pub struct RecordingEngine {
    received: Rc<RefCell<Vec<Rom>>>,
    fail_with: Option<String>,
}

impl RecordingEngine {
    /// Records images like the default engine, then reports `message` as a
    /// failure.
    pub fn failing(message: &str) -> Self {
        Self {
            received: Rc::default(),
            fail_with: Some(message.to_string()),
        }
    }

    pub fn received(&self) -> Vec<Rom> {
        self.received.borrow().clone()
    }
}

impl Engine for RecordingEngine {
    fn run(&mut self, rom: Rom) -> Result<(), EngineError> {
        self.received.borrow_mut().push(rom);
        match &self.fail_with {
            Some(message) => Err(EngineError(message.clone())),
            None => Ok(()),
        }
    }
}
