use std::cell::RefCell;
use std::future::Future;

use crate::errors::{EngineError, LoadError, ReadError};
use crate::rom::Rom;

/// The one-shot control the user picks a program with.
pub trait FileSelector {
    /// Hide and disable the control. Never undone.
    fn hide(&mut self);
}

/// A file handed over by the selector. Only its bytes are interpreted.
pub trait SelectedFile {
    fn name(&self) -> String;
    fn size(&self) -> u64;
    /// Read the whole file as raw bytes.
    fn read_bytes(&self) -> impl Future<Output = Result<Vec<u8>, ReadError>>;
}

/// The emulation engine's single entry point. Takes ownership of the image
/// and, from then on, of the surface.
pub trait Engine {
    fn run(&mut self, rom: Rom) -> Result<(), EngineError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectorState {
    Armed,
    Hidden,
}

/// Bridges selection events to the engine. Loads exactly one program per
/// page lifetime.
#[derive(Debug)]
pub struct Loader<S, E> {
    selector: S,
    engine: Option<E>,
    state: SelectorState,
    reading: bool,
}

/// An image paired with the engine it goes to. Produced once per loader.
#[derive(Debug)]
pub struct Handoff<E> {
    rom: Rom,
    engine: E,
}

impl<E: Engine> Handoff<E> {
    pub fn rom(&self) -> &Rom {
        &self.rom
    }

    /// Call the engine's entry point, giving it the image.
    pub fn start(mut self) -> Result<(), EngineError> {
        log::info!("starting engine with {} byte image", self.rom.len());
        self.engine.run(self.rom)
    }
}

pub fn arm_loader<S: FileSelector, E: Engine>(selector: S, engine: E) -> Loader<S, E> {
    log::debug!("rom loader armed");
    Loader {
        selector,
        engine: Some(engine),
        state: SelectorState::Armed,
        reading: false,
    }
}

impl<S: FileSelector, E: Engine> Loader<S, E> {
    pub fn state(&self) -> SelectorState {
        self.state
    }

    pub fn is_reading(&self) -> bool {
        self.reading
    }

    pub fn selector(&self) -> &S {
        &self.selector
    }

    /// The engine, until it has been handed off.
    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    /// Pick the file a change event should read, if any, and mark the read
    /// as in flight. Only the first file of the selection is considered.
    pub fn begin_read<F: SelectedFile>(&mut self, files: impl IntoIterator<Item = F>) -> Option<F> {
        if self.state == SelectorState::Hidden {
            log::debug!("selector already used, ignoring change event");
            return None;
        }
        if self.reading {
            log::debug!("read already in flight, ignoring change event");
            return None;
        }
        let Some(file) = files.into_iter().next() else {
            log::debug!("empty selection");
            return None;
        };
        log::debug!("reading `{}` ({} bytes)", file.name(), file.size());
        self.reading = true;
        Some(file)
    }

    /// Finish a read started by `begin_read`: hide the selector and release
    /// the image together with the engine.
    ///
    /// A failed read leaves the selector armed so the user can try again.
    /// Without a read in flight nothing changes and `NoReadInFlight` is
    /// returned.
    pub fn complete_read(&mut self, result: Result<Vec<u8>, ReadError>) -> Result<Handoff<E>, LoadError> {
        if !self.reading {
            return Err(LoadError::NoReadInFlight);
        }
        self.reading = false;
        let rom = match result {
            Ok(bytes) => Rom::from(bytes),
            Err(err) => {
                log::error!("{}", err);
                return Err(err.into());
            }
        };
        let engine = self.engine.take().ok_or(LoadError::NoReadInFlight)?;
        if !rom.fits_in_memory() {
            log::warn!(
                "image is {} bytes, larger than the {} bytes of program memory",
                rom.len(),
                Rom::MAX_PROGRAM_LEN
            );
        }
        log::trace!("image head:\n{}", rom.hexdump(32));

        self.selector.hide();
        self.state = SelectorState::Hidden;
        Ok(Handoff { rom, engine })
    }
}

/// Handle one change event end to end: pick the file, read it, hand it over.
///
/// `loader` is only borrowed while its state changes, never across the read
/// or while the engine runs, so further events may arrive at any point.
/// The selector is hidden before the engine starts; an engine failure still
/// consumes the one load.
pub async fn handle_selection<S, E, F>(
    loader: &RefCell<Loader<S, E>>,
    files: impl IntoIterator<Item = F>,
) -> Result<(), LoadError>
where
    S: FileSelector,
    E: Engine,
    F: SelectedFile,
{
    let file = loader.borrow_mut().begin_read(files);
    let Some(file) = file else {
        return Ok(());
    };
    let result = file.read_bytes().await;
    let handoff = loader.borrow_mut().complete_read(result)?;
    handoff.start()?;
    Ok(())
}

#[cfg(test)]
use crate::frontend::mock::{MockFile, MockSelector, RecordingEngine};

#[test]
fn test_begin_read_takes_first_file() {
    let mut loader = arm_loader(MockSelector::default(), RecordingEngine::default());
    let file = loader.begin_read(vec![MockFile::new("a.ch8", vec![1]), MockFile::new("b.ch8", vec![2])]);
    assert_eq!(file.map(|f| f.name()), Some("a.ch8".to_string()));
    assert!(loader.is_reading());
    assert_eq!(loader.state(), SelectorState::Armed);
}

#[test]
fn test_begin_read_empty_selection() {
    let mut loader = arm_loader(MockSelector::default(), RecordingEngine::default());
    assert!(loader.begin_read(Vec::<MockFile>::new()).is_none());
    assert!(!loader.is_reading());
    assert_eq!(loader.state(), SelectorState::Armed);
}

#[test]
fn test_begin_read_while_reading() {
    let mut loader = arm_loader(MockSelector::default(), RecordingEngine::default());
    assert!(loader.begin_read(vec![MockFile::new("a.ch8", vec![1])]).is_some());
    assert!(loader.begin_read(vec![MockFile::new("b.ch8", vec![2])]).is_none());
}

#[test]
fn test_complete_read_hands_over() {
    let engine = RecordingEngine::default();
    let mut loader = arm_loader(MockSelector::default(), engine.clone());
    loader.begin_read(vec![MockFile::new("a.ch8", vec![0x00])]);
    let handoff = loader.complete_read(Ok(vec![0x00])).unwrap();
    assert_eq!(loader.state(), SelectorState::Hidden);
    assert!(loader.selector().is_hidden());
    assert!(loader.engine().is_none());
    assert!(engine.received().is_empty());

    assert_eq!(handoff.rom(), &Rom::from(vec![0x00]));
    assert_eq!(handoff.start(), Ok(()));
    assert_eq!(engine.received(), vec![Rom::from(vec![0x00])]);
    assert!(loader.begin_read(vec![MockFile::new("b.ch8", vec![2])]).is_none());
}

#[test]
fn test_complete_read_runs_once() {
    let engine = RecordingEngine::default();
    let mut loader = arm_loader(MockSelector::default(), engine.clone());
    loader.begin_read(vec![MockFile::new("a.ch8", vec![1])]);
    loader.complete_read(Ok(vec![1])).unwrap().start().unwrap();

    assert_eq!(loader.complete_read(Ok(vec![2])).err(), Some(LoadError::NoReadInFlight));
    assert_eq!(loader.state(), SelectorState::Hidden);
    assert_eq!(loader.selector().hide_calls(), 1);
    assert_eq!(engine.received(), vec![Rom::from(vec![1])]);
}

#[test]
fn test_complete_read_without_begin() {
    let engine = RecordingEngine::default();
    let mut loader = arm_loader(MockSelector::default(), engine.clone());
    assert_eq!(loader.complete_read(Ok(vec![1])).err(), Some(LoadError::NoReadInFlight));
    assert_eq!(loader.state(), SelectorState::Armed);
    assert!(loader.engine().is_some());
    assert!(!loader.selector().is_hidden());
}

#[test]
fn test_complete_read_failure_rearms() {
    let engine = RecordingEngine::default();
    let mut loader = arm_loader(MockSelector::default(), engine.clone());
    loader.begin_read(vec![MockFile::new("a.ch8", vec![1])]);
    let err = ReadError::new("a.ch8", "NotReadableError");
    assert_eq!(loader.complete_read(Err(err.clone())).err(), Some(LoadError::Read(err)));
    assert_eq!(loader.state(), SelectorState::Armed);
    assert!(!loader.is_reading());
    assert!(!loader.selector().is_hidden());
    assert!(loader.engine().is_some());
    assert!(engine.received().is_empty());
}

#[test]
fn test_engine_failure_still_hides() {
    let mut loader = arm_loader(MockSelector::default(), RecordingEngine::failing("bad opcode"));
    loader.begin_read(vec![MockFile::new("a.ch8", vec![1])]);
    let handoff = loader.complete_read(Ok(vec![1])).unwrap();
    assert_eq!(handoff.start(), Err(EngineError("bad opcode".into())));
    assert_eq!(loader.state(), SelectorState::Hidden);
    assert_eq!(loader.selector().hide_calls(), 1);
}
