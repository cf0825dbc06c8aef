//! Page bootstrap for a CHIP-8 emulator running in the browser: blank the
//! display, wait for the user to pick a ROM, and hand its bytes to the
//! emulation engine.

pub mod config;
pub mod display;
pub mod errors;
pub mod frontend;
pub mod loader;
pub mod rom;

pub use config::{BootConfig, Palette};
pub use display::{initialize_display, Framebuffer, PixelSurface, Rect, Shade, DISPLAY_COLUMNS, DISPLAY_ROWS};
pub use errors::{BootError, EngineError, LoadError, ReadError};
pub use loader::{arm_loader, handle_selection, Engine, FileSelector, Handoff, Loader, SelectedFile, SelectorState};
pub use rom::Rom;

/// Blank `surface`, then arm a loader that will start `engine` with the first
/// program picked on `selector`.
pub fn bootstrap<P, S, E>(surface: &mut P, selector: S, engine: E) -> Loader<S, E>
where
    P: PixelSurface + ?Sized,
    S: FileSelector,
    E: Engine,
{
    initialize_display(surface);
    arm_loader(selector, engine)
}
