//! DOM bindings: the canvas surface, the file input, browser `File`s and a
//! JS function as the engine.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use js_sys::{Function, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::{CanvasRenderingContext2d, Document, File, HtmlCanvasElement, HtmlInputElement};

use crate::config::{BootConfig, Palette};
use crate::display::{PixelSurface, Rect, Shade};
use crate::errors::{BootError, EngineError, ReadError};
use crate::loader::{handle_selection, Engine, FileSelector, Loader, SelectedFile};
use crate::rom::Rom;

pub type WebLoader = Loader<InputSelector, JsEngine>;

fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    match value.dyn_ref::<js_sys::Error>() {
        Some(error) => format!("{}: {}", String::from(error.name()), String::from(error.message())),
        None => format!("{:?}", value),
    }
}

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    palette: Palette,
}

impl CanvasSurface {
    /// Find the canvas `config.surface_id`, size it to the logical display
    /// and take its 2d context.
    pub fn locate(document: &Document, config: &BootConfig) -> Result<Self, BootError> {
        let id = &config.surface_id;
        let canvas = document
            .get_element_by_id(id)
            .ok_or_else(|| BootError::ElementNotFound(id.clone()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| BootError::WrongElement { id: id.clone(), expected: "canvas" })?;
        canvas.set_width(config.width);
        canvas.set_height(config.height);

        let context = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|context| context.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| BootError::ContextUnavailable(id.clone()))?;

        Ok(Self {
            canvas,
            context,
            palette: config.palette.clone(),
        })
    }

    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.context
    }
}

impl PixelSurface for CanvasSurface {
    fn dimensions(&self) -> (usize, usize) {
        (self.canvas.width() as usize, self.canvas.height() as usize)
    }

    fn fill_rect(&mut self, rect: Rect, shade: Shade) {
        self.context.set_fill_style_str(self.palette.css(shade));
        self.context.fill_rect(
            rect.x as f64,
            rect.y as f64,
            rect.width as f64,
            rect.height as f64,
        );
    }
}

pub struct InputSelector {
    input: HtmlInputElement,
}

impl InputSelector {
    pub fn locate(document: &Document, id: &str) -> Result<Self, BootError> {
        let input = document
            .get_element_by_id(id)
            .ok_or_else(|| BootError::ElementNotFound(id.to_string()))?
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| BootError::WrongElement { id: id.to_string(), expected: "file input" })?;
        if input.type_() != "file" {
            return Err(BootError::WrongElement { id: id.to_string(), expected: "file input" });
        }
        Ok(Self { input })
    }

    pub fn element(&self) -> &HtmlInputElement {
        &self.input
    }

    /// Files currently selected, in selection order.
    fn selection(&self) -> Vec<WebFile> {
        match self.input.files() {
            Some(list) => (0..list.length()).filter_map(|i| list.get(i)).map(WebFile).collect(),
            None => vec![],
        }
    }
}

impl FileSelector for InputSelector {
    fn hide(&mut self) {
        self.input.set_hidden(true);
        self.input.set_disabled(true);
    }
}

pub struct WebFile(pub File);

impl SelectedFile for WebFile {
    fn name(&self) -> String {
        self.0.name()
    }

    fn size(&self) -> u64 {
        self.0.size() as u64
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, ReadError> {
        let buffer = JsFuture::from(self.0.array_buffer())
            .await
            .map_err(|err| ReadError::new(self.0.name(), describe(&err)))?;
        Ok(Uint8Array::new(&buffer).to_vec())
    }
}

/// A JS function taking a `Uint8Array`, such as the engine module's `run_emu`.
pub struct JsEngine {
    entry: Function,
}

impl JsEngine {
    pub fn new(entry: Function) -> Self {
        Self { entry }
    }
}

impl Engine for JsEngine {
    fn run(&mut self, rom: Rom) -> Result<(), EngineError> {
        let image = Uint8Array::from(rom.as_bytes());
        self.entry
            .call1(&JsValue::NULL, &image)
            .map(|_| ())
            .map_err(|err| EngineError(describe(&err)))
    }
}

/// Install the change listener on the loader's selector. The listener lives
/// for the rest of the page.
///
/// Each event is handled as a promise; a failed load rejects it, which the
/// browser reports as an unhandled rejection.
pub fn arm_selector(loader: Rc<RefCell<WebLoader>>) {
    let input = loader.borrow().selector().element().clone();
    let listener = EventListener::new(&input, "change", move |_event| {
        let files = loader.borrow().selector().selection();
        let loader = Rc::clone(&loader);
        let _ = future_to_promise(async move {
            handle_selection(&loader, files)
                .await
                .map(|()| JsValue::UNDEFINED)
                .map_err(JsValue::from)
        });
    });
    listener.forget();
}

/// Blank the display and arm the loader. Call once from the page script,
/// passing the engine's entry point and an optional config object.
#[wasm_bindgen(js_name = bootstrap)]
pub fn start(engine: Function, config: JsValue) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let config: BootConfig = if config.is_undefined() || config.is_null() {
        BootConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(|err| BootError::Config(err.to_string()))?
    };
    // Only the first call can install the logger.
    let _ = console_log::init_with_level(config.log_level()?);

    let document = web_sys::window()
        .ok_or(BootError::NoWindow)?
        .document()
        .ok_or(BootError::NoDocument)?;
    let mut surface = CanvasSurface::locate(&document, &config)?;
    let selector = InputSelector::locate(&document, &config.selector_id)?;

    let loader = crate::bootstrap(&mut surface, selector, JsEngine::new(engine));
    arm_selector(Rc::new(RefCell::new(loader)));
    log::info!("waiting for a rom on `#{}`", config.selector_id);
    Ok(())
}
