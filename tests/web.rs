#![cfg(target_arch = "wasm32")]

wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

use chip8_boot::frontend::web::{start, CanvasSurface, InputSelector, JsEngine, WebFile};
use chip8_boot::{initialize_display, BootConfig, BootError, Engine, FileSelector, Rom, SelectedFile};
use js_sys::{Array, Function, Promise, Reflect, Uint8Array, JSON};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::wasm_bindgen_test;
use web_sys::{CanvasRenderingContext2d, DataTransfer, Document, Event, File, HtmlCanvasElement, HtmlInputElement};

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn add_element(tag: &str, id: &str) -> web_sys::Element {
    let document = document();
    if let Some(old) = document.get_element_by_id(id) {
        old.remove();
    }
    let element = document.create_element(tag).unwrap();
    element.set_id(id);
    document.body().unwrap().append_child(&element).unwrap();
    element
}

#[wasm_bindgen_test]
fn canvas_is_blanked_white() {
    add_element("canvas", "display");
    let mut surface = CanvasSurface::locate(&document(), &BootConfig::default()).unwrap();
    initialize_display(&mut surface);

    let data = surface.context().get_image_data(0.0, 0.0, 64.0, 32.0).unwrap().data();
    assert_eq!(data.len(), 64 * 32 * 4);
    assert!(data.iter().all(|channel| *channel == 0xff));
}

#[wasm_bindgen_test]
fn missing_or_wrong_elements_are_fatal() {
    let config = BootConfig::default().surface_id("no-such-canvas");
    assert_eq!(
        CanvasSurface::locate(&document(), &config).err(),
        Some(BootError::ElementNotFound("no-such-canvas".into()))
    );

    add_element("div", "not-a-canvas");
    let config = BootConfig::default().surface_id("not-a-canvas");
    assert!(matches!(
        CanvasSurface::locate(&document(), &config),
        Err(BootError::WrongElement { .. })
    ));

    let text = add_element("input", "text-input").dyn_into::<HtmlInputElement>().unwrap();
    text.set_type("text");
    assert!(matches!(
        InputSelector::locate(&document(), "text-input"),
        Err(BootError::WrongElement { .. })
    ));
}

#[wasm_bindgen_test]
fn selector_hides_for_good() {
    let input = add_element("input", "rom_selector").dyn_into::<HtmlInputElement>().unwrap();
    input.set_type("file");
    let mut selector = InputSelector::locate(&document(), "rom_selector").unwrap();
    assert!(!input.hidden());
    selector.hide();
    assert!(input.hidden());
    assert!(input.disabled());
}

#[wasm_bindgen_test]
fn js_engine_receives_the_bytes() {
    let entry = Function::new_with_args("rom", "globalThis.__chip8_rom = rom;");
    let mut engine = JsEngine::new(entry);
    engine.run(Rom::from(vec![0x00, 0xe0, 0xa2, 0x2a])).unwrap();

    let received = Reflect::get(&js_sys::global(), &JsValue::from_str("__chip8_rom")).unwrap();
    let received = received.dyn_into::<Uint8Array>().unwrap();
    assert_eq!(received.to_vec(), vec![0x00, 0xe0, 0xa2, 0x2a]);
}

#[wasm_bindgen_test]
fn js_engine_failure_is_reported() {
    let entry = Function::new_with_args("rom", "throw new Error('rom too large: ' + rom.length);");
    let mut engine = JsEngine::new(entry);
    let err = engine.run(Rom::from(vec![0; 5000])).unwrap_err();
    assert_eq!(err.0, "Error: rom too large: 5000");
}

fn make_file(bytes: &[u8], name: &str) -> File {
    let parts = Array::of1(&Uint8Array::from(bytes));
    File::new_with_u8_array_sequence(&parts, name).unwrap()
}

/// Put `file` in the input's selection and fire `change`, as a file picker
/// would.
fn select(input: &HtmlInputElement, file: Option<File>) {
    let transfer = DataTransfer::new().unwrap();
    if let Some(file) = file {
        transfer.items().add_with_file(&file).unwrap();
    }
    input.set_files(Some(&transfer.files()));
    input.dispatch_event(&Event::new("change").unwrap()).unwrap();
}

async fn sleep(ms: i32) {
    let promise = Promise::new(&mut |resolve, _reject| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

/// Engine function appending every image it gets to `globalThis[key]`.
fn recording_engine(key: &str) -> Function {
    Function::new_with_args(
        "rom",
        &format!("(globalThis.{key} = globalThis.{key} || []).push(rom);"),
    )
}

fn recorded(key: &str) -> Vec<Vec<u8>> {
    let value = Reflect::get(&js_sys::global(), &JsValue::from_str(key)).unwrap();
    if value.is_undefined() {
        return vec![];
    }
    value
        .dyn_into::<Array>()
        .unwrap()
        .iter()
        .map(|rom| rom.dyn_into::<Uint8Array>().unwrap().to_vec())
        .collect()
}

async fn wait_for_records(key: &str, count: usize) {
    for _ in 0..100 {
        if recorded(key).len() >= count {
            return;
        }
        sleep(10).await;
    }
}

fn pixel(canvas: &HtmlCanvasElement, x: f64, y: f64) -> Vec<u8> {
    let context = canvas
        .get_context("2d")
        .unwrap()
        .unwrap()
        .dyn_into::<CanvasRenderingContext2d>()
        .unwrap();
    context.get_image_data(x, y, 1.0, 1.0).unwrap().data().to_vec()
}

fn error_message(value: JsValue) -> String {
    String::from(value.dyn_into::<js_sys::Error>().unwrap().message())
}

#[wasm_bindgen_test]
async fn web_file_reads_raw_bytes() {
    let bytes: Vec<u8> = (0..3584).map(|i| (i % 251) as u8).collect();
    let file = WebFile(make_file(&bytes, "maze.ch8"));
    assert_eq!(file.name(), "maze.ch8");
    assert_eq!(file.size(), 3584);
    assert_eq!(file.read_bytes().await.unwrap(), bytes);

    let empty = WebFile(make_file(&[], "empty.ch8"));
    assert_eq!(empty.read_bytes().await.unwrap(), Vec::<u8>::new());
}

#[wasm_bindgen_test]
async fn change_event_starts_engine_once() {
    let canvas = add_element("canvas", "boot-display").dyn_into::<HtmlCanvasElement>().unwrap();
    let input = add_element("input", "boot-selector").dyn_into::<HtmlInputElement>().unwrap();
    input.set_type("file");
    let config = JSON::parse(
        r#"{"surfaceId": "boot-display", "selectorId": "boot-selector", "palette": {"foreground": "lime"}, "logLevel": "debug"}"#,
    )
    .unwrap();

    start(recording_engine("__boot_once"), config).unwrap();
    assert_eq!((canvas.width(), canvas.height()), (64, 32));
    assert_eq!(pixel(&canvas, 0.0, 0.0), vec![0, 255, 0, 255]);
    assert_eq!(pixel(&canvas, 63.0, 31.0), vec![0, 255, 0, 255]);

    select(&input, None);
    sleep(20).await;
    assert!(recorded("__boot_once").is_empty());
    assert!(!input.hidden());

    let image: Vec<u8> = (0..=255).collect();
    select(&input, Some(make_file(&image, "all-bytes.ch8")));
    wait_for_records("__boot_once", 1).await;
    assert_eq!(recorded("__boot_once"), vec![image.clone()]);
    assert!(input.hidden());
    assert!(input.disabled());

    select(&input, Some(make_file(&[0x00], "second.ch8")));
    sleep(50).await;
    assert_eq!(recorded("__boot_once"), vec![image]);
}

#[wasm_bindgen_test]
fn start_with_default_config() {
    let canvas = add_element("canvas", "display").dyn_into::<HtmlCanvasElement>().unwrap();
    let input = add_element("input", "rom_selector").dyn_into::<HtmlInputElement>().unwrap();
    input.set_type("file");

    start(recording_engine("__boot_default"), JsValue::UNDEFINED).unwrap();
    assert_eq!((canvas.width(), canvas.height()), (64, 32));
    assert_eq!(pixel(&canvas, 10.0, 10.0), vec![255, 255, 255, 255]);
    assert!(!input.hidden());
}

#[wasm_bindgen_test]
fn start_rejects_bad_config() {
    let err = start(recording_engine("__boot_bad"), JSON::parse(r#"{"logLevel": "loud"}"#).unwrap()).unwrap_err();
    assert_eq!(error_message(err), "invalid boot configuration: unknown log level `loud`");

    let err = start(recording_engine("__boot_bad"), JSON::parse(r#"{"width": -5}"#).unwrap()).unwrap_err();
    assert!(error_message(err).starts_with("invalid boot configuration"));

    let config = JSON::parse(r#"{"surfaceId": "nowhere"}"#).unwrap();
    let err = start(recording_engine("__boot_bad"), config).unwrap_err();
    assert_eq!(error_message(err), "no element with id `nowhere`");
}
