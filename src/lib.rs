#![cfg(target_arch = "wasm32")]
use fx_core::effects::EffectKind;
use fx_core::scene::{Asset, Transform};
use fx_core::{FxHost, FxParams};
use glam::Vec3;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod audio;
mod dom;
mod events;
mod frame;
mod overlay;
mod render;

use events::Command;

thread_local! {
    static HOST: RefCell<Option<Rc<RefCell<FxHost>>>> = const { RefCell::new(None) };
    static COMMANDS: RefCell<Option<Rc<RefCell<VecDeque<Command>>>>> = const { RefCell::new(None) };
}

fn with_host<R>(f: impl FnOnce(&mut FxHost) -> R) -> Option<R> {
    HOST.with(|h| h.borrow().as_ref().map(|host| f(&mut host.borrow_mut())))
}

fn push_command(command: Command) {
    COMMANDS.with(|c| {
        if let Some(queue) = c.borrow().as_ref() {
            queue.borrow_mut().push_back(command);
        }
    });
}

fn wire_canvas_resize(canvas: &web::HtmlCanvasElement) {
    dom::sync_canvas_backing_size(canvas);
    let canvas_resize = canvas.clone();
    let resize_closure = Closure::wrap(Box::new(move || {
        dom::sync_canvas_backing_size(&canvas_resize);
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window
            .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref());
    }
    resize_closure.forget();
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("fx-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id("fx-canvas")
        .ok_or_else(|| anyhow::anyhow!("missing #fx-canvas"))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    wire_canvas_resize(&canvas);

    let audio_ctx = web::AudioContext::new().map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let backend = audio::WebAudioBackend::new(audio_ctx.clone());
    let ambient = audio::AmbientMusic::new(fx_core::constants::AMBIENT_TRACK);

    let seed = js_sys::Math::random().to_bits();
    let host = Rc::new(RefCell::new(FxHost::new(
        FxParams::with_seed(seed),
        Box::new(backend),
    )));
    let commands = Rc::new(RefCell::new(VecDeque::new()));
    HOST.with(|h| *h.borrow_mut() = Some(host.clone()));
    COMMANDS.with(|c| *c.borrow_mut() = Some(commands.clone()));

    overlay::wire_popup_close(&document, commands.clone());
    events::wire_input_handlers(events::InputWiring {
        canvas: canvas.clone(),
        host: host.clone(),
        commands: commands.clone(),
        audio_ctx: audio_ctx.clone(),
    });
    events::wire_global_keydown(commands.clone());

    let frame_ctx = Rc::new(RefCell::new(frame::FrameLoop::new(
        host, commands, canvas, document, ambient,
    )));
    frame::start_loop(frame_ctx);
    Ok(())
}

/// Called by the scene loader for every named object it finds.
#[wasm_bindgen]
pub fn fx_register_object(name: &str, x: f32, y: f32, z: f32, yaw: f32, radius: f32) {
    let transform = Transform {
        position: Vec3::new(x, y, z),
        yaw,
    };
    with_host(|host| {
        host.register_object(name, transform, radius);
    });
}

/// Called by loaders when an asset finishes loading.
#[wasm_bindgen]
pub fn fx_asset_ready(name: &str) -> Result<(), JsValue> {
    let asset = match name {
        "scene" => Asset::Scene,
        "wave-track" => Asset::WaveTrack,
        "daisy-track" => Asset::DaisyTrack,
        "glyph-font" => Asset::GlyphFont,
        "flappy-model" => Asset::FlappyModel,
        other => return Err(JsValue::from_str(&format!("unknown asset `{other}`"))),
    };
    with_host(|host| host.assets_mut().mark_ready(asset));
    Ok(())
}

/// Queue an effect start by name, as if its object had been clicked.
#[wasm_bindgen]
pub fn fx_start(name: &str) -> Result<(), JsValue> {
    let kind = EffectKind::from_name(name).map_err(|e| JsValue::from_str(&e.to_string()))?;
    push_command(Command::Start(kind));
    Ok(())
}

#[wasm_bindgen]
pub fn fx_stop_all() {
    push_command(Command::StopAll);
}
