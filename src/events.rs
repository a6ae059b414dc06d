use fx_core::effects::EffectKind;
use fx_core::router::pixel_to_ndc;
use fx_core::FxHost;
use glam::Vec2;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Input that may start or stop effects. Queued from event handlers and
/// applied in order at the top of the next frame, so two clicks can never race
/// for the effect slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    Click,
    StopAll,
    Start(EffectKind),
}

#[derive(Clone)]
pub struct InputWiring {
    pub canvas: web::HtmlCanvasElement,
    pub host: Rc<RefCell<FxHost>>,
    pub commands: Rc<RefCell<VecDeque<Command>>>,
    pub audio_ctx: web::AudioContext,
}

pub fn wire_input_handlers(w: InputWiring) {
    wire_pointermove(&w);
    wire_pointerleave(&w);
    wire_click(&w);
}

fn pointer_ndc(ev: &web::PointerEvent, canvas: &web::HtmlCanvasElement) -> Option<Vec2> {
    let rect = canvas.get_bounding_client_rect();
    let px = Vec2::new(
        (ev.client_x() as f64 - rect.left()) as f32,
        (ev.client_y() as f64 - rect.top()) as f32,
    );
    pixel_to_ndc(px, Vec2::new(rect.width() as f32, rect.height() as f32))
}

fn wire_pointermove(w: &InputWiring) {
    let w = w.clone();
    let canvas = w.canvas.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        if let Some(ndc) = pointer_ndc(&ev, &w.canvas) {
            w.host.borrow_mut().pointer_moved(ndc);
        }
    }) as Box<dyn FnMut(_)>);
    _ = canvas.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_pointerleave(w: &InputWiring) {
    let host = w.host.clone();
    let closure = Closure::wrap(Box::new(move |_ev: web::PointerEvent| {
        host.borrow_mut().pointer_left();
    }) as Box<dyn FnMut(_)>);
    _ = w
        .canvas
        .add_event_listener_with_callback("pointerleave", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_click(w: &InputWiring) {
    let commands = w.commands.clone();
    let audio_ctx = w.audio_ctx.clone();
    let closure = Closure::wrap(Box::new(move |_ev: web::MouseEvent| {
        // First gesture unlocks audio output.
        _ = audio_ctx.resume();
        commands.borrow_mut().push_back(Command::Click);
    }) as Box<dyn FnMut(_)>);
    _ = w
        .canvas
        .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
    closure.forget();
}

pub fn wire_global_keydown(commands: Rc<RefCell<VecDeque<Command>>>) {
    let closure = Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
        if ev.repeat() {
            return;
        }
        let command = match ev.key().as_str() {
            "Escape" => Command::StopAll,
            "h" | "H" => Command::Start(EffectKind::Heart),
            "w" | "W" => Command::Start(EffectKind::Wave),
            "l" | "L" => Command::Start(EffectKind::Liberation),
            _ => return,
        };
        log::info!("[keys] {:?}", command);
        commands.borrow_mut().push_back(command);
    }) as Box<dyn FnMut(_)>);
    if let Some(window) = web::window() {
        _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
