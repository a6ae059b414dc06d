use crate::audio::AmbientMusic;
use crate::dom;
use crate::events::Command;
use crate::overlay;
use crate::render;
use fx_core::router::Cursor;
use fx_core::FxHost;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameLoop {
    host: Rc<RefCell<FxHost>>,
    commands: Rc<RefCell<VecDeque<Command>>>,
    canvas: web::HtmlCanvasElement,
    document: web::Document,
    ambient: AmbientMusic,
    shown_popup: Option<String>,
    cursor: Cursor,
}

impl FrameLoop {
    pub fn new(
        host: Rc<RefCell<FxHost>>,
        commands: Rc<RefCell<VecDeque<Command>>>,
        canvas: web::HtmlCanvasElement,
        document: web::Document,
        ambient: AmbientMusic,
    ) -> Self {
        overlay::hide_popup(&document);
        Self {
            host,
            commands,
            canvas,
            document,
            ambient,
            shown_popup: None,
            cursor: Cursor::Default,
        }
    }

    pub fn frame(&mut self) {
        let mut host = self.host.borrow_mut();
        host.set_aspect(dom::canvas_aspect(&self.canvas));

        // Drain into a local first so handlers firing mid-frame queue for the next one.
        let pending: Vec<Command> = self.commands.borrow_mut().drain(..).collect();
        for command in pending {
            let result = match command {
                Command::Click => {
                    self.ambient.retry();
                    host.click()
                }
                Command::Start(kind) => host.start(kind),
                Command::StopAll => {
                    host.stop_all();
                    Ok(())
                }
            };
            if let Err(e) = result {
                log::warn!("[frame] {:?} failed: {}", command, e);
            }
        }

        host.frame_now();

        let presentation = host.presentation();
        self.ambient.sync(presentation.ambient_playing);
        if presentation.popup != self.shown_popup {
            match &presentation.popup {
                Some(text) => overlay::show_popup(&self.document, text),
                None => overlay::hide_popup(&self.document),
            }
            self.shown_popup = presentation.popup.clone();
        }

        let cursor = host.cursor();
        if cursor != self.cursor {
            dom::set_cursor(
                &self.canvas,
                match cursor {
                    Cursor::Pointer => "pointer",
                    Cursor::Default => "default",
                },
            );
            self.cursor = cursor;
        }

        render::draw(&host);
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameLoop>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
