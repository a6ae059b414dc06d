use crate::dom;
use crate::events::Command;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use web_sys as web;

const POPUP_ID: &str = "fx-popup";
const POPUP_TEXT_ID: &str = "fx-popup-text";
const POPUP_CLOSE_ID: &str = "fx-popup-close";

#[inline]
pub fn show_popup(document: &web::Document, text: &str) {
    if let Some(el) = document.get_element_by_id(POPUP_TEXT_ID) {
        el.set_text_content(Some(text));
    }
    if let Some(el) = document.get_element_by_id(POPUP_ID) {
        _ = el.class_list().remove_1("hidden");
        // fallback for environments without CSS class
        _ = el.set_attribute("style", "");
    }
}

#[inline]
pub fn hide_popup(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(POPUP_ID) {
        _ = el.class_list().add_1("hidden");
        _ = el.set_attribute("style", "display:none");
    }
}

/// Closing the popup ends the effect that opened it, like Escape.
pub fn wire_popup_close(document: &web::Document, commands: Rc<RefCell<VecDeque<Command>>>) {
    dom::add_click_listener(document, POPUP_CLOSE_ID, move || {
        commands.borrow_mut().push_back(Command::StopAll);
    });
}
