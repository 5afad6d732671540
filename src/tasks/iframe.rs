//! Nested browsing-context propagation.
//!
//! Two install-once tasks cover the two ways an iframe appears: a sweep of
//! frames already in the document (repeated once at content-ready for
//! frames parsed after us), and wrappers around the DOM insertion methods
//! for frames created by script. Both funnel into `Context::adopt_child`,
//! which deduplicates by window identity, so a frame seen by both paths is
//! instrumented exactly once.
//!
//! Everything here goes through `Reflect` rather than typed web-sys casts:
//! a child realm's `document` is not an `instanceof` of our realm's
//! constructors, and the sweep has to work inside adopted children too.

use crate::context::Context;
use crate::glue;
use crate::originals::{capture_and_install, Capability};
use js_sys::{Array, Reflect};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub fn blank_iframe_enabled(cx: &Rc<Context>) -> bool {
    cx.conf().hook_blank_iframe
}

/// Instrument every iframe currently in the document, then once more when
/// the document finishes parsing.
pub fn enable_static_sweep(cx: &Rc<Context>) -> Result<(), JsValue> {
    sweep(cx)?;
    let target: &web_sys::EventTarget = cx.win().unchecked_ref();
    let again = cx.clone();
    glue::subscribe_once(target, "DOMContentLoaded", move || {
        if let Err(err) = sweep(&again) {
            log::warn!("content-ready iframe sweep failed: {:?}", err);
        }
    })?;
    Ok(())
}

fn sweep(cx: &Rc<Context>) -> Result<(), JsValue> {
    let document = glue::global_of(cx.win(), "document")?;
    if document.is_undefined() || document.is_null() {
        return Ok(());
    }
    let query = Reflect::get(&document, &JsValue::from_str("querySelectorAll"))?;
    if !query.is_function() {
        return Ok(());
    }
    let frames = glue::call_original(
        &query,
        &document,
        &Array::of1(&JsValue::from_str("iframe")),
    )?;
    let len = Reflect::get(&frames, &JsValue::from_str("length"))?
        .as_f64()
        .unwrap_or(0.0) as u32;
    for i in 0..len {
        if let Ok(frame) = Reflect::get_u32(&frames, i) {
            adopt_frame(cx, &frame);
        }
    }
    Ok(())
}

/// Hand a frame's content window to the context. Cross-origin frames are
/// skipped: their document is unreachable and nothing inside them can be
/// instrumented from here.
fn adopt_frame(cx: &Rc<Context>, frame: &JsValue) {
    let Ok(child_win) = Reflect::get(frame, &JsValue::from_str("contentWindow")) else {
        return;
    };
    if child_win.is_null() || child_win.is_undefined() {
        return;
    }
    match Reflect::get(&child_win, &JsValue::from_str("document")) {
        Ok(doc) if !doc.is_undefined() && !doc.is_null() => cx.adopt_child(child_win),
        Ok(_) => {}
        Err(_) => log::debug!("skipping cross-origin frame"),
    }
}

/// Wrap the DOM insertion methods so script-created iframes are adopted the
/// moment they enter the tree.
pub fn enable_dynamic_capture(cx: &Rc<Context>) -> Result<(), JsValue> {
    let proto = glue::prototype_of(cx.win(), "HTMLElement")?;
    if proto.is_undefined() {
        log::debug!("HTMLElement missing; dynamic iframe capture unavailable");
        return Ok(());
    }
    for (cap, method) in [
        (Capability::AppendChild, "appendChild"),
        (Capability::InsertBefore, "insertBefore"),
        (Capability::ReplaceChild, "replaceChild"),
    ] {
        wrap_insertion(cx, &proto, cap, method)?;
    }
    Ok(())
}

fn wrap_insertion(
    cx: &Rc<Context>,
    proto: &JsValue,
    cap: Capability,
    method: &str,
) -> Result<(), JsValue> {
    let original = Reflect::get(proto, &JsValue::from_str(method))?;
    if !original.is_function() {
        return Ok(());
    }

    let inner = original.clone();
    let owner = cx.clone();
    let trap: glue::ApplyTrap = Closure::wrap(Box::new(
        move |_target: JsValue, this: JsValue, args: JsValue| -> Result<JsValue, JsValue> {
            // Insert first; an unattached iframe has no content window yet.
            let result = glue::call_original(&inner, &this, &args)?;
            let list: &Array = args.unchecked_ref();
            let node = list.get(0);
            let tag = Reflect::get(&node, &JsValue::from_str("tagName"))
                .ok()
                .and_then(|t| t.as_string());
            if tag.as_deref() == Some("IFRAME") {
                adopt_frame(&owner, &node);
            }
            Ok(result)
        },
    )
        as Box<dyn FnMut(JsValue, JsValue, JsValue) -> Result<JsValue, JsValue>>);

    capture_and_install(cx.originals(), cap, || original.clone(), || {
        let proxied = glue::proxy_with_apply(cx.win(), &original, trap)?;
        glue::set_or_err(proto, method, &proxied)
    })
}
