//! Descriptor shielding.
//!
//! Replacing `window.navigator` with a data property leaves a tell: the
//! descriptor a page reads back no longer matches a stock browser's. This
//! install-once task wraps the window's own
//! `Object.getOwnPropertyDescriptor` and answers queries for `navigator`
//! and `screen` against that window with the pre-override descriptors,
//! captured here before any surface task runs its first override.

use crate::context::Context;
use crate::glue;
use crate::originals::{capture_and_install, Capability};
use js_sys::{Array, Object, Reflect};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub fn always(_cx: &Rc<Context>) -> bool {
    true
}

pub fn enable(cx: &Rc<Context>) -> Result<(), JsValue> {
    let win = cx.win().clone();
    let object_ns = glue::global_of(&win, "Object")?;
    let original = Reflect::get(&object_ns, &JsValue::from_str("getOwnPropertyDescriptor"))?;
    if !original.is_function() {
        return Err(crate::error::FacadeError::CapabilityUnavailable(
            "Object.getOwnPropertyDescriptor",
        )
        .into());
    }

    // Pristine descriptors: prefer what a surface task already captured,
    // otherwise read the live (still untouched) window.
    let navigator_desc = match cx.originals().borrow().peek(Capability::NavigatorDescriptor) {
        Some(desc) => desc.clone(),
        None => glue::get_own_property_descriptor(&win, &win, "navigator")?,
    };
    let screen_desc = match cx.originals().borrow().peek(Capability::ScreenDescriptor) {
        Some(desc) => desc.clone(),
        None => glue::get_own_property_descriptor(&win, &win, "screen")?,
    };

    let inner = original.clone();
    let shielded_win = win.clone();
    let trap: glue::ApplyTrap = Closure::wrap(Box::new(
        move |_target: JsValue, this: JsValue, args: JsValue| -> Result<JsValue, JsValue> {
            let list: &Array = args.unchecked_ref();
            let queried = list.get(0);
            if Object::is(&queried, &shielded_win) {
                match list.get(1).as_string().as_deref() {
                    Some("navigator") => return Ok(navigator_desc.clone()),
                    Some("screen") => return Ok(screen_desc.clone()),
                    _ => {}
                }
            }
            glue::call_original(&inner, &this, &args)
        },
    )
        as Box<dyn FnMut(JsValue, JsValue, JsValue) -> Result<JsValue, JsValue>>);

    capture_and_install(
        cx.originals(),
        Capability::OwnPropertyDescriptor,
        || original.clone(),
        || {
            let proxied = glue::proxy_with_apply(&win, &original, trap)?;
            glue::set_or_err(&object_ns, "getOwnPropertyDescriptor", &proxied)
        },
    )
}
