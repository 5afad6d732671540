//! Screen surface. Same shape as the navigator task, minus the identity
//! family: every configured property resolves through the Value Resolver,
//! everything else falls through to the real screen object.

use crate::context::Context;
use crate::glue;
use crate::originals::{capture_and_install, Capability};
use js_sys::Reflect;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

use super::navigator::restore_window_property;

pub fn wanted(cx: &Rc<Context>) -> bool {
    !cx.conf().fingerprint.screen.is_all_default()
}

pub fn enable(cx: &Rc<Context>) -> Result<(), JsValue> {
    let win = cx.win().clone();
    let screen = glue::global_of(&win, "screen")?;
    if screen.is_undefined() || screen.is_null() {
        return Err(crate::error::FacadeError::CapabilityUnavailable("screen").into());
    }
    let descriptor = glue::get_own_property_descriptor(&win, &win, "screen")?;
    let owner = cx.clone();
    let trap: glue::GetTrap = Closure::wrap(Box::new(
        move |target: JsValue, key: JsValue, _receiver: JsValue| -> JsValue {
            lookup(&owner, &target, &key).unwrap_or(JsValue::UNDEFINED)
        },
    )
        as Box<dyn FnMut(JsValue, JsValue, JsValue) -> JsValue>);

    capture_and_install(
        cx.originals(),
        Capability::ScreenDescriptor,
        || descriptor.clone(),
        || {
            let proxy = glue::proxy_with_get(&win, &screen, trap)?;
            glue::define_property(&win, &win, "screen", &glue::value_descriptor(&proxy)?)
        },
    )
}

fn lookup(cx: &Rc<Context>, target: &JsValue, key: &JsValue) -> Option<JsValue> {
    let Some(name) = key.as_string() else {
        return Reflect::get(target, key).ok();
    };
    if !Reflect::has(target, key).unwrap_or(false) {
        return None;
    }
    if let Some(value) = cx.get_value("screen", &name, None) {
        return Some(value);
    }
    let real = Reflect::get(target, key).ok()?;
    Some(glue::bind_if_function(real, target))
}

pub fn disable(cx: &Rc<Context>) -> Result<(), JsValue> {
    let Some(descriptor) = cx
        .originals()
        .borrow_mut()
        .take(Capability::ScreenDescriptor)
    else {
        return Ok(());
    };
    restore_window_property(cx.win(), "screen", &descriptor)
}
