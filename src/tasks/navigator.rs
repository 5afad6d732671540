//! Navigator surface.
//!
//! The real navigator is wrapped in a `get`-trapped proxy and installed
//! over `window.navigator` as a configurable data property. Identity
//! fields (`userAgent`, `appVersion`, `userAgentData`) come from the
//! device-identity generator as one coherent family; everything else goes
//! through the Value Resolver. Unhandled reads fall through to the real
//! navigator, with methods bound so `nav.getBattery()` still carries the
//! right receiver.

use crate::context::Context;
use crate::glue;
use crate::originals::{capture_and_install, Capability};
use crate::report;
use js_sys::{Object, Reflect};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

const IDENTITY_FIELDS: [&str; 3] = ["userAgent", "appVersion", "userAgentData"];

pub fn wanted(cx: &Rc<Context>) -> bool {
    !cx.conf().fingerprint.navigator.is_all_default()
}

pub fn enable(cx: &Rc<Context>) -> Result<(), JsValue> {
    let win = cx.win().clone();
    let navigator = glue::global_of(&win, "navigator")?;
    if navigator.is_undefined() || navigator.is_null() {
        return Err(crate::error::FacadeError::CapabilityUnavailable("navigator").into());
    }
    let descriptor = glue::get_own_property_descriptor(&win, &win, "navigator")?;
    let owner = cx.clone();
    let trap: glue::GetTrap = Closure::wrap(Box::new(
        move |target: JsValue, key: JsValue, _receiver: JsValue| -> JsValue {
            lookup(&owner, &target, &key).unwrap_or(JsValue::UNDEFINED)
        },
    )
        as Box<dyn FnMut(JsValue, JsValue, JsValue) -> JsValue>);

    capture_and_install(
        cx.originals(),
        Capability::NavigatorDescriptor,
        || descriptor.clone(),
        || {
            let proxy = glue::proxy_with_get(&win, &navigator, trap)?;
            glue::define_property(&win, &win, "navigator", &glue::value_descriptor(&proxy)?)
        },
    )
}

/// Resolve one property read against the proxy target (the real
/// navigator). `None` maps to `undefined`, matching a read of a property
/// the browser does not have.
fn lookup(cx: &Rc<Context>, target: &JsValue, key: &JsValue) -> Option<JsValue> {
    let Some(name) = key.as_string() else {
        // Symbol keys are never overridden.
        return Reflect::get(target, key).ok();
    };
    if !Reflect::has(target, key).unwrap_or(false) {
        return None;
    }

    let spoofed = if IDENTITY_FIELDS.contains(&name.as_str()) {
        cx.equipment_seed().and_then(|seed| {
            let value = cx.equipment(target, seed).get_value(&name);
            if value.is_some() {
                report::record_and_send(&format!("navigator.{}", name));
            }
            value
        })
    } else {
        cx.get_value("navigator", &name, None)
    };
    if let Some(value) = spoofed {
        return Some(value);
    }

    let real = Reflect::get(target, key).ok()?;
    Some(glue::bind_if_function(real, target))
}

pub fn disable(cx: &Rc<Context>) -> Result<(), JsValue> {
    let Some(descriptor) = cx
        .originals()
        .borrow_mut()
        .take(Capability::NavigatorDescriptor)
    else {
        return Ok(());
    };
    restore_window_property(cx.win(), "navigator", &descriptor)
}

/// Write a captured own-property descriptor back, or remove the property
/// when there was no own descriptor to begin with (the accessor then comes
/// back from the prototype chain).
pub fn restore_window_property(
    win: &JsValue,
    prop: &str,
    descriptor: &JsValue,
) -> Result<(), JsValue> {
    if descriptor.is_undefined() {
        let target: &Object = win.unchecked_ref();
        Reflect::delete_property(target, &JsValue::from_str(prop))?;
        return Ok(());
    }
    glue::define_property(win, win, prop, descriptor)
}
