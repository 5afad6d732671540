//! Proxy/Reflect helpers for capability interception.
//!
//! Every helper takes the context's own window handle instead of the WASM
//! module's global scope: nested browsing contexts are instrumented through
//! their own `Object`/`Proxy` intrinsics, so cross-realm identity checks
//! keep working. Installed closures are WASM-compiled functions, which
//! return `"[native code]"` from `Function.prototype.toString()` without
//! extra spoofing.

use js_sys::{Array, Function, Object, Reflect};
use std::cell::Cell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Trap signatures used by the hook tasks.
pub type ApplyTrap = Closure<dyn FnMut(JsValue, JsValue, JsValue) -> Result<JsValue, JsValue>>;
pub type ConstructTrap = Closure<dyn FnMut(JsValue, JsValue, JsValue) -> Result<JsValue, JsValue>>;
pub type GetTrap = Closure<dyn FnMut(JsValue, JsValue, JsValue) -> JsValue>;

/// A global binding of `win` (e.g. "navigator", "HTMLElement").
pub fn global_of(win: &JsValue, name: &str) -> Result<JsValue, JsValue> {
    Reflect::get(win, &JsValue::from_str(name))
}

/// `win.<ctor>.prototype`; undefined when the constructor is absent.
pub fn prototype_of(win: &JsValue, ctor: &str) -> Result<JsValue, JsValue> {
    let ctor = global_of(win, ctor)?;
    if ctor.is_undefined() || ctor.is_null() {
        return Ok(JsValue::UNDEFINED);
    }
    Reflect::get(&ctor, &JsValue::from_str("prototype"))
}

fn object_method(win: &JsValue, name: &str) -> Result<Function, JsValue> {
    let object_ns = global_of(win, "Object")?;
    Reflect::get(&object_ns, &JsValue::from_str(name))?
        .dyn_into()
        .map_err(|_| JsValue::from_str("Object intrinsic missing"))
}

/// `win.Object.defineProperty(target, prop, descriptor)`.
pub fn define_property(
    win: &JsValue,
    target: &JsValue,
    prop: &str,
    descriptor: &JsValue,
) -> Result<(), JsValue> {
    let define = object_method(win, "defineProperty")?;
    let args = Array::of3(target, &JsValue::from_str(prop), descriptor);
    Reflect::apply(&define, &JsValue::UNDEFINED, &args)?;
    Ok(())
}

/// `win.Object.getOwnPropertyDescriptor(target, prop)`.
pub fn get_own_property_descriptor(
    win: &JsValue,
    target: &JsValue,
    prop: &str,
) -> Result<JsValue, JsValue> {
    let get_desc = object_method(win, "getOwnPropertyDescriptor")?;
    let args = Array::of2(target, &JsValue::from_str(prop));
    Reflect::apply(&get_desc, &JsValue::UNDEFINED, &args)
}

/// A `{ value, configurable: true }` data descriptor. Configurable so the
/// captured descriptor can be written back on disable.
pub fn value_descriptor(value: &JsValue) -> Result<JsValue, JsValue> {
    let descriptor = Object::new();
    Reflect::set(&descriptor, &JsValue::from_str("value"), value)?;
    Reflect::set(&descriptor, &JsValue::from_str("configurable"), &JsValue::TRUE)?;
    Ok(descriptor.into())
}

/// `Reflect.set` that fails when the write is refused. Against a frozen or
/// sealed target `Reflect.set` returns `false` without throwing; a wrapper
/// that was never actually installed must surface as an error, not as a
/// hook reported active.
pub fn set_or_err(target: &JsValue, prop: &str, value: &JsValue) -> Result<(), JsValue> {
    if Reflect::set(target, &JsValue::from_str(prop), value)? {
        Ok(())
    } else {
        Err(JsValue::from_str(&format!("property '{}' rejected the write", prop)))
    }
}

fn proxy_ctor(win: &JsValue) -> Result<Function, JsValue> {
    global_of(win, "Proxy")?
        .dyn_into()
        .map_err(|_| JsValue::from_str("Proxy not found"))
}

fn construct_proxy(win: &JsValue, target: &JsValue, handler: &Object) -> Result<JsValue, JsValue> {
    let ctor = proxy_ctor(win)?;
    let args = Array::of2(target, handler);
    Reflect::construct(&ctor, &args)
}

/// Proxy around a callable with an `apply` trap
/// (`(target, thisArg, argumentsList)`).
pub fn proxy_with_apply(
    win: &JsValue,
    target: &JsValue,
    apply_trap: ApplyTrap,
) -> Result<JsValue, JsValue> {
    let handler = Object::new();
    Reflect::set(&handler, &JsValue::from_str("apply"), apply_trap.as_ref())?;
    apply_trap.forget();
    construct_proxy(win, target, &handler)
}

/// Proxy around a constructor that is also callable without `new`
/// (`Intl.DateTimeFormat`): both `construct` and `apply` traps.
pub fn proxy_with_construct_and_apply(
    win: &JsValue,
    target: &JsValue,
    construct_trap: ConstructTrap,
    apply_trap: ApplyTrap,
) -> Result<JsValue, JsValue> {
    let handler = Object::new();
    Reflect::set(&handler, &JsValue::from_str("construct"), construct_trap.as_ref())?;
    construct_trap.forget();
    Reflect::set(&handler, &JsValue::from_str("apply"), apply_trap.as_ref())?;
    apply_trap.forget();
    construct_proxy(win, target, &handler)
}

/// Proxy around an object with a `get` trap
/// (`(target, property, receiver)`), for wrapping navigator/screen.
pub fn proxy_with_get(
    win: &JsValue,
    target: &JsValue,
    get_trap: GetTrap,
) -> Result<JsValue, JsValue> {
    let handler = Object::new();
    Reflect::set(&handler, &JsValue::from_str("get"), get_trap.as_ref())?;
    get_trap.forget();
    construct_proxy(win, target, &handler)
}

/// Delegate to a captured original callable via `Reflect.apply`.
pub fn call_original(func: &JsValue, this: &JsValue, args: &JsValue) -> Result<JsValue, JsValue> {
    let func: &Function = func.unchecked_ref();
    Reflect::apply(func, this, args.unchecked_ref())
}

/// Delegate to a captured original constructor via `Reflect.construct`.
pub fn construct_original(ctor: &JsValue, args: &JsValue) -> Result<JsValue, JsValue> {
    let ctor: &Function = ctor.unchecked_ref();
    Reflect::construct(ctor, args.unchecked_ref())
}

/// Real-value fallback: callables are bound to their owner so extracting a
/// method through the wrapper still invokes it on the real object.
pub fn bind_if_function(value: JsValue, owner: &JsValue) -> JsValue {
    if value.is_function() {
        let func: &Function = value.unchecked_ref();
        func.bind(owner).into()
    } else {
        value
    }
}

/// One-shot subscription: the callback fires at most once, and the browser
/// drops the listener after the first dispatch.
pub fn subscribe_once(
    target: &web_sys::EventTarget,
    event: &str,
    callback: impl FnMut() + 'static,
) -> Result<(), JsValue> {
    let fired = Cell::new(false);
    let mut callback = callback;
    let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
        if fired.replace(true) {
            return;
        }
        callback();
    }) as Box<dyn FnMut(web_sys::Event)>);

    let options = web_sys::AddEventListenerOptions::new();
    options.set_once(true);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        event,
        closure.as_ref().unchecked_ref(),
        &options,
    )?;
    closure.forget();
    Ok(())
}
