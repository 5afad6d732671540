//! Timezone surface.
//!
//! Two capabilities, driven by the same structured override:
//!
//! * `Intl.DateTimeFormat` is replaced by a proxy whose construct and call
//!   traps inject the configured locale (when the caller passed none) and
//!   default the options' `timeZone` to the configured zone. Caller
//!   arguments always win.
//! * `Date.prototype.getTimezoneOffset` answers the negated configured
//!   offset: a zone at UTC+480 minutes reads back as -480, matching the
//!   sign convention real engines use.

use crate::context::Context;
use crate::glue;
use crate::originals::{capture_and_install, Capability};
use js_sys::{Array, Object, Reflect};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub fn wanted(cx: &Rc<Context>) -> bool {
    !cx.conf().fingerprint.other.timezone.mode.is_default()
}

pub fn enable(cx: &Rc<Context>) -> Result<(), JsValue> {
    wrap_date_time_format(cx)?;
    wrap_timezone_offset(cx)?;
    Ok(())
}

fn wrap_date_time_format(cx: &Rc<Context>) -> Result<(), JsValue> {
    let intl = glue::global_of(cx.win(), "Intl")?;
    if intl.is_undefined() || intl.is_null() {
        return Ok(());
    }
    let original = Reflect::get(&intl, &JsValue::from_str("DateTimeFormat"))?;
    if !original.is_function() {
        return Ok(());
    }

    let ctor_inner = original.clone();
    let ctor_owner = cx.clone();
    let construct_trap: glue::ConstructTrap = Closure::wrap(Box::new(
        move |_target: JsValue, args: JsValue, _new_target: JsValue| -> Result<JsValue, JsValue> {
            let args = steered_args(&ctor_owner, &args)?;
            glue::construct_original(&ctor_inner, &args)
        },
    )
        as Box<dyn FnMut(JsValue, JsValue, JsValue) -> Result<JsValue, JsValue>>);

    let call_inner = original.clone();
    let call_owner = cx.clone();
    let apply_trap: glue::ApplyTrap = Closure::wrap(Box::new(
        move |_target: JsValue, this: JsValue, args: JsValue| -> Result<JsValue, JsValue> {
            let args = steered_args(&call_owner, &args)?;
            glue::call_original(&call_inner, &this, &args)
        },
    )
        as Box<dyn FnMut(JsValue, JsValue, JsValue) -> Result<JsValue, JsValue>>);

    capture_and_install(
        cx.originals(),
        Capability::DateTimeFormat,
        || original.clone(),
        || {
            let proxied = glue::proxy_with_construct_and_apply(
                cx.win(),
                &original,
                construct_trap,
                apply_trap,
            )?;
            glue::set_or_err(&intl, "DateTimeFormat", &proxied)
        },
    )
}

/// `(locales, options)` with the configured defaults filled in. With no
/// active override the argument list passes through untouched.
fn steered_args(cx: &Rc<Context>, args: &JsValue) -> Result<JsValue, JsValue> {
    let Some(tz) = cx.timezone_override() else {
        return Ok(args.clone());
    };
    let list: &Array = args.unchecked_ref();

    let locales = list.get(0);
    let locales = if locales.is_undefined() || locales.is_null() {
        JsValue::from_str(&tz.locale)
    } else {
        locales
    };

    let options = Object::new();
    Reflect::set(&options, &JsValue::from_str("timeZone"), &JsValue::from_str(&tz.zone))?;
    let caller_options = list.get(1);
    if caller_options.is_object() {
        Object::assign(&options, caller_options.unchecked_ref());
    }

    Ok(Array::of2(&locales, &options).into())
}

fn wrap_timezone_offset(cx: &Rc<Context>) -> Result<(), JsValue> {
    let proto = glue::prototype_of(cx.win(), "Date")?;
    if proto.is_undefined() {
        return Ok(());
    }
    let original = Reflect::get(&proto, &JsValue::from_str("getTimezoneOffset"))?;
    if !original.is_function() {
        return Ok(());
    }

    let inner = original.clone();
    let owner = cx.clone();
    let trap: glue::ApplyTrap = Closure::wrap(Box::new(
        move |_target: JsValue, this: JsValue, args: JsValue| -> Result<JsValue, JsValue> {
            if let Some(tz) = owner.timezone_override() {
                return Ok(JsValue::from_f64(-f64::from(tz.offset_minutes)));
            }
            glue::call_original(&inner, &this, &args)
        },
    )
        as Box<dyn FnMut(JsValue, JsValue, JsValue) -> Result<JsValue, JsValue>>);

    capture_and_install(
        cx.originals(),
        Capability::GetTimezoneOffset,
        || original.clone(),
        || {
            let proxied = glue::proxy_with_apply(cx.win(), &original, trap)?;
            glue::set_or_err(&proto, "getTimezoneOffset", &proxied)
        },
    )
}

pub fn disable(cx: &Rc<Context>) -> Result<(), JsValue> {
    if let Some(original) = cx.originals().borrow_mut().take(Capability::DateTimeFormat) {
        let intl = glue::global_of(cx.win(), "Intl")?;
        if !intl.is_undefined() && !intl.is_null() {
            glue::set_or_err(&intl, "DateTimeFormat", &original)?;
        }
    }
    if let Some(original) = cx
        .originals()
        .borrow_mut()
        .take(Capability::GetTimezoneOffset)
    {
        let proto = glue::prototype_of(cx.win(), "Date")?;
        if !proto.is_undefined() {
            glue::set_or_err(&proto, "getTimezoneOffset", &original)?;
        }
    }
    Ok(())
}
