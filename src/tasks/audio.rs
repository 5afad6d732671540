//! Audio fingerprint perturbation.
//!
//! `OfflineAudioContext.prototype.createDynamicsCompressor` is wrapped to
//! splice a gain node between the compressor and the destination. The gain
//! value comes from the Value Resolver (a small seeded fraction or a
//! literal), so rendered samples shift deterministically per session.

use crate::context::Context;
use crate::glue;
use crate::originals::{capture_and_install, Capability};
use js_sys::{Array, Reflect};
use std::rc::Rc;
use wasm_bindgen::prelude::*;

pub fn wanted(cx: &Rc<Context>) -> bool {
    !cx.conf().fingerprint.other.audio.is_default()
}

pub fn enable(cx: &Rc<Context>) -> Result<(), JsValue> {
    let proto = glue::prototype_of(cx.win(), "OfflineAudioContext")?;
    if proto.is_undefined() {
        log::debug!("OfflineAudioContext missing; audio hook unavailable");
        return Ok(());
    }
    let original = Reflect::get(&proto, &JsValue::from_str("createDynamicsCompressor"))?;
    if !original.is_function() {
        return Ok(());
    }

    let inner = original.clone();
    let owner = cx.clone();
    let trap: glue::ApplyTrap = Closure::wrap(Box::new(
        move |_target: JsValue, this: JsValue, args: JsValue| -> Result<JsValue, JsValue> {
            let compressor = glue::call_original(&inner, &this, &args)?;
            if let Some(gain_value) = owner
                .get_value("other", "audio", None)
                .and_then(|v| v.as_f64())
            {
                if let Err(err) = splice_gain(&this, &compressor, gain_value) {
                    log::warn!("audio gain splice failed: {:?}", err);
                }
            }
            Ok(compressor)
        },
    )
        as Box<dyn FnMut(JsValue, JsValue, JsValue) -> Result<JsValue, JsValue>>);

    capture_and_install(
        cx.originals(),
        Capability::CreateDynamicsCompressor,
        || original.clone(),
        || {
            let proxied = glue::proxy_with_apply(cx.win(), &original, trap)?;
            glue::set_or_err(&proto, "createDynamicsCompressor", &proxied)
        },
    )
}

/// compressor -> gain(value) -> context.destination
fn splice_gain(audio_ctx: &JsValue, compressor: &JsValue, value: f64) -> Result<(), JsValue> {
    let create_gain = Reflect::get(audio_ctx, &JsValue::from_str("createGain"))?;
    if !create_gain.is_function() {
        return Ok(());
    }
    let gain = glue::call_original(&create_gain, audio_ctx, &Array::new())?;
    let param = Reflect::get(&gain, &JsValue::from_str("gain"))?;
    Reflect::set(&param, &JsValue::from_str("value"), &JsValue::from_f64(value))?;

    let connect = Reflect::get(compressor, &JsValue::from_str("connect"))?;
    glue::call_original(&connect, compressor, &Array::of1(&gain))?;
    let destination = Reflect::get(audio_ctx, &JsValue::from_str("destination"))?;
    let gain_connect = Reflect::get(&gain, &JsValue::from_str("connect"))?;
    glue::call_original(&gain_connect, &gain, &Array::of1(&destination))?;
    Ok(())
}

pub fn disable(cx: &Rc<Context>) -> Result<(), JsValue> {
    let Some(original) = cx
        .originals()
        .borrow_mut()
        .take(Capability::CreateDynamicsCompressor)
    else {
        return Ok(());
    };
    let proto = glue::prototype_of(cx.win(), "OfflineAudioContext")?;
    if proto.is_undefined() {
        return Ok(());
    }
    glue::set_or_err(&proto, "createDynamicsCompressor", &original)
}
