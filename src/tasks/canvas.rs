//! Canvas readback perturbation.
//!
//! `HTMLCanvasElement.prototype.toDataURL` is wrapped so that each export
//! first paints a near-transparent glyph derived from the configured
//! override. The pixels shift a hair, the rendered image does not visibly
//! change, and the readback hash becomes a function of the session value
//! instead of the GPU stack. Deterministic per context: the same value
//! paints the same glyph every export.

use crate::context::Context;
use crate::glue;
use crate::originals::{capture_and_install, Capability};
use js_sys::{Array, Reflect};
use std::rc::Rc;
use wasm_bindgen::prelude::*;

const GLYPH_STYLE: &str = "rgba(0, 0, 0, 0.01)";

pub fn wanted(cx: &Rc<Context>) -> bool {
    !cx.conf().fingerprint.other.canvas.is_default()
}

pub fn enable(cx: &Rc<Context>) -> Result<(), JsValue> {
    let proto = glue::prototype_of(cx.win(), "HTMLCanvasElement")?;
    if proto.is_undefined() {
        log::debug!("HTMLCanvasElement missing; canvas hook unavailable");
        return Ok(());
    }
    let original = Reflect::get(&proto, &JsValue::from_str("toDataURL"))?;
    if !original.is_function() {
        return Ok(());
    }

    let inner = original.clone();
    let owner = cx.clone();
    let trap: glue::ApplyTrap = Closure::wrap(Box::new(
        move |_target: JsValue, this: JsValue, args: JsValue| -> Result<JsValue, JsValue> {
            if let Some(text) = owner
                .get_value("other", "canvas", None)
                .and_then(|v| v.as_string())
            {
                if let Err(err) = paint_glyph(&this, &text) {
                    log::warn!("canvas glyph paint failed: {:?}", err);
                }
            }
            glue::call_original(&inner, &this, &args)
        },
    )
        as Box<dyn FnMut(JsValue, JsValue, JsValue) -> Result<JsValue, JsValue>>);

    capture_and_install(
        cx.originals(),
        Capability::CanvasToDataUrl,
        || original.clone(),
        || {
            let proxied = glue::proxy_with_apply(cx.win(), &original, trap)?;
            glue::set_or_err(&proto, "toDataURL", &proxied)
        },
    )
}

fn paint_glyph(canvas: &JsValue, text: &str) -> Result<(), JsValue> {
    let get_context = Reflect::get(canvas, &JsValue::from_str("getContext"))?;
    if !get_context.is_function() {
        return Ok(());
    }
    let ctx = glue::call_original(&get_context, canvas, &Array::of1(&JsValue::from_str("2d")))?;
    if ctx.is_null() || ctx.is_undefined() {
        return Ok(());
    }
    let prior_style = Reflect::get(&ctx, &JsValue::from_str("fillStyle"))?;
    Reflect::set(&ctx, &JsValue::from_str("fillStyle"), &JsValue::from_str(GLYPH_STYLE))?;
    let fill_text = Reflect::get(&ctx, &JsValue::from_str("fillText"))?;
    glue::call_original(
        &fill_text,
        &ctx,
        &Array::of3(&JsValue::from_str(text), &JsValue::from_f64(0.0), &JsValue::from_f64(2.0)),
    )?;
    Reflect::set(&ctx, &JsValue::from_str("fillStyle"), &prior_style)?;
    Ok(())
}

pub fn disable(cx: &Rc<Context>) -> Result<(), JsValue> {
    let Some(original) = cx.originals().borrow_mut().take(Capability::CanvasToDataUrl) else {
        return Ok(());
    };
    let proto = glue::prototype_of(cx.win(), "HTMLCanvasElement")?;
    if proto.is_undefined() {
        return Ok(());
    }
    glue::set_or_err(&proto, "toDataURL", &original)
}
