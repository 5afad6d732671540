//! WebGL surface.
//!
//! Two wrappers per rendering-context flavor (WebGL1 and WebGL2, each with
//! its own store slot so either can be present alone):
//!
//! * `getParameter` answers debug-extension identity queries — the
//!   unmasked renderer from the resolver, the unmasked vendor with the
//!   fixed string real ANGLE builds report.
//! * `shaderSource` rewrites simple `void main(){..}` bodies to emit the
//!   configured color, perturbing shader-derived hashes. Sources the
//!   rewriter cannot handle safely pass through untouched.

use crate::context::Context;
use crate::glue;
use crate::originals::{capture_and_install, Capability};
use crate::shader;
use js_sys::{Array, Reflect};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

const UNMASKED_VENDOR_WEBGL: u32 = 0x9245;
const UNMASKED_RENDERER_WEBGL: u32 = 0x9246;
const SPOOFED_VENDOR: &str = "Google Inc.";

const FLAVORS: [(&str, Capability, Capability); 2] = [
    (
        "WebGLRenderingContext",
        Capability::WebglGetParameter,
        Capability::WebglShaderSource,
    ),
    (
        "WebGL2RenderingContext",
        Capability::Webgl2GetParameter,
        Capability::Webgl2ShaderSource,
    ),
];

pub fn wanted(cx: &Rc<Context>) -> bool {
    !cx.conf().fingerprint.other.webgl.mode.is_default()
}

pub fn enable(cx: &Rc<Context>) -> Result<(), JsValue> {
    for (ctor, param_cap, shader_cap) in FLAVORS {
        let proto = glue::prototype_of(cx.win(), ctor)?;
        if proto.is_undefined() {
            continue;
        }
        wrap_get_parameter(cx, &proto, param_cap)?;
        wrap_shader_source(cx, &proto, shader_cap)?;
    }
    Ok(())
}

fn wrap_get_parameter(cx: &Rc<Context>, proto: &JsValue, cap: Capability) -> Result<(), JsValue> {
    let original = Reflect::get(proto, &JsValue::from_str("getParameter"))?;
    if !original.is_function() {
        return Ok(());
    }

    let inner = original.clone();
    let owner = cx.clone();
    let trap: glue::ApplyTrap = Closure::wrap(Box::new(
        move |_target: JsValue, this: JsValue, args: JsValue| -> Result<JsValue, JsValue> {
            let list: &Array = args.unchecked_ref();
            match list.get(0).as_f64().map(|p| p as u32) {
                Some(UNMASKED_RENDERER_WEBGL) => {
                    if let Some(info) = owner.get_value("other", "webgl", Some("info")) {
                        return Ok(info);
                    }
                }
                Some(UNMASKED_VENDOR_WEBGL) => {
                    return Ok(JsValue::from_str(SPOOFED_VENDOR));
                }
                _ => {}
            }
            glue::call_original(&inner, &this, &args)
        },
    )
        as Box<dyn FnMut(JsValue, JsValue, JsValue) -> Result<JsValue, JsValue>>);

    capture_and_install(cx.originals(), cap, || original.clone(), || {
        let proxied = glue::proxy_with_apply(cx.win(), &original, trap)?;
        glue::set_or_err(proto, "getParameter", &proxied)
    })
}

fn wrap_shader_source(cx: &Rc<Context>, proto: &JsValue, cap: Capability) -> Result<(), JsValue> {
    let original = Reflect::get(proto, &JsValue::from_str("shaderSource"))?;
    if !original.is_function() {
        return Ok(());
    }

    let inner = original.clone();
    let owner = cx.clone();
    let trap: glue::ApplyTrap = Closure::wrap(Box::new(
        move |_target: JsValue, this: JsValue, args: JsValue| -> Result<JsValue, JsValue> {
            let list: &Array = args.unchecked_ref();
            let color = owner
                .get_value("other", "webgl", Some("color"))
                .and_then(|v| v.as_string());
            if let (Some(source), Some(color)) = (list.get(1).as_string(), color) {
                if let Some(rewritten) = shader::rewrite_source(&source, &color) {
                    let patched = Array::of2(&list.get(0), &JsValue::from_str(&rewritten));
                    return glue::call_original(&inner, &this, &patched);
                }
            }
            glue::call_original(&inner, &this, &args)
        },
    )
        as Box<dyn FnMut(JsValue, JsValue, JsValue) -> Result<JsValue, JsValue>>);

    capture_and_install(cx.originals(), cap, || original.clone(), || {
        let proxied = glue::proxy_with_apply(cx.win(), &original, trap)?;
        glue::set_or_err(proto, "shaderSource", &proxied)
    })
}

pub fn disable(cx: &Rc<Context>) -> Result<(), JsValue> {
    for (ctor, param_cap, shader_cap) in FLAVORS {
        let param = cx.originals().borrow_mut().take(param_cap);
        let source = cx.originals().borrow_mut().take(shader_cap);
        if param.is_none() && source.is_none() {
            continue;
        }
        let proto = glue::prototype_of(cx.win(), ctor)?;
        if proto.is_undefined() {
            continue;
        }
        if let Some(original) = param {
            glue::set_or_err(&proto, "getParameter", &original)?;
        }
        if let Some(original) = source {
            glue::set_or_err(&proto, "shaderSource", &original)?;
        }
    }
    Ok(())
}
