//! # Identity Facade
//!
//! A browser-fingerprint counterfeiting engine compiled to WebAssembly.
//!
//! The crate intercepts the JavaScript APIs fingerprinting scripts read —
//! navigator and screen properties, canvas readbacks, audio rendering,
//! WebGL identity queries, timezone surfaces — and answers them with
//! configured or seed-derived values instead of the machine's real ones.
//! Interception is per browsing context: applying a profile to the top
//! window also instruments every same-origin iframe, existing or created
//! later by script, with the same configuration.
//!
//! ## Architecture
//!
//! ```text
//! apply_profile (JS boundary)
//!   ↓
//! Context (one per window)
//!   ↓
//! Hook Lifecycle Engine ── Task Registry
//!   ↓
//! capability wrappers ── Value Resolver ── Original-State Store
//! ```
//!
//! Every wrapper captures the native capability before replacing it, and
//! disabling an override restores exactly the captured reference. A failed
//! override degrades to the real value; this crate never throws into page
//! code.

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub mod config;
pub mod context;
pub mod equipment;
pub mod error;
pub mod glue;
pub mod originals;
pub mod prng;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod shader;
pub mod tasks;

pub use config::SessionConfig;
pub use context::Context;
pub use error::FacadeError;

thread_local! {
    static TOP: RefCell<Option<Rc<Context>>> = const { RefCell::new(None) };
}

/// Set up logging and panic reporting. Runs once at module instantiation.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("identity facade initialized");
}

/// Apply (or re-apply) a session profile to the current window.
///
/// The first call attaches the facade to the global window and drives every
/// task whose condition the configuration satisfies. Subsequent calls swap
/// the configuration in place and re-drive the lifecycle engine, enabling
/// newly wanted hooks and restoring no-longer-wanted ones, here and in
/// every adopted iframe.
///
/// Returns `{ enabled: [task names], count }`.
#[wasm_bindgen]
pub fn apply_profile(options: JsValue) -> std::result::Result<JsValue, JsValue> {
    let conf: SessionConfig = serde_wasm_bindgen::from_value(options)
        .map_err(|e| FacadeError::Config(e.to_string()))?;
    let conf = Rc::new(conf);

    let top = TOP.with(|t| {
        let mut slot = t.borrow_mut();
        match slot.as_ref() {
            Some(cx) => {
                cx.reconfigure(conf);
                cx.clone()
            }
            None => {
                let cx = Context::attach(js_sys::global().into(), conf);
                *slot = Some(cx.clone());
                cx
            }
        }
    });

    let enabled = top.enabled_tasks();
    log::info!("profile applied; {} hooks active", enabled.len());
    let summary = serde_json::json!({
        "enabled": enabled,
        "count": enabled.len(),
    });
    serde::Serialize::serialize(&summary, &serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Register a callback invoked with the field key each time the page reads
/// an overridden value. Pass `undefined`/`null` to clear it.
#[wasm_bindgen]
pub fn set_report_sink(sink: JsValue) {
    if sink.is_function() {
        report::set_sink(Some(sink.unchecked_into()));
    } else {
        report::set_sink(None);
    }
}

/// Per-field read counts since session start, as `{ "navigator.userAgent": 3, ... }`.
#[wasm_bindgen]
pub fn consulted_fields() -> std::result::Result<JsValue, JsValue> {
    let counts: std::collections::BTreeMap<String, u64> = report::counts().into_iter().collect();
    serde::Serialize::serialize(&counts, &serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
