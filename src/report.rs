//! Consultation reporting.
//!
//! Each page-observed read of an overridden field is recorded here, once
//! per read. Transport and aggregation are the harness's job: it registers
//! a JS sink callback and receives the field key. Counters are kept
//! locally as a debugging aid (`consulted_fields` export).

use js_sys::Function;
use std::cell::RefCell;
use std::collections::BTreeMap;
use wasm_bindgen::JsValue;

thread_local! {
    static SINK: RefCell<Option<Function>> = const { RefCell::new(None) };
    static COUNTS: RefCell<BTreeMap<String, u64>> = const { RefCell::new(BTreeMap::new()) };
}

/// Register (or clear) the external reporting callback.
pub fn set_sink(sink: Option<Function>) {
    SINK.with(|s| *s.borrow_mut() = sink);
}

/// Report one observed read of an overridden field.
pub fn record_and_send(field_key: &str) {
    COUNTS.with(|c| {
        *c.borrow_mut().entry(field_key.to_owned()).or_insert(0) += 1;
    });
    SINK.with(|s| {
        if let Some(sink) = s.borrow().as_ref() {
            if let Err(err) = sink.call1(&JsValue::UNDEFINED, &JsValue::from_str(field_key)) {
                log::warn!("report sink failed for '{}': {:?}", field_key, err);
            }
        } else {
            log::trace!("fingerprint field consulted: {}", field_key);
        }
    });
}

/// Per-field read counts since session start.
pub fn counts() -> Vec<(String, u64)> {
    COUNTS.with(|c| c.borrow().iter().map(|(k, v)| (k.clone(), *v)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_accumulate_per_field() {
        record_and_send("navigator.userAgent");
        record_and_send("navigator.userAgent");
        record_and_send("screen.width");
        let counts = counts();
        let ua = counts.iter().find(|(k, _)| k == "navigator.userAgent").unwrap();
        assert!(ua.1 >= 2);
        assert!(counts.iter().any(|(k, _)| k == "screen.width"));
    }
}
