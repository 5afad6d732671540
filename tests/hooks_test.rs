//! Browser integration tests for the capability hooks.
//!
//! Each test applies its own full profile; re-applying drives the lifecycle
//! engine, so hooks wanted by a previous test are restored before the next
//! assertion runs. Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use facade_wasm::{apply_profile, Context, SessionConfig};
use js_sys::Reflect;
use std::rc::Rc;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn apply(profile_js: &str) -> JsValue {
    let options = js_sys::eval(profile_js).expect("profile literal");
    apply_profile(options).expect("apply_profile")
}

fn eval(src: &str) -> JsValue {
    js_sys::eval(src).expect(src)
}

fn enabled_names(summary: &JsValue) -> Vec<String> {
    let arr: js_sys::Array = Reflect::get(summary, &"enabled".into()).unwrap().into();
    arr.iter().filter_map(|v| v.as_string()).collect()
}

#[wasm_bindgen_test]
fn default_profile_leaves_surfaces_alone() {
    let real_language = eval("navigator.language");
    let summary = apply("({})");
    let names = enabled_names(&summary);
    // The descriptor shield is unconditional; no surface hook may engage.
    // (Install-once iframe tasks may linger from an earlier profile.)
    assert!(names.contains(&"descriptor shield".to_string()));
    for surface in ["navigator", "screen", "canvas", "audio", "webgl", "timezone"] {
        assert!(!names.contains(&surface.to_string()), "{} engaged", surface);
    }
    assert_eq!(eval("navigator.language"), real_language);
}

#[wasm_bindgen_test]
fn navigator_literal_override_is_visible() {
    apply(
        r#"({ fingerprint: { navigator: { fields: {
            language: { mode: "value", value: "xx-XX" }
        } } } })"#,
    );
    assert_eq!(eval("navigator.language").as_string().as_deref(), Some("xx-XX"));
    // Unconfigured properties still read through to the real navigator.
    assert!(eval("navigator.userAgent").as_string().unwrap().len() > 10);
    // Methods extracted through the wrapper stay callable (bound receiver).
    assert_eq!(eval("typeof navigator.javaEnabled()"), eval("'boolean'"));
    // Absent properties stay absent.
    assert!(eval("navigator.definitelyNotAProperty").is_undefined());

    apply("({})");
    assert_ne!(eval("navigator.language").as_string().as_deref(), Some("xx-XX"));
}

#[wasm_bindgen_test]
fn seeded_equipment_produces_a_coherent_identity() {
    apply(
        r#"({ fingerprint: { navigator: {
            equipment: { mode: "seeded", seed: 5 }
        } } })"#,
    );
    let ua = eval("navigator.userAgent").as_string().unwrap();
    assert!(ua.starts_with("Mozilla/5.0 ("));
    assert!(ua.contains("Chrome/"));
    // Stable across reads.
    assert_eq!(eval("navigator.userAgent").as_string().unwrap(), ua);
    // appVersion is the UA minus its prefix.
    let av = eval("navigator.appVersion").as_string().unwrap();
    assert_eq!(format!("Mozilla/{}", av), ua);
    // userAgentData keeps object identity between reads.
    assert_eq!(
        eval("navigator.userAgentData === navigator.userAgentData"),
        JsValue::TRUE
    );
    apply("({})");
}

#[wasm_bindgen_test]
fn screen_override_applies_and_restores() {
    let real_width = eval("screen.width");
    apply(
        r#"({ fingerprint: { screen: { fields: {
            width: { mode: "value", value: 7777 }
        } } } })"#,
    );
    assert_eq!(eval("screen.width").as_f64(), Some(7777.0));
    apply("({})");
    assert_eq!(eval("screen.width"), real_width);
}

#[wasm_bindgen_test]
fn descriptor_shield_hides_the_override() {
    apply(
        r#"({ fingerprint: { navigator: { fields: {
            language: { mode: "value", value: "yy-YY" }
        } } } })"#,
    );
    // The override is live, yet the descriptor the page reads back is the
    // pre-override one (an accessor on the window, not our data property).
    assert_eq!(eval("navigator.language").as_string().as_deref(), Some("yy-YY"));
    assert_eq!(
        eval("typeof Object.getOwnPropertyDescriptor(window, 'navigator').get"),
        eval("'function'")
    );
    apply("({})");
}

#[wasm_bindgen_test]
fn timezone_override_negates_configured_minutes() {
    let real_offset = eval("new Date().getTimezoneOffset()");
    apply(
        r#"({ fingerprint: { other: { timezone: {
            mode: "value",
            locale: "zh-CN",
            zone: "Asia/Shanghai",
            offsetMinutes: 480
        } } } })"#,
    );
    assert_eq!(eval("new Date().getTimezoneOffset()").as_f64(), Some(-480.0));
    // Timezone reads count as consultations like any other surface.
    let counts = facade_wasm::consulted_fields().unwrap();
    let tz_reads = Reflect::get(&counts, &"other.timezone".into())
        .unwrap()
        .as_f64()
        .unwrap_or(0.0);
    assert!(tz_reads >= 1.0, "timezone consultation unreported");
    assert_eq!(
        eval("new Intl.DateTimeFormat().resolvedOptions().timeZone")
            .as_string()
            .as_deref(),
        Some("Asia/Shanghai")
    );
    // Caller options still win over the injected zone.
    assert_eq!(
        eval("new Intl.DateTimeFormat('en-US', { timeZone: 'UTC' }).resolvedOptions().timeZone")
            .as_string()
            .as_deref(),
        Some("UTC")
    );
    apply("({})");
    assert_eq!(eval("new Date().getTimezoneOffset()"), real_offset);
}

#[wasm_bindgen_test]
fn canvas_export_shifts_under_override_and_recovers() {
    apply("({})");
    let clean = eval(
        "(() => { const c = document.createElement('canvas'); return c.toDataURL(); })()",
    );

    apply(r#"({ fingerprint: { other: { canvas: { mode: "value", value: "session-noise" } } } })"#);
    let hooked = eval(
        "(() => { const c = document.createElement('canvas'); return c.toDataURL(); })()",
    );
    assert_ne!(hooked, clean, "glyph paint must perturb the export");

    // Same override, fresh canvas: the perturbation is deterministic.
    let hooked_again = eval(
        "(() => { const c = document.createElement('canvas'); return c.toDataURL(); })()",
    );
    assert_eq!(hooked_again, hooked);

    apply("({})");
    let restored = eval(
        "(() => { const c = document.createElement('canvas'); return c.toDataURL(); })()",
    );
    assert_eq!(restored, clean);
}

#[wasm_bindgen_test]
fn webgl_identity_queries_are_answered() {
    apply(
        r#"({ fingerprint: { other: { webgl: {
            mode: "value", info: "Custom Renderer String"
        } } } })"#,
    );
    let answers = eval(
        r#"(() => {
            const gl = document.createElement('canvas').getContext('webgl');
            if (!gl) return null;
            return [gl.getParameter(0x9246), gl.getParameter(0x9245)];
        })()"#,
    );
    if !answers.is_null() {
        let pair: js_sys::Array = answers.into();
        assert_eq!(pair.get(0).as_string().as_deref(), Some("Custom Renderer String"));
        assert_eq!(pair.get(1).as_string().as_deref(), Some("Google Inc."));
    }
    apply("({})");
}

#[wasm_bindgen_test]
fn iframes_inherit_the_profile() {
    // A frame already in the document when the profile lands is picked up
    // by the enable-time sweep.
    eval("document.body.insertAdjacentHTML('beforeend', '<iframe id=\"preexisting-frame\"></iframe>')");
    apply(
        r#"({ hookBlankIframe: true, fingerprint: { screen: { fields: {
            width: { mode: "value", value: 4321 }
        } } } })"#,
    );
    let swept_width = eval(
        r#"(() => {
            const f = document.getElementById('preexisting-frame');
            const w = f.contentWindow.screen.width;
            f.remove();
            return w;
        })()"#,
    );
    assert_eq!(swept_width.as_f64(), Some(4321.0));

    // Dynamically inserted frame goes through the wrapped appendChild.
    let width = eval(
        r#"(() => {
            const f = document.createElement('iframe');
            document.body.appendChild(f);
            const w = f.contentWindow.screen.width;
            f.remove();
            return w;
        })()"#,
    );
    assert_eq!(width.as_f64(), Some(4321.0));
    apply("({})");
}

#[wasm_bindgen_test]
fn consulted_fields_count_override_reads() {
    apply(
        r#"({ fingerprint: { navigator: { fields: {
            language: { mode: "value", value: "zz-ZZ" }
        } } } })"#,
    );
    eval("navigator.language");
    eval("navigator.language");
    let counts = facade_wasm::consulted_fields().unwrap();
    let n = Reflect::get(&counts, &"navigator.language".into())
        .unwrap()
        .as_f64()
        .unwrap_or(0.0);
    assert!(n >= 2.0);
    apply("({})");
}

#[wasm_bindgen_test]
fn audio_compressor_survives_the_gain_splice() {
    apply(r#"({ fingerprint: { other: { audio: { mode: "value", value: 0.004 } } } })"#);
    let node_ok = eval(
        r#"(() => {
            const ctx = new OfflineAudioContext(1, 128, 44100);
            return ctx.createDynamicsCompressor() instanceof DynamicsCompressorNode;
        })()"#,
    );
    assert_eq!(node_ok, JsValue::TRUE);
    let counts = facade_wasm::consulted_fields().unwrap();
    let reads = Reflect::get(&counts, &"other.audio".into())
        .unwrap()
        .as_f64()
        .unwrap_or(0.0);
    assert!(reads >= 1.0, "audio consultation unreported");
    apply("({})");
}

/// Insert a blank iframe and hand back its window, for tests that need a
/// browsing context the shared top-level facade does not touch.
fn scratch_window(id: &str) -> JsValue {
    eval(&format!(
        "(() => {{ const f = document.createElement('iframe'); f.id = '{}'; \
         document.body.appendChild(f); return f.contentWindow; }})()",
        id
    ))
}

fn drop_frame(id: &str) {
    eval(&format!("document.getElementById('{}').remove()", id));
}

#[wasm_bindgen_test]
fn adoption_is_deduplicated_by_window_identity() {
    let host = scratch_window("adoption-host");
    let child = scratch_window("adoption-child");
    let cx = Context::attach(host.clone(), Rc::new(SessionConfig::default()));
    cx.adopt_child(child.clone());
    cx.adopt_child(child);
    cx.adopt_child(host);
    cx.adopt_child(JsValue::NULL);
    assert_eq!(cx.child_count(), 1);
    drop_frame("adoption-child");
    drop_frame("adoption-host");
}

#[wasm_bindgen_test]
fn discarded_frames_are_pruned_on_reconfigure() {
    let host = scratch_window("prune-host");
    let child = scratch_window("prune-child");
    let cx = Context::attach(host, Rc::new(SessionConfig::default()));
    cx.adopt_child(child);
    assert_eq!(cx.child_count(), 1);

    drop_frame("prune-child");
    cx.reconfigure(Rc::new(SessionConfig::default()));
    assert_eq!(cx.child_count(), 0);
    drop_frame("prune-host");
}

#[wasm_bindgen_test]
fn sealed_prototype_leaves_no_half_installed_hook() {
    let host = scratch_window("sealed-host");
    eval(
        r#"(() => {
            const w = document.getElementById('sealed-host').contentWindow;
            w.Object.freeze(w.HTMLCanvasElement.prototype);
        })()"#,
    );
    let conf: SessionConfig = serde_json::from_value(serde_json::json!({
        "fingerprint": { "other": { "canvas": { "mode": "value", "value": "noise" } } }
    }))
    .unwrap();
    // The prototype rejects the write, so the task must not report itself
    // active and the captured slot must be released for a later retry.
    let cx = Context::attach(host, Rc::new(conf));
    assert!(!cx.enabled_tasks().contains(&"canvas"));
    assert!(!cx
        .originals()
        .borrow()
        .is_captured(facade_wasm::originals::Capability::CanvasToDataUrl));
    drop_frame("sealed-host");
}
