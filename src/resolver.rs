//! Value Resolver: configuration lookup for every hook call site.
//!
//! `resolve` is a pure function of the configuration (plus, for seeded
//! modes, the derived seed): given `category.key[.sub_key]` it returns the
//! override value, or `None` — the "no override, use the real value"
//! sentinel. Recording of consulted fields is layered on top by
//! `Context::get_value`; nothing here has side effects.

use crate::config::{HookEntry, HookMode, SessionConfig};
use crate::prng;
use serde_json::{json, Value};

// Index salts keeping independent seeded surfaces decorrelated.
const CANVAS_SALT: u32 = 0x0C41_7A50;
const AUDIO_SALT: u32 = 0x0A0D_1050;
const WEBGL_SALT: u32 = 0x0396_1000;

/// Renderer strings answered for seeded WebGL overrides.
const WEBGL_RENDERERS: &[&str] = &[
    "ANGLE (Intel, Intel(R) UHD Graphics 630 Direct3D11 vs_5_0 ps_5_0, D3D11)",
    "ANGLE (NVIDIA, NVIDIA GeForce GTX 1660 Direct3D11 vs_5_0 ps_5_0, D3D11)",
    "ANGLE (AMD, AMD Radeon RX 580 Direct3D11 vs_5_0 ps_5_0, D3D11)",
    "ANGLE (Intel, Mesa Intel(R) Xe Graphics (TGL GT2), OpenGL 4.6)",
    "ANGLE (Unknown, Generic Renderer, OpenGL)",
];

/// Look up the configured override for `category.key[.sub_key]`.
pub fn resolve(
    conf: &SessionConfig,
    category: &str,
    key: &str,
    sub_key: Option<&str>,
) -> Option<Value> {
    match category {
        "navigator" => literal(conf.fingerprint.navigator.fields.get(key)?),
        "screen" => literal(conf.fingerprint.screen.fields.get(key)?),
        "other" => match key {
            "canvas" => canvas_value(&conf.fingerprint.other.canvas),
            "audio" => audio_value(&conf.fingerprint.other.audio),
            "webgl" => webgl_value(conf, sub_key?),
            "timezone" => timezone_value(conf),
            // Declared surface with no resolution rule yet.
            "webrtc" => None,
            _ => None,
        },
        _ => None,
    }
}

/// Literal entries: only an explicit non-null value overrides. Seeded modes
/// have no generation rule for free-form properties.
fn literal(entry: &HookEntry) -> Option<Value> {
    match (entry.mode, &entry.value) {
        (HookMode::Value, Some(v)) if !v.is_null() => Some(v.clone()),
        _ => None,
    }
}

fn canvas_value(entry: &HookEntry) -> Option<Value> {
    match entry.mode {
        HookMode::Value => entry.value.as_ref().filter(|v| v.is_string()).cloned(),
        HookMode::Seeded => {
            let seed = entry.derived_seed()?;
            Some(json!(format!("{:08x}", prng::mix(seed, CANVAS_SALT))))
        }
        HookMode::Default => None,
    }
}

fn audio_value(entry: &HookEntry) -> Option<Value> {
    match entry.mode {
        HookMode::Value => entry.value.as_ref().filter(|v| v.is_number()).cloned(),
        HookMode::Seeded => {
            let seed = entry.derived_seed()?;
            Some(json!(prng::unit(seed, AUDIO_SALT) * 0.01))
        }
        HookMode::Default => None,
    }
}

fn webgl_value(conf: &SessionConfig, sub_key: &str) -> Option<Value> {
    let webgl = &conf.fingerprint.other.webgl;
    if webgl.mode.is_default() {
        return None;
    }
    match sub_key {
        "info" => match (&webgl.info, webgl.derived_seed()) {
            (Some(info), _) => Some(json!(info)),
            (None, Some(seed)) => Some(json!(*prng::pick(seed, WEBGL_SALT, WEBGL_RENDERERS))),
            (None, None) => None,
        },
        "color" => webgl.color.as_ref().map(|c| json!(c)),
        _ => None,
    }
}

fn timezone_value(conf: &SessionConfig) -> Option<Value> {
    let tz = &conf.fingerprint.other.timezone;
    if tz.mode.is_default() {
        return None;
    }
    Some(json!({
        "locale": tz.locale,
        "zone": tz.zone,
        "offsetMinutes": tz.offset_minutes,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conf(v: Value) -> SessionConfig {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn default_surface_yields_sentinel_for_every_key() {
        let c = SessionConfig::default();
        for key in ["language", "platform", "hardwareConcurrency", "vendor"] {
            assert_eq!(resolve(&c, "navigator", key, None), None);
        }
        for key in ["width", "height", "colorDepth"] {
            assert_eq!(resolve(&c, "screen", key, None), None);
        }
        assert_eq!(resolve(&c, "other", "canvas", None), None);
        assert_eq!(resolve(&c, "other", "audio", None), None);
        assert_eq!(resolve(&c, "other", "webgl", Some("info")), None);
        assert_eq!(resolve(&c, "other", "timezone", None), None);
    }

    #[test]
    fn literal_overrides_come_back_verbatim() {
        let c = conf(json!({
            "fingerprint": {
                "navigator": { "fields": { "language": { "mode": "value", "value": "de-DE" } } },
                "screen": { "fields": { "width": { "mode": "value", "value": 2560 } } }
            }
        }));
        assert_eq!(resolve(&c, "navigator", "language", None), Some(json!("de-DE")));
        assert_eq!(resolve(&c, "screen", "width", None), Some(json!(2560)));
        // Unconfigured keys on a configured surface still pass through.
        assert_eq!(resolve(&c, "navigator", "platform", None), None);
    }

    #[test]
    fn value_mode_without_value_is_passthrough() {
        let c = conf(json!({
            "fingerprint": { "navigator": { "fields": { "language": { "mode": "value" } } } }
        }));
        assert_eq!(resolve(&c, "navigator", "language", None), None);
    }

    #[test]
    fn seeded_canvas_is_deterministic_and_seed_sensitive() {
        let a = conf(json!({ "fingerprint": { "other": { "canvas": { "mode": "seeded", "seed": 1 } } } }));
        let b = conf(json!({ "fingerprint": { "other": { "canvas": { "mode": "seeded", "seed": 2 } } } }));
        let v1 = resolve(&a, "other", "canvas", None).unwrap();
        let v2 = resolve(&a, "other", "canvas", None).unwrap();
        assert_eq!(v1, v2);
        assert_ne!(v1, resolve(&b, "other", "canvas", None).unwrap());
    }

    #[test]
    fn seeded_audio_magnitude_is_small() {
        let c = conf(json!({ "fingerprint": { "other": { "audio": { "mode": "seeded", "seed": 3 } } } }));
        let v = resolve(&c, "other", "audio", None).unwrap();
        let f = v.as_f64().unwrap();
        assert!((0.0..0.01).contains(&f));
    }

    #[test]
    fn webgl_info_prefers_configured_string() {
        let c = conf(json!({
            "fingerprint": { "other": { "webgl": {
                "mode": "value",
                "info": "Custom Renderer",
                "color": "vec4(1.0,0.0,0.0,1.0)"
            } } }
        }));
        assert_eq!(resolve(&c, "other", "webgl", Some("info")), Some(json!("Custom Renderer")));
        assert_eq!(
            resolve(&c, "other", "webgl", Some("color")),
            Some(json!("vec4(1.0,0.0,0.0,1.0)"))
        );
    }

    #[test]
    fn webgl_seeded_picks_from_renderer_table() {
        let c = conf(json!({
            "fingerprint": { "other": { "webgl": { "mode": "seeded", "seed": 11 } } }
        }));
        let info = resolve(&c, "other", "webgl", Some("info")).unwrap();
        assert!(WEBGL_RENDERERS.contains(&info.as_str().unwrap()));
        assert_eq!(resolve(&c, "other", "webgl", Some("info")), Some(info));
    }

    #[test]
    fn timezone_returns_structured_value() {
        let c = conf(json!({
            "fingerprint": { "other": { "timezone": {
                "mode": "value",
                "locale": "zh-CN", "zone": "Asia/Shanghai", "offsetMinutes": 480
            } } }
        }));
        let v = resolve(&c, "other", "timezone", None).unwrap();
        assert_eq!(v["zone"], json!("Asia/Shanghai"));
        assert_eq!(v["offsetMinutes"], json!(480));
    }
}
