//! Session configuration for the identity facade.
//!
//! The tree mirrors what the hosting harness hands over per browsing
//! context: one section per fingerprint surface, each entry carrying a mode
//! tag. `default` means "do not override"; schema validation beyond serde's
//! own is the loader's concern, and missing sections fall back to defaults
//! (configuration-absent is never fatal).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How one fingerprint entry is overridden.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookMode {
    /// No override; the page sees the real value.
    #[default]
    Default,
    /// A literal override value.
    Value,
    /// A deterministic override derived from a seed.
    Seeded,
}

impl HookMode {
    pub fn is_default(&self) -> bool {
        matches!(self, HookMode::Default)
    }
}

/// One configured override: the mode tag plus its parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HookEntry {
    pub mode: HookMode,
    pub value: Option<serde_json::Value>,
    pub seed: Option<u32>,
}

impl HookEntry {
    pub fn is_default(&self) -> bool {
        self.mode.is_default()
    }

    /// Seed derivation for this entry: `None` means "do not override",
    /// which is distinct from a present seed of value zero. Literal-value
    /// modes carry no seed; a `seeded` entry without an explicit seed uses
    /// the per-session random seed.
    pub fn derived_seed(&self) -> Option<u32> {
        seed_from(self.mode, self.seed)
    }
}

/// The `getSeedByHookValue` contract as a pure function of the mode pair.
pub fn seed_from(mode: HookMode, seed: Option<u32>) -> Option<u32> {
    match mode {
        HookMode::Seeded => Some(seed.unwrap_or_else(crate::prng::session_seed)),
        HookMode::Default | HookMode::Value => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Instrument nested browsing contexts (existing and dynamically
    /// created iframes).
    pub hook_blank_iframe: bool,
    pub fingerprint: FingerprintConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FingerprintConfig {
    pub navigator: NavigatorConfig,
    pub screen: SurfaceConfig,
    pub other: OtherConfig,
}

/// Navigator surface: the seeded device-identity family plus free-form
/// per-property entries (`language`, `platform`, `hardwareConcurrency`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NavigatorConfig {
    /// Governs `userAgent` / `appVersion` / `userAgentData` as one unit.
    pub equipment: HookEntry,
    pub fields: BTreeMap<String, HookEntry>,
}

impl NavigatorConfig {
    pub fn is_all_default(&self) -> bool {
        self.equipment.is_default() && self.fields.values().all(HookEntry::is_default)
    }
}

/// A surface that is nothing but per-property entries (screen).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurfaceConfig {
    pub fields: BTreeMap<String, HookEntry>,
}

impl SurfaceConfig {
    pub fn is_all_default(&self) -> bool {
        self.fields.values().all(HookEntry::is_default)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OtherConfig {
    pub canvas: HookEntry,
    pub audio: HookEntry,
    pub webgl: WebglConfig,
    pub timezone: TimezoneConfig,
    pub webrtc: HookEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebglConfig {
    pub mode: HookMode,
    pub seed: Option<u32>,
    /// Renderer string answered for UNMASKED_RENDERER_WEBGL queries.
    pub info: Option<String>,
    /// GLSL color expression forced into shader main bodies.
    pub color: Option<String>,
}

impl WebglConfig {
    pub fn derived_seed(&self) -> Option<u32> {
        seed_from(self.mode, self.seed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimezoneConfig {
    pub mode: HookMode,
    pub locale: String,
    pub zone: String,
    /// UTC offset in minutes; the page-visible `getTimezoneOffset()` is its
    /// negation (+480 configured reads back as -480).
    pub offset_minutes: i32,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            mode: HookMode::Default,
            locale: "en-US".into(),
            zone: "UTC".into(),
            offset_minutes: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_is_all_default() {
        let conf: SessionConfig = serde_json::from_value(json!({})).unwrap();
        assert!(!conf.hook_blank_iframe);
        assert!(conf.fingerprint.navigator.is_all_default());
        assert!(conf.fingerprint.screen.is_all_default());
        assert!(conf.fingerprint.other.canvas.is_default());
        assert!(conf.fingerprint.other.webgl.mode.is_default());
        assert_eq!(conf.fingerprint.other.timezone.zone, "UTC");
    }

    #[test]
    fn parses_mixed_modes() {
        let conf: SessionConfig = serde_json::from_value(json!({
            "hookBlankIframe": true,
            "fingerprint": {
                "navigator": {
                    "equipment": { "mode": "seeded", "seed": 7 },
                    "fields": {
                        "language": { "mode": "value", "value": "de-DE" },
                        "platform": { "mode": "default" }
                    }
                },
                "screen": {
                    "fields": { "width": { "mode": "value", "value": 2560 } }
                },
                "other": {
                    "canvas": { "mode": "seeded" },
                    "webgl": { "mode": "value", "info": "Custom Renderer" },
                    "timezone": {
                        "mode": "value",
                        "locale": "zh-CN",
                        "zone": "Asia/Shanghai",
                        "offsetMinutes": 480
                    }
                }
            }
        }))
        .unwrap();

        assert!(conf.hook_blank_iframe);
        assert!(!conf.fingerprint.navigator.is_all_default());
        assert_eq!(conf.fingerprint.navigator.equipment.seed, Some(7));
        let lang = &conf.fingerprint.navigator.fields["language"];
        assert_eq!(lang.mode, HookMode::Value);
        assert_eq!(lang.value, Some(json!("de-DE")));
        assert!(!conf.fingerprint.screen.is_all_default());
        assert_eq!(conf.fingerprint.other.webgl.info.as_deref(), Some("Custom Renderer"));
        assert_eq!(conf.fingerprint.other.timezone.offset_minutes, 480);
    }

    #[test]
    fn default_fields_do_not_disturb_all_default() {
        let conf: SessionConfig = serde_json::from_value(json!({
            "fingerprint": {
                "navigator": { "fields": { "language": { "mode": "default" } } }
            }
        }))
        .unwrap();
        assert!(conf.fingerprint.navigator.is_all_default());
    }

    #[test]
    fn seed_derivation_distinguishes_absent_from_zero() {
        assert_eq!(seed_from(HookMode::Default, Some(5)), None);
        assert_eq!(seed_from(HookMode::Value, Some(5)), None);
        assert_eq!(seed_from(HookMode::Seeded, Some(0)), Some(0));
        assert_eq!(seed_from(HookMode::Seeded, Some(9)), Some(9));
        // Absent seed resolves to the session seed, stable across calls.
        let a = seed_from(HookMode::Seeded, None);
        let b = seed_from(HookMode::Seeded, None);
        assert!(a.is_some());
        assert_eq!(a, b);
    }
}
