//! Device-identity generator for navigator-derived fields.
//!
//! Constructed at most once per context with `(baseline navigator, seed,
//! strict)`. Every produced value is cached, so repeated page reads of the
//! same field observe the identical JS value — including object identity
//! for `userAgentData`, which detectors compare across reads.

use crate::prng;
use js_sys::{Array, Object, Reflect};
use std::cell::RefCell;
use std::collections::HashMap;
use wasm_bindgen::JsValue;

const UA_OS_SALT: u32 = 0x0E01_0500;
const UA_VER_SALT: u32 = 0x0E02_0500;

/// `(user-agent OS segment, userAgentData platform)` pairs.
const PLATFORMS: &[(&str, &str)] = &[
    ("Windows NT 10.0; Win64; x64", "Windows"),
    ("X11; Linux x86_64", "Linux"),
    ("Macintosh; Intel Mac OS X 10_15_7", "macOS"),
];

const CHROME_VERSIONS: &[&str] = &[
    "119.0.6045.199",
    "120.0.6099.110",
    "121.0.6167.85",
    "122.0.6261.94",
    "123.0.6312.58",
];

/// Deterministic user-agent string for a seed.
pub fn derive_user_agent(seed: u32) -> String {
    let (os, _) = prng::pick(seed, UA_OS_SALT, PLATFORMS);
    let version = prng::pick(seed, UA_VER_SALT, CHROME_VERSIONS);
    format!(
        "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
        os, version
    )
}

/// `navigator.appVersion` is the user agent minus its `Mozilla/` prefix.
pub fn derive_app_version(seed: u32) -> String {
    derive_user_agent(seed)
        .strip_prefix("Mozilla/")
        .map(str::to_owned)
        .unwrap_or_default()
}

/// userAgentData platform for a seed (paired with the UA's OS segment).
pub fn derive_platform(seed: u32) -> &'static str {
    prng::pick(seed, UA_OS_SALT, PLATFORMS).1
}

/// `(brand, significant version)` triple for userAgentData.
pub fn derive_brands(seed: u32) -> Vec<(String, String)> {
    let full = prng::pick(seed, UA_VER_SALT, CHROME_VERSIONS);
    let major = full.split('.').next().unwrap_or("120").to_owned();
    vec![
        ("Not_A Brand".into(), "8".into()),
        ("Chromium".into(), major.clone()),
        ("Google Chrome".into(), major),
    ]
}

pub struct EquipmentInfoHandler {
    navigator: JsValue,
    seed: u32,
    strict: bool,
    cache: RefCell<HashMap<&'static str, JsValue>>,
}

impl EquipmentInfoHandler {
    pub fn new(navigator: JsValue, seed: u32, strict: bool) -> Self {
        Self {
            navigator,
            seed,
            strict,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Spoofed value for an identity field, or `None` when this field is
    /// not handled (caller falls back to the resolver / real value).
    /// Fields the baseline navigator does not carry are never invented.
    pub fn get_value(&self, field: &str) -> Option<JsValue> {
        let field: &'static str = match field {
            "userAgent" => "userAgent",
            "appVersion" if self.strict => "appVersion",
            "userAgentData" if self.strict => "userAgentData",
            _ => return None,
        };

        if !Reflect::has(&self.navigator, &JsValue::from_str(field)).unwrap_or(false) {
            return None;
        }

        if let Some(cached) = self.cache.borrow().get(field) {
            return Some(cached.clone());
        }

        let value = match field {
            "userAgent" => JsValue::from_str(&derive_user_agent(self.seed)),
            "appVersion" => JsValue::from_str(&derive_app_version(self.seed)),
            _ => self.build_ua_data().ok()?,
        };
        self.cache.borrow_mut().insert(field, value.clone());
        Some(value)
    }

    fn build_ua_data(&self) -> Result<JsValue, JsValue> {
        let data = Object::new();
        let brands = Array::new();
        for (brand, version) in derive_brands(self.seed) {
            let entry = Object::new();
            Reflect::set(&entry, &JsValue::from_str("brand"), &JsValue::from_str(&brand))?;
            Reflect::set(&entry, &JsValue::from_str("version"), &JsValue::from_str(&version))?;
            brands.push(&entry);
        }
        Reflect::set(&data, &JsValue::from_str("brands"), &brands)?;
        Reflect::set(&data, &JsValue::from_str("mobile"), &JsValue::FALSE)?;
        Reflect::set(
            &data,
            &JsValue::from_str("platform"),
            &JsValue::from_str(derive_platform(self.seed)),
        )?;
        Ok(data.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_identity() {
        assert_eq!(derive_user_agent(42), derive_user_agent(42));
        assert_eq!(derive_brands(42), derive_brands(42));
    }

    #[test]
    fn seeds_diverge() {
        // A multi-valued field: some pair of nearby seeds must differ.
        let baseline = derive_user_agent(0);
        assert!((1..64).any(|s| derive_user_agent(s) != baseline));
    }

    #[test]
    fn app_version_tracks_user_agent() {
        let ua = derive_user_agent(7);
        let av = derive_app_version(7);
        assert_eq!(format!("Mozilla/{}", av), ua);
    }

    #[test]
    fn platform_matches_ua_os_segment() {
        for seed in 0..16 {
            let ua = derive_user_agent(seed);
            match derive_platform(seed) {
                "Windows" => assert!(ua.contains("Windows NT")),
                "Linux" => assert!(ua.contains("Linux x86_64")),
                "macOS" => assert!(ua.contains("Mac OS X")),
                other => panic!("unexpected platform {}", other),
            }
        }
    }

    #[test]
    fn brands_carry_the_ua_major_version() {
        let ua = derive_user_agent(9);
        let brands = derive_brands(9);
        let major = &brands[1].1;
        assert!(ua.contains(&format!("Chrome/{}.", major)));
    }
}
