//! Per-browsing-context state.
//!
//! One `Context` exists per window the facade instruments: the top
//! document gets one at apply time, every nested iframe gets its own when
//! first observed. A context owns the only mutable state in the system —
//! the Original-State Store and the enabled-task set — and both are scoped
//! to its window, so contexts never share hook state.

use crate::config::{SessionConfig, TimezoneConfig};
use crate::equipment::EquipmentInfoHandler;
use crate::originals::OriginalStore;
use crate::registry;
use crate::report;
use crate::resolver;
use js_sys::Object;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use wasm_bindgen::JsValue;

pub struct Context {
    win: JsValue,
    conf: RefCell<Rc<SessionConfig>>,
    originals: RefCell<OriginalStore<JsValue>>,
    equipment: RefCell<Option<Rc<EquipmentInfoHandler>>>,
    enabled: RefCell<BTreeSet<&'static str>>,
    children: RefCell<Vec<Rc<Context>>>,
}

impl Context {
    /// Create a context for `win` and run the lifecycle engine once.
    pub fn attach(win: JsValue, conf: Rc<SessionConfig>) -> Rc<Context> {
        let cx = Rc::new(Context {
            win,
            conf: RefCell::new(conf),
            originals: RefCell::new(OriginalStore::new()),
            equipment: RefCell::new(None),
            enabled: RefCell::new(BTreeSet::new()),
            children: RefCell::new(Vec::new()),
        });
        cx.sync();
        cx
    }

    pub fn win(&self) -> &JsValue {
        &self.win
    }

    pub fn conf(&self) -> Rc<SessionConfig> {
        self.conf.borrow().clone()
    }

    pub fn originals(&self) -> &RefCell<OriginalStore<JsValue>> {
        &self.originals
    }

    pub fn enabled_tasks(&self) -> Vec<&'static str> {
        self.enabled.borrow().iter().copied().collect()
    }

    /// Run the lifecycle engine against the current configuration.
    pub fn sync(self: &Rc<Self>) {
        registry::sync(crate::tasks::all(), self, &self.enabled);
    }

    /// Swap in a new configuration and re-drive this context and every
    /// nested context it has adopted. Contexts whose browsing context has
    /// been discarded (frame removed or navigated away) are dropped first,
    /// releasing their window handles.
    pub fn reconfigure(self: &Rc<Self>, conf: Rc<SessionConfig>) {
        *self.conf.borrow_mut() = conf.clone();
        self.sync();
        self.children.borrow_mut().retain(|c| window_is_live(&c.win));
        let children: Vec<_> = self.children.borrow().iter().cloned().collect();
        for child in children {
            child.reconfigure(conf.clone());
        }
    }

    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    /// Apply the framework to a nested context's window, exactly once per
    /// window no matter how many creation paths observe it.
    pub fn adopt_child(self: &Rc<Self>, child_win: JsValue) {
        if child_win.is_null() || child_win.is_undefined() {
            return;
        }
        if Object::is(&child_win, &self.win) {
            return;
        }
        if self
            .children
            .borrow()
            .iter()
            .any(|c| Object::is(&c.win, &child_win))
        {
            return;
        }
        log::debug!("adopting nested browsing context");
        let child = Context::attach(child_win, self.conf());
        self.children.borrow_mut().push(child);
    }

    /// Configured override for `category.key[.sub_key]`, converted for JS
    /// consumption. Consultation is reported only when an override exists;
    /// `None` means "use the real value" and leaves no trace.
    pub fn get_value(&self, category: &str, key: &str, sub_key: Option<&str>) -> Option<JsValue> {
        let resolved = resolver::resolve(&self.conf.borrow(), category, key, sub_key)?;
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let value = resolved.serialize(&serializer).ok()?;
        report::record_and_send(&field_key(category, key, sub_key));
        Some(value)
    }

    /// Typed view of the timezone override. Reads are reported like any
    /// other overridden surface.
    pub fn timezone_override(&self) -> Option<TimezoneConfig> {
        let resolved = resolver::resolve(&self.conf.borrow(), "other", "timezone", None)?;
        let tz = serde_json::from_value(resolved).ok()?;
        report::record_and_send("other.timezone");
        Some(tz)
    }

    /// Seed for the device-identity family; `None` disables it.
    pub fn equipment_seed(&self) -> Option<u32> {
        self.conf.borrow().fingerprint.navigator.equipment.derived_seed()
    }

    /// The context's identity generator, constructed on first use against
    /// the real navigator so identity values stay stable for the
    /// context's lifetime.
    pub fn equipment(&self, navigator: &JsValue, seed: u32) -> Rc<EquipmentInfoHandler> {
        let mut slot = self.equipment.borrow_mut();
        if let Some(handler) = slot.as_ref() {
            return handler.clone();
        }
        let handler = Rc::new(EquipmentInfoHandler::new(navigator.clone(), seed, true));
        *slot = Some(handler.clone());
        handler
    }
}

/// A window whose browsing context was discarded reports `closed`.
fn window_is_live(win: &JsValue) -> bool {
    match js_sys::Reflect::get(win, &JsValue::from_str("closed")) {
        Ok(closed) => !closed.is_truthy(),
        Err(_) => false,
    }
}

fn field_key(category: &str, key: &str, sub_key: Option<&str>) -> String {
    match sub_key {
        Some(sub) => format!("{}.{}.{}", category, key, sub),
        None => format!("{}.{}", category, key),
    }
}
