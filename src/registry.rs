//! Hook task registry and lifecycle engine.
//!
//! A task is a stateless definition: a condition over the context's
//! configuration, an enable procedure, and (unless it is install-once) a
//! disable procedure. All mutable state lives in the context's
//! Original-State Store, which is what makes re-entrant enables no-ops.
//!
//! The engine is generic over the context and error types so the
//! enable/disable state machine can be exercised natively; the crate
//! instantiates it with `Rc<Context>` and `JsValue`.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;

pub struct Task<C, E> {
    /// Unique key, also the enabled-flag map key.
    pub name: &'static str,
    /// Structural instrumentation: enables once, never disables, and must
    /// tolerate repeated enable calls.
    pub only_once_enable: bool,
    pub condition: fn(&C) -> bool,
    /// Absent for declared-but-inert tasks (the engine skips them).
    pub on_enable: Option<fn(&C) -> Result<(), E>>,
    pub on_disable: Option<fn(&C) -> Result<(), E>>,
}

/// Drive every task toward the state its condition asks for.
///
/// Tasks are independent: a failure in one is logged and must not stop the
/// pass, and no task may rely on another having run first. Called whenever
/// configuration is (re)applied to a context.
pub fn sync<C, E: fmt::Debug>(
    tasks: &[Task<C, E>],
    cx: &C,
    enabled: &RefCell<BTreeSet<&'static str>>,
) {
    for task in tasks {
        let is_enabled = enabled.borrow().contains(task.name);
        let wants = (task.condition)(cx);

        if wants && !is_enabled {
            let Some(enable) = task.on_enable else {
                // Declared with a condition but no behavior yet.
                continue;
            };
            match enable(cx) {
                Ok(()) => {
                    enabled.borrow_mut().insert(task.name);
                    log::debug!("hook task '{}' enabled", task.name);
                }
                Err(err) => {
                    log::warn!("hook task '{}' enable failed: {:?}", task.name, err);
                }
            }
        } else if !wants && is_enabled && !task.only_once_enable {
            // Transition to disabled even if restoration partially fails:
            // restored slots are empty, and a later enable re-captures only
            // what is not still held.
            enabled.borrow_mut().remove(task.name);
            if let Some(disable) = task.on_disable {
                if let Err(err) = disable(cx) {
                    log::warn!("hook task '{}' disable failed: {:?}", task.name, err);
                }
            }
            log::debug!("hook task '{}' disabled", task.name);
        }
    }
}
