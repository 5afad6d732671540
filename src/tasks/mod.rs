//! The capability hook tasks.
//!
//! Each task wraps exactly one native capability: capture the original
//! once, install a replacement that consults the Value Resolver and then
//! delegates to the captured original, and on disable write the captured
//! original back. Tasks are registered here in a fixed order but must not
//! depend on it.

pub mod audio;
pub mod canvas;
pub mod descriptor;
pub mod iframe;
pub mod navigator;
pub mod screen;
pub mod timezone;
pub mod webgl;
pub mod webrtc;

use crate::context::Context;
use crate::registry::Task;
use std::rc::Rc;
use wasm_bindgen::JsValue;

pub type HookTask = Task<Rc<Context>, JsValue>;

static TASKS: [HookTask; 10] = [
    HookTask {
        name: "static iframe",
        only_once_enable: true,
        condition: iframe::blank_iframe_enabled,
        on_enable: Some(iframe::enable_static_sweep),
        on_disable: None,
    },
    HookTask {
        name: "script iframe",
        only_once_enable: true,
        condition: iframe::blank_iframe_enabled,
        on_enable: Some(iframe::enable_dynamic_capture),
        on_disable: None,
    },
    HookTask {
        name: "descriptor shield",
        only_once_enable: true,
        condition: descriptor::always,
        on_enable: Some(descriptor::enable),
        on_disable: None,
    },
    HookTask {
        name: "navigator",
        only_once_enable: false,
        condition: navigator::wanted,
        on_enable: Some(navigator::enable),
        on_disable: Some(navigator::disable),
    },
    HookTask {
        name: "screen",
        only_once_enable: false,
        condition: screen::wanted,
        on_enable: Some(screen::enable),
        on_disable: Some(screen::disable),
    },
    HookTask {
        name: "canvas",
        only_once_enable: false,
        condition: canvas::wanted,
        on_enable: Some(canvas::enable),
        on_disable: Some(canvas::disable),
    },
    HookTask {
        name: "audio",
        only_once_enable: false,
        condition: audio::wanted,
        on_enable: Some(audio::enable),
        on_disable: Some(audio::disable),
    },
    HookTask {
        name: "webgl",
        only_once_enable: false,
        condition: webgl::wanted,
        on_enable: Some(webgl::enable),
        on_disable: Some(webgl::disable),
    },
    HookTask {
        name: "timezone",
        only_once_enable: false,
        condition: timezone::wanted,
        on_enable: Some(timezone::enable),
        on_disable: Some(timezone::disable),
    },
    // Declared surface; behavior is future work and the engine skips the
    // missing enable path.
    HookTask {
        name: "webrtc",
        only_once_enable: false,
        condition: webrtc::wanted,
        on_enable: None,
        on_disable: None,
    },
];

pub fn all() -> &'static [HookTask] {
    &TASKS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn task_names_are_unique() {
        let names: BTreeSet<_> = TASKS.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), TASKS.len());
    }

    #[test]
    fn only_once_tasks_have_no_disable_path() {
        for task in &TASKS {
            if task.only_once_enable {
                assert!(task.on_disable.is_none(), "{} must not disable", task.name);
            }
        }
    }
}
