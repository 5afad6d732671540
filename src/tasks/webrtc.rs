//! WebRTC surface: declared but inert. The registry entry carries only a
//! condition so configurations naming it parse and report cleanly; no
//! capability is wrapped until leak-prevention semantics land.

use crate::context::Context;
use std::rc::Rc;

pub fn wanted(cx: &Rc<Context>) -> bool {
    !cx.conf().fingerprint.other.webrtc.is_default()
}
