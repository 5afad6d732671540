//! Original-State Store: one slot per interceptable native capability.
//!
//! Invariant: a slot is populated if and only if the capability is
//! currently overridden. Enabling checks the slot before touching the
//! environment (re-entrant enables are no-ops, nothing gets double-wrapped)
//! and disabling restores exactly the captured reference before emptying
//! the slot — never a value re-read from the live environment, which other
//! code may have modified since.
//!
//! The store is generic over the slot type so the install/restore
//! discipline is testable without a JS runtime; contexts instantiate it
//! with `JsValue`.

use std::cell::RefCell;

/// Stable identifier for each native reference the tasks may capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Capability {
    AppendChild,
    InsertBefore,
    ReplaceChild,
    OwnPropertyDescriptor,
    NavigatorDescriptor,
    ScreenDescriptor,
    CanvasToDataUrl,
    CreateDynamicsCompressor,
    WebglGetParameter,
    Webgl2GetParameter,
    WebglShaderSource,
    Webgl2ShaderSource,
    DateTimeFormat,
    GetTimezoneOffset,
}

impl Capability {
    pub const COUNT: usize = 14;
}

#[derive(Debug)]
pub struct OriginalStore<T> {
    slots: [Option<T>; Capability::COUNT],
}

impl<T> Default for OriginalStore<T> {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }
}

impl<T> OriginalStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_captured(&self, cap: Capability) -> bool {
        self.slots[cap as usize].is_some()
    }

    /// Capture the original for `cap` unless a capture is already held.
    /// `read` runs only when the slot is empty. Returns whether a new
    /// capture happened — `false` tells the caller to skip installation.
    pub fn capture(&mut self, cap: Capability, read: impl FnOnce() -> T) -> bool {
        let slot = &mut self.slots[cap as usize];
        if slot.is_some() {
            return false;
        }
        *slot = Some(read());
        true
    }

    /// Borrow the captured original without releasing the slot.
    pub fn peek(&self, cap: Capability) -> Option<&T> {
        self.slots[cap as usize].as_ref()
    }

    /// Release the captured original for restoration, emptying the slot.
    pub fn take(&mut self, cap: Capability) -> Option<T> {
        self.slots[cap as usize].take()
    }
}

/// Capture-then-install with rollback. `install` runs only on a fresh
/// capture; when it fails the slot is released again, so the populated-iff-
/// overridden invariant survives the error path and a later pass retries
/// the whole installation instead of silently reporting an active hook.
pub fn capture_and_install<T, E>(
    store: &RefCell<OriginalStore<T>>,
    cap: Capability,
    read: impl FnOnce() -> T,
    install: impl FnOnce() -> Result<(), E>,
) -> Result<(), E> {
    if !store.borrow_mut().capture(cap, read) {
        return Ok(());
    }
    if let Err(err) = install() {
        store.borrow_mut().take(cap);
        return Err(err);
    }
    Ok(())
}
