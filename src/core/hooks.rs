use std::fmt;

use mlua::{Lua, MultiValue};

use super::commands::DEFAULT_HOOKS;
use super::session::Session;

/// A native function exposed to scripts as a global.
pub type HookFn = fn(&Lua, &Session, MultiValue) -> mlua::Result<MultiValue>;

#[derive(Clone)]
pub struct Hook {
    name: String,
    callback: HookFn,
}

impl Hook {
    pub fn new(name: impl Into<String>, callback: HookFn) -> Self {
        Self {
            name: name.into(),
            callback,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn callback(&self) -> HookFn {
        self.callback
    }

    fn has_callback(&self, callback: HookFn) -> bool {
        // Function addresses are the only identity a fn pointer has.
        self.callback as usize == callback as usize
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook").field("name", &self.name).finish()
    }
}

/// Ordered, name-unique collection of hooks.
#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    hooks: Vec<Hook>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The native command set.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (name, callback) in DEFAULT_HOOKS {
            registry.register(*name, *callback);
        }
        registry
    }

    /// Returns false, leaving the registry untouched, when the name is taken.
    pub fn register(&mut self, name: impl Into<String>, callback: HookFn) -> bool {
        let name = name.into();
        if self.contains(&name) {
            log::debug!("hook {} already registered", name);
            return false;
        }
        self.hooks.push(Hook::new(name, callback));
        true
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.take(name).is_some()
    }

    /// Removes the first hook bound to `callback`.
    pub fn unregister_callback(&mut self, callback: HookFn) -> bool {
        self.take_callback(callback).is_some()
    }

    pub(crate) fn take(&mut self, name: &str) -> Option<Hook> {
        let index = self.hooks.iter().position(|hook| hook.name == name)?;
        Some(self.hooks.remove(index))
    }

    pub(crate) fn take_callback(&mut self, callback: HookFn) -> Option<Hook> {
        let index = self
            .hooks
            .iter()
            .position(|hook| hook.has_callback(callback))?;
        Some(self.hooks.remove(index))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.hooks.iter().any(|hook| hook.name == name)
    }

    pub fn get(&self, name: &str) -> Option<HookFn> {
        self.hooks
            .iter()
            .find(|hook| hook.name == name)
            .map(Hook::callback)
    }

    /// Current hooks in registration order.
    pub fn hooks(&self) -> &[Hook] {
        &self.hooks
    }

    pub fn names(&self) -> Vec<String> {
        self.hooks.iter().map(|hook| hook.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}
