//! `before_save` / `after_save` hooks.
//!
//! A hook is either an inline closure or the name of a handler registered in
//! a [`HandlerRegistry`]. Named handlers are built fresh from their factory
//! for every invocation and receive the in-flight [`Payload`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use imageup_common::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::images::ImageHandle;
use crate::request::UploadedFile;

/// What a hook sees: the decoded image for image fields, the raw upload for
/// file fields.
pub enum Payload<'a> {
    Image(&'a mut dyn ImageHandle),
    File(&'a UploadedFile),
}

impl Payload<'_> {
    /// The image, when this payload carries one.
    pub fn image(&mut self) -> Option<&mut dyn ImageHandle> {
        match self {
            Payload::Image(image) => Some(&mut **image),
            Payload::File(_) => None,
        }
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        match self {
            Payload::File(file) => Some(file),
            Payload::Image(_) => None,
        }
    }
}

/// Signature of an inline hook.
pub type HookFn = dyn Fn(&mut Payload<'_>) -> Result<()> + Send + Sync;

/// A hook declared on a field.
#[derive(Clone)]
pub enum Hook {
    Inline(Arc<HookFn>),
    Named(String),
}

impl Hook {
    pub fn inline<F>(f: F) -> Self
    where
        F: Fn(&mut Payload<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Self::Inline(Arc::new(f))
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Whether this hook is a closure, which has no serialized form.
    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Inline(_))
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline(_) => f.write_str("Hook::Inline(..)"),
            Self::Named(name) => f.debug_tuple("Hook::Named").field(name).finish(),
        }
    }
}

/// Named hooks serialize as their name. Inline hooks serialize as `null`,
/// so they do not survive a round trip.
impl Serialize for Hook {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Inline(_) => serializer.serialize_none(),
            Self::Named(name) => serializer.serialize_str(name),
        }
    }
}

/// Hooks in configuration are always handler names.
impl<'de> Deserialize<'de> for Hook {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::Named)
    }
}

/// A named hook implementation.
pub trait UploadHandler: Send {
    fn handle(&self, payload: &mut Payload<'_>) -> Result<()>;
}

type HandlerFactory = dyn Fn() -> Box<dyn UploadHandler> + Send + Sync;

/// Maps handler names to factories.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    factories: HashMap<String, Arc<HandlerFactory>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler type constructed with `Default`.
    pub fn register<H>(&mut self, name: impl Into<String>)
    where
        H: UploadHandler + Default + 'static,
    {
        self.register_with(name, || Box::new(H::default()) as Box<dyn UploadHandler>);
    }

    /// Register a handler built by `factory`.
    pub fn register_with<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn UploadHandler> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Build a fresh handler for `name`.
    pub fn resolve(&self, name: &str) -> Result<Box<dyn UploadHandler>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| Error::UnknownHook(name.to_string()))
    }

    /// Invoke `hook` with `payload`.
    pub fn trigger(&self, hook: &Hook, payload: &mut Payload<'_>) -> Result<()> {
        match hook {
            Hook::Inline(f) => f(payload),
            Hook::Named(name) => {
                tracing::debug!(handler = %name, "running named upload hook");
                self.resolve(name)?.handle(payload)
            }
        }
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort_unstable();
        f.debug_struct("HandlerRegistry").field("handlers", &names).finish()
    }
}
