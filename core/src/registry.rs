//! Handler registry
//!
//! Handlers are compiled into the worker and registered under a kind name.
//! A manifest picks one of them at startup, so no code is ever loaded from
//! an arbitrary path at runtime.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::echo::EchoHandler;
use crate::{Handler, HandlerError, HandlerManifest};

/// Builds a fresh, unloaded handler from manifest options.
pub type HandlerFactory =
    Box<dyn Fn(&Value) -> Result<Box<dyn Handler>, HandlerError> + Send + Sync>;

#[derive(Default)]
pub struct HandlerRegistry {
    factories: HashMap<String, HandlerFactory>,
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every handler shipped in this crate
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(EchoHandler::KIND, |options| {
            let handler = EchoHandler::with_options(parse_options(options)?);
            Ok(Box::new(handler) as Box<dyn Handler>)
        });
        registry
    }

    /// Register a factory under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Value) -> Result<Box<dyn Handler>, HandlerError> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(handler = %name, "Registering handler factory");
        self.factories.insert(name, Box::new(factory));
    }

    /// Instantiate the handler a manifest asks for.
    pub fn create(&self, manifest: &HandlerManifest) -> Result<Box<dyn Handler>, HandlerError> {
        let factory = self
            .factories
            .get(&manifest.handler)
            .ok_or_else(|| HandlerError::UnknownHandler {
                name: manifest.handler.clone(),
                available: self.names().join(", "),
            })?;

        factory(&manifest.options)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered kind names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Deserialize handler options, treating `null` as "all defaults".
pub fn parse_options<T>(options: &Value) -> Result<T, HandlerError>
where
    T: DeserializeOwned + Default,
{
    if options.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(options.clone())?)
}
