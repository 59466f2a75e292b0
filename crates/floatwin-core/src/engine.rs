//! Lifetime of the content engine that renders the overlay.
//!
//! Two policies are supported. `OnDemand` creates an engine for every show
//! and destroys it on close. `Preloaded` keeps one engine per entrypoint in a
//! registry owned by [`EngineLifecycleBridge`] and only pauses it on close.

use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EngineError, Error, Result};

/// An embedded runtime instance that renders overlay content.
pub trait ContentEngine: Send + Sync {
    fn entrypoint(&self) -> &str;

    /// Content became visible.
    fn resume(&self);

    /// Content is no longer visible but may be shown again.
    fn pause(&self);

    /// Release every resource. The engine is never used again.
    fn destroy(&self);
}

pub trait EngineFactory: Send {
    fn create(&mut self, entrypoint: &str) -> Result<Arc<dyn ContentEngine>, EngineError>;
}

impl<F> EngineFactory for F
where
    F: FnMut(&str) -> Result<Arc<dyn ContentEngine>, EngineError> + Send,
{
    fn create(&mut self, entrypoint: &str) -> Result<Arc<dyn ContentEngine>, EngineError> {
        self(entrypoint)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EngineId(pub u64);

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine-{}", self.0)
    }
}

/// Shared, reference-counted handle to a content engine.
#[derive(Clone)]
pub struct ContentEngineHandle {
    id: EngineId,
    engine: Arc<dyn ContentEngine>,
}

impl ContentEngineHandle {
    pub fn id(&self) -> EngineId {
        self.id
    }

    pub fn entrypoint(&self) -> &str {
        self.engine.entrypoint()
    }

    pub fn engine(&self) -> &Arc<dyn ContentEngine> {
        &self.engine
    }

    /// True when both handles point at the same engine instance.
    pub fn same_engine(&self, other: &ContentEngineHandle) -> bool {
        Arc::ptr_eq(&self.engine, &other.engine)
    }
}

impl fmt::Debug for ContentEngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentEngineHandle")
            .field("id", &self.id)
            .field("entrypoint", &self.entrypoint())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnginePolicy {
    OnDemand,
    #[default]
    Preloaded,
}

pub struct EngineLifecycleBridge {
    policy: EnginePolicy,
    factory: Box<dyn EngineFactory>,
    cache: IndexMap<String, ContentEngineHandle>,
    active: Option<ContentEngineHandle>,
    next_id: u64,
}

impl EngineLifecycleBridge {
    pub fn new(policy: EnginePolicy, factory: impl EngineFactory + 'static) -> Self {
        Self {
            policy,
            factory: Box::new(factory),
            cache: IndexMap::new(),
            active: None,
            next_id: 1,
        }
    }

    pub fn policy(&self) -> EnginePolicy {
        self.policy
    }

    fn spawn(&mut self, entrypoint: &str) -> Result<ContentEngineHandle> {
        let engine = self.factory.create(entrypoint)?;
        let id = EngineId(self.next_id);
        self.next_id += 1;
        debug!(%id, entrypoint, "Created content engine");
        Ok(ContentEngineHandle { id, engine })
    }

    /// Handle to render `entrypoint` with, per the bridge policy.
    pub fn acquire(&mut self, entrypoint: &str) -> Result<ContentEngineHandle> {
        match self.policy {
            EnginePolicy::OnDemand => self.spawn(entrypoint),
            EnginePolicy::Preloaded => {
                if let Some(handle) = self.cache.get(entrypoint) {
                    return Ok(handle.clone());
                }
                let handle = self.spawn(entrypoint)?;
                self.cache.insert(entrypoint.to_string(), handle.clone());
                Ok(handle)
            }
        }
    }

    /// Give a handle back once its surface is gone.
    pub fn release(&mut self, handle: ContentEngineHandle) {
        if self
            .active
            .as_ref()
            .is_some_and(|active| active.same_engine(&handle))
        {
            self.active = None;
        }

        let cached = self
            .cache
            .get(handle.entrypoint())
            .is_some_and(|c| c.same_engine(&handle));

        if self.policy == EnginePolicy::Preloaded && cached {
            debug!(id = %handle.id, "Pausing cached content engine");
            handle.engine.pause();
        } else {
            debug!(id = %handle.id, "Destroying content engine");
            handle.engine.destroy();
        }
    }

    /// Create and cache the engine for `entrypoint` ahead of the first show.
    /// Returns false when one was already cached.
    pub fn preload(&mut self, entrypoint: &str) -> Result<bool> {
        if self.policy == EnginePolicy::OnDemand {
            return Err(Error::InvalidArgument(
                "engine preloading requires the preloaded policy".to_string(),
            ));
        }
        if self.cache.contains_key(entrypoint) {
            return Ok(false);
        }
        let handle = self.spawn(entrypoint)?;
        info!(id = %handle.id, entrypoint, "Preloaded content engine");
        self.cache.insert(entrypoint.to_string(), handle);
        Ok(true)
    }

    pub fn is_preloaded(&self, entrypoint: &str) -> bool {
        self.cache.contains_key(entrypoint)
    }

    pub fn cached(&self, entrypoint: &str) -> Option<&ContentEngineHandle> {
        self.cache.get(entrypoint)
    }

    /// Destroy every cached engine regardless of policy. An engine that is
    /// still attached to a surface leaves the registry now and is destroyed
    /// when it is released. Returns how many engines were destroyed.
    pub fn teardown(&mut self) -> usize {
        let mut destroyed = 0;
        for (_, handle) in self.cache.drain(..) {
            if self
                .active
                .as_ref()
                .is_some_and(|active| active.same_engine(&handle))
            {
                warn!(id = %handle.id, "Engine still attached, destroying it on release");
                continue;
            }
            debug!(id = %handle.id, "Destroying cached content engine");
            handle.engine.destroy();
            destroyed += 1;
        }
        destroyed
    }

    /// Mark `handle` as the one attached to the visible surface.
    pub fn activate(&mut self, handle: &ContentEngineHandle) -> Result<()> {
        if let Some(active) = &self.active {
            return Err(Error::EngineAlreadyActive(active.id.0));
        }
        self.active = Some(handle.clone());
        Ok(())
    }

    pub fn deactivate(&mut self) -> Option<ContentEngineHandle> {
        self.active.take()
    }

    pub fn active(&self) -> Option<&ContentEngineHandle> {
        self.active.as_ref()
    }
}

impl Drop for EngineLifecycleBridge {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            if !self.cache.values().any(|c| c.same_engine(&active)) {
                active.engine.destroy();
            }
        }
        self.teardown();
    }
}
