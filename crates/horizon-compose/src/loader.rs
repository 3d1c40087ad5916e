//! Versioned loads.
//!
//! A host that reloads content asynchronously can have several loads in
//! flight. Each load takes a [`LoadTicket`] from a [`CompositionLoader`];
//! starting a newer load or cancelling makes older tickets stale, and a stale
//! ticket's graph is never instantiated.
//!
//! ```
//! use horizon_compose::CompositionLoader;
//!
//! let loader = CompositionLoader::default();
//! let first = loader.begin_load();
//! let second = loader.begin_load();
//! assert!(!first.is_current());
//! assert!(second.is_current());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use horizon_compose_graph::{NodeId, SourceGraph};

use crate::compositor::Compositor;
use crate::config::InstantiatorConfig;
use crate::error::InstantiationResult;
use crate::instantiator::{Instantiator, Materialized};
use crate::logging::targets;

/// A shared load counter. Clones observe the same counter.
#[derive(Debug, Clone, Default)]
pub struct LoadGeneration(Arc<AtomicU64>);

impl LoadGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current generation.
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn same_counter(&self, other: &LoadGeneration) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Proof that a load was started at a given generation.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    generation: LoadGeneration,
    version: u64,
}

impl LoadTicket {
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether no newer load was started and no cancel happened since this
    /// ticket was issued.
    pub fn is_current(&self) -> bool {
        self.generation.current() == self.version
    }
}

/// Issues load tickets and instantiates graphs for current tickets only.
#[derive(Debug, Clone, Default)]
pub struct CompositionLoader {
    instantiator: Instantiator,
    generation: LoadGeneration,
}

impl CompositionLoader {
    pub fn new(config: InstantiatorConfig) -> Self {
        Self {
            instantiator: Instantiator::new(config),
            generation: LoadGeneration::new(),
        }
    }

    pub fn instantiator(&self) -> &Instantiator {
        &self.instantiator
    }

    /// A handle on this loader's counter, for observing it from other
    /// threads.
    pub fn generation(&self) -> LoadGeneration {
        self.generation.clone()
    }

    /// Start a load. Every ticket issued before becomes stale.
    pub fn begin_load(&self) -> LoadTicket {
        let version = self.generation.advance();
        tracing::debug!(target: targets::LOADER, version, "load started");
        LoadTicket {
            generation: self.generation.clone(),
            version,
        }
    }

    /// Make every outstanding ticket stale.
    pub fn cancel(&self) {
        let version = self.generation.advance();
        tracing::debug!(target: targets::LOADER, version, "loads cancelled");
    }

    /// Whether `ticket` was issued by this loader and is still current.
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation.same_counter(&self.generation) && ticket.is_current()
    }

    /// Instantiate `graph` from `root` if `ticket` is still current.
    ///
    /// Returns `Ok(None)` without touching the compositor when the ticket is
    /// stale. Errors from the instantiation are returned as is; falling back
    /// to a previous composition is up to the caller.
    pub fn materialize_if_current<C: Compositor>(
        &self,
        ticket: &LoadTicket,
        compositor: &mut C,
        graph: &SourceGraph,
        root: NodeId,
    ) -> InstantiationResult<Option<Materialized<C::Object>>> {
        if !self.is_current(ticket) {
            tracing::debug!(
                target: targets::LOADER,
                version = ticket.version,
                current = self.generation.current(),
                "discarding stale load"
            );
            return Ok(None);
        }
        self.instantiator
            .materialize(compositor, graph, root)
            .map(Some)
    }
}
