//! Render Resource Pool
//!
//! Keeps draw resources for connections alive between frames so forming and
//! dissolving connections never allocates once the pool has warmed up.
//!
//! # Architecture
//!
//! ```text
//! RenderResourcePool
//!         ├── arena (SlotMap of every resource ever created)
//!         ├── free list (handles ready for reuse)
//!         └── checked out (connection key → handle)
//!                     ↓
//!              O(1) acquire / release
//! ```
//!
//! A key holds at most one resource, so two connections never share one.
//! Everything still pooled is disposed through the factory when the pool is
//! dropped.

mod line;

pub use line::{LineGeometry, LineMaterial, LineResource, LineResourceFactory, LineVertex};

use std::collections::HashMap;
use std::hash::Hash;

use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

new_key_type! {
    /// Handle to a resource inside the pool arena
    pub struct ResourceHandle;
}

/// Resource pool errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The factory refused to create more resources
    #[error("resource limit of {limit} reached")]
    Exhausted {
        /// Maximum number of live resources
        limit: usize,
    },

    /// Resource creation failed
    #[error("resource allocation failed: {0}")]
    AllocationFailed(String),
}

/// Creates and destroys the pooled resource type
pub trait ResourceFactory {
    /// Resource handed out by the pool
    type Resource;

    /// Create a fresh resource
    fn create(&mut self) -> Result<Self::Resource, PoolError>;

    /// Destroy a resource that will never be reused
    fn dispose(&mut self, resource: Self::Resource);
}

/// Statistics for the pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Resources created through the factory
    pub allocated: u64,
    /// Acquisitions served from the free list
    pub reused: u64,
    /// Resources returned to the free list
    pub released: u64,
    /// Resources disposed
    pub disposed: u64,
    /// Resources checked out right now
    pub outstanding: usize,
}

/// Keyed arena/free-list of reusable draw resources
pub struct RenderResourcePool<K, F>
where
    K: Copy + Eq + Hash,
    F: ResourceFactory,
{
    factory: F,
    arena: SlotMap<ResourceHandle, F::Resource>,
    free: Vec<ResourceHandle>,
    checked_out: HashMap<K, ResourceHandle>,
    stats: PoolStats,
}

impl<K, F> RenderResourcePool<K, F>
where
    K: Copy + Eq + Hash,
    F: ResourceFactory,
{
    /// Create an empty pool
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            arena: SlotMap::with_key(),
            free: Vec::new(),
            checked_out: HashMap::new(),
            stats: PoolStats::default(),
        }
    }

    /// Resource for `key`, checking one out if the key has none yet.
    ///
    /// Reuses a free resource before asking the factory for a new one.
    pub fn acquire(&mut self, key: K) -> Result<ResourceHandle, PoolError> {
        if let Some(&handle) = self.checked_out.get(&key) {
            return Ok(handle);
        }

        let handle = if let Some(handle) = self.free.pop() {
            self.stats.reused += 1;
            handle
        } else {
            let resource = self.factory.create()?;
            self.stats.allocated += 1;
            self.arena.insert(resource)
        };

        self.checked_out.insert(key, handle);
        Ok(handle)
    }

    /// Return the resource held by `key` to the free list.
    ///
    /// Returns `false` when `key` held nothing.
    pub fn release(&mut self, key: &K) -> bool {
        match self.checked_out.remove(key) {
            Some(handle) => {
                self.free.push(handle);
                self.stats.released += 1;
                true
            }
            None => false,
        }
    }

    /// Dispose every resource, pooled or checked out
    pub fn dispose_all(&mut self) {
        let count = self.arena.len();
        for (_, resource) in self.arena.drain() {
            self.factory.dispose(resource);
        }
        self.free.clear();
        self.checked_out.clear();
        self.stats.disposed += count as u64;
        if count > 0 {
            log::debug!("Disposed {} pooled render resource(s)", count);
        }
    }

    /// Resource behind `handle`
    pub fn get(&self, handle: ResourceHandle) -> Option<&F::Resource> {
        self.arena.get(handle)
    }

    /// Mutable resource behind `handle`
    pub fn get_mut(&mut self, handle: ResourceHandle) -> Option<&mut F::Resource> {
        self.arena.get_mut(handle)
    }

    /// Resource currently checked out for `key`
    pub fn resource_for(&self, key: &K) -> Option<&F::Resource> {
        self.checked_out.get(key).and_then(|&handle| self.arena.get(handle))
    }

    /// Checked-out resources with their keys
    pub fn checked_out(&self) -> impl Iterator<Item = (K, &F::Resource)> + '_ {
        self.checked_out
            .iter()
            .filter_map(|(&key, &handle)| self.arena.get(handle).map(|resource| (key, resource)))
    }

    /// Number of resources checked out
    pub fn outstanding(&self) -> usize {
        self.checked_out.len()
    }

    /// Number of resources waiting on the free list
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Total resources alive in the arena
    pub fn capacity(&self) -> usize {
        self.arena.len()
    }

    /// Lifetime statistics
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            outstanding: self.checked_out.len(),
            ..self.stats
        }
    }

    /// The factory
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Mutable access to the factory
    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }
}

impl<K, F> Drop for RenderResourcePool<K, F>
where
    K: Copy + Eq + Hash,
    F: ResourceFactory,
{
    fn drop(&mut self) {
        self.dispose_all();
    }
}

impl<K, F> std::fmt::Debug for RenderResourcePool<K, F>
where
    K: Copy + Eq + Hash,
    F: ResourceFactory,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderResourcePool")
            .field("capacity", &self.arena.len())
            .field("free", &self.free.len())
            .field("outstanding", &self.checked_out.len())
            .field("stats", &self.stats)
            .finish()
    }
}
