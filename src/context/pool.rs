//! Context pooling.
//!
//! # Responsibilities
//! - Hand out reusable `Context` instances to concurrent requests
//! - Reset and take back instances when the request completes
//! - Cap the number of idle instances kept around
//!
//! # Design Decisions
//! - A RAII guard owns the checked-out instance; drop returns it
//! - Contexts move in and out of the pool by value; an empty `Context` owns
//!   no heap memory, so swapping one in on drop costs nothing
//! - The idle list is a mutex-protected stack; the critical section is a push or pop
//! - A poisoned lock is recovered, since every instance is reset before reuse

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::context::Context;
use crate::observability::metrics;

/// Shared pool of request contexts.
#[derive(Debug)]
pub struct ContextPool {
    idle: Mutex<Vec<Context>>,
    max_idle: usize,
    allocated: AtomicUsize,
}

impl ContextPool {
    /// Create an empty pool that keeps at most `max_idle` instances.
    pub fn new(max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::with_capacity(max_idle.min(1024))),
            max_idle,
            allocated: AtomicUsize::new(0),
        }
    }

    /// Create a pool with `prewarm` instances allocated up front.
    pub fn with_prewarm(max_idle: usize, prewarm: usize) -> Self {
        let pool = Self::new(max_idle);
        let count = prewarm.min(max_idle);
        {
            let mut idle = pool.lock();
            idle.extend((0..count).map(|_| Context::new()));
        }
        pool.allocated.store(count, Ordering::Relaxed);
        pool
    }

    /// Check out a context. Creates one only when no idle instance exists.
    pub fn acquire(&self) -> PooledContext<'_> {
        let reused = self.lock().pop();
        let ctx = match reused {
            Some(ctx) => ctx,
            None => {
                self.allocated.fetch_add(1, Ordering::Relaxed);
                metrics::record_pool_allocation();
                Context::new()
            }
        };
        PooledContext { pool: self, ctx }
    }

    fn release(&self, mut ctx: Context) {
        ctx.reset();
        let mut idle = self.lock();
        if idle.len() < self.max_idle {
            idle.push(ctx);
        }
        metrics::record_pool_idle(idle.len());
    }

    /// Instances currently waiting for reuse.
    pub fn idle(&self) -> usize {
        self.lock().len()
    }

    /// Instances created over the pool's lifetime.
    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Context>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ContextPool {
    fn default() -> Self {
        Self::new(1024)
    }
}

/// A checked-out context. Returned to the pool on drop.
#[derive(Debug)]
pub struct PooledContext<'a> {
    pool: &'a ContextPool,
    ctx: Context,
}

impl PooledContext<'_> {
    /// Return the context now instead of at end of scope.
    pub fn release(self) {}
}

impl Deref for PooledContext<'_> {
    type Target = Context;

    fn deref(&self) -> &Self::Target {
        &self.ctx
    }
}

impl DerefMut for PooledContext<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.ctx
    }
}

impl Drop for PooledContext<'_> {
    fn drop(&mut self) {
        let ctx = std::mem::take(&mut self.ctx);
        self.pool.release(ctx);
    }
}
