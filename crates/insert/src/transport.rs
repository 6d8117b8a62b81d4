//! Channel-backed pool transport
//!
//! `PeerLink` models the request/reply contract towards one peer pool: a
//! bounded send queue, a pending-reply table keyed by correlation pid, and
//! the rule that a reply for an unknown pid is logged and dropped (the
//! request it belonged to has usually timed out already).
//!
//! `ChannelTransport` bundles one link per pool behind the [`Transport`]
//! seam. Production deployments replace it with the cluster's TCP
//! transport; the contract stays the same.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pulse_protocol::Package;
use pulse_routing::PoolId;
use tokio::sync::{mpsc, oneshot};

use crate::error::TransportError;
use crate::traits::Transport;

/// Request/reply channel to one peer pool
#[derive(Debug)]
pub struct PeerLink {
    pool: PoolId,
    queue: mpsc::Sender<Package>,
    pending: Mutex<HashMap<u16, oneshot::Sender<Package>>>,
    next_pid: AtomicU16,
}

impl PeerLink {
    /// Create a link feeding packages into `queue`
    ///
    /// Whatever drains the queue is responsible for eventually calling
    /// [`PeerLink::complete`] with the peer's reply.
    pub fn new(pool: PoolId, queue: mpsc::Sender<Package>) -> Self {
        Self {
            pool,
            queue,
            pending: Mutex::new(HashMap::new()),
            next_pid: AtomicU16::new(0),
        }
    }

    /// The pool this link talks to
    #[inline]
    pub fn pool(&self) -> PoolId {
        self.pool
    }

    /// Requests awaiting a reply
    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Send a package and await the peer's reply
    ///
    /// Assigns a fresh pid (wrapping u16) before the package is queued. A
    /// full queue is reported as backpressure and the pending entry is
    /// rolled back; the caller decides whether that fails the pool.
    pub async fn request(&self, mut pkg: Package) -> Result<Package, TransportError> {
        let pid = self.next_pid.fetch_add(1, Ordering::Relaxed);
        pkg.set_pid(pid);

        let (reply_tx, reply_rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(pid, reply_tx);

        if let Err(err) = self.queue.try_send(pkg) {
            self.pending.lock().unwrap().remove(&pid);
            return Err(match err {
                mpsc::error::TrySendError::Full(_) => TransportError::QueueFull(self.pool),
                mpsc::error::TrySendError::Closed(_) => TransportError::Closed(self.pool),
            });
        }

        tracing::debug!(pid, pool = %self.pool, "forwarded package to peer");

        reply_rx
            .await
            .map_err(|_| TransportError::Closed(self.pool))
    }

    /// Complete a pending request with the peer's reply
    ///
    /// A reply whose pid has no pending entry belongs to a request that
    /// timed out earlier; it is logged and dropped.
    pub fn complete(&self, reply: Package) {
        let waiter = self.pending.lock().unwrap().remove(&reply.pid());
        match waiter {
            Some(tx) => {
                // Receiver may be gone if the job gave up; that is fine
                let _ = tx.send(reply);
            }
            None => {
                tracing::warn!(
                    pid = reply.pid(),
                    pool = %self.pool,
                    tp = %reply.tp(),
                    "reply for unknown pid, request probably timed out earlier"
                );
            }
        }
    }
}

/// [`Transport`] over a set of per-pool links
#[derive(Debug, Default)]
pub struct ChannelTransport {
    links: Vec<Option<Arc<PeerLink>>>,
}

impl ChannelTransport {
    /// Create a transport with no links registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the link for a pool, replacing any previous one
    pub fn register(&mut self, link: Arc<PeerLink>) {
        let index = link.pool().as_usize();
        if index >= self.links.len() {
            self.links.resize_with(index + 1, || None);
        }
        self.links[index] = Some(link);
    }

    /// The link for a pool, if registered
    pub fn link(&self, pool: PoolId) -> Option<&Arc<PeerLink>> {
        self.links.get(pool.as_usize()).and_then(|l| l.as_ref())
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&self, pool: PoolId, pkg: Package) -> Result<Package, TransportError> {
        match self.link(pool) {
            Some(link) => link.request(pkg).await,
            None => Err(TransportError::NoRoute(pool)),
        }
    }
}
