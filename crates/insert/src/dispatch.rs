//! Insert dispatcher
//!
//! Drives an [`InsertJob`] from fan-out to its single reply. One task per
//! non-empty sub-batch reports into an outcome channel; a single deadline
//! covers the whole job. Pools that miss the deadline are recorded as
//! failed, and their late outcomes die at the closed channel.

use std::collections::HashSet;
use std::sync::Arc;

use pulse_protocol::{Package, PackageType, Token, Unpacker};
use pulse_routing::{PoolId, PoolMap, RoutingError};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::classify::{classify, PoolBatch};
use crate::config::InsertConfig;
use crate::error::{FailureReason, PoolFailure};
use crate::job::{InsertJob, JobState};
use crate::local::apply_local;
use crate::metrics::InsertMetrics;
use crate::reply;
use crate::traits::{PointStorage, SeriesRegistry, Transport};

/// One pool's report: points accepted, or why it failed
type Outcome = (PoolId, Result<usize, FailureReason>);

/// Fans insert jobs out across the cluster and aggregates the outcomes
pub struct Dispatcher<R, S, T> {
    registry: Arc<R>,
    storage: Arc<S>,
    transport: Arc<T>,
    pools: PoolMap,
    local_pool: PoolId,
    config: InsertConfig,
    metrics: Arc<InsertMetrics>,
}

impl<R, S, T> Dispatcher<R, S, T>
where
    R: SeriesRegistry + 'static,
    S: PointStorage + 'static,
    T: Transport + 'static,
{
    /// Create a dispatcher for the pool this server belongs to
    ///
    /// # Panics
    ///
    /// Panics if `local_pool` is not within `config.pool_count`.
    pub fn new(
        config: InsertConfig,
        local_pool: PoolId,
        registry: Arc<R>,
        storage: Arc<S>,
        transport: Arc<T>,
    ) -> Result<Self, RoutingError> {
        let pools = PoolMap::new(config.pool_count)?;
        assert!(
            local_pool.index() < config.pool_count,
            "{local_pool} is outside the cluster of {} pool(s)",
            config.pool_count
        );
        Ok(Self {
            registry,
            storage,
            transport,
            pools,
            local_pool,
            config,
            metrics: Arc::new(InsertMetrics::new()),
        })
    }

    /// The cluster's pool map
    #[inline]
    pub fn pools(&self) -> &PoolMap {
        &self.pools
    }

    /// The pool this server writes locally
    #[inline]
    pub fn local_pool(&self) -> PoolId {
        self.local_pool
    }

    /// The active configuration
    #[inline]
    pub fn config(&self) -> &InsertConfig {
        &self.config
    }

    /// The dispatcher's metrics
    #[inline]
    pub fn metrics(&self) -> &InsertMetrics {
        &self.metrics
    }

    /// A metrics handle that stays valid independent of the dispatcher
    pub fn metrics_handle(&self) -> Arc<InsertMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Process one `REQ_INSERT` package end to end
    ///
    /// Classifies the body, dispatches on success, and sends exactly one
    /// reply package through `client` either way.
    pub async fn handle_insert(&self, request: Package, client: mpsc::Sender<Package>) {
        let mut unpacker = Unpacker::new(request.body());
        match classify(&mut unpacker, &self.pools, &self.config) {
            Ok(sub_batches) => {
                let job = InsertJob::new(request.pid(), sub_batches);
                self.dispatch(job, client).await;
            }
            Err(err) => {
                self.metrics.record_rejected();
                tracing::debug!(pid = request.pid(), error = %err, "insert request rejected");
                self.reply_to(client, reply::classify_error(request.pid(), err))
                    .await;
            }
        }
    }

    /// Drive a classified job to its reply
    pub async fn dispatch(&self, mut job: InsertJob, client: mpsc::Sender<Package>) {
        self.metrics.record_request(job.total_points());

        job.advance(JobState::Fanout);
        let deadline = Instant::now() + self.config.timeout();

        let batches = job.take_batches();
        let mut pending: HashSet<PoolId> = batches.iter().map(|b| b.pool).collect();
        let (outcome_tx, mut outcome_rx) = mpsc::channel::<Outcome>(pending.len().max(1));

        for batch in batches {
            if batch.pool == self.local_pool {
                self.spawn_local(batch, outcome_tx.clone());
            } else {
                self.spawn_remote(batch, outcome_tx.clone());
            }
        }
        drop(outcome_tx);

        let mut successful_points = 0usize;
        let deadline = sleep_until(deadline);
        tokio::pin!(deadline);

        while !pending.is_empty() {
            tokio::select! {
                outcome = outcome_rx.recv() => match outcome {
                    Some((pool, Ok(points))) => {
                        pending.remove(&pool);
                        successful_points += points;
                    }
                    Some((pool, Err(reason))) => {
                        pending.remove(&pool);
                        self.metrics.record_pool_failure();
                        job.record_failure(PoolFailure::new(pool, reason));
                    }
                    None => break,
                },
                _ = &mut deadline => {
                    for pool in pending.drain() {
                        self.metrics.record_timeout();
                        self.metrics.record_pool_failure();
                        job.record_failure(PoolFailure::new(pool, FailureReason::Timeout));
                    }
                }
            }
        }
        // Closing the channel drops any late outcome on the floor
        drop(outcome_rx);

        job.advance(JobState::Replied);
        let package = if job.failures().is_empty() {
            reply::success(job.pid(), job.total_points())
        } else {
            reply::pool_failure(job.pid(), job.failures(), successful_points)
        };
        self.reply_to(client, package).await;
        self.metrics.record_reply();

        job.advance(JobState::Released);
        // The job, its remaining buffers and the client handle drop here
    }

    /// Apply the local pool's sub-batch on its own task
    fn spawn_local(&self, batch: PoolBatch, outcome_tx: mpsc::Sender<Outcome>) {
        let registry = Arc::clone(&self.registry);
        let storage = Arc::clone(&self.storage);
        let metrics = Arc::clone(&self.metrics);

        tokio::spawn(async move {
            let pool = batch.pool;
            let outcome = apply_local(&*registry, &*storage, &batch.body).await;
            if let Ok(points) = &outcome {
                metrics.record_appended(*points);
            }
            if outcome_tx.send((pool, outcome)).await.is_err() {
                tracing::debug!(pool = %pool, "job already replied, dropping local outcome");
            }
        });
    }

    /// Forward a remote pool's sub-batch and interpret the peer's reply
    fn spawn_remote(&self, batch: PoolBatch, outcome_tx: mpsc::Sender<Outcome>) {
        let transport = Arc::clone(&self.transport);
        let metrics = Arc::clone(&self.metrics);

        tokio::spawn(async move {
            let pool = batch.pool;
            let points = batch.points;
            metrics.record_forwarded();

            let pkg = Package::new(0, PackageType::ReqInsert, batch.body);
            let outcome = match transport.send(pool, pkg).await {
                Ok(rep) => match rep.tp() {
                    PackageType::ResAck => Ok(points),
                    PackageType::ResInsertError => Err(FailureReason::Peer(peer_error_text(&rep))),
                    other => Err(FailureReason::UnexpectedReply(other)),
                },
                Err(err) => Err(FailureReason::Transport(err)),
            };

            if outcome_tx.send((pool, outcome)).await.is_err() {
                tracing::debug!(pool = %pool, "job already replied, dropping peer outcome");
            }
        });
    }

    /// Deliver the reply, tolerating a client that is already gone
    async fn reply_to(&self, client: mpsc::Sender<Package>, package: Package) {
        let pid = package.pid();
        if client.send(package).await.is_err() {
            tracing::warn!(pid, "client disconnected before insert reply, dropping");
        }
    }
}

impl<R, S, T> std::fmt::Debug for Dispatcher<R, S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("local_pool", &self.local_pool)
            .field("pool_count", &self.pools.pool_count())
            .finish()
    }
}

/// Pull the message text out of a peer's `{"error_msg": <raw>}` body
fn peer_error_text(pkg: &Package) -> String {
    let mut unpacker = Unpacker::new(pkg.body());
    let mut last_raw: Option<String> = None;
    loop {
        match unpacker.next() {
            Ok(Token::Raw(raw)) => last_raw = Some(String::from_utf8_lossy(raw).into_owned()),
            Ok(Token::End) | Err(_) => break,
            Ok(_) => {}
        }
    }
    last_raw.unwrap_or_else(|| "peer returned no error message".into())
}
