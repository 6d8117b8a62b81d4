//! Batch classifier: one client payload in, one sub-batch per pool out
//!
//! The classifier walks the decoded payload exactly once. Every point is
//! validated on the way through and re-packed into the encoder of the pool
//! that owns its series. Per-pool encoders are allocated lazily on first
//! write, so a large cluster does not pay for pools the payload never
//! touches.
//!
//! Any validation failure aborts the whole request: the caller discards
//! the partially built sub-batches and nothing reaches the network.

use bytes::Bytes;
use pulse_protocol::{strip_term, Packer, Token, Unpacker};
use pulse_routing::{PoolId, PoolMap};

use crate::config::InsertConfig;
use crate::error::InsertError;
use crate::Result;

/// One pool's share of an insert request
#[derive(Debug, Clone)]
pub struct PoolBatch {
    /// The pool the batch is routed to
    pub pool: PoolId,
    /// Number of points in the batch
    pub points: usize,
    /// Wire-encoded sub-batch: a map of series name to points
    pub body: Bytes,
}

/// Per-pool encoder state
#[derive(Debug)]
struct SubBatch {
    packer: Packer,
    points: usize,
}

/// The classifier's output: lazily allocated per-pool sub-batches
#[derive(Debug)]
pub struct SubBatches {
    slots: Vec<Option<SubBatch>>,
    total_points: usize,
}

impl SubBatches {
    fn new(pool_count: u16) -> Self {
        let mut slots = Vec::with_capacity(pool_count as usize);
        slots.resize_with(pool_count as usize, || None);
        Self {
            slots,
            total_points: 0,
        }
    }

    /// The pool's encoder, created with `MAP_OPEN` on first use
    fn packer_for(&mut self, pool: PoolId) -> &mut Packer {
        let slot = &mut self.slots[pool.as_usize()];
        let sub = slot.get_or_insert_with(|| {
            let mut packer = Packer::new();
            packer.open_map();
            SubBatch { packer, points: 0 }
        });
        &mut sub.packer
    }

    fn count_point(&mut self, pool: PoolId) {
        // Slot exists: the series name was written before its points
        if let Some(sub) = &mut self.slots[pool.as_usize()] {
            sub.points += 1;
        }
        self.total_points += 1;
    }

    /// Total number of points across all pools
    #[inline]
    pub fn total_points(&self) -> usize {
        self.total_points
    }

    /// Number of pools with at least one series
    pub fn batch_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// View one pool's encoded sub-batch
    pub fn sub_batch(&self, pool: PoolId) -> Option<&[u8]> {
        self.slots
            .get(pool.as_usize())
            .and_then(|s| s.as_ref())
            .map(|s| s.packer.as_slice())
    }

    /// Points routed to one pool
    pub fn points_for(&self, pool: PoolId) -> usize {
        self.slots
            .get(pool.as_usize())
            .and_then(|s| s.as_ref())
            .map_or(0, |s| s.points)
    }

    /// Consume into the non-empty pool batches
    ///
    /// Empty sub-batches were never allocated, so everything returned here
    /// is worth transmitting.
    pub fn into_pool_batches(self) -> (usize, Vec<PoolBatch>) {
        let total = self.total_points;
        let batches = self
            .slots
            .into_iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                slot.map(|sub| PoolBatch {
                    pool: PoolId::new(index as u16),
                    points: sub.points,
                    body: sub.packer.into_bytes(),
                })
            })
            .collect();
        (total, batches)
    }
}

/// Classify a client insert payload into per-pool sub-batches
///
/// `unpacker` must be positioned at the start of the payload body. The
/// top level is either a map of `series name -> array of points`, or a
/// flat array (accepted, produces no sub-batches; reserved shape).
///
/// Returns the filled [`SubBatches`] or the first validation error; on
/// error nothing must be transmitted.
pub fn classify(
    unpacker: &mut Unpacker<'_>,
    pools: &PoolMap,
    config: &InsertConfig,
) -> Result<SubBatches> {
    let mut out = SubBatches::new(pools.pool_count());

    let top = unpacker
        .next()
        .map_err(|_| InsertError::ExpectingMapOrArray)?;

    match top {
        Token::MapOpen => {
            classify_map(unpacker, pools, config, &mut out)?;
            Ok(out)
        }
        top if top.is_array() => {
            tracing::debug!("array-form insert payload, no sub-batches produced");
            Ok(out)
        }
        _ => Err(InsertError::ExpectingMapOrArray),
    }
}

/// Walk the series map, routing and validating as we go
///
/// Decoder failures map to the error of whatever the classifier was
/// expecting at that position, so truncated input surfaces the same codes
/// a type mismatch would.
fn classify_map(
    unpacker: &mut Unpacker<'_>,
    pools: &PoolMap,
    config: &InsertConfig,
    out: &mut SubBatches,
) -> Result<()> {
    let mut tok = unpacker
        .next()
        .map_err(|_| InsertError::ExpectingSeriesNameAndPoints)?;

    while let Token::Raw(raw_name) = tok {
        let name = strip_term(raw_name);
        if name.is_empty() {
            return Err(InsertError::ExpectingSeriesNameAndPoints);
        }
        let pool = pools.pool_of(name);
        out.packer_for(pool).push_raw_term(name);

        let points_array = unpacker
            .next()
            .map_err(|_| InsertError::ExpectingArrayOfPoints)?;
        if !points_array.is_array() {
            return Err(InsertError::ExpectingArrayOfPoints);
        }
        out.packer_for(pool).open_array();

        tok = unpacker
            .next()
            .map_err(|_| InsertError::ExpectingAtLeastOnePoint)?;
        if tok != Token::Array(2) {
            return Err(InsertError::ExpectingAtLeastOnePoint);
        }

        while tok == Token::Array(2) {
            let ts = match unpacker.next().map_err(|_| InsertError::ExpectingIntegerTs)? {
                Token::Int64(ts) => ts,
                _ => return Err(InsertError::ExpectingIntegerTs),
            };
            if !config.valid_ts(ts) {
                return Err(InsertError::TimestampOutOfRange);
            }

            let packer = out.packer_for(pool);
            packer.push_array_header(2);
            packer.push_int(ts);

            match unpacker.next().map_err(|_| InsertError::UnsupportedValue)? {
                Token::Int64(v) => out.packer_for(pool).push_int(v),
                Token::Double(v) => out.packer_for(pool).push_double(v),
                Token::Raw(v) => out.packer_for(pool).push_raw(v),
                _ => return Err(InsertError::UnsupportedValue),
            }
            out.count_point(pool);

            tok = unpacker
                .next()
                .map_err(|_| InsertError::ExpectingSeriesNameAndPoints)?;
        }

        // A fixed-arity points array has no close token; the loop already
        // stopped on the next series name or the end of the map.
        if tok == Token::ArrayClose {
            tok = unpacker
                .next()
                .map_err(|_| InsertError::ExpectingSeriesNameAndPoints)?;
        }
        out.packer_for(pool).close_array();
    }

    match tok {
        Token::End | Token::MapClose => Ok(()),
        _ => Err(InsertError::ExpectingSeriesNameAndPoints),
    }
}
