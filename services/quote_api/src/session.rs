//! Debounced two-way quote recomputation for an interactive swap form
//!
//! Editing the input amount quotes forward, editing the output amount quotes
//! in reverse. Either edit supersedes anything pending on both fields, and the
//! pool snapshot is read when the computation runs, not when it was scheduled.
//!
//! Both fields deliver on one channel. Every edit advances the session
//! generation, and [`QuoteUpdates::next`] drops results from older
//! generations, so a superseded quote is never handed out after a newer one.

use network::{Debounced, Debouncer};
use parking_lot::RwLock;
use sluice_amm::{PoolSnapshot, QuoteEngine, QuoteError, SwapDirection, SwapQuote, TokenAmount};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteField {
    AmountIn,
    AmountOut,
}

/// Result of one debounced recomputation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteUpdate {
    /// Field the user edited
    pub field: QuoteField,
    pub input: String,
    /// Session generation of the edit
    pub generation: u64,
    pub result: Result<SwapQuote, QuoteError>,
    /// Value for the other field, in that field's decimals
    pub counterpart: Option<TokenAmount>,
}

pub struct QuoteSession {
    pool: Arc<RwLock<PoolSnapshot>>,
    direction: SwapDirection,
    decimals_in: u8,
    decimals_out: u8,
    slippage_bps: u32,
    generation: Arc<AtomicU64>,
    amount_in: Debouncer<QuoteUpdate>,
    amount_out: Debouncer<QuoteUpdate>,
}

/// Receiving side of a [`QuoteSession`]
pub struct QuoteUpdates {
    generation: Arc<AtomicU64>,
    results: UnboundedReceiver<Debounced<QuoteUpdate>>,
}

impl QuoteUpdates {
    /// Next update that is still current, or `None` once the session is dropped
    pub async fn next(&mut self) -> Option<QuoteUpdate> {
        while let Some(Debounced { value, .. }) = self.results.recv().await {
            if value.generation == self.generation.load(Ordering::SeqCst) {
                return Some(value);
            }
            debug!(
                "Dropping superseded {:?} quote for '{}' (generation {})",
                value.field, value.input, value.generation
            );
        }
        None
    }
}

impl QuoteSession {
    pub fn new(
        pool: PoolSnapshot,
        direction: SwapDirection,
        decimals_in: u8,
        decimals_out: u8,
        slippage_bps: u32,
        delay: Duration,
    ) -> (Self, QuoteUpdates) {
        let (sender, results) = mpsc::unbounded_channel();
        let generation = Arc::new(AtomicU64::new(0));
        let session = Self {
            pool: Arc::new(RwLock::new(pool)),
            direction,
            decimals_in,
            decimals_out,
            slippage_bps,
            generation: generation.clone(),
            amount_in: Debouncer::with_sender(delay, sender.clone()),
            amount_out: Debouncer::with_sender(delay, sender),
        };
        (session, QuoteUpdates { generation, results })
    }

    /// User typed into the input field; an empty string clears pending work
    ///
    /// Returns the session generation of the scheduled quote.
    pub fn set_amount_in(&self, input: &str) -> Option<u64> {
        let generation = self.begin_edit();
        if input.trim().is_empty() {
            return None;
        }

        let pool = self.pool.clone();
        let (direction, slippage_bps) = (self.direction, self.slippage_bps);
        let (decimals_in, decimals_out) = (self.decimals_in, self.decimals_out);
        let input = input.to_string();
        self.amount_in.schedule(async move {
            let result = TokenAmount::parse(&input, decimals_in)
                .map_err(QuoteError::from)
                .and_then(|amount| {
                    QuoteEngine::quote_swap(&pool.read(), direction, amount.raw, slippage_bps)
                });
            let counterpart = result
                .as_ref()
                .ok()
                .map(|quote| TokenAmount::new(quote.amount_out, decimals_out));
            QuoteUpdate {
                field: QuoteField::AmountIn,
                input,
                generation,
                result,
                counterpart,
            }
        });
        Some(generation)
    }

    /// User typed into the output field; quotes the input needed for it
    pub fn set_amount_out(&self, input: &str) -> Option<u64> {
        let generation = self.begin_edit();
        if input.trim().is_empty() {
            return None;
        }

        let pool = self.pool.clone();
        let (direction, slippage_bps) = (self.direction, self.slippage_bps);
        let (decimals_in, decimals_out) = (self.decimals_in, self.decimals_out);
        let input = input.to_string();
        self.amount_out.schedule(async move {
            let result = TokenAmount::parse(&input, decimals_out)
                .map_err(QuoteError::from)
                .and_then(|amount| {
                    QuoteEngine::quote_exact_output(&pool.read(), direction, amount.raw, slippage_bps)
                });
            let counterpart = result
                .as_ref()
                .ok()
                .map(|quote| TokenAmount::new(quote.amount_in, decimals_in));
            QuoteUpdate {
                field: QuoteField::AmountOut,
                input,
                generation,
                result,
                counterpart,
            }
        });
        Some(generation)
    }

    /// Replace the snapshot; pending computations will see the new one
    pub fn update_pool(&self, pool: PoolSnapshot) {
        debug!("Quote session pool {} refreshed", pool.pool_id);
        *self.pool.write() = pool;
    }

    /// Applies to computations scheduled after this call
    pub fn set_slippage_bps(&mut self, slippage_bps: u32) {
        self.slippage_bps = slippage_bps;
    }

    /// Retire everything pending or queued
    pub fn cancel(&self) {
        self.begin_edit();
    }

    fn begin_edit(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.amount_in.cancel();
        self.amount_out.cancel();
        generation
    }
}
