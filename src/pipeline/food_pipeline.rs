//! Food classification pipeline
//!
//! One `fetch` call issues one catalog request on a background task.
//! The outcome crosses an internal channel to the pipeline's delivery
//! task, which classifies the food and emits it on exactly one output
//! relay. Overlapping fetches are neither coalesced nor serialized —
//! outcomes are delivered in arrival order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, warn};

use crate::catalog::{CatalogError, FoodCatalog};
use crate::config::TierThresholds;
use crate::relay::Relay;
use crate::types::{Food, FoodResponse, Tier};

use super::classifier::classify;

/// Errors surfaced on the pipeline's error relay.
///
/// Relay payloads must be `Clone`, so the transport error arrives here
/// already rendered to text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("catalog request failed: {0}")]
    Catalog(String),
    #[error("no food found for id {0}")]
    FoodNotFound(String),
}

/// Output relays of a pipeline, one per observable side effect.
///
/// Each relay replays its latest value to new subscribers.
#[derive(Debug, Default)]
pub struct FoodChannels {
    /// Foods below the yellow cut point
    pub green: Relay<Food>,
    /// Foods between the yellow and red cut points
    pub yellow: Relay<Food>,
    /// Foods at or above the red cut point
    pub red: Relay<Food>,
    /// Foods with a negative value or no nutrient entries
    pub unknown: Relay<Food>,
    /// True while at least one fetch is awaiting its outcome
    pub progress: Relay<bool>,
    /// Transport failures and empty catalog responses
    pub error: Relay<PipelineError>,
}

/// Outcome of one catalog request, queued for the delivery task.
struct FetchOutcome {
    epoch: u64,
    food_id: String,
    result: Result<FoodResponse, CatalogError>,
}

/// The classification pipeline.
///
/// Owns its output relays and the cancellation handles of in-flight
/// fetches. The transport is injected and shared; thresholds are fixed
/// per instance. Must be created inside a tokio runtime.
pub struct FoodPipeline {
    catalog: Arc<dyn FoodCatalog>,
    channels: Arc<FoodChannels>,
    outcome_tx: mpsc::UnboundedSender<FetchOutcome>,
    /// Bumped by `cleanup` — queued outcomes from an older epoch are
    /// discarded before any emission
    epoch: Arc<AtomicU64>,
    fetches: Mutex<Vec<AbortHandle>>,
    delivery: JoinHandle<()>,
}

impl FoodPipeline {
    /// Create a pipeline over the given transport and thresholds, and
    /// start its delivery task.
    pub fn new(catalog: Arc<dyn FoodCatalog>, thresholds: TierThresholds) -> Self {
        if thresholds.yellow_level > thresholds.red_level {
            warn!(
                "[FoodPipeline] yellow_level ({}) exceeds red_level ({}) — yellow tier unreachable",
                thresholds.yellow_level, thresholds.red_level,
            );
        }

        let channels = Arc::new(FoodChannels::default());
        let epoch = Arc::new(AtomicU64::new(0));
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        let delivery = tokio::spawn(delivery_loop(
            outcome_rx,
            Arc::clone(&channels),
            thresholds,
            Arc::clone(&epoch),
        ));

        Self {
            catalog,
            channels,
            outcome_tx,
            epoch,
            fetches: Mutex::new(Vec::new()),
            delivery,
        }
    }

    /// The pipeline's output relays.
    pub fn channels(&self) -> &FoodChannels {
        &self.channels
    }

    /// Trigger one asynchronous fetch for `food_id`.
    ///
    /// Emits `progress = true` immediately; the request runs on a
    /// background task and its outcome is classified and emitted by the
    /// delivery task. Overlapping calls each issue their own request.
    pub fn fetch(&self, food_id: &str) {
        let epoch = self.epoch.load(Ordering::SeqCst);
        self.channels.progress.emit(true);

        let catalog = Arc::clone(&self.catalog);
        let outcome_tx = self.outcome_tx.clone();
        let food_id = food_id.to_string();

        let handle = tokio::spawn(async move {
            let result = catalog.get_food_item(&food_id).await;
            // delivery task gone only during teardown
            let _ = outcome_tx.send(FetchOutcome {
                epoch,
                food_id,
                result,
            });
        });

        let mut fetches = self.lock_fetches();
        fetches.retain(|h| !h.is_finished());
        fetches.push(handle.abort_handle());
    }

    /// Cancel every in-flight fetch.
    ///
    /// No channel receives any emission from fetches issued before this
    /// call: the request tasks are aborted, and outcomes already queued
    /// for delivery are discarded by the epoch check. The progress relay
    /// is left at whatever it last held. The pipeline stays usable for
    /// new `fetch` calls.
    pub fn cleanup(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let mut fetches = self.lock_fetches();
        let cancelled = fetches.len();
        for handle in fetches.drain(..) {
            handle.abort();
        }
        if cancelled > 0 {
            debug!("[FoodPipeline] cleanup aborted {} in-flight fetch(es)", cancelled);
        }
    }

    fn lock_fetches(&self) -> std::sync::MutexGuard<'_, Vec<AbortHandle>> {
        self.fetches.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for FoodPipeline {
    fn drop(&mut self) {
        self.cleanup();
        self.delivery.abort();
    }
}

/// Delivery task: classification and every terminal emission happen
/// here, in outcome arrival order, never on the request tasks.
async fn delivery_loop(
    mut outcome_rx: mpsc::UnboundedReceiver<FetchOutcome>,
    channels: Arc<FoodChannels>,
    thresholds: TierThresholds,
    epoch: Arc<AtomicU64>,
) {
    while let Some(outcome) = outcome_rx.recv().await {
        if outcome.epoch != epoch.load(Ordering::SeqCst) {
            debug!(
                "[FoodPipeline] Discarding outcome for {} — cancelled by cleanup",
                outcome.food_id,
            );
            continue;
        }

        channels.progress.emit(false);

        match outcome.result {
            Ok(response) => match response.into_first_food() {
                Some(food) => route(&channels, &thresholds, food),
                None => {
                    warn!(
                        "[FoodPipeline] Catalog returned no food for {}",
                        outcome.food_id,
                    );
                    channels
                        .error
                        .emit(PipelineError::FoodNotFound(outcome.food_id));
                }
            },
            Err(e) => {
                warn!(
                    "[FoodPipeline] Catalog request for {} failed: {}",
                    outcome.food_id, e,
                );
                channels.error.emit(PipelineError::Catalog(e.to_string()));
            }
        }
    }
}

/// Route one food onto its tier relay.
fn route(channels: &FoodChannels, thresholds: &TierThresholds, food: Food) {
    let raw = match food.nutrients.first() {
        Some(nutrient) => nutrient.value.clone(),
        None => {
            channels.unknown.emit(food);
            return;
        }
    };

    match raw.parse::<f64>() {
        Ok(value) => {
            let tier = classify(value, thresholds);
            debug!("[FoodPipeline] {} classified {} (value {})", food.ndbno, tier, value);
            match tier {
                Tier::Green => channels.green.emit(food),
                Tier::Yellow => channels.yellow.emit(food),
                Tier::Red => channels.red.emit(food),
                Tier::Unknown => channels.unknown.emit(food),
            }
        }
        // Parse failures are logged and swallowed — deliberately no
        // emission on any relay, not even unknown (see DESIGN.md).
        Err(e) => {
            error!(
                "[FoodPipeline] Error parsing nutrient value {:?} for {}: {}",
                raw, food.ndbno, e,
            );
        }
    }
}
