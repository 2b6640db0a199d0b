//! Pipeline Integration Tests
//!
//! Exercises the full classification pipeline against scripted catalog
//! implementations: tier routing, the error path, the swallowed parse
//! failure, and cancellation via cleanup().

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use nutriwatch::{
    CatalogError, Food, FoodCatalog, FoodNutrient, FoodPipeline, FoodResponse, PipelineError,
    TierThresholds,
};
use nutriwatch::types::FoodReport;

/// Catalog that answers each request with the next scripted outcome.
struct ScriptedCatalog {
    outcomes: Mutex<VecDeque<Result<FoodResponse, CatalogError>>>,
}

impl ScriptedCatalog {
    fn new(outcomes: Vec<Result<FoodResponse, CatalogError>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
        })
    }
}

#[async_trait]
impl FoodCatalog for ScriptedCatalog {
    async fn get_food_item(&self, _food_id: &str) -> Result<FoodResponse, CatalogError> {
        self.outcomes
            .lock()
            .await
            .pop_front()
            .expect("no scripted outcome left")
    }
}

/// Catalog that never answers within the test's horizon.
struct HangingCatalog;

#[async_trait]
impl FoodCatalog for HangingCatalog {
    async fn get_food_item(&self, _food_id: &str) -> Result<FoodResponse, CatalogError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(response_with_value("5"))
    }
}

fn thresholds() -> TierThresholds {
    TierThresholds {
        yellow_level: 10.0,
        red_level: 20.0,
    }
}

fn food_with_value(value: &str) -> Food {
    Food {
        ndbno: "45001".to_string(),
        name: "Test food".to_string(),
        measure: "1.0 cup".to_string(),
        nutrients: vec![FoodNutrient {
            nutrient: "Sugars, total".to_string(),
            unit: "g".to_string(),
            value: value.to_string(),
        }],
    }
}

fn response_with_value(value: &str) -> FoodResponse {
    FoodResponse {
        report: Some(FoodReport {
            foods: vec![food_with_value(value)],
        }),
    }
}

/// Await one value from a relay subscription with a test deadline.
async fn recv_within<T: Clone>(
    sub: &mut nutriwatch::RelaySubscription<T>,
    what: &str,
) -> T {
    tokio::time::timeout(Duration::from_secs(5), sub.recv())
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {what}"))
        .unwrap_or_else(|| panic!("relay closed while waiting for {what}"))
}

#[tokio::test]
async fn test_green_yellow_red_unknown_routing() {
    // thresholds 10/20: "5" green, "15" yellow, "25" red, "-1" unknown
    let cases = [
        ("5", "green"),
        ("15", "yellow"),
        ("25", "red"),
        ("-1", "unknown"),
    ];

    for (value, expected) in cases {
        let catalog = ScriptedCatalog::new(vec![Ok(response_with_value(value))]);
        let pipeline = FoodPipeline::new(catalog, thresholds());
        let channels = pipeline.channels();

        let mut green = channels.green.subscribe();
        let mut yellow = channels.yellow.subscribe();
        let mut red = channels.red.subscribe();
        let mut unknown = channels.unknown.subscribe();
        let mut error = channels.error.subscribe();

        pipeline.fetch("45001");

        let food = match expected {
            "green" => recv_within(&mut green, "green emission").await,
            "yellow" => recv_within(&mut yellow, "yellow emission").await,
            "red" => recv_within(&mut red, "red emission").await,
            _ => recv_within(&mut unknown, "unknown emission").await,
        };
        assert_eq!(food.ndbno, "45001");
        assert_eq!(food.nutrients[0].value, value);

        // exactly one channel fired
        tokio::task::yield_now().await;
        let others = [
            ("green", green.try_recv().is_some(), expected == "green"),
            ("yellow", yellow.try_recv().is_some(), expected == "yellow"),
            ("red", red.try_recv().is_some(), expected == "red"),
            ("unknown", unknown.try_recv().is_some(), expected == "unknown"),
        ];
        for (name, fired, was_expected) in others {
            if !was_expected {
                assert!(!fired, "value {value} must not reach the {name} channel");
            }
        }
        assert!(error.try_recv().is_none(), "no error for value {value}");
    }
}

#[tokio::test]
async fn test_progress_toggles_around_fetch() {
    let catalog = ScriptedCatalog::new(vec![Ok(response_with_value("5"))]);
    let pipeline = FoodPipeline::new(catalog, thresholds());
    let mut progress = pipeline.channels().progress.subscribe();
    let mut green = pipeline.channels().green.subscribe();

    pipeline.fetch("45001");

    assert!(recv_within(&mut progress, "progress true").await);
    assert!(!recv_within(&mut progress, "progress false").await);
    recv_within(&mut green, "green emission").await;
}

#[tokio::test]
async fn test_transport_failure_emits_exactly_one_error() {
    let catalog = ScriptedCatalog::new(vec![Err(CatalogError::ServerError(
        reqwest::StatusCode::INTERNAL_SERVER_ERROR,
    ))]);
    let pipeline = FoodPipeline::new(catalog, thresholds());
    let channels = pipeline.channels();

    let mut progress = channels.progress.subscribe();
    let mut error = channels.error.subscribe();
    let mut green = channels.green.subscribe();
    let mut yellow = channels.yellow.subscribe();
    let mut red = channels.red.subscribe();
    let mut unknown = channels.unknown.subscribe();

    pipeline.fetch("45001");

    let err = recv_within(&mut error, "error emission").await;
    match err {
        PipelineError::Catalog(message) => assert!(message.contains("500")),
        other => panic!("expected a catalog error, got {other:?}"),
    }

    assert!(recv_within(&mut progress, "progress true").await);
    assert!(!recv_within(&mut progress, "progress false").await);

    tokio::task::yield_now().await;
    assert!(error.try_recv().is_none(), "exactly one error emission");
    assert!(green.try_recv().is_none());
    assert!(yellow.try_recv().is_none());
    assert!(red.try_recv().is_none());
    assert!(unknown.try_recv().is_none());
}

#[tokio::test]
async fn test_empty_food_list_is_an_error() {
    for response in [
        FoodResponse { report: None },
        FoodResponse {
            report: Some(FoodReport { foods: vec![] }),
        },
    ] {
        let catalog = ScriptedCatalog::new(vec![Ok(response)]);
        let pipeline = FoodPipeline::new(catalog, thresholds());
        let mut error = pipeline.channels().error.subscribe();
        let mut unknown = pipeline.channels().unknown.subscribe();

        pipeline.fetch("99999");

        let err = recv_within(&mut error, "error emission").await;
        assert_eq!(err, PipelineError::FoodNotFound("99999".to_string()));
        tokio::task::yield_now().await;
        assert!(unknown.try_recv().is_none());
    }
}

#[tokio::test]
async fn test_empty_nutrient_list_is_unknown() {
    let food = Food {
        nutrients: vec![],
        ..food_with_value("5")
    };
    let catalog = ScriptedCatalog::new(vec![Ok(FoodResponse {
        report: Some(FoodReport { foods: vec![food] }),
    })]);
    let pipeline = FoodPipeline::new(catalog, thresholds());
    let mut unknown = pipeline.channels().unknown.subscribe();
    let mut error = pipeline.channels().error.subscribe();

    pipeline.fetch("45001");

    let food = recv_within(&mut unknown, "unknown emission").await;
    assert!(food.nutrients.is_empty());
    tokio::task::yield_now().await;
    assert!(error.try_recv().is_none(), "empty nutrients is not an error");
}

#[tokio::test]
async fn test_unparsable_value_emits_nothing() {
    for value in ["", "abc"] {
        let catalog = ScriptedCatalog::new(vec![Ok(response_with_value(value))]);
        let pipeline = FoodPipeline::new(catalog, thresholds());
        let channels = pipeline.channels();

        let mut progress = channels.progress.subscribe();
        let mut green = channels.green.subscribe();
        let mut yellow = channels.yellow.subscribe();
        let mut red = channels.red.subscribe();
        let mut unknown = channels.unknown.subscribe();
        let mut error = channels.error.subscribe();

        pipeline.fetch("45001");

        // progress false is emitted before the (skipped) classification,
        // so once it arrives the outcome has been fully processed
        assert!(recv_within(&mut progress, "progress true").await);
        assert!(!recv_within(&mut progress, "progress false").await);

        tokio::task::yield_now().await;
        assert!(green.try_recv().is_none(), "value {value:?}");
        assert!(yellow.try_recv().is_none(), "value {value:?}");
        assert!(red.try_recv().is_none(), "value {value:?}");
        assert!(unknown.try_recv().is_none(), "value {value:?}");
        assert!(error.try_recv().is_none(), "value {value:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_cleanup_cancels_in_flight_fetch() {
    let pipeline = FoodPipeline::new(Arc::new(HangingCatalog), thresholds());
    let channels = pipeline.channels();

    let mut green = channels.green.subscribe();
    let mut error = channels.error.subscribe();
    let mut progress = channels.progress.subscribe();

    pipeline.fetch("45001");
    assert!(recv_within(&mut progress, "progress true").await);

    // let the request task park on its sleep, then cancel it
    tokio::task::yield_now().await;
    pipeline.cleanup();

    // even after the request would have resolved, nothing is emitted
    tokio::time::advance(Duration::from_secs(7200)).await;
    tokio::task::yield_now().await;

    assert!(green.try_recv().is_none());
    assert!(error.try_recv().is_none());
    assert!(progress.try_recv().is_none(), "progress left as-is");
    assert_eq!(channels.progress.latest(), Some(true));
}

#[tokio::test]
async fn test_pipeline_usable_after_cleanup() {
    let catalog = ScriptedCatalog::new(vec![Ok(response_with_value("5"))]);
    let pipeline = FoodPipeline::new(catalog, thresholds());
    let mut green = pipeline.channels().green.subscribe();

    pipeline.cleanup();
    pipeline.fetch("45001");

    let food = recv_within(&mut green, "green emission after cleanup").await;
    assert_eq!(food.ndbno, "45001");
}

#[tokio::test]
async fn test_sequential_fetches_classify_identically() {
    let catalog = ScriptedCatalog::new(vec![
        Ok(response_with_value("15")),
        Ok(response_with_value("15")),
    ]);
    let pipeline = FoodPipeline::new(catalog, thresholds());
    let mut yellow = pipeline.channels().yellow.subscribe();

    pipeline.fetch("45001");
    let first = recv_within(&mut yellow, "first yellow emission").await;

    pipeline.fetch("45001");
    let second = recv_within(&mut yellow, "second yellow emission").await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_late_subscriber_replays_latest_classification() {
    let catalog = ScriptedCatalog::new(vec![Ok(response_with_value("25"))]);
    let pipeline = FoodPipeline::new(catalog, thresholds());
    // keep one live subscriber so we know when delivery happened
    let mut red = pipeline.channels().red.subscribe();

    pipeline.fetch("45001");
    recv_within(&mut red, "red emission").await;

    // a subscriber arriving after the emission still sees it
    let mut late = pipeline.channels().red.subscribe();
    let replayed = recv_within(&mut late, "replayed red emission").await;
    assert_eq!(replayed.ndbno, "45001");
}
