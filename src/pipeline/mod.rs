//! Classification Pipeline Module
//!
//! The fetch → parse → classify → emit sequence:
//!
//! ```text
//! fetch(food_id)
//!   ├── progress channel: true
//!   ├── catalog request (background task)
//!   └── delivery task (arrival order)
//!         ├── progress channel: false
//!         ├── transport failure / empty food list → error channel
//!         ├── empty nutrient list → unknown channel
//!         ├── unparsable nutrient value → logged, NO emission
//!         └── parsed value → green | yellow | red | unknown channel
//! ```

mod classifier;
mod food_pipeline;

pub use classifier::classify;
pub use food_pipeline::{FoodChannels, FoodPipeline, PipelineError};
