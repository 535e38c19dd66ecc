//! Clean, split, train, score and evaluate hotel bookings.
//!
//! Stages take values and return new values. [`steps`] wires them to files
//! for the command-line tool.

pub mod clean;
pub mod evaluate;
pub mod input;
pub mod model;
pub mod predict;
pub mod score;
pub mod split;
pub mod steps;
pub mod train;

pub use clean::{DropMode, LabelEncoder, get_clean_data, log1p_checked};
pub use evaluate::{Evaluation, evaluate};
pub use input::Input;
pub use model::{TrainedModel, load_model, save_model};
pub use predict::{BookingForm, SinglePrediction, predict_one};
pub use score::{Predictions, score};
pub use split::{Partition, Split, split};
pub use steps::{Step, run_step};
pub use train::fit;

/// Binary label column: 1 when the booking was cancelled.
pub const TARGET_COLUMN: &str = "is_canceled";

/// Feature columns the served model is trained on, in order.
pub const DEFAULT_INITIAL_FEATURES: [&str; 11] = [
    "hotel",
    "arrival_date_day_of_month",
    "arrival_date_week_number",
    "day",
    "month",
    "weekday",
    "lead_time",
    "stays_in_week_nights",
    "stays_in_weekend_nights",
    "total_of_special_requests",
    "market_segment",
];
