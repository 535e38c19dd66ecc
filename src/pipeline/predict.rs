//! Single-booking prediction for the form submission path.

use std::path::Path;

use polars::prelude::*;

use crate::bookings::NewBooking;
use crate::error::{PipelineError, PipelineResult};
use crate::table::{feature_rows, float_values};

use super::clean::log1p_checked;
use super::model::TrainedModel;

pub const CANCELLED_MESSAGE: &str = "Booking is likely to be cancelled";
pub const CONFIRMED_MESSAGE: &str = "Booking is likely to be confirmed";

/// Hotel name encoded as 1 on the form path; every other name is 0.
pub const CITY_HOTEL: &str = "City Hotel";

/// Outcome of scoring one booking.
#[derive(Debug, Clone, PartialEq)]
pub struct SinglePrediction {
    pub message: &'static str,
    /// `[p_confirmed, p_cancelled]`.
    pub probabilities: [f64; 2],
}

impl SinglePrediction {
    pub fn is_cancelled(&self) -> bool {
        self.message == CANCELLED_MESSAGE
    }

    /// Cancellation probability rounded to two decimals for display.
    pub fn rounded_cancel_probability(&self) -> f64 {
        (self.probabilities[1] * 100.0).round() / 100.0
    }
}

/// Score a one-row `record` with the model stored at `model_path`.
///
/// Only `lead_time` is log-transformed here; every other field must already
/// be in the encoding the model was trained on.
pub fn predict_one(record: &DataFrame, model_path: &Path) -> PipelineResult<SinglePrediction> {
    if record.height() != 1 {
        return Err(PipelineError::value(format!(
            "Expected exactly one booking row, got {}",
            record.height()
        )));
    }
    let model = TrainedModel::load(model_path)?;
    predict_with(record, &model)
}

pub(crate) fn predict_with(
    record: &DataFrame,
    model: &TrainedModel,
) -> PipelineResult<SinglePrediction> {
    let logged = float_values(record, "lead_time")?
        .into_iter()
        .map(|x| log1p_checked("lead_time", x))
        .collect::<PipelineResult<Vec<f64>>>()?;
    let mut record = record.clone();
    record.with_column(Series::new("lead_time".into(), logged))?;
    let rows = feature_rows(&record, &model.initial_features)?;
    let row = rows
        .first()
        .ok_or_else(|| PipelineError::value("Booking record has no rows"))?;

    let p_cancel = model.classifier.predict_proba(row);
    let cancelled = model.classifier.predict_class(row) == 1;
    let prediction = SinglePrediction {
        message: if cancelled {
            CANCELLED_MESSAGE
        } else {
            CONFIRMED_MESSAGE
        },
        probabilities: [1.0 - p_cancel, p_cancel],
    };
    tracing::info!(
        "{} (p_cancel={:.3})",
        prediction.message,
        prediction.probabilities[1]
    );
    Ok(prediction)
}

/// Fields collected by the booking form, before encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingForm {
    pub hotel: String,
    pub arrival_date_day_of_month: i64,
    pub arrival_date_week_number: i64,
    pub reservation_day: i64,
    pub reservation_month: i64,
    pub reservation_weekday: i64,
    pub lead_time: i64,
    pub stays_in_week_nights: i64,
    pub stays_in_weekend_nights: i64,
    pub total_of_special_requests: i64,
    pub market_segment: i64,
}

impl BookingForm {
    pub fn hotel_code(&self) -> i64 {
        i64::from(self.hotel == CITY_HOTEL)
    }

    /// One-row record keyed by training column names.
    pub fn to_record(&self) -> PipelineResult<DataFrame> {
        let cells = [
            ("hotel", self.hotel_code()),
            ("arrival_date_day_of_month", self.arrival_date_day_of_month),
            ("arrival_date_week_number", self.arrival_date_week_number),
            ("day", self.reservation_day),
            ("month", self.reservation_month),
            ("weekday", self.reservation_weekday),
            ("lead_time", self.lead_time),
            ("stays_in_week_nights", self.stays_in_week_nights),
            ("stays_in_weekend_nights", self.stays_in_weekend_nights),
            ("total_of_special_requests", self.total_of_special_requests),
            ("market_segment", self.market_segment),
        ];
        let columns = cells
            .iter()
            .map(|&(name, value)| Column::from(Series::new(name.into(), [value])))
            .collect();
        Ok(DataFrame::new(columns)?)
    }

    /// Store entry for this submission, with the hotel already encoded.
    pub fn to_new_booking(&self) -> NewBooking {
        NewBooking {
            hotel: self.hotel_code(),
            arrival_date_day_of_month: self.arrival_date_day_of_month,
            arrival_date_week_number: self.arrival_date_week_number,
            reservation_day: self.reservation_day,
            reservation_month: self.reservation_month,
            reservation_weekday: self.reservation_weekday,
            lead_time: self.lead_time,
            stays_in_week_nights: self.stays_in_week_nights,
            stays_in_weekend_nights: self.stays_in_weekend_nights,
            total_of_special_requests: self.total_of_special_requests,
            market_segment: self.market_segment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::Classifier;
    use crate::ml::logreg::LogRegModel;
    use crate::pipeline::DEFAULT_INITIAL_FEATURES;
    use crate::table::{column_names, int_values};

    fn form(hotel: &str, lead_time: i64) -> BookingForm {
        BookingForm {
            hotel: hotel.to_string(),
            arrival_date_day_of_month: 16,
            arrival_date_week_number: 42,
            reservation_day: 16,
            reservation_month: 9,
            reservation_weekday: 2,
            lead_time,
            stays_in_week_nights: 3,
            stays_in_weekend_nights: 0,
            total_of_special_requests: 0,
            market_segment: 5,
        }
    }

    /// Logistic model that only looks at the (logged) lead time.
    fn lead_time_model() -> TrainedModel {
        let n = DEFAULT_INITIAL_FEATURES.len();
        let lead = DEFAULT_INITIAL_FEATURES
            .iter()
            .position(|f| *f == "lead_time")
            .unwrap();
        let mut weights = vec![0.0; n];
        weights[lead] = 4.0;
        TrainedModel::new(
            DEFAULT_INITIAL_FEATURES.iter().map(|f| f.to_string()).collect(),
            Classifier::LogisticRegression(LogRegModel {
                feature_len: n,
                mean: vec![0.0; n],
                scale: vec![1.0; n],
                weights,
                bias: -4.0 * 3.0,
            }),
        )
    }

    #[test]
    fn hotel_name_encodes_city_as_one() {
        assert_eq!(form("City Hotel", 1).hotel_code(), 1);
        assert_eq!(form("Resort Hotel", 1).hotel_code(), 0);
        assert_eq!(form("city hotel", 1).hotel_code(), 0);
    }

    #[test]
    fn record_has_training_column_names() {
        let record = form("City Hotel", 10).to_record().unwrap();
        assert_eq!(record.height(), 1);
        assert_eq!(column_names(&record), DEFAULT_INITIAL_FEATURES.to_vec());
        assert_eq!(int_values(&record, "day").unwrap(), vec![16]);
        assert_eq!(int_values(&record, "lead_time").unwrap(), vec![10]);
    }

    #[test]
    fn lead_time_is_logged_before_scoring() {
        let model = lead_time_model();
        // ln(x + 1) > 3 once x >= 20
        let long = predict_with(&form("City Hotel", 200).to_record().unwrap(), &model).unwrap();
        assert!(long.is_cancelled());
        assert_eq!(long.message, CANCELLED_MESSAGE);
        let short = predict_with(&form("City Hotel", 2).to_record().unwrap(), &model).unwrap();
        assert_eq!(short.message, CONFIRMED_MESSAGE);
        assert!((short.probabilities.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn wrong_columns_are_lookup_errors() {
        let record = df!("htl" => [0i64], "lead_time" => [5i64]).unwrap();
        let err = predict_with(&record, &lead_time_model()).unwrap_err();
        assert!(err.is_lookup());
    }

    #[test]
    fn multi_row_record_is_value_error() {
        let one = form("City Hotel", 1).to_record().unwrap();
        let record = one.vstack(&one).unwrap();
        let err = predict_one(&record, Path::new("/unused/model.json")).unwrap_err();
        assert!(matches!(err, PipelineError::Value(_)));
    }

    #[test]
    fn missing_model_is_io_error() {
        let record = form("City Hotel", 1).to_record().unwrap();
        let err = predict_one(&record, Path::new("/no/such/model.json")).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn new_booking_keeps_raw_lead_time() {
        let booking = form("City Hotel", 37).to_new_booking();
        assert_eq!(booking.hotel, 1);
        assert_eq!(booking.lead_time, 37);
    }
}
