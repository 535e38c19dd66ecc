use std::path::Path;

use hotel_cancel::table::{read_csv_from_bytes, write_csv};
use polars::prelude::DataFrame;

pub const RAW_HEADER: [&str; 32] = [
    "hotel",
    "is_canceled",
    "lead_time",
    "arrival_date_year",
    "arrival_date_month",
    "arrival_date_week_number",
    "arrival_date_day_of_month",
    "stays_in_weekend_nights",
    "stays_in_week_nights",
    "adults",
    "children",
    "babies",
    "meal",
    "country",
    "market_segment",
    "distribution_channel",
    "is_repeated_guest",
    "previous_cancellations",
    "previous_bookings_not_canceled",
    "reserved_room_type",
    "assigned_room_type",
    "booking_changes",
    "deposit_type",
    "agent",
    "company",
    "days_in_waiting_list",
    "customer_type",
    "adr",
    "required_car_parking_spaces",
    "total_of_special_requests",
    "reservation_status",
    "reservation_status_date",
];

/// The fields that vary between fixture bookings.
#[derive(Debug, Clone)]
pub struct RawBooking {
    pub hotel: &'static str,
    pub is_canceled: i64,
    pub lead_time: i64,
    pub week_number: i64,
    pub day_of_month: i64,
    pub weekend_nights: i64,
    pub week_nights: i64,
    pub adults: i64,
    pub children: Option<i64>,
    pub babies: i64,
    pub market_segment: &'static str,
    pub adr: f64,
    pub special_requests: i64,
    pub status_date: String,
}

impl RawBooking {
    /// CSV fields in `RAW_HEADER` order; an empty field is a missing cell.
    pub fn cells(&self) -> Vec<String> {
        let status = if self.is_canceled == 1 {
            "Canceled"
        } else {
            "Check-Out"
        };
        let agent = if self.is_canceled == 1 { "9" } else { "" };
        let children = self.children.map(|c| c.to_string()).unwrap_or_default();
        vec![
            self.hotel.to_string(),
            self.is_canceled.to_string(),
            self.lead_time.to_string(),
            "2015".to_string(),
            "July".to_string(),
            self.week_number.to_string(),
            self.day_of_month.to_string(),
            self.weekend_nights.to_string(),
            self.week_nights.to_string(),
            self.adults.to_string(),
            children,
            self.babies.to_string(),
            "BB".to_string(),
            "PRT".to_string(),
            self.market_segment.to_string(),
            "TA/TO".to_string(),
            "0".to_string(),
            "0".to_string(),
            "0".to_string(),
            "A".to_string(),
            "A".to_string(),
            "0".to_string(),
            "No Deposit".to_string(),
            agent.to_string(),
            String::new(),
            "0".to_string(),
            "Transient".to_string(),
            self.adr.to_string(),
            "0".to_string(),
            self.special_requests.to_string(),
            status.to_string(),
            self.status_date.clone(),
        ]
    }
}

/// Parse rows of fields under `RAW_HEADER` the way a raw export is read.
pub fn raw_frame(rows: &[Vec<String>]) -> DataFrame {
    let mut text = RAW_HEADER.join(",");
    text.push('\n');
    for row in rows {
        text.push_str(&row.join(","));
        text.push('\n');
    }
    read_csv_from_bytes(text.into_bytes(), Path::new("fixture")).expect("parse raw csv")
}

fn booking(
    hotel: &'static str,
    is_canceled: i64,
    lead_time: i64,
    adults: i64,
    market_segment: &'static str,
    adr: f64,
    status_date: &str,
) -> RawBooking {
    RawBooking {
        hotel,
        is_canceled,
        lead_time,
        week_number: 27 + lead_time % 5,
        day_of_month: 1 + lead_time % 28,
        weekend_nights: lead_time % 3,
        week_nights: 1 + lead_time % 4,
        adults,
        children: Some(0),
        babies: 0,
        market_segment,
        adr,
        special_requests: i64::from(is_canceled == 0),
        status_date: status_date.to_string(),
    }
}

/// Eight distinct, valid bookings.
pub fn valid_bookings() -> Vec<RawBooking> {
    let mut rows = vec![
        booking("Resort Hotel", 0, 3, 2, "Direct", 75.0, "2015-07-04"),
        booking("City Hotel", 1, 210, 2, "Online TA", 98.5, "7/1/2015"),
        booking("City Hotel", 0, 12, 1, "Corporate", 62.0, "2015-07-06 00:00:00"),
        booking("Resort Hotel", 1, 160, 2, "Groups", 88.0, "2015-06-20"),
        booking("City Hotel", 0, 7, 2, "Direct", 110.0, "2015-07-09"),
        booking("Resort Hotel", 1, 301, 3, "Online TA", 130.25, "2015-05-11"),
        booking("City Hotel", 0, 25, 2, "Online TA", 95.0, "2015-07-12"),
        booking("City Hotel", 1, 188, 1, "Groups", 70.0, "2015-06-02"),
    ];
    // A missing children count is filled with zero, not dropped.
    rows[4].children = None;
    rows
}

/// Eleven raw rows: the eight valid bookings, two exact duplicates and one
/// booking with no guests.
pub fn fixture_raw() -> DataFrame {
    let valid = valid_bookings();
    let mut empty_room = booking("City Hotel", 0, 40, 0, "Direct", 80.0, "2015-07-15");
    empty_room.children = Some(0);
    let order = [
        valid[0].cells(),
        valid[1].cells(),
        valid[2].cells(),
        valid[0].cells(),
        valid[3].cells(),
        empty_room.cells(),
        valid[4].cells(),
        valid[5].cells(),
        valid[3].cells(),
        valid[6].cells(),
        valid[7].cells(),
    ];
    raw_frame(&order)
}

/// `n` valid bookings where long lead times cancel, alternating labels.
pub fn synthetic_raw(n: usize) -> DataFrame {
    const SEGMENTS: [&str; 4] = ["Direct", "Online TA", "Groups", "Corporate"];
    const HOTELS: [&str; 2] = ["City Hotel", "Resort Hotel"];
    let rows: Vec<Vec<String>> = (0..n)
        .map(|i| {
            let canceled = (i % 2) as i64;
            let lead_time = if canceled == 1 { 120 + 3 * i as i64 } else { i as i64 };
            let date = format!("2016-{:02}-{:02}", i % 12 + 1, i % 28 + 1);
            booking(
                HOTELS[i % 2],
                canceled,
                lead_time,
                1 + (i % 3) as i64,
                SEGMENTS[i % 4],
                50.0 + i as f64,
                &date,
            )
            .cells()
        })
        .collect();
    raw_frame(&rows)
}

pub fn write_raw(df: &DataFrame, path: &Path) {
    write_csv(df, path).expect("write raw csv");
}
