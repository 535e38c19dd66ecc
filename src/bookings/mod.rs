//! Append-only SQLite store of submitted bookings.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

mod schema;

#[derive(Debug, Error)]
pub enum BookingStoreError {
    #[error("Database query failed: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("Could not create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Database is busy, please retry")]
    Busy,
    #[error("SQLite returned an unexpected result")]
    Unexpected,
}

/// Booking fields as written by the form or ingest command.
///
/// Hotel and market segment are already integer-coded to match training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBooking {
    pub hotel: i64,
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

/// A booking row read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBooking {
    pub id: i64,
    /// Unix seconds, UTC.
    pub created_at: i64,
    #[serde(flatten)]
    pub booking: NewBooking,
}

pub struct BookingStore {
    connection: Connection,
}

impl BookingStore {
    /// Open (or create) the store at `path`, applying pragmas and schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BookingStoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| BookingStoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let connection = Connection::open(path)?;
        schema::apply_pragmas(&connection)?;
        schema::apply_schema(&connection)?;
        tracing::debug!("Opened booking store at {}", path.display());
        Ok(Self { connection })
    }

    /// In-memory store for tests and dry runs.
    pub fn open_in_memory() -> Result<Self, BookingStoreError> {
        let connection = Connection::open_in_memory()?;
        schema::apply_schema(&connection)?;
        Ok(Self { connection })
    }

    /// Append one booking and return its id.
    pub fn insert(&self, booking: &NewBooking) -> Result<i64, BookingStoreError> {
        let created_at = OffsetDateTime::now_utc().unix_timestamp();
        let mut stmt = self
            .connection
            .prepare_cached(
                "INSERT INTO bookings (
                    hotel, arrival_date_day_of_month, arrival_date_week_number,
                    reservation_day, reservation_month, reservation_weekday,
                    lead_time, stays_in_week_nights, stays_in_weekend_nights,
                    total_of_special_requests, market_segment, created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )
            .map_err(map_sql_error)?;
        stmt.execute(params![
            booking.hotel,
            booking.arrival_date_day_of_month,
            booking.arrival_date_week_number,
            booking.reservation_day,
            booking.reservation_month,
            booking.reservation_weekday,
            booking.lead_time,
            booking.stays_in_week_nights,
            booking.stays_in_weekend_nights,
            booking.total_of_special_requests,
            booking.market_segment,
            created_at,
        ])
        .map_err(map_sql_error)?;
        let id = self.connection.last_insert_rowid();
        tracing::info!("Added booking {id} (hotel {})", booking.hotel);
        Ok(id)
    }

    /// Most recent bookings first, at most `limit` rows.
    pub fn recent(&self, limit: usize) -> Result<Vec<StoredBooking>, BookingStoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self
            .connection
            .prepare_cached(
                "SELECT id, created_at, hotel, arrival_date_day_of_month,
                        arrival_date_week_number, reservation_day, reservation_month,
                        reservation_weekday, lead_time, stays_in_week_nights,
                        stays_in_weekend_nights, total_of_special_requests, market_segment
                 FROM bookings
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?1",
            )
            .map_err(map_sql_error)?;
        let rows = stmt
            .query_map(params![limit], read_booking)
            .map_err(map_sql_error)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(map_sql_error)
    }

    pub fn count(&self) -> Result<u64, BookingStoreError> {
        let count: i64 = self
            .connection
            .query_row("SELECT COUNT(*) FROM bookings", [], |row| row.get(0))
            .map_err(map_sql_error)?;
        u64::try_from(count).map_err(|_| BookingStoreError::Unexpected)
    }
}

fn read_booking(row: &Row<'_>) -> rusqlite::Result<StoredBooking> {
    Ok(StoredBooking {
        id: row.get(0)?,
        created_at: row.get(1)?,
        booking: NewBooking {
            hotel: row.get(2)?,
            arrival_date_day_of_month: row.get(3)?,
            arrival_date_week_number: row.get(4)?,
            reservation_day: row.get(5)?,
            reservation_month: row.get(6)?,
            reservation_weekday: row.get(7)?,
            lead_time: row.get(8)?,
            stays_in_week_nights: row.get(9)?,
            stays_in_weekend_nights: row.get(10)?,
            total_of_special_requests: row.get(11)?,
            market_segment: row.get(12)?,
        },
    })
}

fn map_sql_error(err: rusqlite::Error) -> BookingStoreError {
    match err {
        rusqlite::Error::SqliteFailure(sql_err, _)
            if sql_err.code == rusqlite::ErrorCode::DatabaseBusy =>
        {
            BookingStoreError::Busy
        }
        rusqlite::Error::InvalidQuery | rusqlite::Error::MultipleStatement => {
            BookingStoreError::Unexpected
        }
        other => BookingStoreError::Sql(other),
    }
}
