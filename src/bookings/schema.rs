use rusqlite::Connection;

use super::{BookingStoreError, map_sql_error};

pub(super) fn apply_pragmas(connection: &Connection) -> Result<(), BookingStoreError> {
    connection
        .execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA busy_timeout=5000;",
        )
        .map_err(map_sql_error)
}

pub(super) fn apply_schema(connection: &Connection) -> Result<(), BookingStoreError> {
    connection
        .execute_batch(
            "CREATE TABLE IF NOT EXISTS bookings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                hotel INTEGER NOT NULL,
                arrival_date_day_of_month INTEGER NOT NULL,
                arrival_date_week_number INTEGER NOT NULL,
                reservation_day INTEGER NOT NULL,
                reservation_month INTEGER NOT NULL,
                reservation_weekday INTEGER NOT NULL,
                lead_time INTEGER NOT NULL,
                stays_in_week_nights INTEGER NOT NULL,
                stays_in_weekend_nights INTEGER NOT NULL,
                total_of_special_requests INTEGER NOT NULL,
                market_segment INTEGER NOT NULL,
                created_at INTEGER NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_bookings_created_at
                ON bookings (created_at, id);",
        )
        .map_err(map_sql_error)
}
