//! Postgres repository implementation using Diesel.
//!
//! This module implements the repository traits against a Postgres database.
//! The conflict-safe booking insert is the critical path: within one
//! transaction, potentially conflicting rows are locked with `SELECT ... FOR
//! UPDATE` before the insert, so two concurrent transactions targeting the
//! same room can never both observe "no conflict". The partial composite
//! index on `(room_id, start_date, end_date)` keeps the lock scoped to a
//! minimal row set.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::db::repository::{
    BookingRepository, ErrorContext, RepositoryError, RepositoryResult, RoomRepository,
};
use crate::models::{
    Booking, BookingId, BookingStatus, BookingWithRoom, NewBooking, Room, RoomId, UserId,
};

mod models;
mod schema;

use models::{BookingRow, NewBookingRow, RoomRow};
use schema::{bookings, rooms};

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// `DATABASE_URL` or `PG_DATABASE_URL` is required; the pool and retry
    /// knobs fall back to their defaults.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let max_pool_size = std::env::var("PG_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let min_pool_size = std::env::var("PG_POOL_MIN")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let connection_timeout_sec = std::env::var("PG_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_sec = std::env::var("PG_IDLE_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(600);

        let max_retries = std::env::var("PG_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(3);

        let retry_delay_ms = std::env::var("PG_RETRY_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(100);

        Ok(Self {
            database_url,
            max_pool_size,
            min_pool_size,
            connection_timeout_sec,
            idle_timeout_sec,
            max_retries,
            retry_delay_ms,
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres.
///
/// Provides connection pooling with configurable limits, automatic retry for
/// transient failures, and automatic schema migrations.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true) // Validate connections before use
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        // Run migrations once during initialization
        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self { pool, config })
    }

    /// Run pending database migrations.
    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation with automatic retry for transient
    /// failures.
    ///
    /// The operation is retried up to `max_retries` times with exponential
    /// backoff if a retryable error occurs (connection errors, timeouts,
    /// serialization failures). Each attempt runs the whole operation from
    /// scratch on a fresh connection; a failed transaction is never resumed.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2; // Exponential backoff
                }

                // Get connection
                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1))
                                .retryable(),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }
                };

                // Execute the operation
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

#[async_trait]
impl BookingRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(RepositoryError::from)
        })
        .await
    }

    async fn create_booking(&self, booking: &NewBooking) -> RepositoryResult<Booking> {
        let booking = booking.clone();
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                // Lock every non-cancelled row that could conflict. A
                // concurrent transaction inserting for the same room blocks
                // here until this one commits or rolls back, which is what
                // serializes conflicting writers per room.
                let conflicts: Vec<BookingRow> = bookings::table
                    .filter(bookings::room_id.eq(booking.room_id.value()))
                    .filter(bookings::status.ne(BookingStatus::Cancelled.as_str()))
                    .filter(bookings::start_date.lt(booking.end_date))
                    .filter(bookings::end_date.gt(booking.start_date))
                    .select(BookingRow::as_select())
                    .for_update()
                    .load(tx)?;

                if let Some(existing) = conflicts.first() {
                    // Returning Err rolls the transaction back; no insert
                    // happens.
                    return Err(RepositoryError::conflict_with_context(
                        format!(
                            "Room {} already booked in [{}, {})",
                            booking.room_id, existing.start_date, existing.end_date
                        ),
                        ErrorContext::new("create_booking")
                            .with_entity("booking")
                            .with_entity_id(booking.room_id),
                    ));
                }

                let inserted: BookingRow = diesel::insert_into(bookings::table)
                    .values(&NewBookingRow {
                        user_id: booking.user_id.value(),
                        room_id: booking.room_id.value(),
                        start_date: booking.start_date,
                        end_date: booking.end_date,
                        status: BookingStatus::Confirmed.as_str().to_string(),
                    })
                    .returning(BookingRow::as_returning())
                    .get_result(tx)?;

                inserted.into_booking()
            })
        })
        .await
    }

    async fn get_booking(&self, booking_id: BookingId) -> RepositoryResult<Booking> {
        self.with_conn(move |conn| {
            let row = bookings::table
                .find(booking_id.value())
                .select(BookingRow::as_select())
                .first::<BookingRow>(conn)
                .optional()?;

            match row {
                Some(row) => row.into_booking(),
                None => Err(RepositoryError::not_found_with_context(
                    format!("Booking {} not found", booking_id),
                    ErrorContext::new("get_booking")
                        .with_entity("booking")
                        .with_entity_id(booking_id),
                )),
            }
        })
        .await
    }

    async fn list_bookings(
        &self,
        user_id: Option<UserId>,
    ) -> RepositoryResult<Vec<BookingWithRoom>> {
        self.with_conn(move |conn| {
            let mut query = bookings::table
                .inner_join(rooms::table)
                .select((BookingRow::as_select(), RoomRow::as_select()))
                .into_boxed();
            if let Some(uid) = user_id {
                query = query.filter(bookings::user_id.eq(uid.value()));
            }

            let rows: Vec<(BookingRow, RoomRow)> = query
                .order(bookings::start_date.desc())
                .then_order_by(bookings::id.desc())
                .load(conn)?;

            rows.into_iter()
                .map(|(booking_row, room_row)| {
                    Ok(BookingWithRoom {
                        booking: booking_row.into_booking()?,
                        room: room_row.into(),
                    })
                })
                .collect()
        })
        .await
    }

    async fn close_booking(&self, booking_id: BookingId) -> RepositoryResult<Booking> {
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                // Guarded single-row update: applies only while the booking
                // is not already closed, so racing close calls resolve to
                // exactly one transition.
                let updated = diesel::update(
                    bookings::table
                        .filter(bookings::id.eq(booking_id.value()))
                        .filter(bookings::status.ne(BookingStatus::Closed.as_str())),
                )
                .set(bookings::status.eq(BookingStatus::Closed.as_str()))
                .returning(BookingRow::as_returning())
                .get_result::<BookingRow>(tx)
                .optional()?;

                match updated {
                    Some(row) => row.into_booking(),
                    None => {
                        // The guard matched nothing: either the booking does
                        // not exist or it is already closed.
                        let exists = bookings::table
                            .find(booking_id.value())
                            .select(BookingRow::as_select())
                            .first::<BookingRow>(tx)
                            .optional()?;
                        match exists {
                            Some(_) => Err(RepositoryError::conflict_with_context(
                                format!("Booking {} is already closed", booking_id),
                                ErrorContext::new("close_booking")
                                    .with_entity("booking")
                                    .with_entity_id(booking_id),
                            )),
                            None => Err(RepositoryError::not_found_with_context(
                                format!("Booking {} not found", booking_id),
                                ErrorContext::new("close_booking")
                                    .with_entity("booking")
                                    .with_entity_id(booking_id),
                            )),
                        }
                    }
                }
            })
        })
        .await
    }
}

#[async_trait]
impl RoomRepository for PostgresRepository {
    async fn get_room(&self, room_id: RoomId) -> RepositoryResult<Room> {
        self.with_conn(move |conn| {
            let row = rooms::table
                .find(room_id.value())
                .select(RoomRow::as_select())
                .first::<RoomRow>(conn)
                .optional()?;

            row.map(Room::from).ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Room {} not found", room_id),
                    ErrorContext::new("get_room")
                        .with_entity("room")
                        .with_entity_id(room_id),
                )
            })
        })
        .await
    }

    async fn list_rooms(&self) -> RepositoryResult<Vec<Room>> {
        self.with_conn(|conn| {
            let rows: Vec<RoomRow> = rooms::table
                .order(rooms::id.asc())
                .select(RoomRow::as_select())
                .load(conn)?;
            Ok(rows.into_iter().map(Room::from).collect())
        })
        .await
    }
}
