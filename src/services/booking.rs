//! Seat-inventory and ticket-creation core.
//!
//! Availability is always a live aggregate (`capacity - booked tickets`);
//! seat conflicts are rejected by the store's unique constraint at insert
//! time, never by a read-then-write pre-check, so concurrent bookings of the
//! same seat resolve to exactly one winner. Losers get [`BookingError::SeatTaken`]
//! and no retry is attempted.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{is_unique_violation, ApiError};

const SEAT_CONFLICT_CONSTRAINT: &str = "uq_ticket_session_row_seat";

/// Seating grid of the dome a session runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomeDims {
    pub rows: i32,
    pub seats_in_row: i32,
}

impl DomeDims {
    pub fn capacity(&self) -> i64 {
        self.rows as i64 * self.seats_in_row as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatRequest {
    pub show_session_id: i64,
    pub row: i32,
    pub seat: i32,
    /// Omitted: a fresh reservation is created for the caller together with
    /// the ticket. Supplied: must belong to the caller and aggregates it.
    pub reservation_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookedTicket {
    pub ticket_id: i64,
    pub reservation_id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("show session {0} not found")]
    SessionNotFound(i64),

    #[error("{field} must be in range 1..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i32,
        max: i32,
    },

    #[error("reservation {0} not found")]
    ReservationNotFound(i64),

    #[error("this seat is already taken for this session")]
    SeatTaken,

    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::SessionNotFound(_) | BookingError::ReservationNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            BookingError::OutOfRange { .. } => ApiError::Validation(err.to_string()),
            BookingError::SeatTaken => ApiError::Conflict(err.to_string()),
            BookingError::Store(inner) => ApiError::Database(inner),
        }
    }
}

/// Store seam for the booking flow. The Postgres implementation backs the
/// API; an in-memory double backs the unit tests.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn dome_for_session(&self, session_id: i64) -> Result<Option<DomeDims>, BookingError>;

    async fn reservation_belongs_to(
        &self,
        reservation_id: i64,
        user_id: i64,
    ) -> Result<bool, BookingError>;

    /// `capacity - count(tickets)` for the session, None for unknown ids.
    async fn tickets_available(&self, session_id: i64) -> Result<Option<i64>, BookingError>;

    /// Inserts the ticket, creating a reservation for `user_id` when
    /// `reservation_id` is None. Both writes happen atomically; a duplicate
    /// `(session, row, seat)` must fail as [`BookingError::SeatTaken`] and
    /// leave no partial state behind.
    async fn insert_ticket(
        &self,
        user_id: i64,
        reservation_id: Option<i64>,
        session_id: i64,
        row: i32,
        seat: i32,
    ) -> Result<BookedTicket, BookingError>;
}

pub fn check_bounds(dims: &DomeDims, row: i32, seat: i32) -> Result<(), BookingError> {
    if row < 1 || row > dims.rows {
        return Err(BookingError::OutOfRange {
            field: "row",
            value: row,
            max: dims.rows,
        });
    }
    if seat < 1 || seat > dims.seats_in_row {
        return Err(BookingError::OutOfRange {
            field: "seat",
            value: seat,
            max: dims.seats_in_row,
        });
    }
    Ok(())
}

/// Validates a seat request against the session's dome and inserts the
/// ticket. Conflicts are left to the store's unique constraint.
pub async fn book_seat<S: BookingStore + ?Sized>(
    store: &S,
    user_id: i64,
    req: &SeatRequest,
) -> Result<BookedTicket, BookingError> {
    let dims = store
        .dome_for_session(req.show_session_id)
        .await?
        .ok_or(BookingError::SessionNotFound(req.show_session_id))?;

    check_bounds(&dims, req.row, req.seat)?;

    if let Some(reservation_id) = req.reservation_id {
        if !store.reservation_belongs_to(reservation_id, user_id).await? {
            return Err(BookingError::ReservationNotFound(reservation_id));
        }
    }

    store
        .insert_ticket(
            user_id,
            req.reservation_id,
            req.show_session_id,
            req.row,
            req.seat,
        )
        .await
}

#[derive(Clone)]
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn dome_for_session(&self, session_id: i64) -> Result<Option<DomeDims>, BookingError> {
        let dims = sqlx::query_as::<_, (i32, i32)>(
            "SELECT d.rows, d.seats_in_row
             FROM show_sessions ss
             JOIN planetarium_domes d ON d.id = ss.planetarium_dome_id
             WHERE ss.id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(dims.map(|(rows, seats_in_row)| DomeDims { rows, seats_in_row }))
    }

    async fn reservation_belongs_to(
        &self,
        reservation_id: i64,
        user_id: i64,
    ) -> Result<bool, BookingError> {
        let belongs = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM reservations WHERE id = $1 AND user_id = $2)",
        )
        .bind(reservation_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(belongs)
    }

    async fn tickets_available(&self, session_id: i64) -> Result<Option<i64>, BookingError> {
        let available = sqlx::query_scalar::<_, i64>(
            "SELECT (d.rows * d.seats_in_row)::BIGINT - COUNT(tk.id)
             FROM show_sessions ss
             JOIN planetarium_domes d ON d.id = ss.planetarium_dome_id
             LEFT JOIN tickets tk ON tk.show_session_id = ss.id
             WHERE ss.id = $1
             GROUP BY d.rows, d.seats_in_row",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(available)
    }

    async fn insert_ticket(
        &self,
        user_id: i64,
        reservation_id: Option<i64>,
        session_id: i64,
        row: i32,
        seat: i32,
    ) -> Result<BookedTicket, BookingError> {
        let mut tx = self.pool.begin().await?;

        let reservation_id = match reservation_id {
            Some(id) => id,
            None => {
                sqlx::query_scalar::<_, i64>(
                    "INSERT INTO reservations (user_id) VALUES ($1) RETURNING id",
                )
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        let inserted = sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO tickets ("row", seat, show_session_id, reservation_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id"#,
        )
        .bind(row)
        .bind(seat)
        .bind(session_id)
        .bind(reservation_id)
        .fetch_one(&mut *tx)
        .await;

        let ticket_id = match inserted {
            Ok(id) => id,
            // Dropping the transaction rolls back the fresh reservation too.
            Err(err) if is_unique_violation(&err, SEAT_CONFLICT_CONSTRAINT) => {
                return Err(BookingError::SeatTaken);
            }
            Err(err) => return Err(err.into()),
        };

        tx.commit().await?;
        Ok(BookedTicket {
            ticket_id,
            reservation_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;

    /// In-memory double mirroring the store contract: unique seat rejection
    /// is atomic with the reservation creation.
    #[derive(Default)]
    struct MemStore {
        domes: HashMap<i64, DomeDims>,
        taken: Mutex<HashSet<(i64, i32, i32)>>,
        reservations: Mutex<HashMap<i64, i64>>,
        next_id: AtomicI64,
    }

    impl MemStore {
        fn with_session(session_id: i64, rows: i32, seats_in_row: i32) -> Self {
            let mut store = MemStore {
                next_id: AtomicI64::new(1),
                ..Default::default()
            };
            store.domes.insert(session_id, DomeDims { rows, seats_in_row });
            store
        }

        fn ticket_count(&self, session_id: i64) -> i64 {
            self.taken
                .lock()
                .unwrap()
                .iter()
                .filter(|(sid, _, _)| *sid == session_id)
                .count() as i64
        }
    }

    #[async_trait]
    impl BookingStore for MemStore {
        async fn dome_for_session(
            &self,
            session_id: i64,
        ) -> Result<Option<DomeDims>, BookingError> {
            Ok(self.domes.get(&session_id).copied())
        }

        async fn reservation_belongs_to(
            &self,
            reservation_id: i64,
            user_id: i64,
        ) -> Result<bool, BookingError> {
            Ok(self.reservations.lock().unwrap().get(&reservation_id) == Some(&user_id))
        }

        async fn tickets_available(&self, session_id: i64) -> Result<Option<i64>, BookingError> {
            Ok(self
                .domes
                .get(&session_id)
                .map(|dims| dims.capacity() - self.ticket_count(session_id)))
        }

        async fn insert_ticket(
            &self,
            user_id: i64,
            reservation_id: Option<i64>,
            session_id: i64,
            row: i32,
            seat: i32,
        ) -> Result<BookedTicket, BookingError> {
            let mut taken = self.taken.lock().unwrap();
            if !taken.insert((session_id, row, seat)) {
                return Err(BookingError::SeatTaken);
            }
            let reservation_id = match reservation_id {
                Some(id) => id,
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                    self.reservations.lock().unwrap().insert(id, user_id);
                    id
                }
            };
            Ok(BookedTicket {
                ticket_id: self.next_id.fetch_add(1, Ordering::SeqCst),
                reservation_id,
            })
        }
    }

    fn request(row: i32, seat: i32) -> SeatRequest {
        SeatRequest {
            show_session_id: 1,
            row,
            seat,
            reservation_id: None,
        }
    }

    #[tokio::test]
    async fn fresh_session_has_full_capacity_available() {
        let store = MemStore::with_session(1, 10, 20);
        assert_eq!(store.tickets_available(1).await.unwrap(), Some(200));
    }

    #[tokio::test]
    async fn booking_decrements_availability_by_one() {
        let store = MemStore::with_session(1, 10, 20);

        let booked = book_seat(&store, 42, &request(1, 1)).await.unwrap();
        assert!(booked.ticket_id > 0);
        assert_eq!(store.tickets_available(1).await.unwrap(), Some(199));
    }

    #[tokio::test]
    async fn out_of_range_row_is_rejected_and_availability_unchanged() {
        let store = MemStore::with_session(1, 10, 20);

        let err = book_seat(&store, 42, &request(15, 2)).await.unwrap_err();
        assert!(matches!(err, BookingError::OutOfRange { field: "row", .. }));
        assert_eq!(store.tickets_available(1).await.unwrap(), Some(200));
    }

    #[tokio::test]
    async fn out_of_range_seat_is_rejected() {
        let store = MemStore::with_session(1, 10, 20);

        let err = book_seat(&store, 42, &request(1, 21)).await.unwrap_err();
        assert!(matches!(err, BookingError::OutOfRange { field: "seat", .. }));

        let err = book_seat(&store, 42, &request(1, 0)).await.unwrap_err();
        assert!(matches!(err, BookingError::OutOfRange { field: "seat", .. }));
    }

    #[tokio::test]
    async fn duplicate_seat_conflicts_and_count_grows_by_one() {
        let store = MemStore::with_session(1, 10, 20);

        book_seat(&store, 42, &request(3, 4)).await.unwrap();
        let err = book_seat(&store, 43, &request(3, 4)).await.unwrap_err();
        assert!(matches!(err, BookingError::SeatTaken));
        assert_eq!(store.ticket_count(1), 1);
        assert_eq!(store.tickets_available(1).await.unwrap(), Some(199));
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let store = MemStore::with_session(1, 10, 20);

        let req = SeatRequest {
            show_session_id: 99,
            row: 1,
            seat: 1,
            reservation_id: None,
        };
        let err = book_seat(&store, 42, &req).await.unwrap_err();
        assert!(matches!(err, BookingError::SessionNotFound(99)));
    }

    #[tokio::test]
    async fn foreign_reservation_is_rejected() {
        let store = MemStore::with_session(1, 10, 20);
        store.reservations.lock().unwrap().insert(7, 1000);

        let req = SeatRequest {
            show_session_id: 1,
            row: 1,
            seat: 1,
            reservation_id: Some(7),
        };
        let err = book_seat(&store, 42, &req).await.unwrap_err();
        assert!(matches!(err, BookingError::ReservationNotFound(7)));
        assert_eq!(store.ticket_count(1), 0);
    }

    #[tokio::test]
    async fn own_reservation_aggregates_tickets() {
        let store = MemStore::with_session(1, 10, 20);
        store.reservations.lock().unwrap().insert(7, 42);

        let req = SeatRequest {
            show_session_id: 1,
            row: 2,
            seat: 2,
            reservation_id: Some(7),
        };
        let booked = book_seat(&store, 42, &req).await.unwrap();
        assert_eq!(booked.reservation_id, 7);
    }

    proptest! {
        #[test]
        fn bounds_accept_exactly_the_grid(
            rows in 1i32..=50,
            seats in 1i32..=100,
            row in -5i32..=60,
            seat in -5i32..=110,
        ) {
            let dims = DomeDims { rows, seats_in_row: seats };
            let inside = (1..=rows).contains(&row) && (1..=seats).contains(&seat);
            prop_assert_eq!(check_bounds(&dims, row, seat).is_ok(), inside);
        }
    }
}
