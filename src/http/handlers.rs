//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the service
//! layer for business logic.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    BookingDto, BookingListQuery, BookingListResponse, BookingWithRoomDto, CloseBookingRequest,
    CreateBookingRequest, HealthResponse, RoomDto, RoomListResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::models::{BookingId, UserId};
use crate::services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Verify the service is running and the storage backend is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Rooms
// =============================================================================

/// GET /v1/rooms
///
/// List all rooms with their derived categories.
pub async fn list_rooms(State(state): State<AppState>) -> HandlerResult<RoomListResponse> {
    let rooms = services::list_rooms(state.repository.as_ref()).await?;

    let room_dtos: Vec<RoomDto> = rooms.into_iter().map(Into::into).collect();
    let total = room_dtos.len();

    Ok(Json(RoomListResponse {
        rooms: room_dtos,
        total,
    }))
}

// =============================================================================
// Bookings
// =============================================================================

/// GET /v1/bookings
///
/// List bookings joined with their rooms, most recent check-in first.
/// Accepts an optional `user_id` query parameter.
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingListQuery>,
) -> HandlerResult<BookingListResponse> {
    let user_id = query.user_id.map(UserId::new);
    let bookings = services::list_bookings(state.repository.as_ref(), user_id).await?;

    let booking_dtos: Vec<BookingWithRoomDto> = bookings.into_iter().map(Into::into).collect();
    let total = booking_dtos.len();

    Ok(Json(BookingListResponse {
        bookings: booking_dtos,
        total,
    }))
}

/// POST /v1/bookings
///
/// Create a booking. Responds 201 on success, 409 when the room already has
/// an overlapping active booking.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingDto>), AppError> {
    let booking_request = services::BookingRequest {
        user_id: request.user_id,
        room_id: request.room_id,
        start_date: request.start_date,
        end_date: request.end_date,
    };

    let booking = services::create_booking(
        state.repository.as_ref(),
        state.cache.as_ref(),
        &booking_request,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// POST /v1/bookings/{booking_id}/close
///
/// Close a booking on behalf of its owner. Responds 409 if the booking was
/// already closed, 403 if the caller does not own it.
pub async fn close_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<i64>,
    Json(request): Json<CloseBookingRequest>,
) -> HandlerResult<BookingDto> {
    let booking = services::close_booking(
        state.repository.as_ref(),
        state.cache.as_ref(),
        BookingId::new(booking_id),
        UserId::new(request.user_id),
    )
    .await?;

    Ok(Json(booking.into()))
}
