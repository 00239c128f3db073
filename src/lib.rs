//! # Roomstay Backend
//!
//! Conflict-safe room reservation backend.
//!
//! This crate provides the booking core for a room reservation system: the
//! central guarantee is that no two overlapping reservations are ever
//! confirmed for the same room, even under concurrent requests. Overlap
//! checks and inserts run atomically inside the storage layer, using
//! pessimistic row locking on Postgres and per-room mutexes in the in-memory
//! backend.
//!
//! ## Features
//!
//! - **Booking lifecycle**: create, list, and close reservations with a
//!   strict error taxonomy
//! - **Half-open date intervals**: a booking ending on a given day never
//!   conflicts with one starting that day
//! - **Pluggable storage**: Diesel-backed Postgres or an in-memory
//!   repository behind the same traits
//! - **HTTP API**: RESTful endpoints via Axum
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`models`]: Domain types (bookings, rooms, statuses, identifiers)
//! - [`db`]: Repository traits, storage backends, and persistence layer
//! - [`services`]: Business logic, validation, and error taxonomy
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
