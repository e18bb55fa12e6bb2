//! # IntelliSchedule Backend
//!
//! Backend for an AI-assisted college timetable scheduler. The crate keeps
//! the institution's catalog (classrooms, subjects, student groups, faculty),
//! delegates timetable construction to a generative model behind the
//! [`generator::TimetableGenerator`] trait, validates every candidate against
//! hard scheduling constraints before it is accepted as a draft, and manages
//! the leave/swap request lifecycle against the published timetable.
//!
//! ## Architecture
//!
//! - [`api`]: Domain model and wire types (days, time slots, catalog
//!   entities, requests, timetables)
//! - [`store`]: Repository traits and the in-memory store with optional
//!   JSON snapshot persistence
//! - [`services`]: Availability resolution, constraint validation, the
//!   generation orchestrator and job tracker, and request lifecycle
//!   transitions
//! - [`generator`]: The generation boundary and the Gemini-backed client
//! - [`http`]: Axum-based REST API (behind the `http-server` feature)

pub mod api;

pub mod generator;

pub mod services;

pub mod store;

#[cfg(feature = "http-server")]
pub mod http;
