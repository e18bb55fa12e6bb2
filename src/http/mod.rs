//! HTTP server module.
//!
//! Axum-based REST API over the store and service layer. Handlers stay
//! thin: request parsing, actor resolution from the `x-user-id` header, and
//! JSON serialization live here; authorization and business rules live in
//! the lifecycle manager and the generation orchestrator.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                              │
//! │  - Request parsing and actor resolution                  │
//! │  - JSON serialization, SSE job-log streaming             │
//! │  - CORS, compression, error mapping                      │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (services/)                               │
//! │  - Generation orchestration and tracking                 │
//! │  - Constraint validation                                 │
//! │  - Request lifecycle transitions                         │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Store Layer (store/)                                    │
//! │  - Catalog, timetables, requests, notifications          │
//! │  - LocalStore with optional JSON snapshot                │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod dto;

pub mod error;

pub mod handlers;

pub mod router;

pub mod state;

pub use router::create_router;

pub use state::AppState;
