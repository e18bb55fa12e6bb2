//! State storage for the scheduling data.
//!
//! All application state (catalog collections, draft and published
//! timetables, requests, notifications) lives behind the Repository-style
//! traits in [`repository`], so the backing storage can be swapped without
//! touching the service layer.
//!
//! The shipped backend is [`LocalStore`]: an in-memory state tree with an
//! optional best-effort JSON snapshot for persistence across restarts. A
//! snapshot write failure only logs a warning; the in-memory state is always
//! authoritative.

pub mod error;
pub mod local;
pub mod repository;

pub use error::{StoreError, StoreResult};
pub use local::LocalStore;
pub use repository::{
    CatalogStore, FullStore, NotificationStore, RequestStore, TimetableStore,
};
