//! Store trait definitions.
//!
//! The application state is reached only through these traits so that the
//! backing storage can be swapped without touching the service layer. The
//! in-memory implementation lives in [`super::local`].

use async_trait::async_trait;

use super::error::StoreResult;
use crate::api::{
    Classroom, ClassroomId, Faculty, GroupId, LeaveRequest, Notification, RequestId, Role,
    StudentGroup, Subject, SubjectId, SwapRequest, Timetable, User, UserId,
};

/// Catalog collections: classrooms, subjects, student groups, faculty, users.
///
/// Upserts replace an existing item with the same id or append a new one;
/// removals of unknown ids return `NotFound`.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn classrooms(&self) -> StoreResult<Vec<Classroom>>;
    async fn upsert_classroom(&self, classroom: Classroom) -> StoreResult<()>;
    async fn remove_classroom(&self, id: &ClassroomId) -> StoreResult<()>;

    async fn subjects(&self) -> StoreResult<Vec<Subject>>;
    async fn upsert_subject(&self, subject: Subject) -> StoreResult<()>;
    async fn remove_subject(&self, id: &SubjectId) -> StoreResult<()>;

    async fn student_groups(&self) -> StoreResult<Vec<StudentGroup>>;
    async fn upsert_student_group(&self, group: StudentGroup) -> StoreResult<()>;
    async fn remove_student_group(&self, id: &GroupId) -> StoreResult<()>;

    async fn faculty(&self) -> StoreResult<Vec<Faculty>>;
    async fn faculty_by_id(&self, id: &UserId) -> StoreResult<Option<Faculty>>;
    async fn upsert_faculty(&self, faculty: Faculty) -> StoreResult<()>;
    async fn remove_faculty(&self, id: &UserId) -> StoreResult<()>;

    async fn users(&self) -> StoreResult<Vec<User>>;
    async fn user_by_id(&self, id: &UserId) -> StoreResult<Option<User>>;
    async fn users_with_role(&self, role: Role) -> StoreResult<Vec<User>>;
    async fn upsert_user(&self, user: User) -> StoreResult<()>;
}

/// Draft and published timetable state.
#[async_trait]
pub trait TimetableStore: Send + Sync {
    async fn draft(&self) -> StoreResult<Option<Timetable>>;

    /// Replace any existing draft with a freshly generated candidate.
    async fn set_draft(&self, timetable: Timetable) -> StoreResult<()>;

    async fn discard_draft(&self) -> StoreResult<()>;

    async fn published(&self) -> StoreResult<Option<Timetable>>;

    /// Move the draft into the published position, replacing whatever was
    /// published before. Fails with `NoDraft` when no draft exists.
    async fn publish(&self) -> StoreResult<Timetable>;

    /// Overwrite the published timetable in place. Used by swap approval,
    /// the only mutation of published state outside a fresh publish.
    async fn replace_published(&self, timetable: Timetable) -> StoreResult<()>;
}

/// Leave and swap request collections.
#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn leave_requests(&self) -> StoreResult<Vec<LeaveRequest>>;
    async fn leave_request(&self, id: &RequestId) -> StoreResult<Option<LeaveRequest>>;
    async fn add_leave_request(&self, request: LeaveRequest) -> StoreResult<()>;
    async fn update_leave_request(&self, request: LeaveRequest) -> StoreResult<()>;

    async fn swap_requests(&self) -> StoreResult<Vec<SwapRequest>>;
    async fn swap_request(&self, id: &RequestId) -> StoreResult<Option<SwapRequest>>;
    async fn add_swap_request(&self, request: SwapRequest) -> StoreResult<()>;
    async fn update_swap_request(&self, request: SwapRequest) -> StoreResult<()>;
}

/// Per-user notification feed.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn add_notification(&self, notification: Notification) -> StoreResult<()>;
    async fn notifications_for(&self, user_id: &UserId) -> StoreResult<Vec<Notification>>;
    async fn mark_notifications_read(&self, user_id: &UserId) -> StoreResult<()>;
}

/// Complete store interface combining all concerns.
#[async_trait]
pub trait FullStore: CatalogStore + TimetableStore + RequestStore + NotificationStore {
    /// Check that the store is reachable and healthy.
    async fn health_check(&self) -> StoreResult<bool>;
}
