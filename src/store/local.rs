//! In-memory store implementation.
//!
//! `LocalStore` keeps the whole application state in one `RwLock`-guarded
//! tree. Mutations are synchronous and atomic; there is a single logical
//! writer. An optional JSON snapshot file gives best-effort persistence:
//! it is loaded at startup and rewritten after every mutation, and a failed
//! write only logs a warning. In-memory state stays authoritative.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use super::error::{StoreError, StoreResult};
use super::repository::{
    CatalogStore, FullStore, NotificationStore, RequestStore, TimetableStore,
};
use crate::api::{
    Classroom, ClassroomId, Faculty, GroupId, LeaveRequest, Notification, RequestId, Role,
    StudentGroup, Subject, SubjectId, SwapRequest, Timetable, User, UserId,
};

/// The persisted state tree. Transient concerns (in-flight generation, HTTP
/// session) are deliberately not part of this struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoreData {
    users: Vec<User>,
    classrooms: Vec<Classroom>,
    subjects: Vec<Subject>,
    student_groups: Vec<StudentGroup>,
    faculty: Vec<Faculty>,
    draft_timetable: Option<Timetable>,
    published_timetable: Option<Timetable>,
    leave_requests: Vec<LeaveRequest>,
    swap_requests: Vec<SwapRequest>,
    notifications: Vec<Notification>,
}

/// In-memory store with optional write-through snapshot persistence.
#[derive(Debug)]
pub struct LocalStore {
    data: RwLock<StoreData>,
    snapshot_path: Option<PathBuf>,
}

impl LocalStore {
    /// Create an empty store with no persistence.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(StoreData::default()),
            snapshot_path: None,
        }
    }

    /// Create a store backed by a JSON snapshot file. An existing snapshot
    /// is loaded; a missing file starts empty. A malformed snapshot is an
    /// error so corrupted state is never silently discarded.
    pub fn with_snapshot(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let data = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| StoreError::SnapshotLoad(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreData::default(),
            Err(e) => {
                return Err(StoreError::SnapshotLoad(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        };
        Ok(Self {
            data: RwLock::new(data),
            snapshot_path: Some(path),
        })
    }

    /// Run a mutation under the write lock, then persist best-effort.
    fn mutate<T>(&self, f: impl FnOnce(&mut StoreData) -> StoreResult<T>) -> StoreResult<T> {
        let (result, snapshot) = {
            let mut data = self.data.write();
            let result = f(&mut data)?;
            let snapshot = self.snapshot_path.is_some().then(|| data.clone());
            (result, snapshot)
        };
        if let Some(data) = snapshot {
            self.persist(&data);
        }
        Ok(result)
    }

    /// Write the snapshot via a temp file and rename. Failure is a warning,
    /// never an error; the in-memory state remains correct.
    fn persist(&self, data: &StoreData) {
        let Some(path) = &self.snapshot_path else {
            return;
        };
        let attempt = || -> std::io::Result<()> {
            let json = serde_json::to_string_pretty(data)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            let tmp = path.with_extension("tmp");
            std::fs::write(&tmp, json)?;
            std::fs::rename(&tmp, path)?;
            Ok(())
        };
        if let Err(e) = attempt() {
            warn!(path = %path.display(), error = %e, "failed to persist state snapshot");
        }
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}

fn upsert_by_key<T, K: PartialEq>(items: &mut Vec<T>, item: T, key: impl Fn(&T) -> K) {
    let item_key = key(&item);
    match items.iter_mut().find(|existing| key(existing) == item_key) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

fn remove_by_key<T, K: PartialEq>(
    items: &mut Vec<T>,
    target: K,
    key: impl Fn(&T) -> K,
    entity: &'static str,
    id: &dyn std::fmt::Display,
) -> StoreResult<()> {
    let before = items.len();
    items.retain(|item| key(item) != target);
    if items.len() == before {
        return Err(StoreError::not_found(entity, id));
    }
    Ok(())
}

#[async_trait]
impl CatalogStore for LocalStore {
    async fn classrooms(&self) -> StoreResult<Vec<Classroom>> {
        Ok(self.data.read().classrooms.clone())
    }

    async fn upsert_classroom(&self, classroom: Classroom) -> StoreResult<()> {
        self.mutate(|data| {
            upsert_by_key(&mut data.classrooms, classroom, |c| c.id.clone());
            Ok(())
        })
    }

    async fn remove_classroom(&self, id: &ClassroomId) -> StoreResult<()> {
        self.mutate(|data| {
            remove_by_key(&mut data.classrooms, id.clone(), |c| c.id.clone(), "classroom", id)
        })
    }

    async fn subjects(&self) -> StoreResult<Vec<Subject>> {
        Ok(self.data.read().subjects.clone())
    }

    async fn upsert_subject(&self, subject: Subject) -> StoreResult<()> {
        self.mutate(|data| {
            upsert_by_key(&mut data.subjects, subject, |s| s.id.clone());
            Ok(())
        })
    }

    async fn remove_subject(&self, id: &SubjectId) -> StoreResult<()> {
        self.mutate(|data| {
            remove_by_key(&mut data.subjects, id.clone(), |s| s.id.clone(), "subject", id)
        })
    }

    async fn student_groups(&self) -> StoreResult<Vec<StudentGroup>> {
        Ok(self.data.read().student_groups.clone())
    }

    async fn upsert_student_group(&self, group: StudentGroup) -> StoreResult<()> {
        self.mutate(|data| {
            upsert_by_key(&mut data.student_groups, group, |g| g.id.clone());
            Ok(())
        })
    }

    async fn remove_student_group(&self, id: &GroupId) -> StoreResult<()> {
        self.mutate(|data| {
            remove_by_key(
                &mut data.student_groups,
                id.clone(),
                |g| g.id.clone(),
                "student group",
                id,
            )
        })
    }

    async fn faculty(&self) -> StoreResult<Vec<Faculty>> {
        Ok(self.data.read().faculty.clone())
    }

    async fn faculty_by_id(&self, id: &UserId) -> StoreResult<Option<Faculty>> {
        Ok(self.data.read().faculty.iter().find(|f| &f.id == id).cloned())
    }

    async fn upsert_faculty(&self, faculty: Faculty) -> StoreResult<()> {
        self.mutate(|data| {
            upsert_by_key(&mut data.faculty, faculty, |f| f.id.clone());
            Ok(())
        })
    }

    async fn remove_faculty(&self, id: &UserId) -> StoreResult<()> {
        self.mutate(|data| {
            remove_by_key(&mut data.faculty, id.clone(), |f| f.id.clone(), "faculty", id)
        })
    }

    async fn users(&self) -> StoreResult<Vec<User>> {
        Ok(self.data.read().users.clone())
    }

    async fn user_by_id(&self, id: &UserId) -> StoreResult<Option<User>> {
        Ok(self.data.read().users.iter().find(|u| &u.id == id).cloned())
    }

    async fn users_with_role(&self, role: Role) -> StoreResult<Vec<User>> {
        Ok(self
            .data
            .read()
            .users
            .iter()
            .filter(|u| u.role == role)
            .cloned()
            .collect())
    }

    async fn upsert_user(&self, user: User) -> StoreResult<()> {
        self.mutate(|data| {
            upsert_by_key(&mut data.users, user, |u| u.id.clone());
            Ok(())
        })
    }
}

#[async_trait]
impl TimetableStore for LocalStore {
    async fn draft(&self) -> StoreResult<Option<Timetable>> {
        Ok(self.data.read().draft_timetable.clone())
    }

    async fn set_draft(&self, timetable: Timetable) -> StoreResult<()> {
        self.mutate(|data| {
            data.draft_timetable = Some(timetable);
            Ok(())
        })
    }

    async fn discard_draft(&self) -> StoreResult<()> {
        self.mutate(|data| {
            data.draft_timetable = None;
            Ok(())
        })
    }

    async fn published(&self) -> StoreResult<Option<Timetable>> {
        Ok(self.data.read().published_timetable.clone())
    }

    async fn publish(&self) -> StoreResult<Timetable> {
        self.mutate(|data| {
            let draft = data.draft_timetable.take().ok_or(StoreError::NoDraft)?;
            data.published_timetable = Some(draft.clone());
            Ok(draft)
        })
    }

    async fn replace_published(&self, timetable: Timetable) -> StoreResult<()> {
        self.mutate(|data| {
            data.published_timetable = Some(timetable);
            Ok(())
        })
    }
}

#[async_trait]
impl RequestStore for LocalStore {
    async fn leave_requests(&self) -> StoreResult<Vec<LeaveRequest>> {
        Ok(self.data.read().leave_requests.clone())
    }

    async fn leave_request(&self, id: &RequestId) -> StoreResult<Option<LeaveRequest>> {
        Ok(self
            .data
            .read()
            .leave_requests
            .iter()
            .find(|r| &r.id == id)
            .cloned())
    }

    async fn add_leave_request(&self, request: LeaveRequest) -> StoreResult<()> {
        self.mutate(|data| {
            data.leave_requests.insert(0, request);
            Ok(())
        })
    }

    async fn update_leave_request(&self, request: LeaveRequest) -> StoreResult<()> {
        self.mutate(|data| {
            let found = data
                .leave_requests
                .iter_mut()
                .find(|r| r.id == request.id)
                .ok_or_else(|| StoreError::not_found("leave request", &request.id))?;
            *found = request;
            Ok(())
        })
    }

    async fn swap_requests(&self) -> StoreResult<Vec<SwapRequest>> {
        Ok(self.data.read().swap_requests.clone())
    }

    async fn swap_request(&self, id: &RequestId) -> StoreResult<Option<SwapRequest>> {
        Ok(self
            .data
            .read()
            .swap_requests
            .iter()
            .find(|r| &r.id == id)
            .cloned())
    }

    async fn add_swap_request(&self, request: SwapRequest) -> StoreResult<()> {
        self.mutate(|data| {
            data.swap_requests.insert(0, request);
            Ok(())
        })
    }

    async fn update_swap_request(&self, request: SwapRequest) -> StoreResult<()> {
        self.mutate(|data| {
            let found = data
                .swap_requests
                .iter_mut()
                .find(|r| r.id == request.id)
                .ok_or_else(|| StoreError::not_found("swap request", &request.id))?;
            *found = request;
            Ok(())
        })
    }
}

#[async_trait]
impl NotificationStore for LocalStore {
    async fn add_notification(&self, notification: Notification) -> StoreResult<()> {
        self.mutate(|data| {
            data.notifications.insert(0, notification);
            Ok(())
        })
    }

    async fn notifications_for(&self, user_id: &UserId) -> StoreResult<Vec<Notification>> {
        Ok(self
            .data
            .read()
            .notifications
            .iter()
            .filter(|n| &n.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_notifications_read(&self, user_id: &UserId) -> StoreResult<()> {
        self.mutate(|data| {
            for notification in data
                .notifications
                .iter_mut()
                .filter(|n| &n.user_id == user_id)
            {
                notification.is_read = true;
            }
            Ok(())
        })
    }
}

#[async_trait]
impl FullStore for LocalStore {
    async fn health_check(&self) -> StoreResult<bool> {
        // The lock being acquirable is all there is to check for the
        // in-memory backend.
        let _ = self.data.read();
        Ok(true)
    }
}
