//! Request lifecycle management.
//!
//! Owns every leave and swap request transition and is the only code path
//! permitted to mutate the published timetable outside of a fresh publish.
//! Both request types share the same state machine: `Pending -> Approved` or
//! `Pending -> Rejected`, terminal thereafter. Role checks are enforced here
//! as preconditions; hiding controls in a UI is not authorization.

use tracing::warn;
use uuid::Uuid;

use crate::api::{
    EntryId, LeaveRequest, Notification, RequestId, RequestStatus, Role, SwapRequest, User,
    UserId,
};
use crate::store::{FullStore, StoreError};

/// Errors from lifecycle transitions. All are local to the operation and
/// recoverable; a failed transition leaves the request Pending.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("{required} role required, but {actor} is {actual}")]
    Unauthorized {
        required: Role,
        actual: Role,
        actor: UserId,
    },

    #[error("request {0} not found")]
    RequestNotFound(RequestId),

    /// The request already reached a terminal state; re-resolving is not
    /// possible.
    #[error("request {0} is already resolved")]
    AlreadyResolved(RequestId),

    #[error("no published timetable exists")]
    NoPublishedTimetable,

    /// A referenced entry is no longer in the published timetable, e.g.
    /// because it was regenerated since the request was filed.
    #[error("timetable entry {0} no longer exists")]
    EntryNotFound(EntryId),

    #[error("invalid request: {0}")]
    Invalid(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Approve or reject a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    fn status(self) -> RequestStatus {
        match self {
            Decision::Approve => RequestStatus::Approved,
            Decision::Reject => RequestStatus::Rejected,
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Decision::Approve => "approved",
            Decision::Reject => "rejected",
        }
    }
}

fn require_role(actor: &User, required: Role) -> Result<(), LifecycleError> {
    if actor.role != required {
        return Err(LifecycleError::Unauthorized {
            required,
            actual: actor.role,
            actor: actor.id.clone(),
        });
    }
    Ok(())
}

/// Notification failure never fails the transition it decorates.
async fn notify(store: &dyn FullStore, user_id: UserId, message: String) {
    if let Err(e) = store
        .add_notification(Notification::new(user_id.clone(), message))
        .await
    {
        warn!(user_id = %user_id, error = %e, "failed to store notification");
    }
}

async fn notify_role(store: &dyn FullStore, role: Role, message: &str) {
    match store.users_with_role(role).await {
        Ok(users) => {
            for user in users {
                notify(store, user.id, message.to_string()).await;
            }
        }
        Err(e) => warn!(%role, error = %e, "failed to list approvers for notification"),
    }
}

// ============================================================================
// Leave requests
// ============================================================================

/// File a new leave request for the acting faculty member. The request
/// starts Pending; every Principal is notified.
pub async fn submit_leave_request(
    store: &dyn FullStore,
    actor: &User,
    mut request: LeaveRequest,
) -> Result<LeaveRequest, LifecycleError> {
    require_role(actor, Role::Faculty)?;
    request.id = RequestId::new(Uuid::new_v4().to_string());
    request.faculty_id = actor.id.clone();
    request.status = RequestStatus::Pending;
    request.validate().map_err(LifecycleError::Invalid)?;

    store.add_leave_request(request.clone()).await?;
    notify_role(
        store,
        Role::Principal,
        &format!("{} filed a new leave request.", actor.name),
    )
    .await;
    Ok(request)
}

/// Resolve a pending leave request. Principal only.
///
/// Approval has no immediate timetable effect; it takes hold the next time
/// a timetable is generated, through the availability resolver. Either
/// decision notifies the requesting faculty member.
pub async fn resolve_leave_request(
    store: &dyn FullStore,
    actor: &User,
    id: &RequestId,
    decision: Decision,
) -> Result<LeaveRequest, LifecycleError> {
    require_role(actor, Role::Principal)?;

    let mut request = store
        .leave_request(id)
        .await?
        .ok_or_else(|| LifecycleError::RequestNotFound(id.clone()))?;
    if request.status.is_terminal() {
        return Err(LifecycleError::AlreadyResolved(id.clone()));
    }

    request.status = decision.status();
    store.update_leave_request(request.clone()).await?;
    notify(
        store,
        request.faculty_id.clone(),
        format!("Your leave request has been {}.", decision.verb()),
    )
    .await;
    Ok(request)
}

// ============================================================================
// Swap requests
// ============================================================================

/// File a new swap request against the currently published timetable.
///
/// Both entries are located by id and snapshotted into the request; the
/// requester must own `my_entry_id`. Every Admin is notified.
pub async fn submit_swap_request(
    store: &dyn FullStore,
    actor: &User,
    my_entry_id: EntryId,
    their_entry_id: EntryId,
    reason: String,
) -> Result<SwapRequest, LifecycleError> {
    require_role(actor, Role::Faculty)?;

    let published = store
        .published()
        .await?
        .ok_or(LifecycleError::NoPublishedTimetable)?;
    let my_class = published
        .entry(&my_entry_id)
        .cloned()
        .ok_or_else(|| LifecycleError::EntryNotFound(my_entry_id.clone()))?;
    let their_class = published
        .entry(&their_entry_id)
        .cloned()
        .ok_or_else(|| LifecycleError::EntryNotFound(their_entry_id.clone()))?;

    if my_class.faculty_id != actor.id {
        return Err(LifecycleError::Invalid(
            "the requested entry is not taught by the requester".to_string(),
        ));
    }
    if my_entry_id == their_entry_id {
        return Err(LifecycleError::Invalid(
            "cannot swap an entry with itself".to_string(),
        ));
    }

    let request = SwapRequest {
        id: RequestId::new(Uuid::new_v4().to_string()),
        faculty_id: actor.id.clone(),
        my_entry_id,
        their_entry_id,
        their_faculty_id: their_class.faculty_id.clone(),
        my_class,
        their_class,
        reason,
        status: RequestStatus::Pending,
    };
    store.add_swap_request(request.clone()).await?;
    notify_role(
        store,
        Role::Admin,
        &format!("{} filed a new class swap request.", actor.name),
    )
    .await;
    Ok(request)
}

/// Resolve a pending swap request. Admin only.
///
/// Approval locates both entries by id in the currently published timetable
/// and exchanges their faculty ids, leaving every other field unchanged. If
/// the timetable is gone or either entry can no longer be found the
/// transition fails and the request stays Pending; it is never marked
/// Approved without taking effect.
pub async fn resolve_swap_request(
    store: &dyn FullStore,
    actor: &User,
    id: &RequestId,
    decision: Decision,
) -> Result<SwapRequest, LifecycleError> {
    require_role(actor, Role::Admin)?;

    let mut request = store
        .swap_request(id)
        .await?
        .ok_or_else(|| LifecycleError::RequestNotFound(id.clone()))?;
    if request.status.is_terminal() {
        return Err(LifecycleError::AlreadyResolved(id.clone()));
    }

    if decision == Decision::Approve {
        let mut published = store
            .published()
            .await?
            .ok_or(LifecycleError::NoPublishedTimetable)?;
        if published.entry(&request.my_entry_id).is_none() {
            return Err(LifecycleError::EntryNotFound(request.my_entry_id.clone()));
        }
        if published.entry(&request.their_entry_id).is_none() {
            return Err(LifecycleError::EntryNotFound(request.their_entry_id.clone()));
        }

        let requester = request.faculty_id.clone();
        let colleague = request.their_faculty_id.clone();
        if let Some(mine) = published.entry_mut(&request.my_entry_id) {
            mine.faculty_id = colleague.clone();
        }
        if let Some(theirs) = published.entry_mut(&request.their_entry_id) {
            theirs.faculty_id = requester;
        }
        store.replace_published(published).await?;
    }

    request.status = decision.status();
    store.update_swap_request(request.clone()).await?;

    notify(
        store,
        request.faculty_id.clone(),
        format!("Your class swap request has been {}.", decision.verb()),
    )
    .await;
    if decision == Decision::Approve {
        notify(
            store,
            request.their_faculty_id.clone(),
            "A class swap involving your schedule has been approved.".to_string(),
        )
        .await;
    }
    Ok(request)
}

// ============================================================================
// Draft publication
// ============================================================================

/// Publish the current draft, replacing the published timetable. Admin only.
pub async fn publish_draft(
    store: &dyn FullStore,
    actor: &User,
) -> Result<usize, LifecycleError> {
    require_role(actor, Role::Admin)?;
    let published = store.publish().await?;
    Ok(published.len())
}

/// Discard the current draft without publishing. Admin only.
pub async fn discard_draft(store: &dyn FullStore, actor: &User) -> Result<(), LifecycleError> {
    require_role(actor, Role::Admin)?;
    store.discard_draft().await?;
    Ok(())
}
