//! Domain model for the IntelliSchedule backend.
//!
//! This file consolidates the entity types shared by the services, store and
//! HTTP layers. All types derive Serialize/Deserialize; wire names match the
//! JSON produced and consumed by the frontend and the external generator
//! (camelCase fields, verbatim day and slot labels).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                $name(value.into())
            }

            pub fn value(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name(value.to_string())
            }
        }
    };
}

string_id!(
    /// Classroom identifier.
    ClassroomId
);
string_id!(
    /// Subject identifier.
    SubjectId
);
string_id!(
    /// Student group identifier.
    GroupId
);
string_id!(
    /// User identifier. Faculty members are users, so faculty ids are user ids.
    UserId
);
string_id!(
    /// Leave or swap request identifier.
    RequestId
);
string_id!(
    /// Stable timetable entry identifier, assigned when a generated candidate
    /// is mapped into internal entries. Swap approval matches entries by this
    /// id rather than by structural equality.
    EntryId
);
string_id!(
    /// Notification identifier.
    NotificationId
);

// ============================================================================
// Fixed enumerations
// ============================================================================

/// Teaching day. Saturday and Sunday are excluded from the whole domain;
/// leave dates falling on a weekend have no weekday mapping.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Day {
    /// All teaching days in display order.
    pub const ALL: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    /// Map a calendar weekday onto a teaching day. Weekend days map to `None`.
    pub fn from_weekday(weekday: chrono::Weekday) -> Option<Day> {
        match weekday {
            chrono::Weekday::Mon => Some(Day::Monday),
            chrono::Weekday::Tue => Some(Day::Tuesday),
            chrono::Weekday::Wed => Some(Day::Wednesday),
            chrono::Weekday::Thu => Some(Day::Thursday),
            chrono::Weekday::Fri => Some(Day::Friday),
            chrono::Weekday::Sat | chrono::Weekday::Sun => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
        }
    }
}

impl std::fmt::Display for Day {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hourly teaching slot. The 13:00-14:00 gap is the lunch break, not a
/// missing value. Labels are the exact wire strings used by the frontend
/// and the generator schema.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum TimeSlot {
    #[serde(rename = "09:00 - 10:00")]
    T0900,
    #[serde(rename = "10:00 - 11:00")]
    T1000,
    #[serde(rename = "11:00 - 12:00")]
    T1100,
    #[serde(rename = "12:00 - 13:00")]
    T1200,
    #[serde(rename = "14:00 - 15:00")]
    T1400,
    #[serde(rename = "15:00 - 16:00")]
    T1500,
}

impl TimeSlot {
    /// All slots in display order.
    pub const ALL: [TimeSlot; 6] = [
        TimeSlot::T0900,
        TimeSlot::T1000,
        TimeSlot::T1100,
        TimeSlot::T1200,
        TimeSlot::T1400,
        TimeSlot::T1500,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::T0900 => "09:00 - 10:00",
            TimeSlot::T1000 => "10:00 - 11:00",
            TimeSlot::T1100 => "11:00 - 12:00",
            TimeSlot::T1200 => "12:00 - 13:00",
            TimeSlot::T1400 => "14:00 - 15:00",
            TimeSlot::T1500 => "15:00 - 16:00",
        }
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Catalog entities
// ============================================================================

/// Classroom type; drives placement constraints for lab subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    Lab,
    #[serde(rename = "Smart Class")]
    SmartClass,
    #[serde(rename = "Lecture Hall")]
    LectureHall,
}

/// Physical classroom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classroom {
    pub id: ClassroomId,
    pub name: String,
    /// Seat count; must cover the strength of any group placed here.
    pub capacity: u32,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub location: String,
}

/// Taught subject with its exact weekly occurrence quota.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub code: String,
    /// Exact number of weekly entries each assigned group must receive.
    pub classes_per_week: u32,
    /// When true the subject may only be placed in a `RoomType::Lab` room.
    pub lab_required: bool,
}

/// Cohort of students scheduled as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentGroup {
    pub id: GroupId,
    pub name: String,
    /// Enrolled headcount.
    pub strength: u32,
    pub department: String,
    pub semester: u32,
}

/// One (subject, group) teaching duty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub subject_id: SubjectId,
    pub group_id: GroupId,
}

/// Declared weekly availability: day to ordered free slots.
pub type WeeklyAvailability = BTreeMap<Day, Vec<TimeSlot>>;

/// Faculty member. The `assignments` set is the authoritative teaching load;
/// `availability` is the declared base state, independent of leave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faculty {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Subject ids the member is qualified to teach. Assignments are expected
    /// to stay within this set but it is not enforced.
    pub expertise: Vec<SubjectId>,
    pub assignments: Vec<Assignment>,
    pub availability: WeeklyAvailability,
}

/// Application role; gates request-lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Administrator")]
    Admin,
    Faculty,
    Principal,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => f.write_str("Administrator"),
            Role::Faculty => f.write_str("Faculty"),
            Role::Principal => f.write_str("Principal"),
        }
    }
}

/// Application user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

// ============================================================================
// Requests
// ============================================================================

/// Lifecycle state shared by leave and swap requests. `Pending` is the only
/// state that may transition; `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// Kind of leave being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaveType {
    #[serde(rename = "full-day")]
    FullDay,
    #[serde(rename = "multi-day")]
    MultiDay,
    #[serde(rename = "half-day")]
    HalfDay,
}

/// Which half of the teaching day a half-day leave blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HalfDaySession {
    #[serde(rename = "first-half")]
    FirstHalf,
    #[serde(rename = "second-half")]
    SecondHalf,
}

/// Faculty leave request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: RequestId,
    pub faculty_id: UserId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: RequestStatus,
    pub leave_type: LeaveType,
    /// Required iff `leave_type` is `HalfDay`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub half_day_session: Option<HalfDaySession>,
}

impl LeaveRequest {
    /// Check the structural invariants of the date range and session field.
    pub fn validate(&self) -> Result<(), String> {
        match self.leave_type {
            LeaveType::FullDay => {
                if self.end_date != self.start_date {
                    return Err("full-day leave must start and end on the same date".to_string());
                }
            }
            LeaveType::MultiDay => {
                if self.end_date < self.start_date {
                    return Err("multi-day leave must not end before it starts".to_string());
                }
            }
            LeaveType::HalfDay => {
                if self.end_date != self.start_date {
                    return Err("half-day leave must start and end on the same date".to_string());
                }
                if self.half_day_session.is_none() {
                    return Err("half-day leave requires a session".to_string());
                }
            }
        }
        if self.leave_type != LeaveType::HalfDay && self.half_day_session.is_some() {
            return Err("session is only valid for half-day leave".to_string());
        }
        Ok(())
    }
}

/// Faculty-initiated exchange of the teaching slot between two published
/// entries. Entries are referenced by stable id; the snapshots record what
/// the requester saw when filing and are kept for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub id: RequestId,
    /// Requesting faculty member.
    pub faculty_id: UserId,
    pub my_entry_id: EntryId,
    pub their_entry_id: EntryId,
    pub my_class: TimetableEntry,
    pub their_class: TimetableEntry,
    pub their_faculty_id: UserId,
    pub reason: String,
    pub status: RequestStatus,
}

// ============================================================================
// Timetable
// ============================================================================

/// One scheduled (day, time, group, subject, faculty, room) tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    pub id: EntryId,
    pub day: Day,
    pub time: TimeSlot,
    pub group_id: GroupId,
    pub subject_id: SubjectId,
    pub faculty_id: UserId,
    pub room_id: ClassroomId,
}

/// A weekly schedule. The system holds at most one draft and one published
/// timetable; publishing replaces the published one with the draft.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timetable {
    pub entries: Vec<TimetableEntry>,
}

impl Timetable {
    pub fn new(entries: Vec<TimetableEntry>) -> Self {
        Self { entries }
    }

    pub fn entry(&self, id: &EntryId) -> Option<&TimetableEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn entry_mut(&mut self, id: &EntryId) -> Option<&mut TimetableEntry> {
        self.entries.iter_mut().find(|e| &e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Notifications
// ============================================================================

/// Fire-and-forget message shown to a user; a side effect of request
/// lifecycle transitions, not part of the scheduling invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub message: String,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Notification {
    /// Build an unread notification with a fresh id, timestamped now.
    pub fn new(user_id: UserId, message: impl Into<String>) -> Self {
        Self {
            id: NotificationId::new(uuid::Uuid::new_v4().to_string()),
            user_id,
            message: message.into(),
            is_read: false,
            created_at: chrono::Utc::now(),
        }
    }
}
