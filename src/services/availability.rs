//! Leave-adjusted faculty availability.
//!
//! Derives the weekly availability used for one generation run from a
//! faculty member's declared base availability and their approved leave.
//! The stored faculty record is never mutated; the result is ephemeral.

use crate::api::{
    Day, Faculty, HalfDaySession, LeaveRequest, LeaveType, RequestStatus, TimeSlot,
    WeeklyAvailability,
};

/// Compute the leave-adjusted weekly availability for one faculty member.
///
/// Leaves are applied in ascending start-date order so that overlapping
/// leaves resolve deterministically. Only `Approved` leaves belonging to
/// this faculty member are considered; anything else is ignored. Calendar
/// dates falling on a weekend have no weekday mapping and are skipped.
///
/// Half-day semantics: the session's slots are taken from the fixed slot
/// catalog split at its ceiling midpoint and removed from the faculty's
/// current list for that day. Removals therefore compose; a first-half and
/// a second-half leave on the same day empty it out.
pub fn resolve_availability(
    faculty: &Faculty,
    leaves: &[LeaveRequest],
) -> WeeklyAvailability {
    let mut availability = faculty.availability.clone();

    let mut applicable: Vec<&LeaveRequest> = leaves
        .iter()
        .filter(|leave| leave.status == RequestStatus::Approved && leave.faculty_id == faculty.id)
        .collect();
    applicable.sort_by_key(|leave| leave.start_date);

    for leave in applicable {
        match leave.leave_type {
            LeaveType::FullDay | LeaveType::MultiDay => {
                for date in leave.start_date.iter_days() {
                    if date > leave.end_date {
                        break;
                    }
                    if let Some(day) = Day::from_weekday(chrono::Datelike::weekday(&date)) {
                        availability.insert(day, Vec::new());
                    }
                }
            }
            LeaveType::HalfDay => {
                let Some(day) = Day::from_weekday(chrono::Datelike::weekday(&leave.start_date))
                else {
                    continue;
                };
                let Some(session) = leave.half_day_session else {
                    // Structurally invalid half-day leave; validation should
                    // have rejected it upstream.
                    continue;
                };
                let blocked = session_slots(session);
                if let Some(slots) = availability.get_mut(&day) {
                    slots.retain(|slot| !blocked.contains(slot));
                }
            }
        }
    }

    availability
}

/// The catalog slots blocked by a half-day session. The catalog splits at
/// the ceiling of half its length (3 of 6 slots per half).
fn session_slots(session: HalfDaySession) -> &'static [TimeSlot] {
    static CATALOG: [TimeSlot; 6] = TimeSlot::ALL;
    const MIDPOINT: usize = TimeSlot::ALL.len().div_ceil(2);
    match session {
        HalfDaySession::FirstHalf => &CATALOG[..MIDPOINT],
        HalfDaySession::SecondHalf => &CATALOG[MIDPOINT..],
    }
}
