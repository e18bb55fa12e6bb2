//! Timetable constraint contract.
//!
//! The rule set a candidate timetable must satisfy, expressed twice: as
//! prompt text sent to the external generator, and as executable predicates
//! run against every returned candidate before it is accepted as a draft.
//! Load distribution (rule 7) is guidance only and is never mechanically
//! checked; caller-supplied free-text constraints are appended verbatim and
//! are likewise advisory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::api::{
    Assignment, Classroom, ClassroomId, Day, EntryId, Faculty, GroupId, RoomType, StudentGroup,
    Subject, SubjectId, TimeSlot, TimetableEntry, UserId, WeeklyAvailability,
};

/// Which contract rule a violation breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintRule {
    /// A faculty member, room or group booked twice in one (day, time) cell.
    DoubleBooking,
    /// Entry's (subject, group) pair is not taught by the entry's faculty.
    AssignmentFidelity,
    /// A (subject, group) pair scheduled more or less often than its quota.
    QuotaSatisfaction,
    /// Lab-required subject placed outside a lab.
    RoomTypeFit,
    /// Group strength exceeds room capacity.
    CapacityFit,
    /// Entry scheduled while its faculty is unavailable.
    AvailabilityCompliance,
    /// Entry references an id absent from the catalog.
    UnknownReference,
}

/// One broken rule in a candidate timetable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintViolation {
    pub rule: ConstraintRule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<EntryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<Day>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeSlot>,
    pub description: String,
}

/// Outcome of validating one candidate timetable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub total_entries: usize,
    pub violations: Vec<ConstraintViolation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} violation(s) across {} entries",
            self.violations.len(),
            self.total_entries
        )?;
        for violation in self.violations.iter().take(5) {
            write!(f, "; {}", violation.description)?;
        }
        if self.violations.len() > 5 {
            write!(f, "; ...")?;
        }
        Ok(())
    }
}

/// Read-only view of the catalog collections a validation run needs.
pub struct CatalogSnapshot<'a> {
    pub classrooms: &'a [Classroom],
    pub subjects: &'a [Subject],
    pub student_groups: &'a [StudentGroup],
    pub faculty: &'a [Faculty],
}

/// Render the constraint contract as generator instructions.
///
/// The numbered rules mirror the executable predicates below; the wording is
/// the contract the generator is asked to honor and must stay in sync with
/// what [`validate_timetable`] later enforces.
pub fn constraint_text(additional: Option<&str>) -> String {
    let mut text = String::from(
        "1. CRITICAL: No clashes. A faculty member, a classroom, or a student group cannot be in two places at the same time.\n\
         2. Adhere strictly to the provided Faculty Assignments. A subject for a group must be taught by the assigned faculty.\n\
         3. For each student group, every assigned subject must be scheduled for the exact number of times specified in the subject's \"classesPerWeek\".\n\
         4. If a subject has \"labRequired: true\", it MUST be scheduled in a classroom of type \"Lab\".\n\
         5. The capacity of a classroom must be greater than or equal to the strength of the student group scheduled in it.\n\
         6. CRITICAL: Respect faculty availability. A faculty member can only be scheduled in a time slot if they are marked as available for that day and time. This data already includes unavailability due to approved leave.\n\
         7. Distribute classes evenly throughout the week for each student group to avoid overloading any single day.",
    );
    if let Some(extra) = additional.map(str::trim).filter(|s| !s.is_empty()) {
        text.push_str("\n8. Additional User Constraints: ");
        text.push_str(extra);
    }
    text
}

/// Run the contract's executable predicates against a candidate timetable.
///
/// `availability` is the leave-adjusted map per faculty member, as produced
/// by the availability resolver for this generation run.
pub fn validate_timetable(
    entries: &[TimetableEntry],
    catalog: &CatalogSnapshot<'_>,
    availability: &HashMap<UserId, WeeklyAvailability>,
) -> ValidationReport {
    let mut violations = Vec::new();

    let classrooms: HashMap<&ClassroomId, &Classroom> =
        catalog.classrooms.iter().map(|c| (&c.id, c)).collect();
    let subjects: HashMap<&SubjectId, &Subject> =
        catalog.subjects.iter().map(|s| (&s.id, s)).collect();
    let groups: HashMap<&GroupId, &StudentGroup> =
        catalog.student_groups.iter().map(|g| (&g.id, g)).collect();
    let faculty: HashMap<&UserId, &Faculty> =
        catalog.faculty.iter().map(|f| (&f.id, f)).collect();

    check_references(entries, &classrooms, &subjects, &groups, &faculty, &mut violations);
    check_double_booking(entries, &mut violations);
    check_assignment_fidelity(entries, &faculty, &mut violations);
    check_quotas(entries, catalog, &subjects, &mut violations);
    check_room_fit(entries, &classrooms, &subjects, &groups, &mut violations);
    check_availability(entries, &faculty, availability, &mut violations);

    ValidationReport {
        total_entries: entries.len(),
        violations,
    }
}

fn check_references(
    entries: &[TimetableEntry],
    classrooms: &HashMap<&ClassroomId, &Classroom>,
    subjects: &HashMap<&SubjectId, &Subject>,
    groups: &HashMap<&GroupId, &StudentGroup>,
    faculty: &HashMap<&UserId, &Faculty>,
    violations: &mut Vec<ConstraintViolation>,
) {
    for entry in entries {
        let mut unknown = |what: &str, id: &dyn std::fmt::Display| {
            violations.push(ConstraintViolation {
                rule: ConstraintRule::UnknownReference,
                entry_id: Some(entry.id.clone()),
                day: Some(entry.day),
                time: Some(entry.time),
                description: format!("entry references unknown {} '{}'", what, id),
            });
        };
        if !classrooms.contains_key(&entry.room_id) {
            unknown("classroom", &entry.room_id);
        }
        if !subjects.contains_key(&entry.subject_id) {
            unknown("subject", &entry.subject_id);
        }
        if !groups.contains_key(&entry.group_id) {
            unknown("student group", &entry.group_id);
        }
        if !faculty.contains_key(&entry.faculty_id) {
            unknown("faculty", &entry.faculty_id);
        }
    }
}

fn check_double_booking(entries: &[TimetableEntry], violations: &mut Vec<ConstraintViolation>) {
    let mut by_faculty: HashMap<(Day, TimeSlot, &UserId), &TimetableEntry> = HashMap::new();
    let mut by_room: HashMap<(Day, TimeSlot, &ClassroomId), &TimetableEntry> = HashMap::new();
    let mut by_group: HashMap<(Day, TimeSlot, &GroupId), &TimetableEntry> = HashMap::new();

    for entry in entries {
        if let Some(first) = by_faculty.insert((entry.day, entry.time, &entry.faculty_id), entry) {
            violations.push(clash(entry, "faculty", first.faculty_id.value()));
        }
        if let Some(first) = by_room.insert((entry.day, entry.time, &entry.room_id), entry) {
            violations.push(clash(entry, "classroom", first.room_id.value()));
        }
        if let Some(first) = by_group.insert((entry.day, entry.time, &entry.group_id), entry) {
            violations.push(clash(entry, "student group", first.group_id.value()));
        }
    }
}

fn clash(entry: &TimetableEntry, what: &str, id: &str) -> ConstraintViolation {
    ConstraintViolation {
        rule: ConstraintRule::DoubleBooking,
        entry_id: Some(entry.id.clone()),
        day: Some(entry.day),
        time: Some(entry.time),
        description: format!(
            "{} '{}' booked twice on {} {}",
            what, id, entry.day, entry.time
        ),
    }
}

fn check_assignment_fidelity(
    entries: &[TimetableEntry],
    faculty: &HashMap<&UserId, &Faculty>,
    violations: &mut Vec<ConstraintViolation>,
) {
    for entry in entries {
        let Some(member) = faculty.get(&entry.faculty_id) else {
            continue; // already reported as an unknown reference
        };
        let assigned = member.assignments.iter().any(|a| {
            a.subject_id == entry.subject_id && a.group_id == entry.group_id
        });
        if !assigned {
            violations.push(ConstraintViolation {
                rule: ConstraintRule::AssignmentFidelity,
                entry_id: Some(entry.id.clone()),
                day: Some(entry.day),
                time: Some(entry.time),
                description: format!(
                    "faculty '{}' is not assigned subject '{}' for group '{}'",
                    entry.faculty_id, entry.subject_id, entry.group_id
                ),
            });
        }
    }
}

fn check_quotas(
    entries: &[TimetableEntry],
    catalog: &CatalogSnapshot<'_>,
    subjects: &HashMap<&SubjectId, &Subject>,
    violations: &mut Vec<ConstraintViolation>,
) {
    // Count entries per assigned pair; entries for unassigned pairs are
    // caught by assignment fidelity, not double-counted here.
    let mut counts: HashMap<Assignment, u32> = HashMap::new();
    for member in catalog.faculty {
        for pair in &member.assignments {
            counts.entry(pair.clone()).or_insert(0);
        }
    }
    for entry in entries {
        let pair = Assignment {
            subject_id: entry.subject_id.clone(),
            group_id: entry.group_id.clone(),
        };
        if let Some(count) = counts.get_mut(&pair) {
            *count += 1;
        }
    }

    for (pair, count) in counts {
        let Some(subject) = subjects.get(&pair.subject_id) else {
            continue;
        };
        if count != subject.classes_per_week {
            violations.push(ConstraintViolation {
                rule: ConstraintRule::QuotaSatisfaction,
                entry_id: None,
                day: None,
                time: None,
                description: format!(
                    "subject '{}' for group '{}' scheduled {} time(s), quota is {}",
                    pair.subject_id, pair.group_id, count, subject.classes_per_week
                ),
            });
        }
    }
}

fn check_room_fit(
    entries: &[TimetableEntry],
    classrooms: &HashMap<&ClassroomId, &Classroom>,
    subjects: &HashMap<&SubjectId, &Subject>,
    groups: &HashMap<&GroupId, &StudentGroup>,
    violations: &mut Vec<ConstraintViolation>,
) {
    for entry in entries {
        let (Some(room), Some(subject), Some(group)) = (
            classrooms.get(&entry.room_id),
            subjects.get(&entry.subject_id),
            groups.get(&entry.group_id),
        ) else {
            continue;
        };
        if subject.lab_required && room.room_type != RoomType::Lab {
            violations.push(ConstraintViolation {
                rule: ConstraintRule::RoomTypeFit,
                entry_id: Some(entry.id.clone()),
                day: Some(entry.day),
                time: Some(entry.time),
                description: format!(
                    "subject '{}' requires a lab but room '{}' is not one",
                    entry.subject_id, entry.room_id
                ),
            });
        }
        if group.strength > room.capacity {
            violations.push(ConstraintViolation {
                rule: ConstraintRule::CapacityFit,
                entry_id: Some(entry.id.clone()),
                day: Some(entry.day),
                time: Some(entry.time),
                description: format!(
                    "group '{}' strength {} exceeds room '{}' capacity {}",
                    entry.group_id, group.strength, entry.room_id, room.capacity
                ),
            });
        }
    }
}

fn check_availability(
    entries: &[TimetableEntry],
    faculty: &HashMap<&UserId, &Faculty>,
    availability: &HashMap<UserId, WeeklyAvailability>,
    violations: &mut Vec<ConstraintViolation>,
) {
    for entry in entries {
        if !faculty.contains_key(&entry.faculty_id) {
            continue;
        }
        let free = availability
            .get(&entry.faculty_id)
            .and_then(|week| week.get(&entry.day))
            .is_some_and(|slots| slots.contains(&entry.time));
        if !free {
            violations.push(ConstraintViolation {
                rule: ConstraintRule::AvailabilityCompliance,
                entry_id: Some(entry.id.clone()),
                day: Some(entry.day),
                time: Some(entry.time),
                description: format!(
                    "faculty '{}' is not available on {} {}",
                    entry.faculty_id, entry.day, entry.time
                ),
            });
        }
    }
}
