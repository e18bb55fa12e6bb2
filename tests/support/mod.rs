//! Shared fixtures for the integration suites: a seeded store and scripted
//! generator stand-ins.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex as PlMutex;

use intellischedule::api::{
    Assignment, Classroom, ClassroomId, Day, Faculty, GroupId, RoomType, Role, StudentGroup,
    Subject, SubjectId, TimeSlot, User, UserId, WeeklyAvailability,
};
use intellischedule::generator::{
    GenerationRequest, GeneratorError, GeneratorTuning, TimetableGenerator,
};
use intellischedule::store::{CatalogStore, LocalStore};

/// Base availability: every weekday, every slot.
pub fn full_availability() -> WeeklyAvailability {
    Day::ALL
        .iter()
        .map(|day| (*day, TimeSlot::ALL.to_vec()))
        .collect::<BTreeMap<_, _>>()
}

pub fn user(id: &str, name: &str, role: Role) -> User {
    User {
        id: UserId::from(id),
        name: name.to_string(),
        email: format!("{}@college.edu", id),
        role,
    }
}

/// Seed a store with a small consistent catalog:
///
/// - rooms `c1` (Lecture Hall, 70 seats) and `c2` (Lab, 35 seats)
/// - subjects `s1` Mathematics (2/week) and `s2` Data Structures (5/week, lab)
/// - group `g1` CS-A (strength 60) and `g2` CS-B (strength 30)
/// - faculty `u2` teaching (s1, g1) and `u4` teaching (s2, g2)
/// - users: `admin`, `principal`, plus the two faculty members
pub async fn seeded_store() -> LocalStore {
    let store = LocalStore::new();

    store
        .upsert_classroom(Classroom {
            id: ClassroomId::from("c1"),
            name: "Hall A".to_string(),
            capacity: 70,
            room_type: RoomType::LectureHall,
            location: "Block 1".to_string(),
        })
        .await
        .unwrap();
    store
        .upsert_classroom(Classroom {
            id: ClassroomId::from("c2"),
            name: "Computer Lab".to_string(),
            capacity: 35,
            room_type: RoomType::Lab,
            location: "Block 2".to_string(),
        })
        .await
        .unwrap();

    store
        .upsert_subject(Subject {
            id: SubjectId::from("s1"),
            name: "Mathematics".to_string(),
            code: "MA101".to_string(),
            classes_per_week: 2,
            lab_required: false,
        })
        .await
        .unwrap();
    store
        .upsert_subject(Subject {
            id: SubjectId::from("s2"),
            name: "Data Structures".to_string(),
            code: "CS201".to_string(),
            classes_per_week: 5,
            lab_required: true,
        })
        .await
        .unwrap();

    store
        .upsert_student_group(StudentGroup {
            id: GroupId::from("g1"),
            name: "CS-A".to_string(),
            strength: 60,
            department: "Computer Science".to_string(),
            semester: 3,
        })
        .await
        .unwrap();
    store
        .upsert_student_group(StudentGroup {
            id: GroupId::from("g2"),
            name: "CS-B".to_string(),
            strength: 30,
            department: "Computer Science".to_string(),
            semester: 3,
        })
        .await
        .unwrap();

    store
        .upsert_faculty(Faculty {
            id: UserId::from("u2"),
            name: "Dr. Sharma".to_string(),
            email: "u2@college.edu".to_string(),
            expertise: vec![SubjectId::from("s1")],
            assignments: vec![Assignment {
                subject_id: SubjectId::from("s1"),
                group_id: GroupId::from("g1"),
            }],
            availability: full_availability(),
        })
        .await
        .unwrap();
    store
        .upsert_faculty(Faculty {
            id: UserId::from("u4"),
            name: "Prof. Iyer".to_string(),
            email: "u4@college.edu".to_string(),
            expertise: vec![SubjectId::from("s2")],
            assignments: vec![Assignment {
                subject_id: SubjectId::from("s2"),
                group_id: GroupId::from("g2"),
            }],
            availability: full_availability(),
        })
        .await
        .unwrap();

    store.upsert_user(user("admin", "Admin", Role::Admin)).await.unwrap();
    store
        .upsert_user(user("principal", "Principal", Role::Principal))
        .await
        .unwrap();
    store
        .upsert_user(user("u2", "Dr. Sharma", Role::Faculty))
        .await
        .unwrap();
    store
        .upsert_user(user("u4", "Prof. Iyer", Role::Faculty))
        .await
        .unwrap();

    store
}

/// A schedule text that satisfies every constraint against [`seeded_store`]:
/// exactly 2 Mathematics entries for g1 with u2 in Hall A, and 5 Data
/// Structures entries for g2 with u4 in the lab.
pub fn valid_schedule_json() -> String {
    let slots = [
        ("Monday", "09:00 - 10:00"),
        ("Tuesday", "09:00 - 10:00"),
        ("Wednesday", "09:00 - 10:00"),
        ("Thursday", "09:00 - 10:00"),
        ("Friday", "09:00 - 10:00"),
    ];
    let mut entries: Vec<serde_json::Value> = slots
        .iter()
        .map(|(day, time)| {
            serde_json::json!({
                "day": day, "time": time,
                "groupId": "g2", "subjectId": "s2", "facultyId": "u4", "roomId": "c2"
            })
        })
        .collect();
    entries.push(serde_json::json!({
        "day": "Monday", "time": "10:00 - 11:00",
        "groupId": "g1", "subjectId": "s1", "facultyId": "u2", "roomId": "c1"
    }));
    entries.push(serde_json::json!({
        "day": "Tuesday", "time": "10:00 - 11:00",
        "groupId": "g1", "subjectId": "s1", "facultyId": "u2", "roomId": "c1"
    }));
    serde_json::to_string(&entries).unwrap()
}

/// Generator stand-in that returns a fixed result and records the request
/// it was handed.
pub struct ScriptedGenerator {
    response: PlMutex<Option<Result<String, GeneratorError>>>,
    pub last_request: PlMutex<Option<GenerationRequest>>,
    pub last_tuning: PlMutex<Option<GeneratorTuning>>,
}

impl ScriptedGenerator {
    pub fn returning(text: impl Into<String>) -> Self {
        Self {
            response: PlMutex::new(Some(Ok(text.into()))),
            last_request: PlMutex::new(None),
            last_tuning: PlMutex::new(None),
        }
    }

    pub fn failing(error: GeneratorError) -> Self {
        Self {
            response: PlMutex::new(Some(Err(error))),
            last_request: PlMutex::new(None),
            last_tuning: PlMutex::new(None),
        }
    }
}

#[async_trait]
impl TimetableGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
        tuning: &GeneratorTuning,
    ) -> Result<String, GeneratorError> {
        *self.last_request.lock() = Some(request.clone());
        *self.last_tuning.lock() = Some(*tuning);
        self.response
            .lock()
            .take()
            .expect("scripted generator called more than once")
    }
}

/// Generator stand-in that never answers; for deadline and cancellation
/// paths.
pub struct HangingGenerator;

#[async_trait]
impl TimetableGenerator for HangingGenerator {
    async fn generate(
        &self,
        _request: &GenerationRequest,
        _tuning: &GeneratorTuning,
    ) -> Result<String, GeneratorError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        unreachable!("hanging generator should be aborted by its caller")
    }
}

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified, restoring them
/// afterwards. Serializes access to the process-global environment so
/// parallel tests cannot observe each other's changes.
///
/// `changes` is a list of `(key, value)` pairs: `Some(v)` sets the variable,
/// `None` removes it.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}
