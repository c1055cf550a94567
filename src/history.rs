//! History store - dated session documents and consolidated per-exercise history

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{Routine, SetData, Workout, WorkoutExercise, routine_key};
use crate::storage::{Category, ExerciseSets, Storage};
use crate::user::User;

/// Name of the consolidated document inside the history category
pub const CONSOLIDATED_NAME: &str = "_consolidated_history";

const SESSION_DATE_FORMAT: &str = "%Y%m%d";

/// Exercise name to session records, oldest first, in document order.
///
/// Entries that do not decode as session lists are kept verbatim and
/// written back unchanged, so an append only touches its own exercises.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsolidatedHistory {
    exercises: Vec<(String, HistoryEntry)>,
}

#[derive(Debug, Clone, PartialEq)]
enum HistoryEntry {
    Sessions(Vec<Vec<SetData>>),
    Unreadable(Value),
}

impl HistoryEntry {
    fn decode(name: &str, value: Value) -> Self {
        match Vec::<Vec<SetData>>::deserialize(&value) {
            Ok(sessions) => HistoryEntry::Sessions(sessions),
            Err(e) => {
                warn!("Keeping unreadable history for '{}' as is: {}", name, e);
                HistoryEntry::Unreadable(value)
            }
        }
    }
}

impl Serialize for ConsolidatedHistory {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.exercises.len()))?;
        for (name, entry) in &self.exercises {
            match entry {
                HistoryEntry::Sessions(sessions) => map.serialize_entry(name, sessions)?,
                HistoryEntry::Unreadable(value) => map.serialize_entry(name, value)?,
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ConsolidatedHistory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct HistoryVisitor;

        impl<'de> Visitor<'de> for HistoryVisitor {
            type Value = ConsolidatedHistory;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of exercise names to session lists")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut history = ConsolidatedHistory::default();
                while let Some((name, value)) = access.next_entry::<String, Value>()? {
                    let entry = HistoryEntry::decode(&name, value);
                    match history.entry_mut(&name) {
                        Some(existing) => *existing = entry,
                        None => history.exercises.push((name, entry)),
                    }
                }
                Ok(history)
            }
        }

        deserializer.deserialize_map(HistoryVisitor)
    }
}

impl ConsolidatedHistory {
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Exercises with readable history, in document order
    pub fn exercise_names(&self) -> impl Iterator<Item = &str> {
        self.exercises
            .iter()
            .filter(|(_, entry)| matches!(entry, HistoryEntry::Sessions(_)))
            .map(|(name, _)| name.as_str())
    }

    pub fn sessions(&self, exercise: &str) -> &[Vec<SetData>] {
        match self.entry(exercise) {
            Some(HistoryEntry::Sessions(sessions)) => sessions.as_slice(),
            _ => &[],
        }
    }

    /// Most recently appended session for an exercise
    pub fn last_session(&self, exercise: &str) -> Option<&[SetData]> {
        self.sessions(exercise).last().map(Vec::as_slice)
    }

    /// Append one session record (a copy of `sets`).
    ///
    /// An unreadable list is extended in place; any other unreadable
    /// value is replaced.
    pub fn append(&mut self, exercise: &str, sets: &[SetData]) {
        match self.entry_mut(exercise) {
            Some(HistoryEntry::Sessions(sessions)) => sessions.push(sets.to_vec()),
            Some(HistoryEntry::Unreadable(Value::Array(items))) => items.push(sets_value(sets)),
            Some(entry) => {
                warn!("Replacing unreadable history for '{}'", exercise);
                *entry = HistoryEntry::Sessions(vec![sets.to_vec()]);
            }
            None => self.exercises.push((
                exercise.to_string(),
                HistoryEntry::Sessions(vec![sets.to_vec()]),
            )),
        }
    }

    fn entry(&self, exercise: &str) -> Option<&HistoryEntry> {
        self.exercises
            .iter()
            .find(|(name, _)| name == exercise)
            .map(|(_, entry)| entry)
    }

    fn entry_mut(&mut self, exercise: &str) -> Option<&mut HistoryEntry> {
        self.exercises
            .iter_mut()
            .find(|(name, _)| name == exercise)
            .map(|(_, entry)| entry)
    }

    /// Append every exercise of a workout as one session each
    pub fn append_workout(&mut self, workout: &Workout) {
        for exercise in &workout.exercises {
            self.append(&exercise.name, &exercise.sets);
        }
    }

    /// Next workout for a routine, pre-filled from the last session.
    ///
    /// Each exercise gets the last recorded sets unchanged, padded with
    /// zero sets up to the target count. Extra historical sets are kept.
    pub fn next_workout(&self, routine: &Routine, date: DateTime<Utc>) -> Workout {
        let mut workout = Workout::new(&routine.name, date);
        for planned in &routine.exercises {
            let mut sets = self
                .last_session(&planned.name)
                .map(<[SetData]>::to_vec)
                .unwrap_or_default();
            let target = planned.target_sets as usize;
            if sets.len() < target {
                sets.resize(target, SetData::ZERO);
            }
            workout.exercises.push(WorkoutExercise::new(&planned.name, sets));
        }
        workout
    }
}

/// Dated document name for a workout: `<routineKey>_<YYYYMMDD>` (local day)
pub fn session_name(workout: &Workout) -> String {
    format!(
        "{}_{}",
        routine_key(&workout.routine_name),
        workout.date.with_timezone(&Local).format(SESSION_DATE_FORMAT)
    )
}

/// Day encoded in a dated document name, if any
pub fn session_date(name: &str) -> Option<NaiveDate> {
    let (_, suffix) = name.rsplit_once('_')?;
    NaiveDate::parse_from_str(suffix, SESSION_DATE_FORMAT).ok()
}

fn sets_value(sets: &[SetData]) -> Value {
    Value::Array(
        sets.iter()
            .map(|s| json!({"reps": s.reps, "weight": s.weight}))
            .collect(),
    )
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    storage: Storage,
}

impl HistoryStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn has_consolidated(&self, user: &User) -> Result<bool> {
        self.storage.exists(user, Category::History, CONSOLIDATED_NAME)
    }

    /// Consolidated history, empty when not built yet or unreadable
    pub fn load_consolidated(&self, user: &User) -> Result<ConsolidatedHistory> {
        self.storage
            .read_or_default(user, Category::History, CONSOLIDATED_NAME)
    }

    /// Build the consolidated document from dated sessions.
    ///
    /// Runs once: if the consolidated document exists this does nothing and
    /// returns `false`. Sessions are merged in calendar order of their name
    /// suffix, ties broken by name.
    pub fn rebuild_consolidated(&self, user: &User) -> Result<bool> {
        if self.has_consolidated(user)? {
            debug!("Consolidated history for {} already exists", user);
            return Ok(false);
        }

        let mut names = self.list_sessions(user)?;
        names.sort_by(|a, b| (session_date(a), a).cmp(&(session_date(b), b)));

        let mut history = ConsolidatedHistory::default();
        let mut merged = 0;
        for name in &names {
            let stored = self.storage.read_document(user, Category::History, name);
            let doc: ExerciseSets = match stored {
                Ok(doc) => doc,
                Err(Error::Malformed { path, reason }) => {
                    warn!("Skipping corrupt session {:?}: {}", path, reason);
                    continue;
                }
                Err(e) => return Err(e),
            };
            for (exercise, sets) in &doc.0 {
                history.append(exercise, sets);
            }
            merged += 1;
        }

        self.storage
            .write_document(user, Category::History, CONSOLIDATED_NAME, &history)?;
        info!("Built consolidated history for {} from {} sessions", user, merged);
        Ok(true)
    }

    /// Workout skeleton from the last performance of each routine exercise
    pub fn last_performance(&self, user: &User, routine: &Routine) -> Result<Workout> {
        let history = self.load_consolidated(user)?;
        Ok(history.next_workout(routine, Utc::now()))
    }

    /// Append the workout to consolidated history, one session per exercise.
    ///
    /// Entries of other exercises are written back untouched. Refuses to
    /// overwrite a consolidated document it cannot parse.
    pub fn append_workout(&self, user: &User, workout: &Workout) -> Result<()> {
        let stored = self
            .storage
            .read_document(user, Category::History, CONSOLIDATED_NAME);
        let mut history: ConsolidatedHistory = match stored {
            Ok(history) => history,
            Err(Error::NotFound { .. }) => ConsolidatedHistory::default(),
            Err(e) => return Err(e),
        };

        history.append_workout(workout);
        self.storage
            .write_document(user, Category::History, CONSOLIDATED_NAME, &history)?;
        debug!(
            "Appended {} exercises of '{}' to history",
            workout.exercises.len(),
            workout.routine_name
        );
        Ok(())
    }

    /// Persist the workout as its dated document; same-day saves overwrite
    pub fn save_workout_session(&self, user: &User, workout: &Workout) -> Result<String> {
        let name = session_name(workout);
        self.storage
            .write_document(user, Category::History, &name, &ExerciseSets::from(workout))?;
        info!("Saved workout session {}", name);
        Ok(name)
    }

    /// Dated session document names, excluding the consolidated one
    pub fn list_sessions(&self, user: &User) -> Result<Vec<String>> {
        let mut names = self.storage.list_documents(user, Category::History)?;
        names.retain(|n| n != CONSOLIDATED_NAME);
        Ok(names)
    }

    pub fn load_session(&self, user: &User, name: &str) -> Result<Workout> {
        let doc: ExerciseSets = self.storage.read_document(user, Category::History, name)?;
        let (routine_name, date) = match (name.rsplit_once('_'), session_date(name)) {
            (Some((prefix, _)), Some(day)) => (prefix.to_string(), local_midnight(day)),
            _ => (name.to_string(), DateTime::<Utc>::UNIX_EPOCH),
        };
        let mut workout = Workout::new(routine_name, date);
        workout.exercises = doc.into_exercises();
        Ok(workout)
    }
}

fn local_midnight(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_opt(0, 0, 0)
        .and_then(|naive| naive.and_local_timezone(Local).earliest())
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| day.and_time(chrono::NaiveTime::MIN).and_utc())
}
