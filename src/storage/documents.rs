//! On-disk document shapes
//!
//! These mirror the JSON files exactly; conversion to the domain model
//! happens in the stores.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::models::{Routine, RoutineExercise, SetData, Workout, WorkoutExercise};

/// `routines/<key>.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutineDocument {
    /// Display name; older documents only have the file key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub exercises: Vec<RoutineExerciseDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineExerciseDocument {
    pub exercise_name: String,
    pub sets: u32,
    pub reps: u32,
}

impl RoutineDocument {
    pub fn into_routine(self, key: &str) -> Routine {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| key.to_string());
        let exercises = self
            .exercises
            .into_iter()
            .map(|e| RoutineExercise::new(e.exercise_name, e.sets, e.reps))
            .collect();
        Routine::new(name, exercises)
    }
}

impl From<&Routine> for RoutineDocument {
    fn from(routine: &Routine) -> Self {
        Self {
            name: Some(routine.name.clone()),
            exercises: routine
                .exercises
                .iter()
                .map(|e| RoutineExerciseDocument {
                    exercise_name: e.name.clone(),
                    sets: e.target_sets,
                    reps: e.target_reps,
                })
                .collect(),
        }
    }
}

/// Exercise name to sets, in document order.
///
/// Used by dated session documents and by the cached workout. A repeated
/// key replaces the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExerciseSets(pub Vec<(String, Vec<SetData>)>);

impl ExerciseSets {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, name: String, sets: Vec<SetData>) {
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = sets,
            None => self.0.push((name, sets)),
        }
    }

    pub fn into_exercises(self) -> Vec<WorkoutExercise> {
        self.0
            .into_iter()
            .map(|(name, sets)| WorkoutExercise::new(name, sets))
            .collect()
    }
}

impl From<&Workout> for ExerciseSets {
    fn from(workout: &Workout) -> Self {
        let mut doc = ExerciseSets::default();
        for exercise in &workout.exercises {
            doc.insert(exercise.name.clone(), exercise.sets.clone());
        }
        doc
    }
}

impl Serialize for ExerciseSets {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, sets) in &self.0 {
            map.serialize_entry(name, sets)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ExerciseSets {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ExerciseSetsVisitor;

        impl<'de> Visitor<'de> for ExerciseSetsVisitor {
            type Value = ExerciseSets;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of exercise names to set lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut doc = ExerciseSets::default();
                while let Some((name, sets)) = access.next_entry::<String, Vec<SetData>>()? {
                    doc.insert(name, sets);
                }
                Ok(doc)
            }
        }

        deserializer.deserialize_map(ExerciseSetsVisitor)
    }
}

/// `temp_workouts/<routine>.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheDocument {
    #[serde(default)]
    pub exercise_index: i64,
    #[serde(default)]
    pub workout: ExerciseSets,
}
