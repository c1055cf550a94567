//! Exercise catalog - valid names for routine editing

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Muscle groups for describing what an exercise trains
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MuscleGroup {
    Chest,
    Shoulders,
    Triceps,
    Back,
    Biceps,
    Core,
    Glutes,
    Quads,
    Hamstrings,
    Calves,
}

impl MuscleGroup {
    pub fn name(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "chest",
            MuscleGroup::Shoulders => "shoulders",
            MuscleGroup::Triceps => "triceps",
            MuscleGroup::Back => "back",
            MuscleGroup::Biceps => "biceps",
            MuscleGroup::Core => "core",
            MuscleGroup::Glutes => "glutes",
            MuscleGroup::Quads => "quads",
            MuscleGroup::Hamstrings => "hamstrings",
            MuscleGroup::Calves => "calves",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Exercise {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub muscle_groups: &'static [MuscleGroup],
    /// Weight is usually negative (machine assistance)
    pub is_assisted: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Category {
    Push,
    Pull,
    Legs,
    Core,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[Category::Push, Category::Pull, Category::Legs, Category::Core]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::Push => "Push",
            Category::Pull => "Pull",
            Category::Legs => "Legs",
            Category::Core => "Core",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Category::Push => "💪",
            Category::Pull => "🏋️",
            Category::Legs => "🦵",
            Category::Core => "🎯",
        }
    }
}

pub const EXERCISES: &[Exercise] = &[
    // Push
    Exercise {
        id: "bench_press",
        name: "Bench Press",
        category: Category::Push,
        muscle_groups: &[MuscleGroup::Chest, MuscleGroup::Triceps, MuscleGroup::Shoulders],
        is_assisted: false,
    },
    Exercise {
        id: "incline_bench_press",
        name: "Incline Bench Press",
        category: Category::Push,
        muscle_groups: &[MuscleGroup::Chest, MuscleGroup::Shoulders, MuscleGroup::Triceps],
        is_assisted: false,
    },
    Exercise {
        id: "overhead_press",
        name: "Overhead Press",
        category: Category::Push,
        muscle_groups: &[MuscleGroup::Shoulders, MuscleGroup::Triceps, MuscleGroup::Core],
        is_assisted: false,
    },
    Exercise {
        id: "lateral_raise",
        name: "Lateral Raise",
        category: Category::Push,
        muscle_groups: &[MuscleGroup::Shoulders],
        is_assisted: false,
    },
    Exercise {
        id: "tricep_dip",
        name: "Tricep Dip",
        category: Category::Push,
        muscle_groups: &[MuscleGroup::Triceps, MuscleGroup::Chest],
        is_assisted: false,
    },
    Exercise {
        id: "assisted_dip",
        name: "Assisted Dip",
        category: Category::Push,
        muscle_groups: &[MuscleGroup::Triceps, MuscleGroup::Chest],
        is_assisted: true,
    },
    Exercise {
        id: "tricep_pushdown",
        name: "Tricep Pushdown",
        category: Category::Push,
        muscle_groups: &[MuscleGroup::Triceps],
        is_assisted: false,
    },
    // Pull
    Exercise {
        id: "deadlift",
        name: "Deadlift",
        category: Category::Pull,
        muscle_groups: &[MuscleGroup::Back, MuscleGroup::Hamstrings, MuscleGroup::Glutes],
        is_assisted: false,
    },
    Exercise {
        id: "barbell_row",
        name: "Barbell Row",
        category: Category::Pull,
        muscle_groups: &[MuscleGroup::Back, MuscleGroup::Biceps],
        is_assisted: false,
    },
    Exercise {
        id: "lat_pulldown",
        name: "Lat Pulldown",
        category: Category::Pull,
        muscle_groups: &[MuscleGroup::Back, MuscleGroup::Biceps],
        is_assisted: false,
    },
    Exercise {
        id: "pull_up",
        name: "Pull Up",
        category: Category::Pull,
        muscle_groups: &[MuscleGroup::Back, MuscleGroup::Biceps],
        is_assisted: false,
    },
    Exercise {
        id: "assisted_pull_up",
        name: "Assisted Pull Up",
        category: Category::Pull,
        muscle_groups: &[MuscleGroup::Back, MuscleGroup::Biceps],
        is_assisted: true,
    },
    Exercise {
        id: "bicep_curl",
        name: "Bicep Curl",
        category: Category::Pull,
        muscle_groups: &[MuscleGroup::Biceps],
        is_assisted: false,
    },
    Exercise {
        id: "face_pull",
        name: "Face Pull",
        category: Category::Pull,
        muscle_groups: &[MuscleGroup::Shoulders, MuscleGroup::Back],
        is_assisted: false,
    },
    // Legs
    Exercise {
        id: "squat",
        name: "Squat",
        category: Category::Legs,
        muscle_groups: &[MuscleGroup::Quads, MuscleGroup::Glutes, MuscleGroup::Core],
        is_assisted: false,
    },
    Exercise {
        id: "romanian_deadlift",
        name: "Romanian Deadlift",
        category: Category::Legs,
        muscle_groups: &[MuscleGroup::Hamstrings, MuscleGroup::Glutes],
        is_assisted: false,
    },
    Exercise {
        id: "leg_press",
        name: "Leg Press",
        category: Category::Legs,
        muscle_groups: &[MuscleGroup::Quads, MuscleGroup::Glutes],
        is_assisted: false,
    },
    Exercise {
        id: "leg_curl",
        name: "Leg Curl",
        category: Category::Legs,
        muscle_groups: &[MuscleGroup::Hamstrings],
        is_assisted: false,
    },
    Exercise {
        id: "calf_raise",
        name: "Calf Raise",
        category: Category::Legs,
        muscle_groups: &[MuscleGroup::Calves],
        is_assisted: false,
    },
    // Core
    Exercise {
        id: "hanging_leg_raise",
        name: "Hanging Leg Raise",
        category: Category::Core,
        muscle_groups: &[MuscleGroup::Core],
        is_assisted: false,
    },
    Exercise {
        id: "cable_crunch",
        name: "Cable Crunch",
        category: Category::Core,
        muscle_groups: &[MuscleGroup::Core],
        is_assisted: false,
    },
];

/// Find exercise by its display name (the join key used in routines and history)
pub fn find_exercise_by_name(name: &str) -> Option<&'static Exercise> {
    EXERCISES.iter().find(|e| e.name == name)
}

/// Resolve a user-typed name or id to a catalog entry, ignoring case
pub fn resolve_exercise(input: &str) -> Result<&'static Exercise> {
    let input = input.trim();
    EXERCISES
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(input) || e.id.eq_ignore_ascii_case(input))
        .ok_or_else(|| Error::UnknownExercise(input.to_string()))
}

pub fn exercises_in(category: Category) -> impl Iterator<Item = &'static Exercise> {
    EXERCISES.iter().filter(move |e| e.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_and_ids_are_unique() {
        let names: HashSet<_> = EXERCISES.iter().map(|e| e.name).collect();
        let ids: HashSet<_> = EXERCISES.iter().map(|e| e.id).collect();
        assert_eq!(names.len(), EXERCISES.len());
        assert_eq!(ids.len(), EXERCISES.len());
    }

    #[test]
    fn test_find_exercise_by_name_is_exact() {
        assert_eq!(find_exercise_by_name("Bench Press").unwrap().id, "bench_press");
        assert!(find_exercise_by_name("bench press").is_none());
    }

    #[test]
    fn test_resolve_exercise() {
        assert_eq!(resolve_exercise("bench press").unwrap().name, "Bench Press");
        assert_eq!(resolve_exercise(" squat ").unwrap().name, "Squat");
        assert_eq!(resolve_exercise("pull_up").unwrap().name, "Pull Up");
    }

    #[test]
    fn test_resolve_unknown_exercise() {
        let err = resolve_exercise("Underwater Basket Weaving").unwrap_err();
        assert!(matches!(err, Error::UnknownExercise(_)));
    }

    #[test]
    fn test_every_exercise_has_muscles() {
        assert!(EXERCISES.iter().all(|e| !e.muscle_groups.is_empty()));
    }

    #[test]
    fn test_exercises_in_category() {
        assert!(exercises_in(Category::Legs).all(|e| e.category == Category::Legs));
        assert!(exercises_in(Category::Core).count() >= 2);
        assert!(resolve_exercise("assisted_pull_up").unwrap().is_assisted);
    }
}
