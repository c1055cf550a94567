//! Workout assembler - builds the next workout and drives a session to save
//!
//! A session moves `InProgress -> Saved`; before `open` there is no session
//! value at all. Opening resolves the workout from the session cache when
//! present, otherwise from history.
//! Every edit or cursor move while in progress is written through to the
//! cache so an interrupted session can be resumed.

use chrono::Utc;
use tracing::{error, info, warn};

use crate::cache::SessionCache;
use crate::error::{Error, Result};
use crate::history::HistoryStore;
use crate::models::{Routine, RoutineExercise, SetData, Workout, WorkoutExercise};
use crate::routines::RoutineStore;
use crate::storage::Storage;
use crate::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    InProgress,
    Saved,
}

/// Where an opened workout came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkoutSource {
    Cache,
    History,
}

/// One user's workout against one routine
#[derive(Debug, Clone)]
pub struct WorkoutSession {
    user: User,
    routine: Routine,
    workout: Workout,
    cursor: usize,
    state: SessionState,
    source: WorkoutSource,
}

impl WorkoutSession {
    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn routine(&self) -> &Routine {
        &self.routine
    }

    pub fn workout(&self) -> &Workout {
        &self.workout
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn source(&self) -> WorkoutSource {
        self.source
    }

    pub fn exercise_count(&self) -> usize {
        self.workout.exercises.len()
    }

    pub fn is_first(&self) -> bool {
        self.cursor == 0
    }

    pub fn is_last(&self) -> bool {
        self.cursor + 1 >= self.exercise_count()
    }

    pub fn current_exercise(&self) -> Option<&WorkoutExercise> {
        self.workout.exercises.get(self.cursor)
    }

    /// Routine plan for the current exercise, matched by name
    pub fn planned_exercise(&self) -> Option<&RoutineExercise> {
        let name = &self.current_exercise()?.name;
        self.routine.exercises.iter().find(|e| &e.name == name)
    }

    fn ensure_in_progress(&self) -> Result<()> {
        match self.state {
            SessionState::InProgress => Ok(()),
            SessionState::Saved => Err(Error::SessionClosed),
        }
    }

    fn current_set_mut(&mut self, index: usize) -> Result<&mut SetData> {
        let exercise = self
            .workout
            .exercises
            .get_mut(self.cursor)
            .ok_or(Error::NoExercises)?;
        let len = exercise.sets.len();
        let name = exercise.name.clone();
        exercise.sets.get_mut(index).ok_or(Error::SetOutOfRange {
            exercise: name,
            index,
            len,
        })
    }
}

/// Orchestrates routines, history and the session cache
#[derive(Debug, Clone)]
pub struct WorkoutAssembler {
    routines: RoutineStore,
    history: HistoryStore,
    cache: SessionCache,
}

impl WorkoutAssembler {
    pub fn new(storage: Storage) -> Self {
        Self {
            routines: RoutineStore::new(storage.clone()),
            history: HistoryStore::new(storage.clone()),
            cache: SessionCache::new(storage),
        }
    }

    pub fn routines(&self) -> &RoutineStore {
        &self.routines
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    /// Open the workout view for a stored routine
    pub fn open(&self, user: &User, routine_name: &str) -> Result<WorkoutSession> {
        let routine = self.routines.get(user, routine_name)?;
        self.open_routine(user, routine)
    }

    /// Cached workout if present, otherwise derived from history and cached
    /// at the first exercise
    pub fn open_routine(&self, user: &User, routine: Routine) -> Result<WorkoutSession> {
        let (workout, cursor, source) = match self.cache.get(user, &routine.name)? {
            Some(entry) => {
                info!("Resuming cached workout for '{}'", routine.name);
                (entry.workout, entry.cursor, WorkoutSource::Cache)
            }
            None => {
                let workout = self.history.last_performance(user, &routine)?;
                self.cache.put(user, &routine.name, &workout, 0)?;
                info!("Started workout for '{}' from history", routine.name);
                (workout, 0, WorkoutSource::History)
            }
        };

        let cursor = cursor.min(workout.exercises.len().saturating_sub(1));
        Ok(WorkoutSession {
            user: user.clone(),
            routine,
            workout,
            cursor,
            state: SessionState::InProgress,
            source,
        })
    }

    /// Replace a set of the current exercise
    pub fn update_set(
        &self,
        session: &mut WorkoutSession,
        index: usize,
        set: SetData,
    ) -> Result<()> {
        session.ensure_in_progress()?;
        *session.current_set_mut(index)? = set;
        self.persist(session)
    }

    pub fn set_reps(&self, session: &mut WorkoutSession, index: usize, reps: u32) -> Result<()> {
        session.ensure_in_progress()?;
        session.current_set_mut(index)?.reps = reps;
        self.persist(session)
    }

    pub fn set_weight(
        &self,
        session: &mut WorkoutSession,
        index: usize,
        weight: f64,
    ) -> Result<()> {
        session.ensure_in_progress()?;
        session.current_set_mut(index)?.weight = weight;
        self.persist(session)
    }

    /// Move to the next exercise; returns false at the last one
    pub fn next(&self, session: &mut WorkoutSession) -> Result<bool> {
        session.ensure_in_progress()?;
        if session.is_last() {
            return Ok(false);
        }
        session.cursor += 1;
        self.persist(session)?;
        Ok(true)
    }

    /// Move to the previous exercise; returns false at the first one
    pub fn previous(&self, session: &mut WorkoutSession) -> Result<bool> {
        session.ensure_in_progress()?;
        if session.is_first() {
            return Ok(false);
        }
        session.cursor -= 1;
        self.persist(session)?;
        Ok(true)
    }

    /// Record the workout and end the session.
    ///
    /// Consolidated history problems are logged and do not stop the save.
    /// The cache is only dropped once the dated document is written.
    pub fn save(&self, session: &mut WorkoutSession) -> Result<String> {
        session.ensure_in_progress()?;
        session.workout.date = Utc::now();

        if let Err(e) = self.history.rebuild_consolidated(&session.user) {
            warn!("Could not build consolidated history: {}", e);
        }
        if let Err(e) = self.history.append_workout(&session.user, &session.workout) {
            error!("Failed to append '{}' to history: {}", session.routine.name, e);
        }

        let name = self
            .history
            .save_workout_session(&session.user, &session.workout)?;
        session.state = SessionState::Saved;

        if let Err(e) = self.cache.delete(&session.user, &session.routine.name) {
            warn!("Saved {} but could not drop cached workout: {}", name, e);
        }
        info!(
            "Workout recorded: {} ({} sets)",
            name,
            session.workout.total_sets()
        );
        Ok(name)
    }

    /// Abandon the session and forget its cached progress
    pub fn discard(&self, session: WorkoutSession) -> Result<()> {
        self.cache.delete(&session.user, &session.routine.name)?;
        info!("Discarded workout for '{}'", session.routine.name);
        Ok(())
    }

    /// Save a routine definition; a cached workout built from the old
    /// definition is dropped
    pub fn save_routine(&self, user: &User, routine: &Routine) -> Result<()> {
        self.routines.save(user, routine)?;
        self.cache.delete(user, &routine.name)
    }

    fn persist(&self, session: &WorkoutSession) -> Result<()> {
        self.cache.put(
            &session.user,
            &session.routine.name,
            &session.workout,
            session.cursor,
        )
    }
}
