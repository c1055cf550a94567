//! ironlog - Personal workout tracker
//!
//! Routines, resumable workout sessions and per-exercise history.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::Level;

use ironlog::analytics::Analytics;
use ironlog::exercises::{Category, Exercise, exercises_in, resolve_exercise};
use ironlog::models::{Routine, RoutineExercise};
use ironlog::tui::App;
use ironlog::user::Identity;
use ironlog::{Storage, WorkoutAssembler};

const LOG_FILE: &str = "ironlog.log";

#[derive(Parser)]
#[command(name = "ironlog")]
#[command(author, version, about = "Personal workout tracker")]
struct Cli {
    /// Directory holding routines, history and cached workouts
    #[arg(long, env = "IRONLOG_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Email of the logged-in user (storage is namespaced by it)
    #[arg(long, env = "IRONLOG_EMAIL", global = true)]
    email: Option<String>,

    /// Display name of the logged-in user
    #[arg(long, env = "IRONLOG_NAME", global = true)]
    name: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the workout screen for a routine
    Workout {
        /// Routine name or key
        routine: String,
    },

    /// List routines
    Routines,

    /// Show a routine's exercises
    Show { routine: String },

    /// Create or replace a routine
    SaveRoutine {
        /// Routine name (e.g., "Push Day")
        name: String,

        /// Exercise as "NAME:SETSxREPS" (e.g., "Bench Press:3x8"), repeatable
        #[arg(short, long = "exercise", required = true)]
        exercises: Vec<String>,
    },

    /// Delete a routine
    DeleteRoutine { routine: String },

    /// Show the next workout pre-filled from the last session
    Last { routine: String },

    /// Max weight and volume per session for a routine's exercises
    Stats { routine: String },

    /// List saved workout sessions
    Sessions,

    /// Build consolidated history from saved sessions (first run only)
    Rebuild,

    /// List the exercise catalog
    Exercises,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli)?;

    if let Some(Commands::Exercises) = cli.command {
        print_catalog();
        return Ok(());
    }

    let identity = Identity::new(
        cli.name.clone(),
        cli.email
            .clone()
            .context("no user: pass --email or set IRONLOG_EMAIL")?,
    );
    let user = identity.user()?;
    let storage = Storage::open(&cli.data_dir)?;
    let assembler = WorkoutAssembler::new(storage);

    match cli.command {
        Some(Commands::Workout { routine }) => {
            let session = assembler.open(&user, &routine)?;
            let mut app = App::new(assembler, session);
            app.run()?;
        }

        Some(Commands::Routines) | None => {
            let routines = assembler.routines().list(&user)?;
            println!("Hello, {}!", identity.display_name());
            if routines.is_empty() {
                println!("No routines available. Please create one first.");
            } else {
                println!("Routines:");
                for name in routines {
                    println!("  {}", name);
                }
            }
        }

        Some(Commands::Show { routine }) => {
            let routine = assembler.routines().get(&user, &routine)?;
            println!("{}", routine.name);
            println!("{:-<40}", "");
            for (i, exercise) in routine.exercises.iter().enumerate() {
                println!(
                    "{:>2}. {:24} {}x{}",
                    i + 1,
                    exercise.name,
                    exercise.target_sets,
                    exercise.target_reps
                );
            }
        }

        Some(Commands::SaveRoutine { name, exercises }) => {
            let exercises = exercises
                .iter()
                .map(|spec| parse_exercise_spec(spec))
                .collect::<Result<Vec<_>>>()?;
            let routine = Routine::new(name.trim(), exercises);
            assembler.save_routine(&user, &routine)?;
            println!(
                "Saved: {} ({} exercises, key {})",
                routine.name,
                routine.exercises.len(),
                routine.key()
            );
        }

        Some(Commands::DeleteRoutine { routine }) => {
            assembler.routines().delete(&user, &routine)?;
            assembler.cache().delete(&user, &routine)?;
            println!("Deleted: {}", routine);
        }

        Some(Commands::Last { routine }) => {
            let routine = assembler.routines().get(&user, &routine)?;
            let workout = assembler.history().last_performance(&user, &routine)?;
            println!("Next workout: {}", routine.name);
            println!("{:-<40}", "");
            for exercise in &workout.exercises {
                println!("{}", exercise.name);
                for (i, set) in exercise.sets.iter().enumerate() {
                    println!("  Set {}: {} x {:.2} kg", i + 1, set.reps, set.weight);
                }
            }
        }

        Some(Commands::Stats { routine }) => {
            let routine = assembler.routines().get(&user, &routine)?;
            let history = assembler.history().load_consolidated(&user)?;
            let trends = Analytics::new(history).routine_trends(&routine);

            if trends.is_empty() {
                println!("No exercises found for this routine.");
                return Ok(());
            }

            println!("Training Statistics: {}", routine.name);
            for trend in trends {
                println!("{:-<40}", "");
                println!("{} ({} sessions)", trend.name, trend.sessions());
                for (i, (max, volume)) in trend.max_weight.iter().zip(&trend.volume).enumerate() {
                    println!(
                        "  Session {:>3} | max {:>8} | volume {:>9}",
                        i + 1,
                        format_metric(*max),
                        format_metric(*volume)
                    );
                }
                let summary = (trend.latest_max_weight(), trend.best_max_weight());
                if let (Some(latest), Some(best)) = summary {
                    println!("  Latest: {:.2} kg | Best: {:.2} kg", latest, best);
                }
            }
        }

        Some(Commands::Sessions) => {
            let sessions = assembler.history().list_sessions(&user)?;
            println!("Saved sessions:");
            println!("{:-<60}", "");
            for name in sessions {
                match assembler.history().load_session(&user, &name) {
                    Ok(workout) => println!(
                        "{} | {:20} | {} exercises, {} sets",
                        workout.date.with_timezone(&Local).format("%Y-%m-%d"),
                        workout.routine_name,
                        workout.exercises.len(),
                        workout.total_sets()
                    ),
                    Err(e) => println!("{} | unreadable: {}", name, e),
                }
            }
        }

        Some(Commands::Rebuild) => {
            if assembler.history().rebuild_consolidated(&user)? {
                println!("Consolidated history built.");
            } else {
                println!("Consolidated history already exists, nothing to do.");
            }
        }

        Some(Commands::Exercises) => unreachable!("handled before user lookup"),
    }

    Ok(())
}

/// Console logging to stderr, or to a file in the data dir for the TUI
fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let builder = tracing_subscriber::fmt().with_max_level(level);

    if matches!(cli.command, Some(Commands::Workout { .. })) {
        let path = log_path(&cli.data_dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open log file {:?}", path))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
    Ok(())
}

fn log_path(data_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data dir {:?}", data_dir))?;
    Ok(data_dir.join(LOG_FILE))
}

/// Parse "Bench Press:3x8" into a catalog-checked routine exercise
fn parse_exercise_spec(spec: &str) -> Result<RoutineExercise> {
    let (name, plan) = spec
        .rsplit_once(':')
        .with_context(|| format!("expected NAME:SETSxREPS, got '{}'", spec))?;
    let (sets, reps) = plan
        .trim()
        .split_once(['x', 'X'])
        .with_context(|| format!("expected SETSxREPS, got '{}'", plan))?;
    let sets: u32 = sets.trim().parse().with_context(|| format!("bad set count '{}'", sets))?;
    let reps: u32 = reps.trim().parse().with_context(|| format!("bad rep count '{}'", reps))?;
    if sets == 0 || reps == 0 {
        bail!("sets and reps must be positive in '{}'", spec);
    }

    let exercise = resolve_exercise(name)?;
    Ok(RoutineExercise::new(exercise.name, sets, reps))
}

fn format_metric(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

fn print_catalog() {
    for category in Category::all() {
        println!("{} {}", category.emoji(), category.name());
        for exercise in exercises_in(*category) {
            println!("  {}", catalog_line(exercise));
        }
    }
}

fn catalog_line(exercise: &Exercise) -> String {
    let muscles: Vec<_> = exercise.muscle_groups.iter().map(|m| m.name()).collect();
    let assisted = if exercise.is_assisted { " (assisted)" } else { "" };
    format!("{:24} {}{}", exercise.name, muscles.join(", "), assisted)
}
