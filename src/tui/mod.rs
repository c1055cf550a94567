//! TUI module - workout screen with ratatui
//!
//! Drives one `WorkoutSession`: every edit and move goes through the
//! assembler, so quitting without saving leaves a resumable cache entry.

use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use std::io::{Stdout, stdout};

use crate::exercises::find_exercise_by_name;
use crate::models::SetData;
use crate::workout::{SessionState, WorkoutAssembler, WorkoutSession, WorkoutSource};

type Tui = Terminal<CrosstermBackend<Stdout>>;

const WEIGHT_STEP: f64 = 2.5;
const WEIGHT_FINE_STEP: f64 = 0.25;
const MIN_WEIGHT: f64 = -50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Reps,
    Weight,
}

/// App state for the workout screen
pub struct App {
    assembler: WorkoutAssembler,
    session: WorkoutSession,
    selected_set: usize,
    field: Field,
    status: String,
    should_quit: bool,
}

impl App {
    pub fn new(assembler: WorkoutAssembler, session: WorkoutSession) -> Self {
        let status = match session.source() {
            WorkoutSource::Cache => "Using cached workout data.",
            WorkoutSource::History => "Using historical workout data.",
        };
        Self {
            assembler,
            session,
            selected_set: 0,
            field: Field::Reps,
            status: status.to_string(),
            should_quit: false,
        }
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;

        let result = self.event_loop(&mut terminal);

        restore_terminal()?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(area);

        // Header
        let title = match self.session.current_exercise() {
            Some(exercise) => format!(
                "{} - {} ({}/{})",
                self.session.routine().name,
                exercise.name,
                self.session.cursor() + 1,
                self.session.exercise_count()
            ),
            None => format!("{} - no exercises", self.session.routine().name),
        };
        let header = Paragraph::new(title)
            .style(Style::default().fg(Color::Cyan).bold())
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        // Sets table
        let sets: &[SetData] = self
            .session
            .current_exercise()
            .map(|e| e.sets.as_slice())
            .unwrap_or_default();
        let rows: Vec<Row> = sets
            .iter()
            .enumerate()
            .map(|(i, set)| {
                let selected = i == self.selected_set;
                let highlight = |field: Field| {
                    if selected && self.field == field {
                        Style::default().fg(Color::Black).bg(Color::Yellow)
                    } else {
                        Style::default()
                    }
                };
                Row::new(vec![
                    Cell::from(format!("Set {}", i + 1)),
                    Cell::from(set.reps.to_string()).style(highlight(Field::Reps)),
                    Cell::from(format!("{:.2}", set.weight)).style(highlight(Field::Weight)),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(8),
                Constraint::Length(8),
                Constraint::Min(12),
            ],
        )
        .header(Row::new(vec!["", "Reps", "Weight in kg"]).style(Style::default().bold()))
        .block(Block::default().borders(Borders::ALL).title(self.plan_title()));
        frame.render_widget(table, chunks[1]);

        // Status
        let status_style = if self.session.state() == SessionState::Saved {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
        };
        let status = Paragraph::new(self.status.as_str())
            .style(status_style)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(status, chunks[2]);

        // Footer
        let footer = Paragraph::new(
            "←/→: exercise | ↑/↓: set | tab: reps/weight | +/-: adjust | s: save | d: discard | q: quit",
        )
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[3]);
    }

    fn plan_title(&self) -> String {
        let mut title = match self.session.planned_exercise() {
            Some(plan) => format!("Target {}x{}", plan.target_sets, plan.target_reps),
            None => "Sets".to_string(),
        };
        if let Some(exercise) = self
            .session
            .current_exercise()
            .and_then(|e| find_exercise_by_name(&e.name))
        {
            let muscles: Vec<_> = exercise.muscle_groups.iter().map(|m| m.name()).collect();
            title.push_str(&format!(" | {} {}", exercise.category.emoji(), muscles.join(", ")));
            if exercise.is_assisted {
                title.push_str(" | assisted: enter negative weight");
            }
        }
        if let Some(exercise) = self.session.current_exercise() {
            title.push_str(&format!(" | volume {:.1}", exercise.volume()));
        }
        title
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            if self.session.state() == SessionState::Saved {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    self.should_quit = true;
                }
                return Ok(());
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                KeyCode::Left | KeyCode::Char('h') => {
                    if self.assembler.previous(&mut self.session)? {
                        self.selected_set = 0;
                    }
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    if self.assembler.next(&mut self.session)? {
                        self.selected_set = 0;
                    }
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.selected_set = self.selected_set.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if self.selected_set + 1 < self.set_count() {
                        self.selected_set += 1;
                    }
                }
                KeyCode::Tab => {
                    self.field = match self.field {
                        Field::Reps => Field::Weight,
                        Field::Weight => Field::Reps,
                    };
                }
                KeyCode::Char('+') | KeyCode::Char('=') => self.adjust(1.0, WEIGHT_STEP)?,
                KeyCode::Char('-') => self.adjust(-1.0, WEIGHT_STEP)?,
                KeyCode::Char(']') => self.adjust(1.0, WEIGHT_FINE_STEP)?,
                KeyCode::Char('[') => self.adjust(-1.0, WEIGHT_FINE_STEP)?,
                KeyCode::Char('s') => self.save(),
                KeyCode::Char('d') => {
                    self.assembler.discard(self.session.clone())?;
                    self.should_quit = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn set_count(&self) -> usize {
        self.session
            .current_exercise()
            .map_or(0, |e| e.sets.len())
    }

    fn adjust(&mut self, direction: f64, weight_step: f64) -> Result<()> {
        let Some(set) = self
            .session
            .current_exercise()
            .and_then(|e| e.sets.get(self.selected_set))
            .copied()
        else {
            return Ok(());
        };

        match self.field {
            Field::Reps => {
                let reps = if direction > 0.0 {
                    set.reps.saturating_add(1)
                } else {
                    set.reps.saturating_sub(1)
                };
                self.assembler
                    .set_reps(&mut self.session, self.selected_set, reps)?;
            }
            Field::Weight => {
                let weight = (set.weight + direction * weight_step).max(MIN_WEIGHT);
                self.assembler
                    .set_weight(&mut self.session, self.selected_set, weight)?;
            }
        }
        Ok(())
    }

    fn save(&mut self) {
        self.status = match self.assembler.save(&mut self.session) {
            Ok(name) => format!("Workout recorded! ({}) Press q to quit.", name),
            Err(e) => format!("Save failed, progress kept in cache: {}", e),
        };
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
