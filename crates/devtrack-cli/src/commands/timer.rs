use chrono::Utc;
use clap::Subcommand;
use devtrack_core::storage::Database;
use devtrack_core::{BreakKind, Config, SessionEngine, SessionType};

use super::parse_enum;

const ENGINE_KEY: &str = "session_engine";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a focus session
    Start {
        /// Session type: pomodoro, short_focus, deep_work, extended_focus, custom
        #[arg(default_value = "pomodoro")]
        session_type: String,
        /// Planned minutes (defaults per session type)
        #[arg(long)]
        minutes: Option<u32>,
        /// Project to attribute the session to
        #[arg(long)]
        project_id: Option<String>,
    },
    /// Open a break in the active session
    Break {
        /// Break kind: short, long, custom
        #[arg(default_value = "short")]
        kind: String,
    },
    /// Close the open break
    EndBreak,
    /// End the active session and record it
    Stop,
    /// Record a user-activity signal (resets the idle clock)
    Signal,
    /// Print the current session state as JSON
    Status,
}

fn load_engine(db: &Database, config: &Config) -> SessionEngine {
    if let Ok(Some(json)) = db.kv_get(ENGINE_KEY) {
        if let Ok(engine) = serde_json::from_str::<SessionEngine>(&json) {
            return engine;
        }
    }
    SessionEngine::new(config.session_engine_config())
}

fn save_engine(db: &Database, engine: &SessionEngine) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(engine)?;
    db.kv_set(ENGINE_KEY, &json)?;
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load()?;
    let mut engine = load_engine(&db, &config);
    let now = Utc::now();

    match action {
        TimerAction::Start {
            session_type,
            minutes,
            project_id,
        } => {
            let session_type: SessionType = parse_enum(&session_type)?;
            let start = engine.start_session(session_type, minutes, project_id, now)?;
            if let Some(prior) = &start.auto_ended {
                db.insert_session(prior)?;
            }
            println!("{}", serde_json::to_string_pretty(&start)?);
        }
        TimerAction::Break { kind } => {
            let kind: BreakKind = parse_enum(&kind)?;
            let snapshot = engine.start_break(kind, now)?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        TimerAction::EndBreak => {
            let snapshot = engine.end_break(now)?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        TimerAction::Stop => {
            let done = engine.end_session(now)?;
            db.insert_session(&done)?;
            println!("{}", serde_json::to_string_pretty(&done)?);
        }
        TimerAction::Signal => {
            engine.record_activity_signal(now);
            println!("{{\"type\": \"signal_recorded\"}}");
        }
        TimerAction::Status => {
            // Tick so idle penalties and the planned-duration event apply
            // before the state is printed.
            let events = engine.tick(now);
            let status = serde_json::json!({
                "active": engine.active(),
                "on_break": engine.is_on_break(),
                "remaining_minutes": engine.remaining_minutes(now),
                "events": events,
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    save_engine(&db, &engine)?;
    Ok(())
}
