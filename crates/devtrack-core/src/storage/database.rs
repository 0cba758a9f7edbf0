//! SQLite-based persistence for the activity log, session history and
//! profile state.
//!
//! Rows are stored as JSON documents keyed by id, with the calendar date
//! (activities) and end timestamp (sessions) broken out into indexed
//! columns for range queries. Profile, projects and live engine state
//! live in a key-value table as JSON blobs.

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::activity::Activity;
use crate::error::{DatabaseError, Result};
use crate::profile::UserProfile;
use crate::project::Project;
use crate::session::TimeSession;

const PROFILE_KEY: &str = "profile";
const PROJECTS_KEY: &str = "projects";

/// Aggregate counters over the stored history.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Stats {
    pub total_activities: u64,
    pub total_minutes: u64,
    pub today_activities: u64,
    pub today_minutes: u64,
    pub total_sessions: u64,
    pub total_session_minutes: u64,
}

/// SQLite database for devtrack state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/devtrack/devtrack.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("devtrack.db");
        let conn = Connection::open(&path).map_err(|source| DatabaseError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS activities (
                    id   TEXT PRIMARY KEY,
                    date TEXT NOT NULL,
                    json TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS sessions (
                    id       TEXT PRIMARY KEY,
                    ended_at TEXT NOT NULL,
                    json     TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_activities_date ON activities(date);
                CREATE INDEX IF NOT EXISTS idx_sessions_ended_at ON sessions(ended_at);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    // ── Activities ───────────────────────────────────────────────────

    /// Append one activity. The log is append-only; re-inserting an id
    /// fails.
    pub fn insert_activity(&self, activity: &Activity) -> Result<()> {
        let json = serde_json::to_string(activity)?;
        self.conn.execute(
            "INSERT INTO activities (id, date, json) VALUES (?1, ?2, ?3)",
            params![activity.id, activity.date.to_string(), json],
        )?;
        Ok(())
    }

    /// All activities in log order: by date, then insertion order within
    /// a day. Analytics trend classification depends on this order.
    pub fn list_activities(&self) -> Result<Vec<Activity>> {
        let mut stmt = self
            .conn
            .prepare("SELECT json FROM activities ORDER BY date, rowid")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut activities = Vec::new();
        for row in rows {
            activities.push(serde_json::from_str(&row?)?);
        }
        Ok(activities)
    }

    /// Activities on one calendar day, in insertion order.
    pub fn activities_on(&self, date: NaiveDate) -> Result<Vec<Activity>> {
        let mut stmt = self
            .conn
            .prepare("SELECT json FROM activities WHERE date = ?1 ORDER BY rowid")?;
        let rows = stmt.query_map(params![date.to_string()], |row| row.get::<_, String>(0))?;
        let mut activities = Vec::new();
        for row in rows {
            activities.push(serde_json::from_str(&row?)?);
        }
        Ok(activities)
    }

    // ── Sessions ─────────────────────────────────────────────────────

    /// Record a finalized session.
    ///
    /// # Errors
    /// Returns [`DatabaseError::QueryFailed`] if the session is still
    /// active (no `end_time`).
    pub fn insert_session(&self, session: &TimeSession) -> Result<()> {
        let ended_at = session.end_time.ok_or_else(|| {
            DatabaseError::QueryFailed("cannot store a session that has not ended".to_string())
        })?;
        let json = serde_json::to_string(session)?;
        self.conn.execute(
            "INSERT INTO sessions (id, ended_at, json) VALUES (?1, ?2, ?3)",
            params![session.id, ended_at.to_rfc3339(), json],
        )?;
        Ok(())
    }

    /// All finalized sessions, oldest first; ties broken by insertion
    /// order.
    pub fn list_sessions(&self) -> Result<Vec<TimeSession>> {
        let mut stmt = self
            .conn
            .prepare("SELECT json FROM sessions ORDER BY ended_at, rowid")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(serde_json::from_str(&row?)?);
        }
        Ok(sessions)
    }

    // ── Profile & projects ───────────────────────────────────────────

    /// Load the profile, or the lazily-created default if none is stored.
    pub fn load_profile(&self) -> Result<UserProfile> {
        match self.kv_get(PROFILE_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(UserProfile::default()),
        }
    }

    pub fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        self.kv_set(PROFILE_KEY, &serde_json::to_string(profile)?)
    }

    pub fn load_projects(&self) -> Result<Vec<Project>> {
        match self.kv_get(PROJECTS_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn save_projects(&self, projects: &[Project]) -> Result<()> {
        self.kv_set(PROJECTS_KEY, &serde_json::to_string(projects)?)
    }

    // ── Key-value store ──────────────────────────────────────────────

    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::from(e).into()),
        }
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    // ── Stats ────────────────────────────────────────────────────────

    /// Counters over the full history, with today's slice broken out.
    pub fn stats(&self, today: NaiveDate) -> Result<Stats> {
        let mut stats = Stats::default();
        for activity in self.list_activities()? {
            stats.total_activities += 1;
            let minutes = activity.duration_minutes.unwrap_or(0) as u64;
            stats.total_minutes += minutes;
            if activity.date == today {
                stats.today_activities += 1;
                stats.today_minutes += minutes;
            }
        }
        for session in self.list_sessions()? {
            stats.total_sessions += 1;
            stats.total_session_minutes += session.duration_minutes.unwrap_or(0) as u64;
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ActivityCategory, ActivityDraft};
    use crate::session::{SessionEngine, SessionType};
    use chrono::TimeZone;

    fn at(day: u32) -> chrono::DateTime<chrono::Utc> {
        chrono::Utc.with_ymd_and_hms(2024, 1, day, 10, 0, 0).unwrap()
    }

    fn sample_activity(day: u32) -> Activity {
        Activity::from_draft(
            ActivityDraft::new(ActivityCategory::Coding, "work").with_duration(30),
            at(day),
        )
        .unwrap()
    }

    #[test]
    fn activity_round_trip() {
        let db = Database::open_memory().unwrap();
        let a = sample_activity(5);
        db.insert_activity(&a).unwrap();
        let listed = db.list_activities().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, a.id);
        assert_eq!(listed[0].category, ActivityCategory::Coding);
    }

    #[test]
    fn duplicate_activity_id_rejected() {
        let db = Database::open_memory().unwrap();
        let a = sample_activity(5);
        db.insert_activity(&a).unwrap();
        assert!(db.insert_activity(&a).is_err());
    }

    #[test]
    fn same_day_activities_keep_insertion_order() {
        let db = Database::open_memory().unwrap();
        // Ids chosen to sort against insertion order lexically.
        let mut first = sample_activity(5);
        first.id = "zz-first".to_string();
        let mut second = sample_activity(5);
        second.id = "aa-second".to_string();
        db.insert_activity(&first).unwrap();
        db.insert_activity(&second).unwrap();

        let listed = db.list_activities().unwrap();
        assert_eq!(listed[0].id, "zz-first");
        assert_eq!(listed[1].id, "aa-second");

        let on_day = db
            .activities_on(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
            .unwrap();
        assert_eq!(on_day[0].id, "zz-first");
        assert_eq!(on_day[1].id, "aa-second");
    }

    #[test]
    fn activities_on_filters_by_date() {
        let db = Database::open_memory().unwrap();
        db.insert_activity(&sample_activity(4)).unwrap();
        db.insert_activity(&sample_activity(5)).unwrap();
        let on_5 = db
            .activities_on(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
            .unwrap();
        assert_eq!(on_5.len(), 1);
    }

    #[test]
    fn active_session_cannot_be_stored() {
        let db = Database::open_memory().unwrap();
        let mut engine = SessionEngine::default();
        let start = engine
            .start_session(SessionType::Pomodoro, Some(25), None, at(5))
            .unwrap();
        assert!(db.insert_session(&start.session).is_err());

        let done = engine.end_session(at(5) + chrono::Duration::minutes(25)).unwrap();
        db.insert_session(&done).unwrap();
        assert_eq!(db.list_sessions().unwrap().len(), 1);
    }

    #[test]
    fn profile_defaults_then_round_trips() {
        let db = Database::open_memory().unwrap();
        let profile = db.load_profile().unwrap();
        assert_eq!(profile.level, 1);

        let mut profile = profile;
        profile.xp = 500;
        profile.level = 4;
        db.save_profile(&profile).unwrap();
        assert_eq!(db.load_profile().unwrap().xp, 500);
    }

    #[test]
    fn kv_set_overwrites() {
        let db = Database::open_memory().unwrap();
        db.kv_set("engine", "a").unwrap();
        db.kv_set("engine", "b").unwrap();
        assert_eq!(db.kv_get("engine").unwrap().as_deref(), Some("b"));
        assert_eq!(db.kv_get("missing").unwrap(), None);
    }

    #[test]
    fn stats_split_today_from_total() {
        let db = Database::open_memory().unwrap();
        db.insert_activity(&sample_activity(4)).unwrap();
        db.insert_activity(&sample_activity(5)).unwrap();
        let stats = db.stats(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()).unwrap();
        assert_eq!(stats.total_activities, 2);
        assert_eq!(stats.today_activities, 1);
        assert_eq!(stats.total_minutes, 60);
        assert_eq!(stats.today_minutes, 30);
    }
}
