//! # SQLite Event Store
//!
//! Reads reminder candidates joined with their owner's contact details and
//! records stage completion. One connection is opened per scheduler iteration
//! and closed when its session is dropped.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Normalise stored reminder timestamps before comparing them to the window
//! - 1.1.0: Open without create so a missing database is reported as unavailable
//! - 1.0.0: Initial release with per-stage candidate queries

use anyhow::{Context, Result};
use log::{debug, warn};
use sqlite::{Connection, OpenFlags, State, Statement};
use std::path::PathBuf;

use crate::features::reminders::event::{
    Contact, DueEvent, EventSchedule, EventStore, StoreSession,
};
use crate::features::reminders::window::TimeWindow;

/// Busy timeout for writers racing the scheduling UI
const BUSY_TIMEOUT_MS: usize = 5_000;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        user_id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL,
        phone TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(user_id),
        title TEXT NOT NULL,
        description TEXT,
        reminder_datetime TEXT,
        date TEXT,
        time TEXT,
        done INTEGER NOT NULL DEFAULT 0,
        reminder1_sent INTEGER,
        reminder2_sent INTEGER
    );
    CREATE INDEX IF NOT EXISTS idx_events_pending_reminder
        ON events(done, reminder_datetime);
    CREATE INDEX IF NOT EXISTS idx_events_pending_date
        ON events(done, date);
";

const STAGE1_QUERY: &str = "
    SELECT e.id, e.title, e.description, e.reminder_datetime, u.email, u.phone
    FROM events AS e
    JOIN users AS u ON e.user_id = u.user_id
    WHERE e.done = 0
      AND datetime(e.reminder_datetime) BETWEEN ? AND ?
      AND (e.reminder1_sent IS NULL OR e.reminder1_sent = 0)
    ORDER BY e.id
";

const STAGE2_QUERY: &str = "
    SELECT e.id, e.title, e.description, e.date, e.time, u.email, u.phone
    FROM events AS e
    JOIN users AS u ON e.user_id = u.user_id
    WHERE e.done = 0
      AND e.date = ?
      AND substr(e.time, 1, 5) BETWEEN ? AND ?
      AND (e.reminder2_sent IS NULL OR e.reminder2_sent = 0)
    ORDER BY e.id
";

/// A new event row, for seeding
#[derive(Debug, Clone, Default)]
pub struct NewEvent<'a> {
    pub user_id: i64,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub reminder_datetime: Option<&'a str>,
    pub date: Option<&'a str>,
    pub time: Option<&'a str>,
}

/// Reminder bookkeeping of a single event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventFlags {
    pub stage1_sent: bool,
    pub stage2_sent: bool,
    pub done: bool,
}

#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Database { path: path.into() }
    }

    /// Create the database file and tables if they do not exist yet
    pub fn initialize(&self) -> Result<()> {
        let connection = Connection::open_with_flags(
            &self.path,
            OpenFlags::new().set_create().set_read_write(),
        )
        .with_context(|| format!("Failed to create database at {}", self.path.display()))?;
        connection
            .execute(SCHEMA)
            .context("Failed to create reminder schema")?;
        debug!("Reminder schema ready at {}", self.path.display());
        Ok(())
    }

    pub fn create_user(&self, email: &str, phone: &str) -> Result<i64> {
        let session = self.connect()?;
        let mut statement = session
            .connection
            .prepare("INSERT INTO users (email, phone) VALUES (?, ?)")?;
        statement.bind((1, email))?;
        statement.bind((2, phone))?;
        statement.next()?;
        session.last_insert_id()
    }

    pub fn create_event(&self, event: &NewEvent<'_>) -> Result<i64> {
        let session = self.connect()?;
        let mut statement = session.connection.prepare(
            "INSERT INTO events (user_id, title, description, reminder_datetime, date, time)
             VALUES (?, ?, ?, ?, ?, ?)",
        )?;
        statement.bind((1, event.user_id))?;
        statement.bind((2, event.title))?;
        statement.bind((3, event.description))?;
        statement.bind((4, event.reminder_datetime))?;
        statement.bind((5, event.date))?;
        statement.bind((6, event.time))?;
        statement.next()?;
        session.last_insert_id()
    }

    /// Current reminder flags of an event, `None` if it does not exist
    pub fn event_flags(&self, event_id: i64) -> Result<Option<EventFlags>> {
        let session = self.connect()?;
        let mut statement = session.connection.prepare(
            "SELECT reminder1_sent, reminder2_sent, done FROM events WHERE id = ?",
        )?;
        statement.bind((1, event_id))?;

        if let State::Row = statement.next()? {
            Ok(Some(EventFlags {
                stage1_sent: read_flag(&statement, "reminder1_sent")?,
                stage2_sent: read_flag(&statement, "reminder2_sent")?,
                done: read_flag(&statement, "done")?,
            }))
        } else {
            Ok(None)
        }
    }
}

impl EventStore for Database {
    type Session = Session;

    /// Open a connection to an existing database. A missing file is an error
    /// rather than an empty new database.
    fn connect(&self) -> Result<Session> {
        let mut connection =
            Connection::open_with_flags(&self.path, OpenFlags::new().set_read_write())
                .with_context(|| {
                    format!("Failed to open database at {}", self.path.display())
                })?;
        connection.set_busy_timeout(BUSY_TIMEOUT_MS)?;
        debug!("Database connection opened.");
        Ok(Session { connection })
    }
}

/// A single-iteration connection. Closed on drop.
pub struct Session {
    connection: Connection,
}

impl Session {
    fn last_insert_id(&self) -> Result<i64> {
        let mut statement = self.connection.prepare("SELECT last_insert_rowid()")?;
        statement.next()?;
        Ok(statement.read::<i64, _>(0)?)
    }

    fn execute_update(&mut self, sql: &str, event_id: i64) -> Result<()> {
        let mut statement = self.connection.prepare(sql)?;
        statement.bind((1, event_id))?;
        while let State::Row = statement.next()? {}

        if self.connection.change_count() == 0 {
            warn!("Event {event_id} no longer exists; nothing updated");
        }
        Ok(())
    }
}

impl StoreSession for Session {
    fn fetch_stage1_candidates(&mut self, window: &TimeWindow) -> Result<Vec<DueEvent>> {
        let (start, end) = window.timestamp_bounds();
        let mut statement = self.connection.prepare(STAGE1_QUERY)?;
        statement.bind((1, start.as_str()))?;
        statement.bind((2, end.as_str()))?;

        let mut events = Vec::new();
        while let State::Row = statement.next()? {
            let schedule =
                EventSchedule::At(statement.read::<Option<String>, _>("reminder_datetime")?);
            events.push(read_due_event(&statement, schedule)?);
        }
        Ok(events)
    }

    fn fetch_stage2_candidates(&mut self, window: &TimeWindow) -> Result<Vec<DueEvent>> {
        let date = window.date();
        let (start, end) = window.time_of_day_bounds();
        let mut statement = self.connection.prepare(STAGE2_QUERY)?;
        statement.bind((1, date.as_str()))?;
        statement.bind((2, start.as_str()))?;
        statement.bind((3, end.as_str()))?;

        let mut events = Vec::new();
        while let State::Row = statement.next()? {
            let schedule = EventSchedule::On {
                date: statement
                    .read::<Option<String>, _>("date")?
                    .unwrap_or_default(),
                time: statement
                    .read::<Option<String>, _>("time")?
                    .unwrap_or_default(),
            };
            events.push(read_due_event(&statement, schedule)?);
        }
        Ok(events)
    }

    fn mark_stage1_sent(&mut self, event_id: i64) -> Result<()> {
        self.execute_update("UPDATE events SET reminder1_sent = 1 WHERE id = ?", event_id)
    }

    fn mark_stage2_done(&mut self, event_id: i64) -> Result<()> {
        self.execute_update(
            "UPDATE events SET reminder2_sent = 1, done = 1 WHERE id = ?",
            event_id,
        )
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!("Database connection closed.");
    }
}

fn read_due_event(statement: &Statement<'_>, schedule: EventSchedule) -> Result<DueEvent> {
    Ok(DueEvent {
        id: statement.read::<i64, _>("id")?,
        title: statement.read::<String, _>("title")?,
        description: statement
            .read::<Option<String>, _>("description")?
            .unwrap_or_default(),
        schedule,
        contact: Contact {
            email: statement.read::<Option<String>, _>("email")?.unwrap_or_default(),
            phone: statement.read::<Option<String>, _>("phone")?.unwrap_or_default(),
        },
    })
}

fn read_flag(statement: &Statement<'_>, column: &str) -> Result<bool> {
    Ok(statement.read::<Option<i64>, _>(column)?.unwrap_or(0) != 0)
}
