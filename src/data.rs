use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub type DBConnection = Arc<Mutex<Connection>>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> UserId {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl ToSql for UserId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.as_str()))
    }
}

impl FromSql for UserId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<UserId> {
        Ok(UserId(value.as_str()?.to_string()))
    }
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS routine_templates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id TEXT,
    title TEXT NOT NULL,
    tasks TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS routine_templates_single_active
    ON routine_templates (owner_id)
    WHERE owner_id IS NOT NULL AND is_active = 1;

CREATE UNIQUE INDEX IF NOT EXISTS routine_templates_single_system_default
    ON routine_templates (is_active)
    WHERE owner_id IS NULL AND is_active = 1;

CREATE TABLE IF NOT EXISTS daily_progress (
    owner_id TEXT NOT NULL,
    date TEXT NOT NULL,
    completed INTEGER NOT NULL,
    total INTEGER NOT NULL,
    completed_task_ids TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (owner_id, date)
);
";

pub fn initialize_schema(db_connection: &Connection) -> rusqlite::Result<()> {
    db_connection.execute_batch(SCHEMA)
}

pub fn open_database(path: &Path) -> rusqlite::Result<Connection> {
    let connection = Connection::open(path)?;
    initialize_schema(&connection)?;

    Ok(connection)
}

#[cfg(test)]
pub fn open_in_memory_database() -> rusqlite::Result<Connection> {
    let connection = Connection::open_in_memory()?;
    initialize_schema(&connection)?;

    Ok(connection)
}

pub fn shared(connection: Connection) -> DBConnection {
    Arc::new(Mutex::new(connection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    #[test]
    fn schema_initialization_is_repeatable() {
        let connection = open_in_memory_database().unwrap();

        initialize_schema(&connection).unwrap();
    }

    #[test]
    fn progress_is_unique_per_owner_and_date() {
        let connection = open_in_memory_database().unwrap();
        let insert = "INSERT INTO daily_progress (owner_id, date, completed, total, created_at, updated_at)
                      VALUES (?1, ?2, 0, 0, 'now', 'now')";

        connection.execute(insert, params!["alice", "2024-06-01"]).unwrap();
        connection.execute(insert, params!["bob", "2024-06-01"]).unwrap();

        assert!(connection.execute(insert, params!["alice", "2024-06-01"]).is_err());
    }

    #[test]
    fn at_most_one_system_default_can_be_active() {
        let connection = open_in_memory_database().unwrap();
        let insert = "INSERT INTO routine_templates (owner_id, title, tasks, is_active, created_at)
                      VALUES (NULL, 'default', '[]', 1, 'now')";

        connection.execute(insert, params![]).unwrap();

        assert!(connection.execute(insert, params![]).is_err());
    }
}
