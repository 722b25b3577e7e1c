//! Template storage.
//!
//! Thin SQLite store for card templates. Its one interesting behavior
//! is exclusive activation: making a template active clears every other
//! active flag in the same write, so readers can never observe two
//! active rows.

use crate::error::CardError;
use chrono::{DateTime, Utc};
use common::model::template::CardTemplate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};

pub struct TemplateStore {
    conn: Connection,
}

impl TemplateStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CardError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, CardError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, CardError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS card_templates (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 name TEXT NOT NULL UNIQUE,
                 front_path TEXT NOT NULL,
                 back_path TEXT NOT NULL,
                 active INTEGER NOT NULL DEFAULT 0,
                 created_at TEXT NOT NULL
             )",
            [],
        )?;
        Ok(Self { conn })
    }

    /// Inserts a template. Inserting as active deactivates every other
    /// template within the same transaction.
    pub fn insert(
        &mut self,
        name: &str,
        front_path: &Path,
        back_path: &Path,
        active: bool,
    ) -> Result<i64, CardError> {
        let tx = self.conn.transaction()?;
        if active {
            tx.execute("UPDATE card_templates SET active = 0", [])?;
        }
        tx.execute(
            "INSERT INTO card_templates (name, front_path, back_path, active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                name,
                front_path.to_string_lossy().into_owned(),
                back_path.to_string_lossy().into_owned(),
                active,
                Utc::now().to_rfc3339(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    /// Makes `id` the single active template: one invariant-preserving
    /// write that sets the flag on the target row and clears it on every
    /// other row.
    pub fn activate(&mut self, id: i64) -> Result<(), CardError> {
        let tx = self.conn.transaction()?;
        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM card_templates WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(CardError::Store(rusqlite::Error::QueryReturnedNoRows));
        }
        tx.execute("UPDATE card_templates SET active = (id = ?1)", params![id])?;
        tx.commit()?;
        Ok(())
    }

    /// The single active template, if any.
    pub fn active_template(&self) -> Result<Option<CardTemplate>, CardError> {
        self.conn
            .query_row(
                "SELECT id, name, front_path, back_path, active, created_at
                 FROM card_templates WHERE active = 1 LIMIT 1",
                [],
                row_to_template,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn get(&self, id: i64) -> Result<Option<CardTemplate>, CardError> {
        self.conn
            .query_row(
                "SELECT id, name, front_path, back_path, active, created_at
                 FROM card_templates WHERE id = ?1",
                params![id],
                row_to_template,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn list(&self) -> Result<Vec<CardTemplate>, CardError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, front_path, back_path, active, created_at
             FROM card_templates ORDER BY id",
        )?;
        let rows = stmt.query_map([], row_to_template)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }
}

fn row_to_template(row: &Row<'_>) -> rusqlite::Result<CardTemplate> {
    let created_raw: String = row.get(5)?;
    let created_at = DateTime::parse_from_rfc3339(&created_raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(CardTemplate {
        id: row.get(0)?,
        name: row.get(1)?,
        front_path: PathBuf::from(row.get::<_, String>(2)?),
        back_path: PathBuf::from(row.get::<_, String>(3)?),
        active: row.get::<_, i64>(4)? != 0,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(names: &[(&str, bool)]) -> (TemplateStore, Vec<i64>) {
        let mut store = TemplateStore::open_in_memory().unwrap();
        let ids = names
            .iter()
            .map(|(name, active)| {
                store
                    .insert(
                        name,
                        Path::new("recto.png"),
                        Path::new("verso.png"),
                        *active,
                    )
                    .unwrap()
            })
            .collect();
        (store, ids)
    }

    #[test]
    fn inserting_an_active_template_displaces_the_previous_one() {
        let (store, ids) = store_with(&[("noel", true), ("gala", true)]);
        let active = store.active_template().unwrap().unwrap();
        assert_eq!(active.id, ids[1]);

        let flagged: Vec<_> = store
            .list()
            .unwrap()
            .into_iter()
            .filter(|t| t.active)
            .collect();
        assert_eq!(flagged.len(), 1);
    }

    #[test]
    fn activation_is_exclusive() {
        let (mut store, ids) = store_with(&[("noel", true), ("gala", true), ("ete", false)]);
        store.activate(ids[0]).unwrap();

        let flagged: Vec<_> = store
            .list()
            .unwrap()
            .into_iter()
            .filter(|t| t.active)
            .collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].id, ids[0]);
        assert_eq!(store.active_template().unwrap().unwrap().id, ids[0]);
    }

    #[test]
    fn activating_an_unknown_template_fails() {
        let (mut store, _) = store_with(&[("noel", true)]);
        assert!(matches!(store.activate(999), Err(CardError::Store(_))));
    }

    #[test]
    fn get_round_trips_paths_and_flags() {
        let (store, ids) = store_with(&[("noel", false)]);
        let template = store.get(ids[0]).unwrap().unwrap();
        assert_eq!(template.name, "noel");
        assert_eq!(template.front_path, PathBuf::from("recto.png"));
        assert!(!template.active);
        assert!(store.get(12345).unwrap().is_none());
    }
}
