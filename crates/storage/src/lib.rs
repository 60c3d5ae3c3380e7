//! Sqlite-backed persistence of host settings and dialog policy assignments.

use std::path::Path;

use anyhow::Context as _;
use buttonctl_core::{DialogEntry, Settings, Theme};
use rusqlite::{Connection, OptionalExtension as _};

#[derive(Debug)]
pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("open sqlite db at {}", path.as_ref().display()))?;
        let storage = Self { conn };
        storage.migrate()?;
        Ok(storage)
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        let storage = Self { conn };
        storage.migrate()?;
        Ok(storage)
    }

    fn migrate(&self) -> anyhow::Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                theme TEXT NOT NULL
            );
            INSERT OR IGNORE INTO settings (id, theme) VALUES (1, 'dark');
            "#,
        )?;

        self.add_column(
            "ALTER TABLE settings ADD COLUMN document_read_only INTEGER NOT NULL DEFAULT 0",
            "add settings.document_read_only column",
        )?;
        self.add_column(
            "ALTER TABLE settings ADD COLUMN dialogs_json TEXT NOT NULL DEFAULT '[]'",
            "add settings.dialogs_json column",
        )?;

        Ok(())
    }

    fn add_column(&self, sql: &str, what: &'static str) -> anyhow::Result<()> {
        match self.conn.execute(sql, []) {
            Ok(_) => Ok(()),
            Err(err) => {
                let msg = err.to_string();
                if msg.contains("duplicate column name") {
                    Ok(())
                } else {
                    Err(err).context(what)
                }
            }
        }
    }

    pub fn load_settings(&self) -> anyhow::Result<Settings> {
        let row = self
            .conn
            .query_row(
                "SELECT theme, document_read_only, dialogs_json FROM settings WHERE id = 1",
                [],
                |row| {
                    let theme: String = row.get(0)?;
                    let document_read_only: i64 = row.get(1)?;
                    let dialogs_json: String = row.get(2)?;
                    Ok((theme, document_read_only, dialogs_json))
                },
            )
            .optional()?;

        let Some((theme, document_read_only, dialogs_json)) = row else {
            return Ok(Settings::default());
        };

        let theme = theme.parse::<Theme>().unwrap_or(Theme::Dark);
        let dialogs: Vec<DialogEntry> = serde_json::from_str(&dialogs_json).unwrap_or_else(|err| {
            tracing::warn!("ignoring stored dialog policies: {err}");
            Vec::new()
        });

        let mut settings = Settings {
            theme,
            document_read_only: document_read_only != 0,
            dialogs,
        };
        settings.normalize();
        Ok(settings)
    }

    pub fn save_settings(&self, settings: &Settings) -> anyhow::Result<()> {
        let mut settings = settings.clone();
        settings.normalize();
        let dialogs_json =
            serde_json::to_string(&settings.dialogs).context("serialize dialog policies")?;

        self.conn.execute(
            "UPDATE settings SET theme = ?, document_read_only = ?, dialogs_json = ? WHERE id = 1",
            (
                settings.theme.as_str(),
                settings.document_read_only as i64,
                dialogs_json,
            ),
        )?;
        Ok(())
    }
}
