use rusqlite::{Connection, OptionalExtension};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::color::ColorCategory;
use crate::error::Result;

/// Key under which the whole colour cache map is stored
const COLOR_CACHE_KEY: &str = "color-cache";

/// Serialized shape of the cache: item id → category names
type StoredMap = BTreeMap<String, Vec<String>>;

/// The ColorStore wraps the local SQLite key/value database.
/// It holds one serialized colour-cache map under a fixed key.
pub struct ColorStore {
    conn: Connection,
    db_path: PathBuf,
}

impl ColorStore {
    /// Open or create the store at `db_path`, creating parent directories.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&db_path)?;
        info!(path = %db_path.display(), "colour cache database opened");

        let store = ColorStore { conn, db_path };
        store.init_schema()?;

        Ok(store)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key     TEXT PRIMARY KEY,
                value   TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }
}

impl std::fmt::Debug for ColorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}

/// Item id → detected colour categories
///
/// Purely an optimization: a miss means "detect again". The optional store
/// keeps results across runs.
#[derive(Debug, Default)]
pub struct ColorCache {
    entries: HashMap<i64, Vec<ColorCategory>>,
    store: Option<ColorStore>,
}

impl ColorCache {
    /// A cache that lives only as long as this value
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the persisted cache at `db_path` and load its entries.
    ///
    /// A stored map that fails to parse is ignored (and overwritten on the
    /// next persist); the database itself failing to open is an error.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let store = ColorStore::open(db_path)?;
        let entries = match store.get(COLOR_CACHE_KEY)? {
            Some(json) => decode_entries(&json).unwrap_or_else(|err| {
                warn!(%err, "stored colour cache is malformed, starting empty");
                HashMap::new()
            }),
            None => HashMap::new(),
        };

        info!(entries = entries.len(), "colour cache loaded");
        Ok(Self {
            entries,
            store: Some(store),
        })
    }

    pub fn get(&self, id: i64) -> Option<&[ColorCategory]> {
        self.entries.get(&id).map(Vec::as_slice)
    }

    /// Record a result; the latest write for an id wins
    pub fn insert(&mut self, id: i64, colors: Vec<ColorCategory>) {
        self.entries.insert(id, colors);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    /// Write the cache back, merged into whatever is stored
    ///
    /// Entries stored by another run but absent here are kept. No-op for an
    /// in-memory cache.
    pub fn persist(&self) -> Result<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };

        let mut merged: StoredMap = match store.get(COLOR_CACHE_KEY)? {
            Some(json) => serde_json::from_str(&json).unwrap_or_default(),
            None => StoredMap::new(),
        };
        for (id, colors) in &self.entries {
            merged.insert(
                id.to_string(),
                colors.iter().map(|c| c.name().to_string()).collect(),
            );
        }

        store.set(COLOR_CACHE_KEY, &serde_json::to_string(&merged)?)?;
        debug!(entries = merged.len(), path = %store.path().display(), "colour cache persisted");
        Ok(())
    }
}

/// Parse a stored map; unknown ids or colour names are skipped
fn decode_entries(json: &str) -> Result<HashMap<i64, Vec<ColorCategory>>> {
    let stored: StoredMap = serde_json::from_str(json)?;

    let entries = stored
        .into_iter()
        .filter_map(|(id, names)| {
            let id = id.parse().ok()?;
            let colors = names.iter().filter_map(|name| name.parse().ok()).collect();
            Some((id, colors))
        })
        .collect();

    Ok(entries)
}
