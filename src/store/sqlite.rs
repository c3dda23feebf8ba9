//! SQLite-backed persistent collections.
//! WAL mode, one connection behind a mutex. Translation rows are idempotent
//! overwrites (INSERT OR REPLACE), order lines are patched per document so
//! unrelated fields survive concurrent writers, catalog entries are
//! insert/delete only.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use crate::catalog::CatalogEntry;
use crate::order::{Category, OrderLine, OrderPatch, Requester, Supplier, Unit};
use crate::translate::{Lang, TranslationRecord};

use super::{
    now_unix, CatalogCollection, OrderCollection, StoreError, TranslationCollection,
};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at the given path.
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(db_path)?;

        // WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS translation_cache (
                name_key TEXT PRIMARY KEY,
                tr TEXT NOT NULL,
                de TEXT NOT NULL,
                pa TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS order_lines (
                id TEXT PRIMARY KEY,
                raw_name TEXT NOT NULL,
                input_lang TEXT NOT NULL,
                name_tr TEXT,
                name_de TEXT,
                name_pa TEXT,
                category TEXT NOT NULL,
                quantity REAL NOT NULL,
                unit TEXT NOT NULL,
                requester TEXT NOT NULL,
                supplier TEXT NOT NULL,
                estimated_cost REAL NOT NULL DEFAULT 0,
                bought INTEGER NOT NULL DEFAULT 0,
                archived INTEGER NOT NULL DEFAULT 0,
                pending INTEGER NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL,
                bought_at INTEGER
            );
            CREATE INDEX IF NOT EXISTS idx_order_created
                ON order_lines(created_at);
            CREATE TABLE IF NOT EXISTS catalog (
                id TEXT PRIMARY KEY,
                category TEXT NOT NULL,
                tr TEXT NOT NULL,
                de TEXT NOT NULL,
                pa TEXT NOT NULL,
                default_cost REAL NOT NULL DEFAULT 0,
                default_supplier TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );",
        )?;

        info!(path = %db_path.display(), "sqlite store opened");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn order_line_from_row(row: &Row<'_>) -> rusqlite::Result<OrderLine> {
    let name_tr: Option<String> = row.get("name_tr")?;
    let name_de: Option<String> = row.get("name_de")?;
    let name_pa: Option<String> = row.get("name_pa")?;
    let names = match (name_tr, name_de, name_pa) {
        (Some(tr), Some(de), Some(pa)) => Some(TranslationRecord { tr, de, pa }),
        _ => None,
    };

    Ok(OrderLine {
        id: row.get("id")?,
        raw_name: row.get("raw_name")?,
        input_lang: Lang::from_tag(&row.get::<_, String>("input_lang")?),
        names,
        category: Category::from_tag(&row.get::<_, String>("category")?),
        quantity: row.get("quantity")?,
        unit: Unit::from_tag(&row.get::<_, String>("unit")?),
        requester: Requester::from_tag(&row.get::<_, String>("requester")?),
        supplier: Supplier::from_tag(&row.get::<_, String>("supplier")?),
        estimated_cost: row.get("estimated_cost")?,
        bought: row.get::<_, i64>("bought")? != 0,
        archived: row.get::<_, i64>("archived")? != 0,
        pending: row.get::<_, i64>("pending")? != 0,
        created_at: row.get("created_at")?,
        bought_at: row.get("bought_at")?,
    })
}

impl TranslationCollection for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<TranslationRecord>, StoreError> {
        let conn = self.conn.lock();
        let record = conn
            .query_row(
                "SELECT tr, de, pa FROM translation_cache WHERE name_key = ?1",
                params![key],
                |row| {
                    Ok(TranslationRecord {
                        tr: row.get(0)?,
                        de: row.get(1)?,
                        pa: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn put(&self, key: &str, record: &TranslationRecord) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO translation_cache
             (name_key, tr, de, pa, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![key, record.tr, record.de, record.pa, now_unix()],
        )?;
        Ok(())
    }
}

impl OrderCollection for SqliteStore {
    fn append(&self, line: &OrderLine) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO order_lines
             (id, raw_name, input_lang, name_tr, name_de, name_pa, category,
              quantity, unit, requester, supplier, estimated_cost, bought,
              archived, pending, created_at, bought_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                     ?14, ?15, ?16, ?17)",
            params![
                line.id,
                line.raw_name,
                line.input_lang.tag(),
                line.names.as_ref().map(|n| n.tr.as_str()),
                line.names.as_ref().map(|n| n.de.as_str()),
                line.names.as_ref().map(|n| n.pa.as_str()),
                line.category.tag(),
                line.quantity,
                line.unit.tag(),
                line.requester.tag(),
                line.supplier.tag(),
                line.estimated_cost,
                line.bought as i64,
                line.archived as i64,
                line.pending as i64,
                line.created_at,
                line.bought_at,
            ],
        )?;
        Ok(())
    }

    fn patch(&self, id: &str, patch: &OrderPatch) -> Result<(), StoreError> {
        if patch.is_empty() {
            return Ok(());
        }

        let conn = self.conn.lock();
        let mut matched = false;

        if let Some(names) = &patch.names {
            let n = conn.execute(
                "UPDATE order_lines
                 SET name_tr = ?1, name_de = ?2, name_pa = ?3, pending = 0
                 WHERE id = ?4",
                params![names.tr, names.de, names.pa, id],
            )?;
            matched |= n > 0;
        }
        if let Some(bought) = patch.bought {
            let bought_at = bought.then(now_unix);
            let n = conn.execute(
                "UPDATE order_lines SET bought = ?1, bought_at = ?2 WHERE id = ?3",
                params![bought as i64, bought_at, id],
            )?;
            matched |= n > 0;
        }
        if let Some(archived) = patch.archived {
            let n = conn.execute(
                "UPDATE order_lines SET archived = ?1 WHERE id = ?2",
                params![archived as i64, id],
            )?;
            matched |= n > 0;
        }

        if matched {
            Ok(())
        } else {
            Err(StoreError::NotFound(id.to_string()))
        }
    }

    fn load_all(&self) -> Result<Vec<OrderLine>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT * FROM order_lines ORDER BY created_at DESC, rowid DESC")?;
        let lines = stmt
            .query_map([], order_line_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(lines)
    }
}

impl CatalogCollection for SqliteStore {
    fn insert(&self, entry: &CatalogEntry) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO catalog
             (id, category, tr, de, pa, default_cost, default_supplier, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                entry.id,
                entry.category.tag(),
                entry.names.tr,
                entry.names.de,
                entry.names.pa,
                entry.default_cost,
                entry.default_supplier.tag(),
                entry.created_at,
            ],
        )?;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM catalog WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, category, tr, de, pa, default_cost, default_supplier, created_at
             FROM catalog",
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(CatalogEntry {
                    id: row.get(0)?,
                    category: Category::from_tag(&row.get::<_, String>(1)?),
                    names: TranslationRecord {
                        tr: row.get(2)?,
                        de: row.get(3)?,
                        pa: row.get(4)?,
                    },
                    default_cost: row.get(5)?,
                    default_supplier: Supplier::from_tag(&row.get::<_, String>(6)?),
                    created_at: row.get(7)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    fn count(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM catalog", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
