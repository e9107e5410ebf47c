use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::time::Duration;
use toolset_core::domain::{CategoryRecord, CategoryRef, ProductId, TermId};
use toolset_core::error::ToolsetError;
use toolset_core::ports::{
    CategoryRepository, Clock, LogCache, ProductRepository, Result, SettingsStore, SystemClock,
    UserId,
};
use tracing::debug;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    term_id     INTEGER PRIMARY KEY,
    name        TEXT NOT NULL,
    slug        TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    image       TEXT,
    count       INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS products (
    id     INTEGER PRIMARY KEY,
    title  TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'publish'
);

CREATE TABLE IF NOT EXISTS product_categories (
    product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
    term_id    INTEGER NOT NULL REFERENCES categories(term_id) ON DELETE CASCADE,
    PRIMARY KEY (product_id, term_id)
);

CREATE TABLE IF NOT EXISTS cache (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    expires_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS user_settings (
    user_id INTEGER NOT NULL,
    key     TEXT NOT NULL,
    value   TEXT NOT NULL,
    PRIMARY KEY (user_id, key)
);
"#;

/// Status that counts towards a category's member count
const PUBLISHED: &str = "publish";

trait SqlResultExt<T> {
    fn storage(self) -> Result<T>;
}

impl<T> SqlResultExt<T> for rusqlite::Result<T> {
    fn storage(self) -> Result<T> {
        self.map_err(ToolsetError::storage)
    }
}

/// SQLite implementation of the host store ports: taxonomy, products,
/// short-lived cache and per-user settings
pub struct SqliteStore {
    conn: Connection,
    clock: Box<dyn Clock>,
}

impl SqliteStore {
    /// Opens (or creates) the database file and ensures the schema exists
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::from_connection(Connection::open(db_path).storage()?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory().storage()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;").storage()?;
        conn.execute_batch(SCHEMA).storage()?;
        Ok(Self {
            conn,
            clock: Box::new(SystemClock),
        })
    }

    /// Replaces the clock used for cache expiry
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Inserts a category, or updates it in place keeping its product links
    pub fn insert_category(&self, category: &CategoryRecord) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO categories (term_id, name, slug, description, image, count)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(term_id) DO UPDATE SET
                     name = excluded.name,
                     slug = excluded.slug,
                     description = excluded.description,
                     image = excluded.image,
                     count = excluded.count",
                params![
                    category.term_id,
                    category.name,
                    category.slug,
                    category.description,
                    category.image,
                    category.count,
                ],
            )
            .storage()?;
        Ok(())
    }

    /// Inserts a product and assigns it to the given categories.
    /// Published products bump the category member counts.
    pub fn insert_product(
        &self,
        product_id: ProductId,
        title: &str,
        status: &str,
        term_ids: &[TermId],
    ) -> Result<()> {
        let tx = self.conn.unchecked_transaction().storage()?;
        tx.execute(
            "INSERT INTO products (id, title, status) VALUES (?1, ?2, ?3)",
            params![product_id, title, status],
        )
        .storage()?;
        for term_id in term_ids {
            tx.execute(
                "INSERT INTO product_categories (product_id, term_id) VALUES (?1, ?2)",
                params![product_id, term_id],
            )
            .storage()?;
            if status == PUBLISHED {
                tx.execute(
                    "UPDATE categories SET count = count + 1 WHERE term_id = ?1",
                    params![term_id],
                )
                .storage()?;
            }
        }
        tx.commit().storage()
    }

    /// Whether a product row still exists
    pub fn product_exists(&self, product_id: ProductId) -> Result<bool> {
        self.conn
            .query_row(
                "SELECT 1 FROM products WHERE id = ?1",
                params![product_id],
                |_| Ok(()),
            )
            .optional()
            .map(|found| found.is_some())
            .storage()
    }

    fn now_secs(&self) -> i64 {
        self.clock.now().timestamp()
    }

    fn map_category(row: &Row) -> rusqlite::Result<CategoryRecord> {
        Ok(CategoryRecord {
            term_id: row.get(0)?,
            name: row.get(1)?,
            slug: row.get(2)?,
            description: row.get(3)?,
            image: row.get(4)?,
            count: row.get(5)?,
        })
    }
}

impl CategoryRepository for SqliteStore {
    fn get_category(&self, category: &CategoryRef) -> Result<Option<CategoryRecord>> {
        let select = "SELECT term_id, name, slug, description, image, count FROM categories";
        let record = match category {
            // SQLite integers are signed; larger ids cannot exist in the table
            CategoryRef::Id(term_id) if i64::try_from(*term_id).is_err() => return Ok(None),
            CategoryRef::Id(term_id) => self.conn.query_row(
                &format!("{select} WHERE term_id = ?1"),
                params![term_id],
                Self::map_category,
            ),
            CategoryRef::Slug(slug) => self.conn.query_row(
                &format!("{select} WHERE slug = ?1"),
                params![slug],
                Self::map_category,
            ),
        };
        record.optional().storage()
    }

    fn list_categories(&self, include_empty: bool) -> Result<Vec<CategoryRecord>> {
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT term_id, name, slug, description, image, count
                FROM categories
                WHERE ?1 OR count > 0
                ORDER BY name COLLATE NOCASE ASC, term_id ASC
                "#,
            )
            .storage()?;

        let categories = stmt
            .query_map(params![include_empty], Self::map_category)
            .storage()?
            .collect::<rusqlite::Result<Vec<_>>>()
            .storage()?;

        Ok(categories)
    }
}

impl ProductRepository for SqliteStore {
    fn find_ids_by_category(
        &self,
        term_id: TermId,
        include_all_statuses: bool,
    ) -> Result<Vec<ProductId>> {
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT p.id
                FROM products p
                JOIN product_categories pc ON pc.product_id = p.id
                WHERE pc.term_id = ?1 AND (?2 OR p.status = ?3)
                ORDER BY p.id ASC
                "#,
            )
            .storage()?;

        let ids = stmt
            .query_map(
                params![term_id, include_all_statuses, PUBLISHED],
                |row| row.get::<_, ProductId>(0),
            )
            .storage()?
            .collect::<rusqlite::Result<Vec<_>>>()
            .storage()?;

        Ok(ids)
    }

    fn delete_permanently(&self, product_id: ProductId) -> Result<bool> {
        let tx = self.conn.unchecked_transaction().storage()?;
        tx.execute(
            r#"
            UPDATE categories SET count = MAX(count - 1, 0)
            WHERE term_id IN (SELECT term_id FROM product_categories WHERE product_id = ?1)
              AND EXISTS (SELECT 1 FROM products WHERE id = ?1 AND status = ?2)
            "#,
            params![product_id, PUBLISHED],
        )
        .storage()?;
        let removed = tx
            .execute("DELETE FROM products WHERE id = ?1", params![product_id])
            .storage()?;
        tx.commit().storage()?;

        debug!(product_id, removed, "Product delete");
        Ok(removed > 0)
    }
}

impl LogCache for SqliteStore {
    fn store(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let expires_at = self.now_secs().saturating_add(ttl_secs);
        self.conn
            .execute(
                "INSERT OR REPLACE INTO cache (key, value, expires_at) VALUES (?1, ?2, ?3)",
                params![key, value, expires_at],
            )
            .storage()?;
        Ok(())
    }

    fn fetch(&self, key: &str) -> Result<Option<String>> {
        let now = self.now_secs();
        self.conn
            .execute(
                "DELETE FROM cache WHERE key = ?1 AND expires_at <= ?2",
                params![key, now],
            )
            .storage()?;
        self.conn
            .query_row(
                "SELECT value FROM cache WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .storage()
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM cache WHERE key = ?1", params![key])
            .storage()?;
        Ok(())
    }
}

impl SettingsStore for SqliteStore {
    fn get_user_setting(&self, user: UserId, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM user_settings WHERE user_id = ?1 AND key = ?2",
                params![user, key],
                |row| row.get(0),
            )
            .optional()
            .storage()
    }

    fn set_user_setting(&self, user: UserId, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO user_settings (user_id, key, value) VALUES (?1, ?2, ?3)",
                params![user, key, value],
            )
            .storage()?;
        Ok(())
    }

    fn delete_setting_for_all_users(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM user_settings WHERE key = ?1", params![key])
            .storage()?;
        Ok(())
    }
}
