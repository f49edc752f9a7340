// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use catdesk_app::{CATEGORIES_COLLECTION, Category, CategoryFormInput, CategoryId, CategoryStore};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

pub const APP_NAME: &str = "catdesk";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[(
    "categories",
    &[
        "id",
        "title",
        "description",
        "icon_name",
        "color",
        "count",
        "created_at",
        "updated_at",
    ],
)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequiredIndex {
    name: &'static str,
    create_sql: &'static str,
}

const REQUIRED_INDEXES: &[RequiredIndex] = &[RequiredIndex {
    name: "idx_categories_title",
    create_sql: "CREATE INDEX IF NOT EXISTS idx_categories_title ON categories (title, id);",
}];

const DEMO_CATEGORIES: [(&str, Option<&str>, &str, &str, i64); 6] = [
    ("Tech", Some("Gadgets, gear and software"), "laptop", "#3b82f6", 12),
    ("Food", None, "utensils", "#ef4444", 7),
    ("Travel", Some("Trips and itineraries"), "plane", "#22c55e", 4),
    ("Music", Some("Albums, gigs and playlists"), "music", "#a855f7", 9),
    ("Health", Some("Fitness and wellbeing"), "heart", "#ec4899", 0),
    ("Finance", Some("Budgets and investing"), "wallet", "#f59e0b", 3),
];

const CATEGORY_COLUMNS: &str =
    "id, title, description, icon_name, color, count, created_at, updated_at";

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        tracing::info!(path = %path.display(), "opened category database");
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if has_user_tables(&self.conn)? {
            validate_schema(&self.conn)?;
        } else {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
            tracing::debug!("created category schema");
        }

        ensure_required_indexes(&self.conn)
    }

    /// Inserts a fixed set of sample categories. No-op when rows already exist.
    pub fn seed_demo_data(&self) -> Result<()> {
        let existing: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))
            .context("count categories")?;
        if existing > 0 {
            return Ok(());
        }

        for (title, description, icon_name, color, count) in DEMO_CATEGORIES {
            let input = CategoryFormInput {
                title: title.to_owned(),
                description: description.map(str::to_owned),
                icon_name: icon_name.to_owned(),
                color: color.to_owned(),
            };
            let created = self.create_category(&input)?;
            self.conn
                .execute(
                    "UPDATE categories SET count = ? WHERE id = ?",
                    params![count, created.id.as_str()],
                )
                .with_context(|| format!("set demo count for {title}"))?;
        }
        Ok(())
    }

    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY title ASC, id ASC"
            ))
            .context("prepare category list query")?;
        let rows = stmt
            .query_map([], category_from_row)
            .context("query categories")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect categories")
    }

    pub fn get_category(&self, id: &CategoryId) -> Result<Category> {
        self.conn
            .query_row(
                &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?"),
                params![id.as_str()],
                category_from_row,
            )
            .optional()
            .with_context(|| format!("load category {id}"))?
            .ok_or_else(|| {
                anyhow!("category {id} not found -- refresh the list and choose an existing row")
            })
    }

    pub fn create_category(&self, input: &CategoryFormInput) -> Result<Category> {
        input.validate()?;
        let id: String = self
            .conn
            .query_row("SELECT lower(hex(randomblob(16)))", [], |row| row.get(0))
            .context("generate category id")?;
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO categories (
                  id, title, description, icon_name, color, count,
                  created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, 0, ?, ?)
                ",
                params![
                    id,
                    input.title,
                    input.description,
                    input.icon_name,
                    input.color,
                    now,
                    now,
                ],
            )
            .context("insert category")?;
        self.get_category(&CategoryId::new(id))
    }

    pub fn update_category(&self, id: &CategoryId, input: &CategoryFormInput) -> Result<Category> {
        input.validate()?;
        let now = now_rfc3339()?;
        let rows_affected = self
            .conn
            .execute(
                "
                UPDATE categories
                SET
                  title = ?,
                  description = ?,
                  icon_name = ?,
                  color = ?,
                  updated_at = ?
                WHERE id = ?
                ",
                params![
                    input.title,
                    input.description,
                    input.icon_name,
                    input.color,
                    now,
                    id.as_str(),
                ],
            )
            .context("update category")?;
        if rows_affected == 0 {
            bail!("category {id} not found -- choose an existing category and retry");
        }
        self.get_category(id)
    }

    pub fn delete_category(&self, id: &CategoryId) -> Result<()> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?", params![id.as_str()])
            .with_context(|| format!("delete category {id}"))?;
        if rows_affected == 0 {
            bail!("category {id} not found -- it may already have been deleted");
        }
        Ok(())
    }
}

impl CategoryStore for Store {
    fn list(&self, collection: &str) -> Result<Vec<Category>> {
        ensure_collection(collection)?;
        self.list_categories()
    }

    fn create(&self, collection: &str, input: &CategoryFormInput) -> Result<Category> {
        ensure_collection(collection)?;
        self.create_category(input)
    }

    fn update(
        &self,
        collection: &str,
        id: &CategoryId,
        input: &CategoryFormInput,
    ) -> Result<Category> {
        ensure_collection(collection)?;
        self.update_category(id, input)
    }

    fn delete_by_id(&self, collection: &str, id: &CategoryId) -> Result<()> {
        ensure_collection(collection)?;
        self.delete_category(id)
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("CATDESK_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set CATDESK_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("catdesk.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn ensure_collection(collection: &str) -> Result<()> {
    if collection != CATEGORIES_COLLECTION {
        bail!(
            "unknown collection {collection:?}; the local store only holds {CATEGORIES_COLLECTION:?}"
        );
    }
    Ok(())
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    let created_at_raw: Option<String> = row.get(6)?;
    let updated_at_raw: Option<String> = row.get(7)?;
    Ok(Category {
        id: CategoryId::new(row.get::<_, String>(0)?),
        title: row.get(1)?,
        description: row.get(2)?,
        icon_name: row.get(3)?,
        color: row.get(4)?,
        count: row.get(5)?,
        created_at: parse_opt_datetime(created_at_raw).map_err(to_sql_error)?,
        updated_at: parse_opt_datetime(updated_at_raw).map_err(to_sql_error)?,
    })
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            bail!(
                "database is missing required table `{table}`; point storage.db_path at a catdesk database"
            );
        }

        let columns = table_columns(conn, table)?;
        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();

        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; run migration before launching",
                missing.join(", ")
            );
        }
    }

    Ok(())
}

fn ensure_required_indexes(conn: &Connection) -> Result<()> {
    for index in REQUIRED_INDEXES {
        conn.execute_batch(index.create_sql)
            .with_context(|| format!("ensure required index `{}`", index.name))?;
    }

    let existing_indexes = index_names(conn)?;
    let missing = REQUIRED_INDEXES
        .iter()
        .filter(|index| !existing_indexes.contains(index.name))
        .map(|index| index.name)
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        bail!(
            "database is missing required indexes: {}; run migration before launching",
            missing.join(", ")
        );
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1
              FROM sqlite_master
              WHERE type = 'table' AND name = ?
            )
            ",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check table existence for {table}"))?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;

    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))
}

fn index_names(conn: &Connection) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(
            "
            SELECT name
            FROM sqlite_master
            WHERE type = 'index'
              AND name NOT LIKE 'sqlite_%'
            ORDER BY name ASC
            ",
        )
        .context("prepare index names query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query index names")?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .context("collect index names")
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}

fn parse_datetime(raw: &str) -> Result<OffsetDateTime> {
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(value);
    }

    // Rows imported from the hosted backend keep its space-separated layout.
    if let Ok(value) = OffsetDateTime::parse(
        raw,
        &format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]"
        ),
    ) {
        return Ok(value);
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Ok(value.assume_utc());
    }

    bail!("unsupported datetime format {raw:?}")
}

fn parse_opt_datetime(raw: Option<String>) -> Result<Option<OffsetDateTime>> {
    raw.as_deref().map(parse_datetime).transpose()
}

fn to_sql_error(error: anyhow::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            error.to_string(),
        )),
    )
}
