use rusqlite::{params, Connection, OptionalExtension};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS nwc_profiles (
        idx INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        relay TEXT NOT NULL,
        client_secret TEXT NOT NULL,
        enabled INTEGER NOT NULL DEFAULT 1,
        created_at INTEGER NOT NULL DEFAULT 0
    );
    CREATE TABLE IF NOT EXISTS wallet_settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
";

const SERVICE_SECRET_KEY: &str = "nwc_service_secret";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoredProfile {
    pub index: u32,
    pub name: String,
    pub relay: String,
    pub client_secret: String,
    pub enabled: bool,
}

pub(crate) fn open_wallet_db(data_dir: &str) -> Result<Connection, rusqlite::Error> {
    let path = std::path::Path::new(data_dir).join("nwc_profiles.sqlite3");
    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}

pub(crate) fn load_service_secret(conn: &Connection) -> Result<Option<String>, rusqlite::Error> {
    conn.query_row(
        "SELECT value FROM wallet_settings WHERE key = ?1",
        [SERVICE_SECRET_KEY],
        |row| row.get(0),
    )
    .optional()
}

pub(crate) fn save_service_secret(
    conn: &Connection,
    secret_hex: &str,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR REPLACE INTO wallet_settings (key, value) VALUES (?1, ?2)",
        params![SERVICE_SECRET_KEY, secret_hex],
    )?;
    Ok(())
}

fn row_to_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredProfile> {
    Ok(StoredProfile {
        index: row.get(0)?,
        name: row.get(1)?,
        relay: row.get(2)?,
        client_secret: row.get(3)?,
        enabled: row.get::<_, i64>(4)? != 0,
    })
}

pub(crate) fn load_profiles(conn: &Connection) -> Result<Vec<StoredProfile>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT idx, name, relay, client_secret, enabled FROM nwc_profiles ORDER BY idx ASC",
    )?;
    let profiles = stmt
        .query_map([], row_to_profile)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(profiles)
}

pub(crate) fn load_profile(
    conn: &Connection,
    index: u32,
) -> Result<Option<StoredProfile>, rusqlite::Error> {
    conn.query_row(
        "SELECT idx, name, relay, client_secret, enabled FROM nwc_profiles WHERE idx = ?1",
        [index],
        row_to_profile,
    )
    .optional()
}

pub(crate) fn name_exists(conn: &Connection, name: &str) -> Result<bool, rusqlite::Error> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM nwc_profiles WHERE name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub(crate) fn insert_profile(
    conn: &Connection,
    name: &str,
    relay: &str,
    client_secret: &str,
    created_at: i64,
) -> Result<u32, rusqlite::Error> {
    conn.execute(
        "INSERT INTO nwc_profiles (name, relay, client_secret, enabled, created_at)
         VALUES (?1, ?2, ?3, 1, ?4)",
        params![name, relay, client_secret, created_at],
    )?;
    Ok(conn.last_insert_rowid() as u32)
}

/// Only the user-editable columns change; secrets and relay stay as issued.
pub(crate) fn update_profile(
    conn: &Connection,
    index: u32,
    name: &str,
    enabled: bool,
) -> Result<bool, rusqlite::Error> {
    let changed = conn.execute(
        "UPDATE nwc_profiles SET name = ?1, enabled = ?2 WHERE idx = ?3",
        params![name, enabled as i64, index],
    )?;
    Ok(changed > 0)
}
