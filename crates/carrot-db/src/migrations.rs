use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Ordered schema migrations: (version, name, sql).
const MIGRATIONS: &[(i64, &str, &str)] = &[
    (
        1,
        "users and market",
        "
        CREATE TABLE users (
            id              TEXT PRIMARY KEY,
            email           TEXT NOT NULL UNIQUE,
            password_hash   TEXT NOT NULL,
            nickname        TEXT NOT NULL UNIQUE,
            location        TEXT NOT NULL,
            avatar_url      TEXT,
            rating          REAL NOT NULL DEFAULT 5.0,
            trade_count     INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE TABLE market (
            id              TEXT PRIMARY KEY,
            title           TEXT NOT NULL,
            description     TEXT NOT NULL,
            price           INTEGER NOT NULL DEFAULT 0,
            trade_type      TEXT NOT NULL DEFAULT 'sell' CHECK (trade_type IN ('sell', 'share')),
            image           TEXT NOT NULL,
            user_id         TEXT NOT NULL,
            created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE INDEX idx_market_user ON market(user_id, created_at);
        CREATE INDEX idx_market_created_at ON market(created_at DESC);
        ",
    ),
    (
        2,
        "comments",
        "
        CREATE TABLE comments (
            id              TEXT PRIMARY KEY,
            product_id      TEXT NOT NULL REFERENCES market(id) ON DELETE CASCADE,
            user_id         TEXT NOT NULL,
            content         TEXT NOT NULL,
            created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            updated_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE INDEX idx_comments_product_id ON comments(product_id);
        CREATE INDEX idx_comments_user_id ON comments(user_id);
        CREATE INDEX idx_comments_created_at ON comments(created_at DESC);
        ",
    ),
];

/// Brings the schema up to the latest version and returns it.
pub fn run(conn: &mut Connection) -> Result<i64> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let mut version = current_version(conn)?;

    for (target, name, sql) in MIGRATIONS {
        if *target <= version {
            continue;
        }

        info!("Running migration v{} ({})", target, name);
        let tx = conn.transaction()?;
        tx.execute_batch(sql)?;
        tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [target])?;
        tx.commit()?;
        version = *target;
    }

    info!("Database migrations complete (schema v{})", version);
    Ok(version)
}

pub fn current_version(conn: &Connection) -> Result<i64> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

pub fn latest_version() -> i64 {
    MIGRATIONS.last().map(|(v, _, _)| *v).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(run(&mut conn).unwrap(), latest_version());
        assert_eq!(run(&mut conn).unwrap(), latest_version());

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, MIGRATIONS.len() as i64);
    }

    #[test]
    fn comments_table_exists_after_migration() {
        let mut conn = Connection::open_in_memory().unwrap();
        run(&mut conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'comments'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
