use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              TEXT PRIMARY KEY,
            username        TEXT NOT NULL UNIQUE,
            email           TEXT NOT NULL UNIQUE,
            password        TEXT NOT NULL,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS books (
            id              TEXT PRIMARY KEY,
            title           TEXT NOT NULL,
            author          TEXT NOT NULL,
            cover_image     TEXT,
            description     TEXT,
            isbn            TEXT,
            published_year  INTEGER NOT NULL,
            category        TEXT NOT NULL,
            rating          REAL,
            user_id         TEXT NOT NULL REFERENCES users(id),
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_books_owner
            ON books(user_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
