use crate::models::{BookRow, UserRow};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};

impl Database {
    // -- Users --

    pub fn create_user(&self, user: &UserRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    user.id,
                    user.username,
                    user.email,
                    user.password,
                    user.created_at,
                    user.updated_at
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email = ?1", email))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", id))
    }

    // -- Books --

    pub fn insert_book(&self, book: &BookRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO books (id, title, author, cover_image, description, isbn,
                                    published_year, category, rating, user_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                rusqlite::params![
                    book.id,
                    book.title,
                    book.author,
                    book.cover_image,
                    book.description,
                    book.isbn,
                    book.published_year,
                    book.category,
                    book.rating,
                    book.user_id,
                    book.created_at,
                    book.updated_at
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_book(&self, id: &str) -> Result<Option<BookRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", SELECT_BOOK))?;
            let row = stmt.query_row([id], map_book_row).optional()?;
            Ok(row)
        })
    }

    /// All books owned by `user_id`, newest-created first.
    pub fn list_books_by_owner(&self, user_id: &str) -> Result<Vec<BookRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE user_id = ?1 ORDER BY created_at DESC",
                SELECT_BOOK
            ))?;
            let rows = stmt
                .query_map([user_id], map_book_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Owner's books whose title or author contains `term`, case-insensitive.
    /// instr() instead of LIKE so the term needs no wildcard escaping.
    pub fn search_books(&self, user_id: &str, term: &str) -> Result<Vec<BookRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE user_id = ?1
                     AND (instr(lower(title), lower(?2)) > 0
                          OR instr(lower(author), lower(?2)) > 0)",
                SELECT_BOOK
            ))?;
            let rows = stmt
                .query_map(rusqlite::params![user_id, term], map_book_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Overwrites the mutable fields and updated_at. Owner and created_at are
    /// never touched.
    pub fn update_book(&self, book: &BookRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE books
                 SET title = ?2, author = ?3, cover_image = ?4, description = ?5,
                     isbn = ?6, published_year = ?7, category = ?8, rating = ?9,
                     updated_at = ?10
                 WHERE id = ?1",
                rusqlite::params![
                    book.id,
                    book.title,
                    book.author,
                    book.cover_image,
                    book.description,
                    book.isbn,
                    book.published_year,
                    book.category,
                    book.rating,
                    book.updated_at
                ],
            )?;
            Ok(())
        })
    }

    pub fn delete_book(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM books WHERE id = ?1", [id])?;
            Ok(())
        })
    }
}

const SELECT_BOOK: &str = "SELECT id, title, author, cover_image, description, isbn,
                                  published_year, category, rating, user_id, created_at, updated_at
                           FROM books";

fn map_book_row(row: &Row<'_>) -> rusqlite::Result<BookRow> {
    Ok(BookRow {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        cover_image: row.get(3)?,
        description: row.get(4)?,
        isbn: row.get(5)?,
        published_year: row.get(6)?,
        category: row.get(7)?,
        rating: row.get(8)?,
        user_id: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn query_user(conn: &Connection, predicate: &str, param: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, username, email, password, created_at, updated_at
         FROM users WHERE {}",
        predicate
    ))?;

    let row = stmt
        .query_row([param], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                created_at: row.get(4)?,
                updated_at: row.get(5)?,
            })
        })
        .optional()?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_user(username: &str, email: &str) -> UserRow {
        let now = chrono::Utc::now().to_rfc3339();
        UserRow {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password: "hash".to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    fn test_book(owner: &str, title: &str, author: &str, created_at: &str) -> BookRow {
        BookRow {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            author: author.to_string(),
            cover_image: None,
            description: None,
            isbn: None,
            published_year: 1869,
            category: "Fiction".to_string(),
            rating: None,
            user_id: owner.to_string(),
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
        }
    }

    #[test]
    fn duplicate_username_or_email_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&test_user("alice", "alice@example.com")).unwrap();

        assert!(db.create_user(&test_user("alice", "other@example.com")).is_err());
        assert!(db.create_user(&test_user("other", "alice@example.com")).is_err());
    }

    #[test]
    fn list_is_newest_first_and_owner_scoped() {
        let db = Database::open_in_memory().unwrap();
        let alice = test_user("alice", "alice@example.com");
        let bob = test_user("bob", "bob@example.com");
        db.create_user(&alice).unwrap();
        db.create_user(&bob).unwrap();

        db.insert_book(&test_book(&alice.id, "Old", "A", "2024-01-01T00:00:00+00:00"))
            .unwrap();
        db.insert_book(&test_book(&alice.id, "New", "A", "2024-06-01T00:00:00+00:00"))
            .unwrap();
        db.insert_book(&test_book(&bob.id, "Bobs", "B", "2024-03-01T00:00:00+00:00"))
            .unwrap();

        let books = db.list_books_by_owner(&alice.id).unwrap();
        let titles: Vec<&str> = books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Old"]);
    }

    #[test]
    fn search_matches_title_or_author_case_insensitively() {
        let db = Database::open_in_memory().unwrap();
        let alice = test_user("alice", "alice@example.com");
        db.create_user(&alice).unwrap();

        let now = "2024-01-01T00:00:00+00:00";
        db.insert_book(&test_book(&alice.id, "War and Peace", "Leo Tolstoy", now))
            .unwrap();
        db.insert_book(&test_book(&alice.id, "The Custom of the Country", "Edgar Warton", now))
            .unwrap();
        db.insert_book(&test_book(&alice.id, "Dubliners", "James Joyce", now))
            .unwrap();

        let hits = db.search_books(&alice.id, "war").unwrap();
        let mut titles: Vec<&str> = hits.iter().map(|b| b.title.as_str()).collect();
        titles.sort();
        assert_eq!(titles, vec!["The Custom of the Country", "War and Peace"]);

        assert!(db.search_books(&alice.id, "zzz").unwrap().is_empty());
    }

    #[test]
    fn update_overwrites_fields_and_delete_removes() {
        let db = Database::open_in_memory().unwrap();
        let alice = test_user("alice", "alice@example.com");
        db.create_user(&alice).unwrap();

        let mut book = test_book(&alice.id, "Draft", "A", "2024-01-01T00:00:00+00:00");
        db.insert_book(&book).unwrap();

        book.title = "Final".to_string();
        book.rating = Some(4.5);
        book.updated_at = "2024-02-01T00:00:00+00:00".to_string();
        db.update_book(&book).unwrap();

        let fetched = db.get_book(&book.id).unwrap().unwrap();
        assert_eq!(fetched.title, "Final");
        assert_eq!(fetched.rating, Some(4.5));
        assert_eq!(fetched.created_at, "2024-01-01T00:00:00+00:00");
        assert_eq!(fetched.updated_at, "2024-02-01T00:00:00+00:00");

        db.delete_book(&book.id).unwrap();
        assert!(db.get_book(&book.id).unwrap().is_none());
    }
}
