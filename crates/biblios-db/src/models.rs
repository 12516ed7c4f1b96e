/// Database row types — these map directly to SQLite rows.
/// Distinct from the biblios-types API shapes to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct BookRow {
    pub id: String,
    pub title: String,
    pub author: String,
    pub cover_image: Option<String>,
    pub description: Option<String>,
    pub isbn: Option<String>,
    pub published_year: i32,
    pub category: String,
    pub rating: Option<f64>,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}
