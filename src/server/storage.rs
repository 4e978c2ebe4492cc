//! SQLite storage for accounts, sessions and tracker data.
//!
//! Each user's record is spread over the `tags`, `calendar_entries`,
//! `goals`, `health_settings` and `period_entries` tables, keyed by the
//! client-generated IDs. A sync is applied in a single transaction.

use routlin_core::{
    parse_date, Entries, Goal, GoalPeriod, HealthProfile, PeriodEntry, Tag, UserData,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Errors that can occur during server storage operations.
#[derive(Debug)]
pub enum ServerStorageError {
    /// Could not create the database directory.
    IoError(PathBuf, std::io::Error),
    /// Database or migration failure.
    Database(sqlx::Error),
    /// A username is already registered.
    UsernameTaken(String),
    /// A stored row could not be turned back into tracker data.
    Corrupt(String),
}

impl std::fmt::Display for ServerStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerStorageError::IoError(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            ServerStorageError::Database(e) => write!(f, "Database error: {}", e),
            ServerStorageError::UsernameTaken(name) => {
                write!(f, "Username already exists: {}", name)
            }
            ServerStorageError::Corrupt(e) => write!(f, "Corrupt stored data: {}", e),
        }
    }
}

impl std::error::Error for ServerStorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerStorageError::IoError(_, e) => Some(e),
            ServerStorageError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for ServerStorageError {
    fn from(err: sqlx::Error) -> Self {
        ServerStorageError::Database(err)
    }
}

impl From<sqlx::migrate::MigrateError> for ServerStorageError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        ServerStorageError::Database(err.into())
    }
}

type StorageResult<T> = Result<T, ServerStorageError>;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

#[derive(sqlx::FromRow)]
struct TagRow {
    tag_id: String,
    name: String,
    color: String,
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    date: String,
    tag_id: String,
}

#[derive(sqlx::FromRow)]
struct GoalRow {
    goal_id: String,
    tag_id: String,
    target_count: i64,
    period: String,
}

#[derive(sqlx::FromRow)]
struct HealthRow {
    avg_cycle_length: i64,
    avg_period_duration: i64,
    last_period_start: Option<String>,
}

#[derive(sqlx::FromRow)]
struct PeriodRow {
    entry_id: String,
    start_date: String,
    end_date: String,
    duration: i64,
    cycle_length: Option<i64>,
}

/// Server-side storage backed by a SQLite pool.
#[derive(Debug, Clone)]
pub struct ServerStorage {
    pool: SqlitePool,
}

impl ServerStorage {
    /// Opens (creating if needed) the database at `path` and runs migrations.
    pub async fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ServerStorageError::IoError(parent.to_path_buf(), e))?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", path.display());
        let options = SqliteConnectOptions::from_str(&db_url)?
            .foreign_keys(true)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        now: i64,
    ) -> StorageResult<i64> {
        if self.find_user(username).await?.is_some() {
            return Err(ServerStorageError::UsernameTaken(username.to_string()));
        }

        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, created_at, last_login) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_user(&self, username: &str) -> StorageResult<Option<UserRow>> {
        let row = sqlx::query_as("SELECT id, username, password_hash FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn record_login(&self, user_id: i64, now: i64) -> StorageResult<()> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(now)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_password(&self, user_id: i64, password_hash: &str) -> StorageResult<()> {
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Removes the user; sessions and tracker data go with it.
    pub async fn delete_user(&self, user_id: i64) -> StorageResult<()> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------

    pub async fn create_session(
        &self,
        user_id: i64,
        token: &str,
        now: i64,
        expires_at: i64,
    ) -> StorageResult<()> {
        sqlx::query(
            "INSERT INTO sessions (user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(token)
        .bind(now)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Returns the user a token belongs to, if the session has not expired.
    pub async fn session_user(&self, token: &str, now: i64) -> StorageResult<Option<i64>> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT user_id FROM sessions WHERE token = ? AND expires_at > ?")
                .bind(token)
                .bind(now)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(id,)| id))
    }

    /// Removes expired sessions. Returns the number removed.
    pub async fn cleanup_sessions(&self, now: i64) -> StorageResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // ------------------------------------------------------------------
    // Tracker data
    // ------------------------------------------------------------------

    /// Loads a user's record: tags and goals in creation order, entries by
    /// date, period entries newest first.
    pub async fn load_user_data(&self, user_id: i64) -> StorageResult<UserData> {
        let tag_rows: Vec<TagRow> = sqlx::query_as(
            "SELECT tag_id, name, color FROM tags WHERE user_id = ? ORDER BY created_at, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let entry_rows: Vec<EntryRow> = sqlx::query_as(
            "SELECT date, tag_id FROM calendar_entries WHERE user_id = ? ORDER BY date, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let goal_rows: Vec<GoalRow> = sqlx::query_as(
            "SELECT goal_id, tag_id, target_count, period FROM goals WHERE user_id = ? ORDER BY created_at, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let health_row: Option<HealthRow> = sqlx::query_as(
            "SELECT avg_cycle_length, avg_period_duration, last_period_start FROM health_settings WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let tags = tag_rows
            .into_iter()
            .map(|row| Tag::new(row.name, row.color).with_id(row.tag_id))
            .collect();

        let mut days: Vec<(chrono::NaiveDate, Vec<String>)> = Vec::new();
        for row in entry_rows {
            let date = parse_stored_date(&row.date)?;
            match days.last_mut() {
                Some((last, ids)) if *last == date => ids.push(row.tag_id),
                _ => days.push((date, vec![row.tag_id])),
            }
        }
        let entries: Entries = days.into_iter().collect();

        let goals = goal_rows
            .into_iter()
            .map(|row| {
                let period = GoalPeriod::from_str(&row.period).map_err(ServerStorageError::Corrupt)?;
                let target = u32::try_from(row.target_count).map_err(|_| {
                    ServerStorageError::Corrupt(format!("goal target {}", row.target_count))
                })?;
                Ok(Goal::new(row.tag_id, target, period).with_id(row.goal_id))
            })
            .collect::<StorageResult<Vec<_>>>()?;

        let health = match health_row {
            Some(row) => Some(self.load_health(user_id, row).await?),
            None => None,
        };

        Ok(UserData {
            tags,
            entries,
            goals,
            health,
        })
    }

    async fn load_health(&self, user_id: i64, row: HealthRow) -> StorageResult<HealthProfile> {
        let period_rows: Vec<PeriodRow> = sqlx::query_as(
            "SELECT entry_id, start_date, end_date, duration, cycle_length FROM period_entries WHERE user_id = ? ORDER BY created_at, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let entries = period_rows
            .into_iter()
            .map(|p| {
                Ok(PeriodEntry {
                    id: p.entry_id,
                    start_date: parse_stored_date(&p.start_date)?,
                    end_date: parse_stored_date(&p.end_date)?,
                    duration: p.duration,
                    cycle_length: p.cycle_length,
                })
            })
            .collect::<StorageResult<Vec<_>>>()?;

        let last_period_start = row
            .last_period_start
            .as_deref()
            .map(parse_stored_date)
            .transpose()?;

        Ok(HealthProfile {
            avg_cycle_length: stored_u32(row.avg_cycle_length)?,
            avg_period_duration: stored_u32(row.avg_period_duration)?,
            last_period_start,
            entries,
        })
    }

    /// Makes the stored record match `data`.
    ///
    /// Tags, goals and period entries are upserted by ID and rows missing
    /// from `data` are deleted. Calendar entries are replaced wholesale. A
    /// `None` health profile leaves stored health data untouched.
    pub async fn apply_sync(&self, user_id: i64, data: &UserData, now: i64) -> StorageResult<()> {
        let mut tx = self.pool.begin().await?;

        sync_tags(&mut tx, user_id, &data.tags, now).await?;
        sync_entries(&mut tx, user_id, &data.entries, now).await?;
        sync_goals(&mut tx, user_id, &data.goals, now).await?;
        if let Some(health) = &data.health {
            sync_health(&mut tx, user_id, health, now).await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

async fn existing_ids(
    tx: &mut Transaction<'_, Sqlite>,
    sql: &str,
    user_id: i64,
) -> StorageResult<HashSet<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(sql)
        .bind(user_id)
        .fetch_all(&mut **tx)
        .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

async fn sync_tags(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: i64,
    tags: &[Tag],
    now: i64,
) -> StorageResult<()> {
    let existing = existing_ids(tx, "SELECT tag_id FROM tags WHERE user_id = ?", user_id).await?;
    let incoming: HashSet<&str> = tags.iter().map(|t| t.id.as_str()).collect();

    for removed in existing.iter().filter(|id| !incoming.contains(id.as_str())) {
        for sql in [
            "DELETE FROM tags WHERE user_id = ? AND tag_id = ?",
            "DELETE FROM calendar_entries WHERE user_id = ? AND tag_id = ?",
            "DELETE FROM goals WHERE user_id = ? AND tag_id = ?",
        ] {
            sqlx::query(sql)
                .bind(user_id)
                .bind(removed)
                .execute(&mut **tx)
                .await?;
        }
    }

    for tag in tags {
        sqlx::query(
            r#"
            INSERT INTO tags (user_id, tag_id, name, color, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (user_id, tag_id) DO UPDATE SET name = excluded.name, color = excluded.color
            "#,
        )
        .bind(user_id)
        .bind(&tag.id)
        .bind(&tag.name)
        .bind(&tag.color)
        .bind(now)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn sync_entries(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: i64,
    entries: &Entries,
    now: i64,
) -> StorageResult<()> {
    sqlx::query("DELETE FROM calendar_entries WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    for (date, ids) in entries.iter() {
        let date = date.to_string();
        for tag_id in ids {
            sqlx::query(
                "INSERT OR IGNORE INTO calendar_entries (user_id, tag_id, date, created_at) VALUES (?, ?, ?, ?)",
            )
            .bind(user_id)
            .bind(tag_id)
            .bind(&date)
            .bind(now)
            .execute(&mut **tx)
            .await?;
        }
    }
    Ok(())
}

async fn sync_goals(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: i64,
    goals: &[Goal],
    now: i64,
) -> StorageResult<()> {
    let existing = existing_ids(tx, "SELECT goal_id FROM goals WHERE user_id = ?", user_id).await?;
    let incoming: HashSet<&str> = goals.iter().map(|g| g.id.as_str()).collect();

    for removed in existing.iter().filter(|id| !incoming.contains(id.as_str())) {
        sqlx::query("DELETE FROM goals WHERE user_id = ? AND goal_id = ?")
            .bind(user_id)
            .bind(removed)
            .execute(&mut **tx)
            .await?;
    }

    for goal in goals {
        sqlx::query(
            r#"
            INSERT INTO goals (user_id, goal_id, tag_id, target_count, period, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id, goal_id) DO UPDATE SET
                tag_id = excluded.tag_id,
                target_count = excluded.target_count,
                period = excluded.period
            "#,
        )
        .bind(user_id)
        .bind(&goal.id)
        .bind(&goal.tag_id)
        .bind(i64::from(goal.target_count))
        .bind(goal.period.to_string())
        .bind(now)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn sync_health(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: i64,
    health: &HealthProfile,
    now: i64,
) -> StorageResult<()> {
    sqlx::query(
        r#"
        INSERT INTO health_settings
            (user_id, avg_cycle_length, avg_period_duration, last_period_start, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (user_id) DO UPDATE SET
            avg_cycle_length = excluded.avg_cycle_length,
            avg_period_duration = excluded.avg_period_duration,
            last_period_start = excluded.last_period_start,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(user_id)
    .bind(i64::from(health.avg_cycle_length))
    .bind(i64::from(health.avg_period_duration))
    .bind(health.last_period_start.map(|d| d.to_string()))
    .bind(now)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    let existing = existing_ids(
        tx,
        "SELECT entry_id FROM period_entries WHERE user_id = ?",
        user_id,
    )
    .await?;
    let incoming: HashSet<&str> = health.entries.iter().map(|e| e.id.as_str()).collect();

    for removed in existing.iter().filter(|id| !incoming.contains(id.as_str())) {
        sqlx::query("DELETE FROM period_entries WHERE user_id = ? AND entry_id = ?")
            .bind(user_id)
            .bind(removed)
            .execute(&mut **tx)
            .await?;
    }

    for entry in &health.entries {
        sqlx::query(
            r#"
            INSERT INTO period_entries
                (user_id, entry_id, start_date, end_date, duration, cycle_length, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id, entry_id) DO UPDATE SET
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                duration = excluded.duration,
                cycle_length = excluded.cycle_length
            "#,
        )
        .bind(user_id)
        .bind(&entry.id)
        .bind(entry.start_date.to_string())
        .bind(entry.end_date.to_string())
        .bind(entry.duration)
        .bind(entry.cycle_length)
        .bind(now)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

fn parse_stored_date(s: &str) -> StorageResult<chrono::NaiveDate> {
    parse_date(s).map_err(|e| ServerStorageError::Corrupt(e.to_string()))
}

fn stored_u32(value: i64) -> StorageResult<u32> {
    u32::try_from(value).map_err(|_| ServerStorageError::Corrupt(format!("value {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    async fn open_storage() -> (TempDir, ServerStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = ServerStorage::open(&temp_dir.path().join("routlin.db"))
            .await
            .unwrap();
        (temp_dir, storage)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_data() -> UserData {
        let mut data = UserData::new();
        data.tags.push(Tag::new("Run", "#FF5252").with_id("t1"));
        data.tags.push(Tag::new("Read", "#2196F3").with_id("t2"));
        data.tags.push(Tag::new("Yoga", "#69F0AE").with_id("t3"));
        data.entries
            .set(date(2024, 1, 1), vec!["t2".into(), "t1".into()]);
        data.entries.set(date(2024, 1, 2), vec!["t1".into()]);
        data.goals
            .push(Goal::new("t1", 3, GoalPeriod::Week).with_id("g1"));
        data.goals
            .push(Goal::new("t3", 10, GoalPeriod::Year).with_id("g2"));
        data
    }

    #[tokio::test]
    async fn test_open_creates_tables() {
        let (_dir, storage) = open_storage().await;

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name NOT LIKE '_sqlx_%' ORDER BY name",
        )
        .fetch_all(&storage.pool)
        .await
        .unwrap();

        let names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        for table in [
            "calendar_entries",
            "goals",
            "health_settings",
            "period_entries",
            "sessions",
            "tags",
            "users",
        ] {
            assert!(names.contains(&table), "missing table {table}");
        }
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicates() {
        let (_dir, storage) = open_storage().await;
        storage.create_user("alice", "hash", 1).await.unwrap();

        let err = storage.create_user("alice", "hash", 2).await.unwrap_err();
        assert!(matches!(err, ServerStorageError::UsernameTaken(_)));

        let user = storage.find_user("alice").await.unwrap().unwrap();
        assert_eq!(user.password_hash, "hash");
        assert!(storage.find_user("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sessions_expire() {
        let (_dir, storage) = open_storage().await;
        let user_id = storage.create_user("alice", "hash", 0).await.unwrap();
        storage.create_session(user_id, "tok", 0, 100).await.unwrap();

        assert_eq!(storage.session_user("tok", 50).await.unwrap(), Some(user_id));
        assert_eq!(storage.session_user("tok", 100).await.unwrap(), None);
        assert_eq!(storage.session_user("other", 50).await.unwrap(), None);

        assert_eq!(storage.cleanup_sessions(100).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sync_round_trip() {
        let (_dir, storage) = open_storage().await;
        let user_id = storage.create_user("alice", "hash", 0).await.unwrap();

        let mut data = sample_data();
        let health = data.health_mut();
        health.setup(date(2024, 1, 1), 28, 5).unwrap();
        health.log_period(date(2024, 1, 30)).unwrap();

        storage.apply_sync(user_id, &data, 10).await.unwrap();
        let loaded = storage.load_user_data(user_id).await.unwrap();

        assert_eq!(loaded.tags, data.tags);
        assert_eq!(loaded.entries, data.entries);
        assert_eq!(loaded.goals, data.goals);

        assert_eq!(loaded.health, data.health);
        assert_eq!(loaded, data);
    }

    #[tokio::test]
    async fn test_sync_keeps_period_entry_order() {
        let (_dir, storage) = open_storage().await;
        let user_id = storage.create_user("alice", "hash", 0).await.unwrap();

        let mut data = UserData::new();
        let health = data.health_mut();
        health.setup(date(2024, 1, 1), 28, 5).unwrap();
        health.log_period(date(2024, 1, 29)).unwrap();
        storage.apply_sync(user_id, &data, 10).await.unwrap();

        data.health_mut().log_period(date(2024, 2, 26)).unwrap();
        storage.apply_sync(user_id, &data, 20).await.unwrap();

        let loaded = storage.load_user_data(user_id).await.unwrap();
        let starts: Vec<_> = loaded
            .health
            .as_ref()
            .unwrap()
            .entries
            .iter()
            .map(|e| e.start_date)
            .collect();
        assert_eq!(
            starts,
            vec![date(2024, 1, 1), date(2024, 1, 29), date(2024, 2, 26)]
        );
        assert_eq!(loaded, data);
    }

    #[tokio::test]
    async fn test_sync_deletes_missing_rows() {
        let (_dir, storage) = open_storage().await;
        let user_id = storage.create_user("alice", "hash", 0).await.unwrap();
        storage
            .apply_sync(user_id, &sample_data(), 10)
            .await
            .unwrap();

        let mut data = sample_data();
        data.delete_tag("t1").unwrap();
        data.tags[0].name = "Books".to_string();
        storage.apply_sync(user_id, &data, 20).await.unwrap();

        let loaded = storage.load_user_data(user_id).await.unwrap();
        let names: Vec<&str> = loaded.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Books", "Yoga"]);
        assert_eq!(loaded.entries.len(), 1);
        assert_eq!(loaded.entries.tags_on(date(2024, 1, 1)), &["t2".to_string()]);
        assert_eq!(loaded.goals.len(), 1);
        assert_eq!(loaded.goals[0].id, "g2");
    }

    #[tokio::test]
    async fn test_health_untouched_without_profile() {
        let (_dir, storage) = open_storage().await;
        let user_id = storage.create_user("alice", "hash", 0).await.unwrap();

        let mut data = UserData::new();
        data.health_mut().setup(date(2024, 2, 1), 30, 4).unwrap();
        storage.apply_sync(user_id, &data, 10).await.unwrap();

        storage
            .apply_sync(user_id, &UserData::new(), 20)
            .await
            .unwrap();
        let loaded = storage.load_user_data(user_id).await.unwrap();
        let health = loaded.health.unwrap();
        assert_eq!(health.avg_cycle_length, 30);
        assert_eq!(health.entries.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let (_dir, storage) = open_storage().await;
        let user_id = storage.create_user("alice", "hash", 0).await.unwrap();
        storage.create_session(user_id, "tok", 0, 100).await.unwrap();
        storage
            .apply_sync(user_id, &sample_data(), 10)
            .await
            .unwrap();

        storage.delete_user(user_id).await.unwrap();

        assert!(storage.find_user("alice").await.unwrap().is_none());
        assert_eq!(storage.session_user("tok", 50).await.unwrap(), None);
        let (tag_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tags")
            .fetch_one(&storage.pool)
            .await
            .unwrap();
        assert_eq!(tag_count, 0);
    }
}
