use chrono::NaiveDate;
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::{NewStory, StreakState, Story, DATE_FORMAT};

use super::schema::SCHEMA;

const STORY_COLUMNS: &str = "id, favorite, title, author, genre, date_started, date_completed, \
     status, num_chapters, word_count, main_character, last_updated, preview";

pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;
        Self::with_connection(conn).await
    }

    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::with_connection(conn).await
    }

    async fn with_connection(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            register_fold_case(conn)?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    // Story operations

    pub async fn create_story(&self, story: NewStory) -> Result<i64> {
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO stories (favorite, title, author, genre, date_started, date_completed,
                                           status, num_chapters, word_count, main_character, last_updated, preview)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"#,
                    params![
                        story.favorite,
                        story.title,
                        story.author,
                        story.genre,
                        story.date_started.map(format_date),
                        story.date_completed.map(format_date),
                        story.status,
                        story.chapter_count,
                        story.word_count,
                        story.main_character,
                        story.last_updated.map(format_date),
                        story.preview,
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        Ok(id)
    }

    /// Overwrites every mutable field of story `id`. Returns false if no such story exists.
    pub async fn update_story(&self, id: i64, story: NewStory) -> Result<bool> {
        let changed = self
            .conn
            .call(move |conn| {
                let changed = conn.execute(
                    r#"UPDATE stories
                       SET favorite = ?1, title = ?2, author = ?3, genre = ?4,
                           date_started = ?5, date_completed = ?6, status = ?7,
                           num_chapters = ?8, word_count = ?9, main_character = ?10,
                           last_updated = ?11, preview = ?12
                       WHERE id = ?13"#,
                    params![
                        story.favorite,
                        story.title,
                        story.author,
                        story.genre,
                        story.date_started.map(format_date),
                        story.date_completed.map(format_date),
                        story.status,
                        story.chapter_count,
                        story.word_count,
                        story.main_character,
                        story.last_updated.map(format_date),
                        story.preview,
                        id,
                    ],
                )?;
                Ok(changed)
            })
            .await?;
        Ok(changed > 0)
    }

    pub async fn delete_story(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .call(move |conn| {
                let changed = conn.execute("DELETE FROM stories WHERE id = ?1", params![id])?;
                Ok(changed)
            })
            .await?;
        Ok(changed > 0)
    }

    pub async fn set_favorite(&self, id: i64, favorite: bool) -> Result<bool> {
        let changed = self
            .conn
            .call(move |conn| {
                let changed = conn.execute(
                    "UPDATE stories SET favorite = ?1 WHERE id = ?2",
                    params![favorite, id],
                )?;
                Ok(changed)
            })
            .await?;
        Ok(changed > 0)
    }

    pub async fn get_story(&self, id: i64) -> Result<Option<Story>> {
        let story = self
            .conn
            .call(move |conn| {
                let mut stmt =
                    conn.prepare(&format!("SELECT {STORY_COLUMNS} FROM stories WHERE id = ?1"))?;
                let story = stmt.query_row(params![id], story_from_row).optional()?;
                Ok(story)
            })
            .await?;
        Ok(story)
    }

    pub async fn list_stories(&self) -> Result<Vec<Story>> {
        let stories = self
            .conn
            .call(|conn| {
                let mut stmt =
                    conn.prepare(&format!("SELECT {STORY_COLUMNS} FROM stories ORDER BY id"))?;
                let stories = stmt
                    .query_map([], story_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(stories)
            })
            .await?;
        Ok(stories)
    }

    /// Stories whose title or author contains `term`, ignoring case.
    /// A blank term lists everything.
    pub async fn search_stories(&self, term: &str) -> Result<Vec<Story>> {
        if term.trim().is_empty() {
            return self.list_stories().await;
        }

        let needle = term.to_lowercase();
        let stories = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    r#"SELECT {STORY_COLUMNS} FROM stories
                       WHERE instr(fold_case(title), ?1) > 0 OR instr(fold_case(author), ?1) > 0
                       ORDER BY id"#
                ))?;
                let stories = stmt
                    .query_map(params![needle], story_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(stories)
            })
            .await?;
        Ok(stories)
    }

    // Streak operations

    pub async fn get_streak(&self) -> Result<StreakState> {
        let streak = self
            .conn
            .call(|conn| {
                let streak = conn
                    .query_row(
                        "SELECT last_read_date, current_streak, longest_streak FROM reading_streak WHERE id = 1",
                        [],
                        |row| {
                            Ok(StreakState {
                                last_read_date: row
                                    .get::<_, Option<String>>(0)?
                                    .and_then(|s| parse_date(&s)),
                                current_streak: row.get(1)?,
                                longest_streak: row.get(2)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(streak.unwrap_or_default())
            })
            .await?;
        Ok(streak)
    }

    pub async fn save_streak(&self, streak: StreakState) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO reading_streak (id, last_read_date, current_streak, longest_streak)
                       VALUES (1, ?1, ?2, ?3)
                       ON CONFLICT(id) DO UPDATE SET
                           last_read_date = excluded.last_read_date,
                           current_streak = excluded.current_streak,
                           longest_streak = excluded.longest_streak"#,
                    params![
                        streak.last_read_date.map(format_date),
                        streak.current_streak,
                        streak.longest_streak,
                    ],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Registers `fold_case(text)`, a Unicode-aware lowercase; SQLite's own `lower` only folds ASCII.
fn register_fold_case(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "fold_case",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )
}

fn story_from_row(row: &Row) -> rusqlite::Result<Story> {
    Ok(Story {
        id: row.get(0)?,
        favorite: row.get(1)?,
        title: row.get(2)?,
        author: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        genre: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        date_started: row
            .get::<_, Option<String>>(5)?
            .and_then(|s| parse_date(&s)),
        date_completed: row
            .get::<_, Option<String>>(6)?
            .and_then(|s| parse_date(&s)),
        status: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        chapter_count: row.get::<_, Option<u32>>(8)?.unwrap_or(0),
        word_count: row.get::<_, Option<u32>>(9)?.unwrap_or(0),
        main_character: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
        last_updated: row
            .get::<_, Option<String>>(11)?
            .and_then(|s| parse_date(&s)),
        preview: row.get::<_, Option<String>>(12)?.unwrap_or_default(),
    })
}
