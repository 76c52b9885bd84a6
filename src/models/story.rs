use chrono::NaiveDate;
use serde::Serialize;

/// Format used for dates in the form, on the command line, and in the database.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Story {
    pub id: i64,
    pub favorite: bool,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub date_started: Option<NaiveDate>,
    pub date_completed: Option<NaiveDate>,
    pub status: String,
    pub chapter_count: u32,
    pub word_count: u32,
    pub main_character: String,
    pub last_updated: Option<NaiveDate>,
    pub preview: String,
}

/// Every mutable field of a story; the input of create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewStory {
    pub favorite: bool,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub date_started: Option<NaiveDate>,
    pub date_completed: Option<NaiveDate>,
    pub status: String,
    pub chapter_count: u32,
    pub word_count: u32,
    pub main_character: String,
    pub last_updated: Option<NaiveDate>,
    pub preview: String,
}

impl Story {
    pub fn favorite_icon(&self) -> &'static str {
        if self.favorite {
            "★"
        } else {
            ""
        }
    }
}

impl From<&Story> for NewStory {
    fn from(story: &Story) -> Self {
        Self {
            favorite: story.favorite,
            title: story.title.clone(),
            author: story.author.clone(),
            genre: story.genre.clone(),
            date_started: story.date_started,
            date_completed: story.date_completed,
            status: story.status.clone(),
            chapter_count: story.chapter_count,
            word_count: story.word_count,
            main_character: story.main_character.clone(),
            last_updated: story.last_updated,
            preview: story.preview.clone(),
        }
    }
}
