use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::models::{NewStory, Story, DATE_FORMAT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Author,
    Genre,
    DateStarted,
    DateCompleted,
    Status,
    Chapters,
    WordCount,
    MainCharacter,
    LastUpdated,
    Preview,
    Favorite,
}

impl FormField {
    pub const ALL: [FormField; 12] = [
        FormField::Title,
        FormField::Author,
        FormField::Genre,
        FormField::DateStarted,
        FormField::DateCompleted,
        FormField::Status,
        FormField::Chapters,
        FormField::WordCount,
        FormField::MainCharacter,
        FormField::LastUpdated,
        FormField::Preview,
        FormField::Favorite,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Story Title",
            FormField::Author => "Author",
            FormField::Genre => "Genre",
            FormField::DateStarted => "Date Started",
            FormField::DateCompleted => "Date Completed",
            FormField::Status => "Story Status",
            FormField::Chapters => "Num Chapters",
            FormField::WordCount => "Word Count",
            FormField::MainCharacter => "Main Character",
            FormField::LastUpdated => "Last Updated",
            FormField::Preview => "Preview",
            FormField::Favorite => "Favorite",
        }
    }

    /// Fields picked from a suggestion list rather than typed.
    pub fn is_choice(&self) -> bool {
        matches!(self, FormField::Genre | FormField::Status)
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Text as typed into the story form, plus which field has focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryForm {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub date_started: String,
    pub date_completed: String,
    pub status: String,
    pub chapters: String,
    pub word_count: String,
    pub main_character: String,
    pub last_updated: String,
    pub preview: String,
    pub favorite: bool,
    pub focus: FormField,
}

impl Default for StoryForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            genre: String::new(),
            date_started: String::new(),
            date_completed: String::new(),
            status: String::new(),
            chapters: String::new(),
            word_count: String::new(),
            main_character: String::new(),
            last_updated: String::new(),
            preview: String::new(),
            favorite: false,
            focus: FormField::Title,
        }
    }
}

impl StoryForm {
    pub fn from_story(story: &Story) -> Self {
        let date = |d: Option<NaiveDate>| {
            d.map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default()
        };
        Self {
            title: story.title.clone(),
            author: story.author.clone(),
            genre: story.genre.clone(),
            date_started: date(story.date_started),
            date_completed: date(story.date_completed),
            status: story.status.clone(),
            chapters: story.chapter_count.to_string(),
            word_count: story.word_count.to_string(),
            main_character: story.main_character.clone(),
            last_updated: date(story.last_updated),
            preview: story.preview.clone(),
            favorite: story.favorite,
            focus: FormField::Title,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Display value of a field.
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Author => &self.author,
            FormField::Genre => &self.genre,
            FormField::DateStarted => &self.date_started,
            FormField::DateCompleted => &self.date_completed,
            FormField::Status => &self.status,
            FormField::Chapters => &self.chapters,
            FormField::WordCount => &self.word_count,
            FormField::MainCharacter => &self.main_character,
            FormField::LastUpdated => &self.last_updated,
            FormField::Preview => &self.preview,
            FormField::Favorite => {
                if self.favorite {
                    "[★]"
                } else {
                    "[ ]"
                }
            }
        }
    }

    fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Title => Some(&mut self.title),
            FormField::Author => Some(&mut self.author),
            FormField::DateStarted => Some(&mut self.date_started),
            FormField::DateCompleted => Some(&mut self.date_completed),
            FormField::Chapters => Some(&mut self.chapters),
            FormField::WordCount => Some(&mut self.word_count),
            FormField::MainCharacter => Some(&mut self.main_character),
            FormField::LastUpdated => Some(&mut self.last_updated),
            FormField::Preview => Some(&mut self.preview),
            FormField::Genre | FormField::Status | FormField::Favorite => None,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn input_char(&mut self, c: char) {
        if self.focus == FormField::Favorite {
            if c == ' ' {
                self.favorite = !self.favorite;
            }
            return;
        }
        if let Some(text) = self.text_mut(self.focus) {
            text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            FormField::Genre => self.genre.clear(),
            FormField::Status => self.status.clear(),
            field => {
                if let Some(text) = self.text_mut(field) {
                    text.pop();
                }
            }
        }
    }

    /// Steps the focused choice field through `options`, with an empty slot
    /// between the last and first option.
    pub fn cycle_choice(&mut self, options: &[String], forward: bool) {
        let current = match self.focus {
            FormField::Genre => &mut self.genre,
            FormField::Status => &mut self.status,
            FormField::Favorite => {
                self.favorite = !self.favorite;
                return;
            }
            _ => return,
        };

        // Slot 0 is empty, slots 1..=len are the options.
        let slots = options.len() + 1;
        let position = options
            .iter()
            .position(|o| o == current)
            .map(|i| i + 1)
            .unwrap_or(0);
        let next = if forward {
            (position + 1) % slots
        } else {
            (position + slots - 1) % slots
        };
        *current = if next == 0 {
            String::new()
        } else {
            options[next - 1].clone()
        };
    }

    /// Validates the form. Bad dates and a blank title are errors; bad counts become zero.
    pub fn to_new_story(&self) -> Result<NewStory> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Story title is required.".to_string()));
        }

        Ok(NewStory {
            favorite: self.favorite,
            title: title.to_string(),
            author: self.author.trim().to_string(),
            genre: self.genre.clone(),
            date_started: parse_date_field("Date Started", &self.date_started)?,
            date_completed: parse_date_field("Date Completed", &self.date_completed)?,
            status: self.status.clone(),
            chapter_count: parse_count(&self.chapters),
            word_count: parse_count(&self.word_count),
            main_character: self.main_character.trim().to_string(),
            last_updated: parse_date_field("Last Updated", &self.last_updated)?,
            preview: self.preview.clone(),
        })
    }
}

/// Parses an optional date typed by the user; blank means no date.
pub fn parse_date_field(field: &'static str, value: &str) -> Result<Option<NaiveDate>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(Some)
        .map_err(|_| AppError::InvalidDate {
            field,
            value: value.to_string(),
        })
}

/// Non-numeric, negative, or oversized counts are treated as zero.
pub fn parse_count(value: &str) -> u32 {
    value.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_counts_are_coerced_to_zero() {
        assert_eq!(parse_count("12"), 12);
        assert_eq!(parse_count(" 7 "), 7);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("abc"), 0);
        assert_eq!(parse_count("-3"), 0);
        assert_eq!(parse_count("99999999999"), 0);
    }

    #[test]
    fn test_dates_are_validated() {
        assert_eq!(parse_date_field("Date Started", "  ").unwrap(), None);
        assert_eq!(
            parse_date_field("Date Started", "2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );

        let err = parse_date_field("Date Started", "2023-02-29").unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidDate { field: "Date Started", ref value } if value == "2023-02-29"
        ));
        assert!(parse_date_field("Last Updated", "yesterday").is_err());
    }

    #[test]
    fn test_to_new_story() {
        let form = StoryForm {
            title: "  Moonfall ".to_string(),
            author: "Ada".to_string(),
            genre: "Fantasy".to_string(),
            date_started: "2025-03-01".to_string(),
            status: "Ongoing".to_string(),
            chapters: "twelve".to_string(),
            word_count: "5400".to_string(),
            favorite: true,
            ..StoryForm::default()
        };

        let story = form.to_new_story().unwrap();
        assert_eq!(story.title, "Moonfall");
        assert_eq!(story.chapter_count, 0);
        assert_eq!(story.word_count, 5400);
        assert_eq!(story.date_started, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(story.date_completed, None);
        assert!(story.favorite);
    }

    #[test]
    fn test_blank_title_is_rejected() {
        let form = StoryForm {
            title: "   ".to_string(),
            ..StoryForm::default()
        };
        assert!(matches!(form.to_new_story(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_bad_date_rejects_whole_form() {
        let form = StoryForm {
            title: "Ok".to_string(),
            date_completed: "03/04/2025".to_string(),
            ..StoryForm::default()
        };
        let err = form.to_new_story().unwrap_err();
        assert!(err.is_user_input());
        assert!(err.to_string().contains("Date Completed"));
    }

    #[test]
    fn test_from_story_fills_every_field() {
        let story = Story {
            id: 3,
            favorite: true,
            title: "Tide".to_string(),
            author: "Bo".to_string(),
            genre: "Drama".to_string(),
            date_started: NaiveDate::from_ymd_opt(2024, 5, 6),
            date_completed: None,
            status: "Hiatus".to_string(),
            chapter_count: 4,
            word_count: 800,
            main_character: "Wren".to_string(),
            last_updated: NaiveDate::from_ymd_opt(2024, 6, 1),
            preview: "Salt.".to_string(),
        };

        let form = StoryForm::from_story(&story);
        assert_eq!(form.date_started, "2024-05-06");
        assert_eq!(form.date_completed, "");
        assert_eq!(form.chapters, "4");
        assert_eq!(form.value(FormField::Favorite), "[★]");
        assert_eq!(form.to_new_story().unwrap(), NewStory::from(&story));
    }

    #[test]
    fn test_typing_goes_to_focused_field() {
        let mut form = StoryForm::default();
        for c in "Hi".chars() {
            form.input_char(c);
        }
        form.focus_next();
        form.input_char('A');
        form.backspace();
        form.input_char('B');
        assert_eq!(form.title, "Hi");
        assert_eq!(form.author, "B");

        // Choice fields ignore typing.
        form.focus_next();
        form.input_char('x');
        assert_eq!(form.genre, "");

        form.focus = FormField::Favorite;
        form.input_char(' ');
        assert!(form.favorite);
    }

    #[test]
    fn test_focus_wraps() {
        let mut form = StoryForm::default();
        form.focus_prev();
        assert_eq!(form.focus, FormField::Favorite);
        form.focus_next();
        assert_eq!(form.focus, FormField::Title);
    }

    #[test]
    fn test_cycle_choice_passes_through_empty() {
        let statuses = options(&["Ongoing", "Completed", "Hiatus"]);
        let mut form = StoryForm {
            focus: FormField::Status,
            ..StoryForm::default()
        };

        form.cycle_choice(&statuses, true);
        assert_eq!(form.status, "Ongoing");
        form.cycle_choice(&statuses, false);
        assert_eq!(form.status, "");
        form.cycle_choice(&statuses, false);
        assert_eq!(form.status, "Hiatus");
        form.cycle_choice(&statuses, true);
        assert_eq!(form.status, "");

        // Free text from the database is replaced by the first option.
        form.status = "Abandoned".to_string();
        form.cycle_choice(&statuses, true);
        assert_eq!(form.status, "Ongoing");
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut form = StoryForm {
            title: "x".to_string(),
            favorite: true,
            focus: FormField::Preview,
            ..StoryForm::default()
        };
        form.clear();
        assert_eq!(form, StoryForm::default());
    }
}
