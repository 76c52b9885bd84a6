use chrono::NaiveDate;

use crate::config::Config;
use crate::db::Repository;
use crate::error::Result;
use crate::form::{FormField, StoryForm};
use crate::models::{ReadOutcome, StreakState, Story};
use crate::streak::StreakTracker;
use crate::tui::AppAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Browse,
    Edit,
    Search,
    ConfirmDelete,
    Reading,
    Library,
    Chapter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// A message shown over everything else until the next key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

pub struct App {
    // Data
    pub stories: Vec<Story>,
    pub library: Vec<Story>,
    pub reading: Option<Story>,

    // UI State
    pub cursor: usize,
    pub selected_id: Option<i64>,
    pub form: StoryForm,
    pub mode: Mode,
    pub show_help: bool,
    pub notice: Option<Notice>,
    pub search_input: String,
    pub active_search: Option<String>,
    pub chapter_input: String,
    pub genres: Vec<String>,
    pub statuses: Vec<String>,

    // Services
    pub repository: Repository,
    streak: StreakTracker,
}

impl App {
    pub async fn new(config: &Config) -> Result<Self> {
        let repository = Repository::new(&config.db_path).await?;
        Self::with_repository(repository, config).await
    }

    pub async fn with_repository(repository: Repository, config: &Config) -> Result<Self> {
        let stories = repository.list_stories().await?;
        let streak = StreakTracker::load(&repository).await?;

        Ok(Self {
            stories,
            library: Vec::new(),
            reading: None,
            cursor: 0,
            selected_id: None,
            form: StoryForm::default(),
            mode: Mode::Browse,
            show_help: false,
            notice: None,
            search_input: String::new(),
            active_search: None,
            chapter_input: String::new(),
            genres: config.genres.clone(),
            statuses: config.statuses.clone(),
            repository,
            streak,
        })
    }

    pub fn cursor_story(&self) -> Option<&Story> {
        self.stories.get(self.cursor)
    }

    pub fn selected_story(&self) -> Option<&Story> {
        let id = self.selected_id?;
        self.stories.iter().find(|s| s.id == id)
    }

    pub fn streak(&self) -> &StreakState {
        self.streak.state()
    }

    pub fn total_words(&self) -> u64 {
        self.stories.iter().map(|s| u64::from(s.word_count)).sum()
    }

    pub async fn handle_action(&mut self, action: AppAction) -> Result<bool> {
        match action {
            AppAction::Quit => return Ok(true),

            AppAction::MoveUp => {
                self.cursor = self.cursor.saturating_sub(1);
            }

            AppAction::MoveDown => {
                if self.cursor + 1 < self.stories.len() {
                    self.cursor += 1;
                }
            }

            AppAction::MoveToTop => {
                self.cursor = 0;
            }

            AppAction::MoveToBottom => {
                self.cursor = self.stories.len().saturating_sub(1);
            }

            AppAction::SelectStory => self.select_cursor_story(),

            AppAction::EditForm => {
                self.mode = Mode::Edit;
            }

            AppAction::CreateStory => self.create_story().await?,

            AppAction::UpdateStory => self.update_selected_story().await?,

            AppAction::StartSearch => {
                self.search_input = self.active_search.clone().unwrap_or_default();
                self.mode = Mode::Search;
            }

            AppAction::ClearForm => {
                self.form.clear();
                self.selected_id = None;
            }

            AppAction::DeleteStory => {
                if self.require_selection("Delete", "delete").is_some() {
                    self.mode = Mode::ConfirmDelete;
                }
            }

            AppAction::ConfirmDelete => {
                self.mode = Mode::Browse;
                self.delete_selected_story().await?;
            }

            AppAction::CancelDelete => {
                self.mode = Mode::Browse;
            }

            AppAction::ToggleFavorite => self.toggle_favorite().await?,

            AppAction::ReadStory => {
                let today = chrono::Local::now().date_naive();
                self.read_selected_story(today).await?;
            }

            AppAction::AddToLibrary => self.add_to_library(),

            AppAction::OpenLibrary => {
                if self.library.is_empty() {
                    self.inform("Library", "Your library is empty.");
                } else {
                    self.mode = Mode::Library;
                }
            }

            AppAction::NewChapter => {
                if self.require_selection("New Chapter", "").is_some() {
                    self.chapter_input.clear();
                    self.mode = Mode::Chapter;
                }
            }

            AppAction::CloseView => {
                self.reading = None;
                self.mode = Mode::Browse;
            }

            AppAction::ShowHelp => {
                self.show_help = true;
            }

            AppAction::HideHelp => {
                self.show_help = false;
            }

            AppAction::DismissNotice => {
                self.notice = None;
            }

            // Form editing
            AppAction::FormChar(c) => self.form.input_char(c),

            AppAction::FormBackspace => self.form.backspace(),

            AppAction::FormNextField => self.form.focus_next(),

            AppAction::FormPrevField => self.form.focus_prev(),

            AppAction::FormCycleNext => {
                let options = self.choices_for_focus();
                self.form.cycle_choice(&options, true);
            }

            AppAction::FormCyclePrev => {
                let options = self.choices_for_focus();
                self.form.cycle_choice(&options, false);
            }

            AppAction::FormDone => {
                self.mode = Mode::Browse;
            }

            // Search input
            AppAction::SearchChar(c) => self.search_input.push(c),

            AppAction::SearchBackspace => {
                self.search_input.pop();
            }

            AppAction::SearchConfirm => {
                self.mode = Mode::Browse;
                let term = std::mem::take(&mut self.search_input);
                self.search(&term).await?;
            }

            AppAction::SearchCancel => {
                self.mode = Mode::Browse;
                self.search_input.clear();
            }

            // Chapter input
            AppAction::ChapterChar(c) => self.chapter_input.push(c),

            AppAction::ChapterNewline => self.chapter_input.push('\n'),

            AppAction::ChapterBackspace => {
                self.chapter_input.pop();
            }

            AppAction::ChapterConfirm => self.save_chapter(),

            AppAction::ChapterCancel => {
                self.chapter_input.clear();
                self.mode = Mode::Browse;
            }
        }

        Ok(false)
    }

    fn choices_for_focus(&self) -> Vec<String> {
        match self.form.focus {
            FormField::Genre => self.genres.clone(),
            FormField::Status => self.statuses.clone(),
            _ => Vec::new(),
        }
    }

    fn inform(&mut self, title: &str, message: impl Into<String>) {
        self.notice = Some(Notice {
            level: NoticeLevel::Info,
            title: title.to_string(),
            message: message.into(),
        });
    }

    fn warn(&mut self, title: &str, message: impl Into<String>) {
        self.notice = Some(Notice {
            level: NoticeLevel::Warning,
            title: title.to_string(),
            message: message.into(),
        });
    }

    /// Returns the selected story id, or shows a warning when nothing is selected.
    fn require_selection(&mut self, title: &str, verb: &str) -> Option<i64> {
        if let Some(id) = self.selected_story().map(|s| s.id) {
            return Some(id);
        }
        let message = if verb.is_empty() {
            "Please select a story first.".to_string()
        } else {
            format!("Please select a story to {verb}.")
        };
        self.warn(title, message);
        None
    }

    fn select_cursor_story(&mut self) {
        let Some(story) = self.cursor_story() else {
            return;
        };
        let (id, form) = (story.id, StoryForm::from_story(story));
        self.form = form;
        self.selected_id = Some(id);
    }

    async fn reload_stories(&mut self) -> Result<()> {
        self.stories = self.repository.list_stories().await?;
        self.active_search = None;
        self.after_reload();
        Ok(())
    }

    fn after_reload(&mut self) {
        if self.cursor >= self.stories.len() {
            self.cursor = self.stories.len().saturating_sub(1);
        }
        if self.selected_story().is_none() {
            self.selected_id = None;
        }
    }

    async fn create_story(&mut self) -> Result<()> {
        let story = match self.form.to_new_story() {
            Ok(story) => story,
            Err(e) if e.is_user_input() => {
                tracing::warn!("Rejected new story: {}", e);
                self.warn("Create", e.to_string());
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let id = self.repository.create_story(story).await?;
        tracing::info!("Created story {}", id);

        self.reload_stories().await?;
        self.form.clear();
        self.selected_id = None;
        self.inform("Success", "Story created!");
        Ok(())
    }

    async fn update_selected_story(&mut self) -> Result<()> {
        let Some(id) = self.require_selection("Update", "update") else {
            return Ok(());
        };

        let story = match self.form.to_new_story() {
            Ok(story) => story,
            Err(e) if e.is_user_input() => {
                tracing::warn!("Rejected update of story {}: {}", id, e);
                self.warn("Update", e.to_string());
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let updated = self.repository.update_story(id, story).await?;
        self.reload_stories().await?;

        if updated {
            tracing::info!("Updated story {}", id);
            self.inform("Success", "Story updated!");
        } else {
            self.warn("Update", "That story no longer exists.");
        }
        Ok(())
    }

    async fn delete_selected_story(&mut self) -> Result<()> {
        let Some(id) = self.require_selection("Delete", "delete") else {
            return Ok(());
        };

        if self.repository.delete_story(id).await? {
            tracing::info!("Deleted story {}", id);
        } else {
            self.warn("Delete", "That story no longer exists.");
        }

        self.library.retain(|s| s.id != id);
        self.reload_stories().await?;
        self.form.clear();
        self.selected_id = None;
        Ok(())
    }

    async fn toggle_favorite(&mut self) -> Result<()> {
        let Some(id) = self.require_selection("Favorite", "mark") else {
            return Ok(());
        };
        let favorite = !self.selected_story().is_some_and(|s| s.favorite);

        if !self.repository.set_favorite(id, favorite).await? {
            self.warn("Favorite", "That story no longer exists.");
            return self.reload_stories().await;
        }
        self.form.favorite = favorite;

        // Keep the search results on screen, only refreshing the flag.
        for story in self.stories.iter_mut().filter(|s| s.id == id) {
            story.favorite = favorite;
        }
        Ok(())
    }

    pub async fn search(&mut self, term: &str) -> Result<()> {
        self.stories = self.repository.search_stories(term).await?;
        self.active_search = (!term.trim().is_empty()).then(|| term.to_string());
        self.cursor = 0;
        self.after_reload();
        tracing::debug!("Search '{}' matched {} stories", term, self.stories.len());
        Ok(())
    }

    /// Records a read for the selected story on `today` and opens the reading view.
    pub async fn read_selected_story(&mut self, today: NaiveDate) -> Result<()> {
        let Some(id) = self.require_selection("Read Story", "") else {
            return Ok(());
        };

        let Some(story) = self.repository.get_story(id).await? else {
            self.warn("Read Story", "That story no longer exists.");
            return self.reload_stories().await;
        };

        if let ReadOutcome::AlreadyCounted(_) = self.record_read(today).await? {
            self.inform("Streak", "Today's read is already counted.");
        }

        self.reading = Some(story);
        self.mode = Mode::Reading;
        Ok(())
    }

    /// Counts a read on `today` toward the streak, persisting the new state.
    pub async fn record_read(&mut self, today: NaiveDate) -> Result<ReadOutcome> {
        self.streak.record_read(&self.repository, today).await
    }

    fn add_to_library(&mut self) {
        let Some(id) = self.require_selection("Library", "add") else {
            return;
        };
        let Some(story) = self.selected_story().cloned() else {
            return;
        };

        if self.library.iter().any(|s| s.id == id) {
            self.inform("Library", format!("'{}' is already in your library.", story.title));
        } else {
            self.inform("Library", format!("'{}' added to your library.", story.title));
            self.library.push(story);
        }
    }

    fn save_chapter(&mut self) {
        if self.chapter_input.trim().is_empty() {
            self.warn("New Chapter", "Chapter is empty.");
            return;
        }

        let title = self
            .selected_story()
            .map(|s| s.title.clone())
            .unwrap_or_default();
        self.chapter_input.clear();
        self.mode = Mode::Browse;
        self.inform(
            "New Chapter",
            format!("Chapter drafted for '{title}'. Chapter text is not stored."),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewStory;

    fn test_config() -> Config {
        Config {
            db_path: ":memory:".to_string(),
            genres: vec!["Fantasy".to_string(), "Horror".to_string()],
            statuses: vec!["Ongoing".to_string(), "Completed".to_string()],
        }
    }

    async fn test_app() -> App {
        let repository = Repository::open_in_memory().await.unwrap();
        App::with_repository(repository, &test_config()).await.unwrap()
    }

    async fn seed(app: &mut App, titles: &[(&str, &str)]) {
        for (title, author) in titles {
            app.repository
                .create_story(NewStory {
                    title: title.to_string(),
                    author: author.to_string(),
                    ..NewStory::default()
                })
                .await
                .unwrap();
        }
        app.reload_stories().await.unwrap();
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn notice_level(app: &App) -> Option<NoticeLevel> {
        app.notice.as_ref().map(|n| n.level)
    }

    #[tokio::test]
    async fn test_create_from_form() {
        let mut app = test_app().await;
        app.form.title = "Moonfall".to_string();
        app.form.chapters = "many".to_string();

        app.handle_action(AppAction::CreateStory).await.unwrap();

        assert_eq!(app.stories.len(), 1);
        assert_eq!(app.stories[0].title, "Moonfall");
        assert_eq!(app.stories[0].chapter_count, 0);
        assert_eq!(app.form, StoryForm::default());
        assert_eq!(notice_level(&app), Some(NoticeLevel::Info));
    }

    #[tokio::test]
    async fn test_create_with_bad_date_warns_and_writes_nothing() {
        let mut app = test_app().await;
        app.form.title = "Moonfall".to_string();
        app.form.date_started = "someday".to_string();

        app.handle_action(AppAction::CreateStory).await.unwrap();

        assert!(app.stories.is_empty());
        assert_eq!(notice_level(&app), Some(NoticeLevel::Warning));
        assert_eq!(app.form.title, "Moonfall");
    }

    #[tokio::test]
    async fn test_actions_without_selection_warn() {
        let mut app = test_app().await;
        seed(&mut app, &[("One", "A")]).await;

        for action in [
            AppAction::UpdateStory,
            AppAction::DeleteStory,
            AppAction::ToggleFavorite,
            AppAction::ReadStory,
            AppAction::AddToLibrary,
            AppAction::NewChapter,
        ] {
            app.notice = None;
            app.handle_action(action).await.unwrap();
            assert_eq!(notice_level(&app), Some(NoticeLevel::Warning));
            assert_eq!(app.mode, Mode::Browse);
        }

        let notice = app.notice.clone().unwrap();
        assert_eq!(notice.message, "Please select a story first.");
        assert!(!app.stories[0].favorite);
        assert_eq!(app.streak().current_streak, 0);
    }

    #[tokio::test]
    async fn test_select_then_update() {
        let mut app = test_app().await;
        seed(&mut app, &[("One", "A"), ("Two", "B")]).await;

        app.handle_action(AppAction::MoveDown).await.unwrap();
        app.handle_action(AppAction::SelectStory).await.unwrap();
        assert_eq!(app.form.title, "Two");
        let id = app.selected_id.unwrap();

        app.form.title = "Two, Revised".to_string();
        app.form.word_count = "1500".to_string();
        app.handle_action(AppAction::UpdateStory).await.unwrap();

        let story = app.stories.iter().find(|s| s.id == id).unwrap();
        assert_eq!(story.title, "Two, Revised");
        assert_eq!(story.word_count, 1500);
        assert_eq!(app.stories.len(), 2);
        assert_eq!(app.notice.as_ref().unwrap().message, "Story updated!");
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let mut app = test_app().await;
        seed(&mut app, &[("One", "A"), ("Two", "B")]).await;
        app.handle_action(AppAction::SelectStory).await.unwrap();
        let id = app.selected_id.unwrap();

        app.handle_action(AppAction::DeleteStory).await.unwrap();
        assert_eq!(app.mode, Mode::ConfirmDelete);
        app.handle_action(AppAction::CancelDelete).await.unwrap();
        assert_eq!(app.stories.len(), 2);

        app.handle_action(AppAction::DeleteStory).await.unwrap();
        app.handle_action(AppAction::ConfirmDelete).await.unwrap();
        assert_eq!(app.mode, Mode::Browse);
        assert!(app.stories.iter().all(|s| s.id != id));
        assert_eq!(app.selected_id, None);
        assert_eq!(app.form, StoryForm::default());
    }

    #[tokio::test]
    async fn test_toggle_favorite() {
        let mut app = test_app().await;
        seed(&mut app, &[("One", "A")]).await;
        app.handle_action(AppAction::SelectStory).await.unwrap();

        app.handle_action(AppAction::ToggleFavorite).await.unwrap();
        assert!(app.stories[0].favorite);
        assert!(app.form.favorite);
        let id = app.stories[0].id;
        assert!(app.repository.get_story(id).await.unwrap().unwrap().favorite);

        app.handle_action(AppAction::ToggleFavorite).await.unwrap();
        assert!(!app.stories[0].favorite);
    }

    #[tokio::test]
    async fn test_search_and_clear_search() {
        let mut app = test_app().await;
        seed(&mut app, &[("Dune", "Herbert"), ("Emma", "Austen"), ("Persuasion", "Austen")]).await;

        app.handle_action(AppAction::StartSearch).await.unwrap();
        assert_eq!(app.mode, Mode::Search);
        for c in "AUSTEN".chars() {
            app.handle_action(AppAction::SearchChar(c)).await.unwrap();
        }
        app.handle_action(AppAction::SearchConfirm).await.unwrap();

        let titles: Vec<&str> = app.stories.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Emma", "Persuasion"]);
        assert_eq!(app.active_search.as_deref(), Some("AUSTEN"));

        app.handle_action(AppAction::StartSearch).await.unwrap();
        assert_eq!(app.search_input, "AUSTEN");
        app.search_input.clear();
        app.handle_action(AppAction::SearchConfirm).await.unwrap();
        assert_eq!(app.stories.len(), 3);
        assert_eq!(app.active_search, None);
    }

    #[tokio::test]
    async fn test_search_term_spaces_are_kept() {
        let mut app = test_app().await;
        seed(&mut app, &[("The Silver Key", "A"), ("Key Largo", "B")]).await;

        app.search(" key").await.unwrap();
        assert_eq!(app.stories.len(), 1);
        assert_eq!(app.stories[0].title, "The Silver Key");
        assert_eq!(app.active_search.as_deref(), Some(" key"));

        app.search("  ").await.unwrap();
        assert_eq!(app.stories.len(), 2);
        assert_eq!(app.active_search, None);
    }

    #[tokio::test]
    async fn test_read_updates_streak_and_opens_view() {
        let mut app = test_app().await;
        seed(&mut app, &[("One", "A")]).await;
        app.handle_action(AppAction::SelectStory).await.unwrap();

        app.read_selected_story(day(2025, 5, 1)).await.unwrap();
        assert_eq!(app.mode, Mode::Reading);
        assert_eq!(app.reading.as_ref().unwrap().title, "One");
        assert_eq!(app.streak().current_streak, 1);
        assert!(app.notice.is_none());

        app.handle_action(AppAction::CloseView).await.unwrap();
        app.read_selected_story(day(2025, 5, 2)).await.unwrap();
        assert_eq!(app.streak().current_streak, 2);

        app.read_selected_story(day(2025, 5, 2)).await.unwrap();
        assert_eq!(app.streak().current_streak, 2);
        assert_eq!(
            app.notice.as_ref().unwrap().message,
            "Today's read is already counted."
        );
        assert_eq!(app.mode, Mode::Reading);

        app.read_selected_story(day(2025, 5, 5)).await.unwrap();
        assert_eq!(app.streak().current_streak, 1);
        assert_eq!(app.streak().longest_streak, 2);
    }

    #[tokio::test]
    async fn test_library_is_session_only_and_deduplicated() {
        let mut app = test_app().await;
        seed(&mut app, &[("One", "A")]).await;

        app.handle_action(AppAction::OpenLibrary).await.unwrap();
        assert_eq!(app.notice.as_ref().unwrap().message, "Your library is empty.");
        assert_eq!(app.mode, Mode::Browse);

        app.handle_action(AppAction::SelectStory).await.unwrap();
        app.handle_action(AppAction::AddToLibrary).await.unwrap();
        app.handle_action(AppAction::AddToLibrary).await.unwrap();
        assert_eq!(app.library.len(), 1);
        assert!(app.notice.as_ref().unwrap().message.contains("already"));

        app.handle_action(AppAction::OpenLibrary).await.unwrap();
        assert_eq!(app.mode, Mode::Library);
    }

    #[tokio::test]
    async fn test_new_chapter_rejects_empty_text() {
        let mut app = test_app().await;
        seed(&mut app, &[("One", "A")]).await;
        app.handle_action(AppAction::SelectStory).await.unwrap();

        app.handle_action(AppAction::NewChapter).await.unwrap();
        assert_eq!(app.mode, Mode::Chapter);
        app.handle_action(AppAction::ChapterChar(' ')).await.unwrap();
        app.handle_action(AppAction::ChapterConfirm).await.unwrap();
        assert_eq!(notice_level(&app), Some(NoticeLevel::Warning));
        assert_eq!(app.mode, Mode::Chapter);

        app.handle_action(AppAction::ChapterChar('x')).await.unwrap();
        app.handle_action(AppAction::ChapterConfirm).await.unwrap();
        assert_eq!(notice_level(&app), Some(NoticeLevel::Info));
        assert_eq!(app.mode, Mode::Browse);
        assert!(app.chapter_input.is_empty());
    }

    #[tokio::test]
    async fn test_form_cycles_configured_choices() {
        let mut app = test_app().await;
        app.form.focus = FormField::Genre;
        app.handle_action(AppAction::FormCycleNext).await.unwrap();
        app.handle_action(AppAction::FormCycleNext).await.unwrap();
        assert_eq!(app.form.genre, "Horror");

        app.form.focus = FormField::Status;
        app.handle_action(AppAction::FormCyclePrev).await.unwrap();
        assert_eq!(app.form.status, "Completed");
    }

    #[tokio::test]
    async fn test_cursor_stays_in_bounds() {
        let mut app = test_app().await;
        app.handle_action(AppAction::MoveDown).await.unwrap();
        app.handle_action(AppAction::MoveToBottom).await.unwrap();
        assert_eq!(app.cursor, 0);
        app.handle_action(AppAction::SelectStory).await.unwrap();
        assert_eq!(app.selected_id, None);

        seed(&mut app, &[("One", "A"), ("Two", "B"), ("Three", "C")]).await;
        app.handle_action(AppAction::MoveToBottom).await.unwrap();
        assert_eq!(app.cursor, 2);
        app.handle_action(AppAction::MoveDown).await.unwrap();
        assert_eq!(app.cursor, 2);
        assert_eq!(app.total_words(), 0);
    }
}
