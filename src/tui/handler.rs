use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::Mode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    MoveUp,
    MoveDown,
    MoveToTop,
    MoveToBottom,
    SelectStory,
    EditForm,
    CreateStory,
    UpdateStory,
    StartSearch,
    ClearForm,
    DeleteStory,
    ConfirmDelete,
    CancelDelete,
    ToggleFavorite,
    ReadStory,
    AddToLibrary,
    OpenLibrary,
    NewChapter,
    CloseView,
    ShowHelp,
    HideHelp,
    DismissNotice,
    // Form editing actions
    FormChar(char),
    FormBackspace,
    FormNextField,
    FormPrevField,
    FormCycleNext,
    FormCyclePrev,
    FormDone,
    // Search input actions
    SearchChar(char),
    SearchBackspace,
    SearchConfirm,
    SearchCancel,
    // Chapter input actions
    ChapterChar(char),
    ChapterNewline,
    ChapterBackspace,
    ChapterConfirm,
    ChapterCancel,
}

pub fn handle_key_event(
    key: KeyEvent,
    mode: Mode,
    notice_active: bool,
    show_help: bool,
) -> Option<AppAction> {
    // If help is showing, any key closes it
    if show_help {
        return Some(AppAction::HideHelp);
    }

    // Notices are dismissed by any key
    if notice_active {
        return Some(AppAction::DismissNotice);
    }

    match mode {
        Mode::Edit => match key.code {
            KeyCode::Esc | KeyCode::Enter => Some(AppAction::FormDone),
            KeyCode::Tab | KeyCode::Down => Some(AppAction::FormNextField),
            KeyCode::BackTab | KeyCode::Up => Some(AppAction::FormPrevField),
            KeyCode::Right => Some(AppAction::FormCycleNext),
            KeyCode::Left => Some(AppAction::FormCyclePrev),
            KeyCode::Backspace => Some(AppAction::FormBackspace),
            KeyCode::Char(c) => Some(AppAction::FormChar(c)),
            _ => None,
        },

        Mode::Search => match key.code {
            KeyCode::Enter => Some(AppAction::SearchConfirm),
            KeyCode::Esc => Some(AppAction::SearchCancel),
            KeyCode::Backspace => Some(AppAction::SearchBackspace),
            KeyCode::Char(c) => Some(AppAction::SearchChar(c)),
            _ => None,
        },

        Mode::ConfirmDelete => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(AppAction::ConfirmDelete),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                Some(AppAction::CancelDelete)
            }
            _ => None,
        },

        Mode::Chapter => match (key.code, key.modifiers) {
            (KeyCode::Char('s'), KeyModifiers::CONTROL) => Some(AppAction::ChapterConfirm),
            (KeyCode::Esc, _) => Some(AppAction::ChapterCancel),
            (KeyCode::Enter, _) => Some(AppAction::ChapterNewline),
            (KeyCode::Backspace, _) => Some(AppAction::ChapterBackspace),
            (KeyCode::Char(c), _) => Some(AppAction::ChapterChar(c)),
            _ => None,
        },

        // Views close on any key
        Mode::Reading | Mode::Library => Some(AppAction::CloseView),

        Mode::Browse => match (key.code, key.modifiers) {
            (KeyCode::Char('q'), _) => Some(AppAction::Quit),
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(AppAction::Quit),

            (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(AppAction::MoveDown),
            (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(AppAction::MoveUp),
            (KeyCode::Char('<'), _) => Some(AppAction::MoveToTop),
            (KeyCode::Char('>'), _) => Some(AppAction::MoveToBottom),

            (KeyCode::Enter, _) => Some(AppAction::SelectStory),

            (KeyCode::Char('e'), _) | (KeyCode::Tab, _) => Some(AppAction::EditForm),
            (KeyCode::Char('c'), _) => Some(AppAction::CreateStory),
            (KeyCode::Char('u'), _) => Some(AppAction::UpdateStory),
            (KeyCode::Char('/'), _) => Some(AppAction::StartSearch),
            (KeyCode::Char('x'), _) => Some(AppAction::ClearForm),
            (KeyCode::Char('d'), _) => Some(AppAction::DeleteStory),
            (KeyCode::Char('s'), _) => Some(AppAction::ToggleFavorite),
            (KeyCode::Char('r'), _) => Some(AppAction::ReadStory),
            (KeyCode::Char('l'), _) => Some(AppAction::AddToLibrary),
            (KeyCode::Char('L'), _) => Some(AppAction::OpenLibrary),
            (KeyCode::Char('w'), _) => Some(AppAction::NewChapter),

            (KeyCode::Char('?'), _) => Some(AppAction::ShowHelp),

            _ => None,
        },
    }
}
