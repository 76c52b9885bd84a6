use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::app::{App, Mode, NoticeLevel};
use crate::form::FormField;
use crate::models::{Story, DATE_FORMAT};

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(8), // Form + side panel
            Constraint::Min(0),    // Story table
            Constraint::Length(1), // Status line
        ])
        .split(frame.area());

    // Form on the left, favorite/streak/progress on the right
    let top_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(2, 3), Constraint::Ratio(1, 3)])
        .split(chunks[1]);

    render_header(frame, app, chunks[0]);
    render_form(frame, app, top_chunks[0]);
    render_side_panel(frame, app, top_chunks[1]);
    render_story_table(frame, app, chunks[2]);
    render_status(frame, app, chunks[3]);

    match app.mode {
        Mode::Search => render_search_input(frame, app),
        Mode::ConfirmDelete => render_confirm_delete(frame, app),
        Mode::Reading => render_reading(frame, app),
        Mode::Library => render_library(frame, app),
        Mode::Chapter => render_chapter_input(frame, app),
        Mode::Browse | Mode::Edit => {}
    }

    if app.notice.is_some() {
        render_notice(frame, app);
    }

    if app.show_help {
        render_help(frame);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let favorites = app.stories.iter().filter(|s| s.favorite).count();
    let filter = app
        .active_search
        .as_ref()
        .map(|term| format!(" [search: {term}]"))
        .unwrap_or_default();

    let title = format!(" Writers Haven{filter} ");
    let stats = format!(" {} Stories | {} Favorites", app.stories.len(), favorites);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let paragraph = Paragraph::new(stats).style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, inner);
}

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let editing = app.mode == Mode::Edit;
    let title = match (app.selected_story(), editing) {
        (Some(story), true) => format!(" Editing #{} ", story.id),
        (Some(story), false) => format!(" Story #{} (e:edit) ", story.id),
        (None, true) => " New Story ".to_string(),
        (None, false) => " New Story (e:edit) ".to_string(),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing {
            Color::Yellow
        } else {
            Color::Green
        }));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Two columns of six fields
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(inner);

    let (left, right) = FormField::ALL.split_at(FormField::ALL.len() / 2);
    for (fields, column) in [(left, columns[0]), (right, columns[1])] {
        let lines: Vec<Line> = fields
            .iter()
            .map(|field| form_line(app, *field, editing))
            .collect();
        frame.render_widget(Paragraph::new(lines), column);
    }
}

fn form_line(app: &App, field: FormField, editing: bool) -> Line<'static> {
    let focused = editing && app.form.focus == field;
    let label_style = if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Blue)
    };

    let mut value = app.form.value(field).to_string();
    if focused {
        if field.is_choice() {
            value = format!("< {value} >");
        } else if field != FormField::Favorite {
            value.push('_');
        }
    }

    Line::from(vec![
        Span::styled(format!("{:>15}: ", field.label()), label_style),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

fn render_side_panel(frame: &mut Frame, app: &App, area: Rect) {
    let streak = app.streak();
    let favorite = app
        .selected_story()
        .map(|s| if s.favorite { "★ Favorite" } else { "Not a favorite" })
        .unwrap_or("No story selected");
    let last_read = streak
        .last_read_date
        .map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| "never".to_string());

    let lines = vec![
        Line::from(Span::styled(favorite, Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from(format!("Current streak: {} day(s)", streak.current_streak)),
        Line::from(format!("Longest streak: {} day(s)", streak.longest_streak)),
        Line::from(Span::styled(
            format!("Last read: {last_read}"),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(format!("Words tracked: {}", app.total_words())),
    ];

    let block = Block::default()
        .title(" Reading Streak ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, area);
}

fn render_story_table(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec![
        "ID", "Fav", "Title", "Author", "Genre", "Start Date", "End Date", "Status", "Chaps",
        "Words", "Main Char", "Updated",
    ])
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = app
        .stories
        .iter()
        .map(|story| {
            let style = if Some(story.id) == app.selected_id {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            story_row(story).style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Length(3),
        Constraint::Min(16),
        Constraint::Length(14),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(9),
        Constraint::Length(5),
        Constraint::Length(7),
        Constraint::Length(12),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL))
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = TableState::default();
    if !app.stories.is_empty() {
        state.select(Some(app.cursor));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn story_row(story: &Story) -> Row<'static> {
    Row::new(vec![
        Cell::from(story.id.to_string()),
        Cell::from(Span::styled(
            story.favorite_icon(),
            Style::default().fg(Color::Yellow),
        )),
        Cell::from(story.title.clone()),
        Cell::from(story.author.clone()),
        Cell::from(story.genre.clone()),
        Cell::from(format_date(story.date_started)),
        Cell::from(format_date(story.date_completed)),
        Cell::from(story.status.clone()),
        Cell::from(story.chapter_count.to_string()),
        Cell::from(story.word_count.to_string()),
        Cell::from(story.main_character.clone()),
        Cell::from(format_date(story.last_updated)),
    ])
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let status = match app.mode {
        Mode::Edit => "Tab/↑↓:field  ←→:choose  Space:favorite  Enter/Esc:done",
        _ => "Enter:select  e:edit  c:create  u:update  /:search  d:delete  r:read  ?:help  q:quit",
    };

    let paragraph = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

fn render_search_input(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 20, frame.area());

    let block = Block::default()
        .title(" Search title or author (empty shows all) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let inner = block.inner(area);

    // Clear the area first
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let input_text = format!("> {}_", app.search_input);
    let paragraph = Paragraph::new(input_text).style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, inner);
}

fn render_confirm_delete(frame: &mut Frame, app: &App) {
    let area = centered_rect(50, 20, frame.area());
    let title = app
        .selected_story()
        .map(|s| s.title.as_str())
        .unwrap_or("this story");

    let block = Block::default()
        .title(" Confirm Delete ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(format!("Delete '{title}'?\n\ny: delete   n/Esc: cancel"))
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn render_reading(frame: &mut Frame, app: &App) {
    let Some(story) = &app.reading else {
        return;
    };
    let area = centered_rect(60, 70, frame.area());

    let body = if story.preview.trim().is_empty() {
        "Story content goes here...\n\n(Chapters are not stored yet.)".to_string()
    } else {
        story.preview.clone()
    };
    let streak = app.streak();

    let mut lines = vec![
        Line::from(Span::styled(
            story.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("by {}", story.author),
            Style::default().fg(Color::Blue),
        )),
        Line::from(""),
    ];
    lines.extend(body.lines().map(|l| Line::from(l.to_string())));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            "Streak: {} day(s), longest {} day(s)",
            streak.current_streak, streak.longest_streak
        ),
        Style::default().fg(Color::Magenta),
    )));

    let block = Block::default()
        .title(format!(" Read: {} ", story.title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn render_library(frame: &mut Frame, app: &App) {
    let area = centered_rect(70, 50, frame.area());

    let header = Row::new(vec!["ID", "Fav", "Title", "Author", "Genre", "Status"]).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    let rows: Vec<Row> = app
        .library
        .iter()
        .map(|story| {
            Row::new(vec![
                story.id.to_string(),
                story.favorite_icon().to_string(),
                story.title.clone(),
                story.author.clone(),
                story.genre.clone(),
                story.status.clone(),
            ])
        })
        .collect();
    let widths = [
        Constraint::Length(4),
        Constraint::Length(3),
        Constraint::Min(16),
        Constraint::Length(14),
        Constraint::Length(10),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(" My Library ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(Clear, area);
    frame.render_widget(table, area);
}

fn render_chapter_input(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 60, frame.area());
    let title = app
        .selected_story()
        .map(|s| s.title.as_str())
        .unwrap_or_default();

    let block = Block::default()
        .title(format!(" New Chapter - {title} (Ctrl-S: save, Esc: cancel) "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let paragraph = Paragraph::new(format!("{}_", app.chapter_input))
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn render_notice(frame: &mut Frame, app: &App) {
    let Some(notice) = &app.notice else {
        return;
    };
    let area = centered_rect(50, 20, frame.area());

    let color = match notice.level {
        NoticeLevel::Info => Color::Green,
        NoticeLevel::Warning => Color::Yellow,
    };

    let block = Block::default()
        .title(format!(" {} ", notice.title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    let paragraph = Paragraph::new(format!("{}\n\nPress any key", notice.message))
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(50, 70, frame.area());

    let help_text = vec![
        "",
        " Navigation:",
        "   j / ↓    Move down",
        "   k / ↑    Move up",
        "   < / >    Top / bottom",
        "   Enter    Select story into the form",
        "",
        " Records:",
        "   e        Edit the form",
        "   c        Create story from the form",
        "   u        Update selected story",
        "   /        Search title or author",
        "   x        Clear form and selection",
        "   d        Delete selected story",
        "   s        Toggle favorite",
        "",
        " Reading:",
        "   r        Read story (counts toward streak)",
        "   l        Add to library",
        "   L        Open library",
        "   w        Write new chapter",
        "",
        " General:",
        "   ?        Toggle this help",
        "   q        Quit",
        "",
        " Press any key to close",
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_text.join("\n"))
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
