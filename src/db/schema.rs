pub const SCHEMA: &str = r#"
-- stories table
CREATE TABLE IF NOT EXISTS stories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    favorite INTEGER NOT NULL DEFAULT 0,
    title TEXT NOT NULL,
    author TEXT,
    genre TEXT,
    date_started TEXT,
    date_completed TEXT,
    status TEXT,
    num_chapters INTEGER NOT NULL DEFAULT 0,
    word_count INTEGER NOT NULL DEFAULT 0,
    main_character TEXT,
    last_updated TEXT,
    preview TEXT NOT NULL DEFAULT ''
);

-- reading_streak table (exactly one row)
CREATE TABLE IF NOT EXISTS reading_streak (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    last_read_date TEXT,
    current_streak INTEGER NOT NULL DEFAULT 0,
    longest_streak INTEGER NOT NULL DEFAULT 0
);

INSERT OR IGNORE INTO reading_streak (id, last_read_date, current_streak, longest_streak)
VALUES (1, NULL, 0, 0);
"#;
