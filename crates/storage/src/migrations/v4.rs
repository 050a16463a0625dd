//! Migration v4: word count on scenes

pub(super) const SQL_WORD_COUNT: &str = "word_count";
pub(super) const SQL_WORD_COUNT_DEF: &str = "INTEGER NOT NULL DEFAULT 0";
