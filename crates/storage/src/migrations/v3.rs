//! Migration v3: character promises

pub(super) const SQL: &str = "
CREATE TABLE IF NOT EXISTS character_promises (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    character_id INTEGER NOT NULL REFERENCES characters(id),
    promise_type TEXT NOT NULL,
    description TEXT NOT NULL,
    introduced_chapter INTEGER NOT NULL,
    fulfilled INTEGER NOT NULL DEFAULT 0,
    fulfilled_scene_id INTEGER REFERENCES scenes(id),
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_promises_character ON character_promises(character_id);
";
