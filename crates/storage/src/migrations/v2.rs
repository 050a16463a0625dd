//! Migration v2: evolution log and content registry

pub(super) const SQL: &str = "
CREATE TABLE IF NOT EXISTS entity_changes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entity_type TEXT NOT NULL,
    entity_id INTEGER NOT NULL,
    scene_id INTEGER NOT NULL REFERENCES scenes(id),
    change_type TEXT NOT NULL,
    description TEXT NOT NULL,
    old_value TEXT,
    new_value TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_entity_changes_entity ON entity_changes(entity_type, entity_id);

DROP TRIGGER IF EXISTS entity_changes_no_update;
CREATE TRIGGER entity_changes_no_update BEFORE UPDATE ON entity_changes BEGIN
    SELECT RAISE(ABORT, 'entity_changes is append-only');
END;

DROP TRIGGER IF EXISTS entity_changes_no_delete;
CREATE TRIGGER entity_changes_no_delete BEFORE DELETE ON entity_changes BEGIN
    SELECT RAISE(ABORT, 'entity_changes is append-only');
END;

CREATE TABLE IF NOT EXISTS content_registry (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content_type TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    content TEXT NOT NULL,
    chapter_number INTEGER,
    scene_number INTEGER,
    created_at TEXT NOT NULL,
    UNIQUE (content_type, content_hash)
);
";
