//! Migration v1: story entities

pub(super) const SQL: &str = "
CREATE TABLE IF NOT EXISTS story_config (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    title TEXT NOT NULL,
    genre TEXT NOT NULL,
    tone TEXT NOT NULL,
    author_style TEXT,
    language TEXT NOT NULL DEFAULT 'English',
    initial_idea TEXT,
    outline TEXT,
    narrative_structure TEXT,
    target_chapters INTEGER,
    target_scenes_per_chapter INTEGER,
    target_words_per_scene INTEGER,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS characters (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    identifier TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    role TEXT NOT NULL,
    backstory TEXT,
    personality TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS locations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    identifier TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    description TEXT,
    parent_id INTEGER REFERENCES locations(id),
    location_type TEXT,
    properties TEXT NOT NULL DEFAULT '{}'
);

CREATE TABLE IF NOT EXISTS world_elements (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category TEXT NOT NULL,
    element_key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (category, element_key)
);

CREATE TABLE IF NOT EXISTS chapters (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    chapter_number INTEGER NOT NULL UNIQUE,
    title TEXT NOT NULL,
    outline TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS scenes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    chapter_id INTEGER NOT NULL REFERENCES chapters(id),
    scene_number INTEGER NOT NULL,
    description TEXT,
    content TEXT,
    audio_markup TEXT,
    scene_type TEXT,
    updated_at TEXT NOT NULL,
    UNIQUE (chapter_id, scene_number)
);

CREATE TABLE IF NOT EXISTS character_states (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    character_id INTEGER NOT NULL REFERENCES characters(id),
    scene_id INTEGER NOT NULL REFERENCES scenes(id),
    emotional_state TEXT,
    physical_state TEXT,
    location_id INTEGER REFERENCES locations(id),
    notes TEXT,
    UNIQUE (character_id, scene_id)
);

CREATE TABLE IF NOT EXISTS character_knowledge (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    character_id INTEGER NOT NULL REFERENCES characters(id),
    fact TEXT NOT NULL,
    visibility TEXT NOT NULL DEFAULT 'public',
    learned_scene_id INTEGER REFERENCES scenes(id),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS character_relationships (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    character1_id INTEGER NOT NULL REFERENCES characters(id),
    character2_id INTEGER NOT NULL REFERENCES characters(id),
    relationship_type TEXT NOT NULL,
    description TEXT,
    properties TEXT NOT NULL DEFAULT '{}',
    updated_at TEXT NOT NULL,
    CHECK (character1_id < character2_id),
    UNIQUE (character1_id, character2_id)
);

CREATE TABLE IF NOT EXISTS plot_threads (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL,
    thread_type TEXT,
    importance TEXT NOT NULL DEFAULT 'minor',
    status TEXT NOT NULL DEFAULT 'introduced',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS plot_thread_developments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    plot_thread_id INTEGER NOT NULL REFERENCES plot_threads(id),
    scene_id INTEGER NOT NULL REFERENCES scenes(id),
    development_type TEXT NOT NULL,
    description TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS scene_entities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    scene_id INTEGER NOT NULL REFERENCES scenes(id),
    entity_type TEXT NOT NULL,
    entity_id INTEGER NOT NULL,
    involvement TEXT NOT NULL DEFAULT 'present',
    UNIQUE (scene_id, entity_type, entity_id)
);

CREATE INDEX IF NOT EXISTS idx_scenes_chapter ON scenes(chapter_id);
CREATE INDEX IF NOT EXISTS idx_character_states_scene ON character_states(scene_id);
CREATE INDEX IF NOT EXISTS idx_knowledge_character ON character_knowledge(character_id);
CREATE INDEX IF NOT EXISTS idx_relationships_second ON character_relationships(character2_id);
CREATE INDEX IF NOT EXISTS idx_developments_thread ON plot_thread_developments(plot_thread_id);
CREATE INDEX IF NOT EXISTS idx_scene_entities_entity ON scene_entities(entity_type, entity_id);
";
