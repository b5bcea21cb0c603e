//! SQL schema for the BookBrainz SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS editor (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL
);

-- AUTOINCREMENT: ids are never reused, so ordering by id is ordering by time.
CREATE TABLE IF NOT EXISTS revision (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    author_id   INTEGER NOT NULL REFERENCES editor(id),
    note        TEXT,
    created_at  TEXT NOT NULL    -- RFC 3339 UTC
);

CREATE TABLE IF NOT EXISTS revision_parent (
    parent_id   INTEGER NOT NULL REFERENCES revision(id),
    child_id    INTEGER NOT NULL REFERENCES revision(id),
    PRIMARY KEY (parent_id, child_id)
);

CREATE TRIGGER IF NOT EXISTS revision_no_update
BEFORE UPDATE ON revision
BEGIN
    SELECT RAISE(ABORT, 'revisions are immutable');
END;

CREATE TRIGGER IF NOT EXISTS revision_no_delete
BEFORE DELETE ON revision
BEGIN
    SELECT RAISE(ABORT, 'revisions are immutable');
END;

CREATE TABLE IF NOT EXISTS entity (
    bbid        TEXT PRIMARY KEY,
    type        TEXT NOT NULL    -- 'Author' | 'Edition' | 'EditionGroup' | 'Publisher' | 'Work'
);

-- ── Shared sets ─────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS language (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    iso_code    TEXT
);

CREATE TABLE IF NOT EXISTS alias (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    sort_name   TEXT NOT NULL,
    language_id INTEGER REFERENCES language(id),
    \"primary\"   INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS alias_set (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    default_alias_id INTEGER REFERENCES alias(id)
);

CREATE TABLE IF NOT EXISTS alias_set__alias (
    set_id      INTEGER NOT NULL REFERENCES alias_set(id),
    alias_id    INTEGER NOT NULL REFERENCES alias(id),
    PRIMARY KEY (set_id, alias_id)
);

CREATE TABLE IF NOT EXISTS identifier (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    type_id     INTEGER NOT NULL,
    value       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS identifier_set (
    id          INTEGER PRIMARY KEY AUTOINCREMENT
);

CREATE TABLE IF NOT EXISTS identifier_set__identifier (
    set_id        INTEGER NOT NULL REFERENCES identifier_set(id),
    identifier_id INTEGER NOT NULL REFERENCES identifier(id),
    PRIMARY KEY (set_id, identifier_id)
);

CREATE TABLE IF NOT EXISTS relationship (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    type_id     INTEGER NOT NULL,
    source_bbid TEXT NOT NULL REFERENCES entity(bbid),
    target_bbid TEXT NOT NULL REFERENCES entity(bbid)
);

CREATE TABLE IF NOT EXISTS relationship_set (
    id          INTEGER PRIMARY KEY AUTOINCREMENT
);

CREATE TABLE IF NOT EXISTS relationship_set__relationship (
    set_id          INTEGER NOT NULL REFERENCES relationship_set(id),
    relationship_id INTEGER NOT NULL REFERENCES relationship(id),
    PRIMARY KEY (set_id, relationship_id)
);

CREATE TABLE IF NOT EXISTS annotation (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    content          TEXT NOT NULL,
    last_revision_id INTEGER NOT NULL REFERENCES revision(id)
);

CREATE TABLE IF NOT EXISTS disambiguation (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    comment     TEXT NOT NULL
);

-- ── Derived sets ────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS language_set (
    id          INTEGER PRIMARY KEY AUTOINCREMENT
);

CREATE TABLE IF NOT EXISTS language_set__language (
    set_id      INTEGER NOT NULL REFERENCES language_set(id),
    language_id INTEGER NOT NULL REFERENCES language(id),
    PRIMARY KEY (set_id, language_id)
);

CREATE TABLE IF NOT EXISTS publisher_set (
    id          INTEGER PRIMARY KEY AUTOINCREMENT
);

CREATE TABLE IF NOT EXISTS publisher_set__publisher (
    set_id      INTEGER NOT NULL REFERENCES publisher_set(id),
    bbid        TEXT NOT NULL REFERENCES entity(bbid),
    PRIMARY KEY (set_id, bbid)
);

-- Release event rows are never updated; a changed date or area is a new row.
CREATE TABLE IF NOT EXISTS release_event (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    date        TEXT,
    area_id     INTEGER
);

CREATE TABLE IF NOT EXISTS release_event_set (
    id          INTEGER PRIMARY KEY AUTOINCREMENT
);

CREATE TABLE IF NOT EXISTS release_event_set__release_event (
    set_id           INTEGER NOT NULL REFERENCES release_event_set(id),
    release_event_id INTEGER NOT NULL REFERENCES release_event(id),
    PRIMARY KEY (set_id, release_event_id)
);

-- ── Entity revision tables ──────────────────────────────────────────────────
-- One row per (bbid, revision). Exactly one row per bbid has master = 1,
-- enforced by the partial unique indexes below.

CREATE TABLE IF NOT EXISTS author (
    bbid                TEXT    NOT NULL REFERENCES entity(bbid),
    revision_id         INTEGER NOT NULL REFERENCES revision(id),
    master              INTEGER NOT NULL DEFAULT 1,
    deleted             INTEGER NOT NULL DEFAULT 0,
    alias_set_id        INTEGER REFERENCES alias_set(id),
    identifier_set_id   INTEGER REFERENCES identifier_set(id),
    relationship_set_id INTEGER REFERENCES relationship_set(id),
    annotation_id       INTEGER REFERENCES annotation(id),
    disambiguation_id   INTEGER REFERENCES disambiguation(id),
    type_id             INTEGER,
    gender_id           INTEGER,
    begin_area_id       INTEGER,
    begin_date          TEXT,
    end_area_id         INTEGER,
    end_date            TEXT,
    ended               INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (bbid, revision_id)
);

CREATE TABLE IF NOT EXISTS edition (
    bbid                 TEXT    NOT NULL REFERENCES entity(bbid),
    revision_id          INTEGER NOT NULL REFERENCES revision(id),
    master               INTEGER NOT NULL DEFAULT 1,
    deleted              INTEGER NOT NULL DEFAULT 0,
    alias_set_id         INTEGER REFERENCES alias_set(id),
    identifier_set_id    INTEGER REFERENCES identifier_set(id),
    relationship_set_id  INTEGER REFERENCES relationship_set(id),
    annotation_id        INTEGER REFERENCES annotation(id),
    disambiguation_id    INTEGER REFERENCES disambiguation(id),
    language_set_id      INTEGER REFERENCES language_set(id),
    publisher_set_id     INTEGER REFERENCES publisher_set(id),
    release_event_set_id INTEGER REFERENCES release_event_set(id),
    edition_group_bbid   TEXT REFERENCES entity(bbid),
    width                INTEGER,
    height               INTEGER,
    depth                INTEGER,
    weight               INTEGER,
    pages                INTEGER,
    format_id            INTEGER,
    status_id            INTEGER,
    PRIMARY KEY (bbid, revision_id)
);

CREATE TABLE IF NOT EXISTS edition_group (
    bbid                TEXT    NOT NULL REFERENCES entity(bbid),
    revision_id         INTEGER NOT NULL REFERENCES revision(id),
    master              INTEGER NOT NULL DEFAULT 1,
    deleted             INTEGER NOT NULL DEFAULT 0,
    alias_set_id        INTEGER REFERENCES alias_set(id),
    identifier_set_id   INTEGER REFERENCES identifier_set(id),
    relationship_set_id INTEGER REFERENCES relationship_set(id),
    annotation_id       INTEGER REFERENCES annotation(id),
    disambiguation_id   INTEGER REFERENCES disambiguation(id),
    type_id             INTEGER,
    PRIMARY KEY (bbid, revision_id)
);

CREATE TABLE IF NOT EXISTS publisher (
    bbid                TEXT    NOT NULL REFERENCES entity(bbid),
    revision_id         INTEGER NOT NULL REFERENCES revision(id),
    master              INTEGER NOT NULL DEFAULT 1,
    deleted             INTEGER NOT NULL DEFAULT 0,
    alias_set_id        INTEGER REFERENCES alias_set(id),
    identifier_set_id   INTEGER REFERENCES identifier_set(id),
    relationship_set_id INTEGER REFERENCES relationship_set(id),
    annotation_id       INTEGER REFERENCES annotation(id),
    disambiguation_id   INTEGER REFERENCES disambiguation(id),
    type_id             INTEGER,
    area_id             INTEGER,
    begin_date          TEXT,
    end_date            TEXT,
    ended               INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (bbid, revision_id)
);

CREATE TABLE IF NOT EXISTS work (
    bbid                TEXT    NOT NULL REFERENCES entity(bbid),
    revision_id         INTEGER NOT NULL REFERENCES revision(id),
    master              INTEGER NOT NULL DEFAULT 1,
    deleted             INTEGER NOT NULL DEFAULT 0,
    alias_set_id        INTEGER REFERENCES alias_set(id),
    identifier_set_id   INTEGER REFERENCES identifier_set(id),
    relationship_set_id INTEGER REFERENCES relationship_set(id),
    annotation_id       INTEGER REFERENCES annotation(id),
    disambiguation_id   INTEGER REFERENCES disambiguation(id),
    language_set_id     INTEGER REFERENCES language_set(id),
    type_id             INTEGER,
    PRIMARY KEY (bbid, revision_id)
);

CREATE UNIQUE INDEX IF NOT EXISTS author_master_idx        ON author(bbid)        WHERE master = 1;
CREATE UNIQUE INDEX IF NOT EXISTS edition_master_idx       ON edition(bbid)       WHERE master = 1;
CREATE UNIQUE INDEX IF NOT EXISTS edition_group_master_idx ON edition_group(bbid) WHERE master = 1;
CREATE UNIQUE INDEX IF NOT EXISTS publisher_master_idx     ON publisher(bbid)     WHERE master = 1;
CREATE UNIQUE INDEX IF NOT EXISTS work_master_idx          ON work(bbid)          WHERE master = 1;

CREATE INDEX IF NOT EXISTS revision_author_idx ON revision(author_id, created_at);

-- ── Achievements ────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS achievement_unlock (
    editor_id   INTEGER NOT NULL REFERENCES editor(id),
    achievement TEXT NOT NULL,
    unlocked_at TEXT NOT NULL,
    PRIMARY KEY (editor_id, achievement)
);

PRAGMA user_version = 1;
";
