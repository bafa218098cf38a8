//! SQL schema for the SQLite disturbance store.
//!
//! Executed at every connection startup; the DDL is idempotent thanks to
//! `CREATE ... IF NOT EXISTS`. `PRAGMA user_version` records the schema
//! revision for future migrations to key off.

/// Full schema DDL; safe to re-run against an existing database.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Disturbances are soft-deleted: deleted rows stay for audit but are
-- invisible to every read, and their key becomes reusable.
CREATE TABLE IF NOT EXISTS disturbances (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    category           TEXT NOT NULL,   -- 'ELECTRICITY', 'WATER', ...
    disturbance_id     TEXT NOT NULL,   -- id assigned by the publishing backend
    title              TEXT NOT NULL,
    description        TEXT NOT NULL,
    status             TEXT NOT NULL,   -- 'OPEN' | 'CLOSED' | 'PLANNED'
    planned_start_date TEXT,            -- ISO 8601 UTC or NULL
    planned_stop_date  TEXT,
    created            TEXT NOT NULL,   -- server-assigned
    updated            TEXT,
    deleted            INTEGER NOT NULL DEFAULT 0
);

-- The key must be unique among live rows only.
CREATE UNIQUE INDEX IF NOT EXISTS disturbances_active_key_idx
    ON disturbances(category, disturbance_id) WHERE deleted = 0;

-- Affected parties of one disturbance row. Insertion order is the
-- presentation order, recovered by ordering on id.
CREATE TABLE IF NOT EXISTS affected (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    disturbance_pk INTEGER NOT NULL REFERENCES disturbances(id) ON DELETE CASCADE,
    party_id       TEXT NOT NULL,
    reference      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS affected_disturbance_idx ON affected(disturbance_pk);
CREATE INDEX IF NOT EXISTS affected_party_idx       ON affected(party_id);

-- Per-disturbance notification subscriptions, keyed by the logical
-- disturbance key so they survive the disturbance row itself.
CREATE TABLE IF NOT EXISTS subscriptions (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    category       TEXT NOT NULL,
    disturbance_id TEXT NOT NULL,
    party_id       TEXT NOT NULL,
    created        TEXT NOT NULL,
    UNIQUE (category, disturbance_id, party_id)
);

CREATE TABLE IF NOT EXISTS global_subscriptions (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    party_id TEXT NOT NULL UNIQUE,
    created  TEXT NOT NULL
);

-- Audit trail: one row per rendered outbound message.
CREATE TABLE IF NOT EXISTS sent_history (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    category       TEXT NOT NULL,
    disturbance_id TEXT NOT NULL,
    party_id       TEXT NOT NULL,
    status         TEXT NOT NULL DEFAULT 'SENT',
    created        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS sent_history_key_idx
    ON sent_history(category, disturbance_id);

PRAGMA user_version = 1;
";
