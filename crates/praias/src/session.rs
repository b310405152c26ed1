use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::types::{BeachCatalog, Extraction};

const PAYLOAD_PREFIX: &str = "cidade_";

/// What a user is browsing: the last successful extraction they asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSession {
    pub summary: String,
    pub catalog: BeachCatalog,
    pub fetched_at: DateTime<Utc>,
}

impl CatalogSession {
    /// `None` for the failure sentinel; a session is only ever created from
    /// an extraction that produced a summary.
    pub fn from_extraction(extraction: Extraction, fetched_at: DateTime<Utc>) -> Option<Self> {
        if extraction.is_failure() {
            return None;
        }
        Some(Self {
            summary: extraction.summary,
            catalog: extraction.catalog,
            fetched_at,
        })
    }

    pub fn select<'a>(&'a self, municipality: &'a str) -> Selection<'a> {
        select(Some(self), municipality)
    }
}

/// Per-user sessions. Not synchronised; a shell serving several users
/// concurrently wraps it in its own lock.
#[derive(Debug)]
pub struct SessionStore<K> {
    sessions: HashMap<K, CatalogSession>,
}

impl<K> Default for SessionStore<K> {
    fn default() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> SessionStore<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `session` under `key`, returning the one it replaces.
    pub fn store(&mut self, key: K, session: CatalogSession) -> Option<CatalogSession> {
        self.sessions.insert(key, session)
    }

    pub fn get(&self, key: &K) -> Option<&CatalogSession> {
        self.sessions.get(key)
    }

    pub fn evict(&mut self, key: &K) -> Option<CatalogSession> {
        self.sessions.remove(key)
    }

    /// Drops every session fetched more than `max_age` before `now` and
    /// returns how many were dropped.
    pub fn evict_older_than(&mut self, now: DateTime<Utc>, max_age: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| now.signed_duration_since(session.fetched_at) <= max_age);
        let evicted = before - self.sessions.len();
        if evicted > 0 {
            log::debug!("Evicted {} stale session(s)", evicted);
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<'a> {
    Found {
        municipality: &'a str,
        beaches: &'a [String],
    },
    NotFound(&'a str),
}

/// Resolves a municipality picked by the user. A missing session, an unknown
/// name and a municipality with no beaches all read as "not found".
pub fn select<'a>(session: Option<&'a CatalogSession>, municipality: &'a str) -> Selection<'a> {
    match session.and_then(|s| s.catalog.get(municipality)) {
        Some(beaches) if !beaches.is_empty() => Selection::Found {
            municipality,
            beaches,
        },
        _ => Selection::NotFound(municipality),
    }
}

impl Display for Selection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selection::Found {
                municipality,
                beaches,
            } => {
                writeln!(f, "Praias de {}:", municipality)?;
                writeln!(f)?;
                let lines: Vec<String> = beaches.iter().map(|b| format!("• {}", b)).collect();
                write!(f, "{}", lines.join("\n"))
            }
            Selection::NotFound(municipality) => {
                write!(f, "Não encontrei praias em {}.", municipality)
            }
        }
    }
}

/// Data carried by a selector so a later selection event can name its
/// municipality.
pub struct SelectionPayload;

impl SelectionPayload {
    pub fn encode(municipality: &str) -> String {
        format!("{}{}", PAYLOAD_PREFIX, municipality)
    }

    pub fn decode(data: &str) -> Option<&str> {
        data.strip_prefix(PAYLOAD_PREFIX)
    }
}
