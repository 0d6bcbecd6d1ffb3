//! Session journal - durable JSON-lines transcript of a chat session
//!
//! One entry per line, appended as the session progresses. The journal is a
//! transcript for later inspection, not store state; in-process diagnostics
//! go through `tracing` instead.

use crate::error::{QuorumError, QuorumResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Responses longer than this are stored as a preview.
const RESPONSE_PREVIEW_LEN: usize = 200;

/// What a journal entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// An agent performed an action
    AgentAction,
    /// The user submitted a query
    UserQuery,
    /// The assistant produced a response
    AssistantResponse,
    /// Something went wrong
    Error,
}

/// One journal line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// When the entry was written
    pub timestamp: DateTime<Utc>,

    /// Entry kind
    pub kind: EntryKind,

    /// Session this entry belongs to
    pub session: String,

    /// Acting agent, for agent actions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,

    /// Short action name, for agent actions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    /// Free-form detail: the query, the response preview, or an error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Generate a unique session ID
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Append-only journal for one session.
pub struct SessionJournal {
    path: PathBuf,
    session: String,
}

impl SessionJournal {
    /// Open a journal at `path` with a freshly generated session ID.
    pub fn new(path: impl Into<PathBuf>) -> QuorumResult<Self> {
        Self::with_session(path, generate_session_id())
    }

    /// Open a journal at `path` for an existing session ID.
    ///
    /// The parent directory is created if missing.
    pub fn with_session(path: impl Into<PathBuf>, session: impl Into<String>) -> QuorumResult<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| QuorumError::journal("create_dir", e))?;
            }
        }

        Ok(Self {
            path,
            session: session.into(),
        })
    }

    /// The session ID entries are tagged with
    pub fn session(&self) -> &str {
        &self.session
    }

    /// The journal file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record an agent action.
    pub fn record_action(
        &self,
        agent: impl Into<String>,
        action: impl Into<String>,
        detail: impl Into<String>,
    ) -> QuorumResult<()> {
        self.append(JournalEntry {
            timestamp: Utc::now(),
            kind: EntryKind::AgentAction,
            session: self.session.clone(),
            agent: Some(agent.into()),
            action: Some(action.into()),
            detail: Some(detail.into()),
        })
    }

    /// Record a user query.
    pub fn record_query(&self, query: &str) -> QuorumResult<()> {
        self.append(JournalEntry {
            timestamp: Utc::now(),
            kind: EntryKind::UserQuery,
            session: self.session.clone(),
            agent: None,
            action: None,
            detail: Some(query.to_string()),
        })
    }

    /// Record an assistant response, storing long bodies as a preview.
    pub fn record_response(&self, response: &str) -> QuorumResult<()> {
        self.append(JournalEntry {
            timestamp: Utc::now(),
            kind: EntryKind::AssistantResponse,
            session: self.session.clone(),
            agent: None,
            action: None,
            detail: Some(preview(response)),
        })
    }

    /// Record an error.
    pub fn record_error(&self, message: &str) -> QuorumResult<()> {
        self.append(JournalEntry {
            timestamp: Utc::now(),
            kind: EntryKind::Error,
            session: self.session.clone(),
            agent: None,
            action: None,
            detail: Some(message.to_string()),
        })
    }

    fn append(&self, entry: JournalEntry) -> QuorumResult<()> {
        let line =
            serde_json::to_string(&entry).map_err(|e| QuorumError::serialization("journal_entry", e))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| QuorumError::journal("open", e))?;

        writeln!(file, "{}", line).map_err(|e| QuorumError::journal("append", e))?;

        Ok(())
    }

    /// The most recent `limit` entries, optionally filtered by kind.
    ///
    /// Malformed lines are skipped; a missing file reads as empty.
    pub fn entries(&self, kind: Option<EntryKind>, limit: usize) -> QuorumResult<Vec<JournalEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.path).map_err(|e| QuorumError::journal("open", e))?;
        let reader = BufReader::new(file);

        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(|e| QuorumError::journal("read", e))?;
            let entry: JournalEntry = match serde_json::from_str(&line) {
                Ok(entry) => entry,
                Err(_) => continue,
            };
            if kind.map_or(true, |k| entry.kind == k) {
                entries.push(entry);
            }
        }

        let start = entries.len().saturating_sub(limit);
        Ok(entries.split_off(start))
    }
}

/// First 200 characters of a response, marked when cut short.
fn preview(response: &str) -> String {
    match response.char_indices().nth(RESPONSE_PREVIEW_LEN) {
        Some((idx, _)) => format!("{}...", &response[..idx]),
        None => response.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_journal_round_trip() {
        let dir = tempdir().unwrap();
        let journal = SessionJournal::new(dir.path().join("session.jsonl")).unwrap();

        journal
            .record_action("coordinator", "processing query", "what is deep learning")
            .unwrap();
        journal.record_query("what is deep learning").unwrap();
        journal.record_response("a short answer").unwrap();

        let all = journal.entries(None, 10).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].kind, EntryKind::AgentAction);
        assert_eq!(all[0].agent.as_deref(), Some("coordinator"));
        assert!(all.iter().all(|e| e.session == journal.session()));
    }

    #[test]
    fn test_journal_kind_filter_and_limit() {
        let dir = tempdir().unwrap();
        let journal = SessionJournal::new(dir.path().join("session.jsonl")).unwrap();

        for i in 0..5 {
            journal.record_query(&format!("query {}", i)).unwrap();
            journal.record_response(&format!("response {}", i)).unwrap();
        }

        let queries = journal.entries(Some(EntryKind::UserQuery), 3).unwrap();
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[0].detail.as_deref(), Some("query 2"));
        assert_eq!(queries[2].detail.as_deref(), Some("query 4"));
    }

    #[test]
    fn test_journal_truncates_long_responses() {
        let dir = tempdir().unwrap();
        let journal = SessionJournal::new(dir.path().join("session.jsonl")).unwrap();

        let long = "x".repeat(300);
        journal.record_response(&long).unwrap();

        let entries = journal.entries(Some(EntryKind::AssistantResponse), 1).unwrap();
        let detail = entries[0].detail.as_deref().unwrap();
        assert_eq!(detail.len(), 203);
        assert!(detail.ends_with("..."));
    }

    #[test]
    fn test_journal_skips_malformed_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        let journal = SessionJournal::new(&path).unwrap();

        journal.record_query("valid entry").unwrap();
        fs::write(&path, {
            let mut content = fs::read_to_string(&path).unwrap();
            content.push_str("not json\n");
            content
        })
        .unwrap();
        journal.record_query("another valid entry").unwrap();

        let entries = journal.entries(None, 10).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_journal_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let journal = SessionJournal::new(dir.path().join("never-written.jsonl")).unwrap();

        assert!(journal.entries(None, 10).unwrap().is_empty());
    }

    #[test]
    fn test_journal_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("logs").join("session.jsonl");

        let journal = SessionJournal::new(&nested).unwrap();
        journal.record_query("hello").unwrap();

        assert!(nested.exists());
    }

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(generate_session_id(), generate_session_id());
    }
}
