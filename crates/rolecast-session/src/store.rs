use crate::session::{DialogueSession, TIMESTAMP_FORMAT};
use crate::transcript::render_transcript;
use async_trait::async_trait;
use rolecast_core::{RolecastError, RolecastResult};
use std::path::PathBuf;
use chrono::NaiveDateTime;
use tracing::{info, warn};

const FILE_PREFIX: &str = "dialogue_";

/// Paths of the artifacts written for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedSession {
    /// The structured JSON record.
    pub record: PathBuf,
    /// The plain-text transcript.
    pub transcript: PathBuf,
}

/// Persistence for finished dialogue sessions, keyed by timestamp.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Write the record and transcript for `session`.
    async fn save(&self, session: &DialogueSession) -> RolecastResult<SavedSession>;
    /// Read a record back; `None` when no record has that timestamp.
    async fn load(&self, timestamp: &str) -> RolecastResult<Option<DialogueSession>>;
    /// Timestamps of every stored record, oldest first.
    async fn list(&self) -> RolecastResult<Vec<String>>;
}

/// Writes `dialogue_{timestamp}.json` and `dialogue_{timestamp}.txt` into a
/// directory. A second save within the same second overwrites the first.
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub async fn new(dir: PathBuf) -> RolecastResult<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn record_path(&self, timestamp: &str) -> RolecastResult<PathBuf> {
        check_timestamp(timestamp)?;
        Ok(self.dir.join(format!("{FILE_PREFIX}{timestamp}.json")))
    }

    fn transcript_path(&self, timestamp: &str) -> RolecastResult<PathBuf> {
        check_timestamp(timestamp)?;
        Ok(self.dir.join(format!("{FILE_PREFIX}{timestamp}.txt")))
    }
}

/// Session ids become file names, so only [`TIMESTAMP_FORMAT`] values are accepted.
fn check_timestamp(timestamp: &str) -> RolecastResult<()> {
    NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
        .map(|_| ())
        .map_err(|_| RolecastError::Session(format!("Invalid session timestamp '{timestamp}'")))
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn save(&self, session: &DialogueSession) -> RolecastResult<SavedSession> {
        let record = self.record_path(&session.timestamp)?;
        let transcript = self.transcript_path(&session.timestamp)?;
        let json = serde_json::to_string_pretty(session)?;
        let text = render_transcript(session);

        tokio::fs::write(&record, json).await?;
        info!(path = %record.display(), "Dialogue record saved");

        // A failed save leaves no orphan record.
        if let Err(e) = tokio::fs::write(&transcript, text).await {
            if let Err(cleanup) = tokio::fs::remove_file(&record).await {
                warn!(path = %record.display(), error = %cleanup, "Failed to remove orphan record");
            }
            return Err(e.into());
        }
        info!(path = %transcript.display(), "Dialogue transcript saved");

        Ok(SavedSession { record, transcript })
    }

    async fn load(&self, timestamp: &str) -> RolecastResult<Option<DialogueSession>> {
        let path = self.record_path(timestamp)?;
        if !path.exists() {
            return Ok(None);
        }
        let data = tokio::fs::read_to_string(path).await?;
        let session: DialogueSession = serde_json::from_str(&data)
            .map_err(|e| RolecastError::Session(format!("Failed to parse session: {e}")))?;
        Ok(Some(session))
    }

    async fn list(&self) -> RolecastResult<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut timestamps = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                if let Some(stem) = name
                    .strip_prefix(FILE_PREFIX)
                    .and_then(|rest| rest.strip_suffix(".json"))
                {
                    timestamps.push(stem.to_string());
                }
            }
        }
        timestamps.sort();
        Ok(timestamps)
    }
}
