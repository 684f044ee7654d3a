//! Participants
//!
//! Participants are grid-wide; the id is sent in the body as `id`.

use super::{require, ExtraFields};
use crate::grid::{Envelope, GridClient, Result};
use crate::resource::{to_payload, ResourceKind, ResourceTask, ScopeKey, ScopeKeys};
use serde::Serialize;
use std::collections::BTreeMap;

/// Profile of a new participant
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParticipantConfig {
    pub category: Vec<String>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Social platform to handle
    pub socials: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Overrides applied by `update`; absent fields are not sent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParticipantUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socials: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Serialize)]
struct CreateBody<'a> {
    #[serde(flatten)]
    config: &'a ParticipantConfig,
    /// Serialized last so it takes precedence over an `extra` entry of the same name
    id: &'a str,
}

/// Participant CRUD against the grid
#[derive(Clone, Debug)]
pub struct ParticipantTask {
    task: ResourceTask,
}

impl ParticipantTask {
    pub fn new(client: GridClient) -> Self {
        Self {
            task: ResourceTask::new(ResourceKind::Participant, client),
        }
    }

    fn single(&self, participant_id: &str) -> Result<ScopeKeys> {
        let keys = ScopeKeys::new().participant(participant_id);
        require(self.task.kind(), &keys, &[ScopeKey::Participant])?;
        Ok(keys)
    }

    pub async fn create(&self, participant_id: &str, config: &ParticipantConfig) -> Result<Envelope> {
        self.single(participant_id)?;
        let payload = to_payload(&CreateBody {
            id: participant_id,
            config,
        })?;
        self.task.create(&ScopeKeys::new(), Some(&payload)).await
    }

    pub async fn read_all(&self) -> Result<Envelope> {
        self.task.read_all(&ScopeKeys::new()).await
    }

    pub async fn read(&self, participant_id: &str) -> Result<Envelope> {
        self.task.read(&self.single(participant_id)?).await
    }

    pub async fn update(&self, participant_id: &str, updates: &ParticipantUpdate) -> Result<Envelope> {
        let keys = self.single(participant_id)?;
        self.task.update(&keys, &to_payload(updates)?).await
    }

    pub async fn delete(&self, participant_id: &str) -> Result<Envelope> {
        self.task.delete(&self.single(participant_id)?).await
    }
}
