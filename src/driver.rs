//! Driver
//!
//! Entry point of the SDK: one grid address, one HTTP client, and a typed task
//! per resource kind sharing them.

use crate::grid::{GridAddress, GridClient, Result};
use crate::tasks::{
    AlignmentTask, CollaborationTask, ExperimentTask, ModelTask, OptimizationTask, ParticipantTask,
    PredictionTask, ProjectTask, RegistrationTask, RunTask, TagTask, ValidationTask,
};

/// Handle on a Synergos grid
///
/// ```no_run
/// # async fn demo() -> synergos::Result<()> {
/// let driver = synergos::Driver::new("localhost", 5000, false)?;
/// let collaborations = driver.collaborations().read_all().await?;
/// println!("{}", collaborations.data());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Driver {
    client: GridClient,
}

impl Driver {
    pub fn new(host: &str, port: u16, secure: bool) -> Result<Self> {
        Self::with_address(GridAddress::new(host, port, secure)?)
    }

    pub fn with_address(address: GridAddress) -> Result<Self> {
        Ok(Self {
            client: GridClient::new(address)?,
        })
    }

    pub fn address(&self) -> &GridAddress {
        &self.client.address
    }

    pub fn client(&self) -> &GridClient {
        &self.client
    }

    pub fn collaborations(&self) -> CollaborationTask {
        CollaborationTask::new(self.client.clone())
    }

    pub fn projects(&self) -> ProjectTask {
        ProjectTask::new(self.client.clone())
    }

    pub fn experiments(&self) -> ExperimentTask {
        ExperimentTask::new(self.client.clone())
    }

    pub fn runs(&self) -> RunTask {
        RunTask::new(self.client.clone())
    }

    pub fn participants(&self) -> ParticipantTask {
        ParticipantTask::new(self.client.clone())
    }

    pub fn registrations(&self) -> RegistrationTask {
        RegistrationTask::new(self.client.clone())
    }

    pub fn tags(&self) -> TagTask {
        TagTask::new(self.client.clone())
    }

    pub fn alignments(&self) -> AlignmentTask {
        AlignmentTask::new(self.client.clone())
    }

    pub fn models(&self) -> ModelTask {
        ModelTask::new(self.client.clone())
    }

    pub fn optimizations(&self) -> OptimizationTask {
        OptimizationTask::new(self.client.clone())
    }

    pub fn validations(&self) -> ValidationTask {
        ValidationTask::new(self.client.clone())
    }

    pub fn predictions(&self) -> PredictionTask {
        PredictionTask::new(self.client.clone())
    }
}
