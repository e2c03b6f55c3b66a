use tokio::sync::mpsc;
use tracing::{debug, info};

use super::worker::{BuildJob, Salt, TreeWorker, WorkerEvent, WorkerMessage};
use super::{Progress, ProofTree, TreeParams};
use crate::error::{OtpSdkError, Result};

/// What the caller sees of the current build.
#[derive(Debug)]
pub enum BuildUpdate {
    Progress(Progress),
    Done(Box<ProofTree>),
    Failed(String),
}

/// Caller side of the tree worker.
///
/// Only the latest request is current. Earlier builds are left to run, and
/// their messages are dropped on receipt because their generation or salt no
/// longer matches.
pub struct TreeBuildSession {
    worker: TreeWorker,
    events: mpsc::UnboundedReceiver<WorkerMessage>,
    generation: u64,
    salt: Option<Salt>,
    pending: bool,
}

impl TreeBuildSession {
    pub fn start() -> Self {
        let (sender, events) = mpsc::unbounded_channel();
        Self {
            worker: TreeWorker::spawn(sender),
            events,
            generation: 0,
            salt: None,
            pending: false,
        }
    }

    /// Supersedes any earlier request. Invalid parameters are rejected here
    /// and never reach the worker.
    pub fn request(&mut self, params: TreeParams) -> Result<Salt> {
        params.validate()?;
        let salt = Salt::random();
        let generation = self.generation + 1;
        self.worker.submit(BuildJob {
            salt,
            generation,
            params,
        })?;
        self.generation = generation;
        self.salt = Some(salt);
        self.pending = true;
        debug!(generation, %salt, "tree build requested");
        Ok(salt)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn current_salt(&self) -> Option<Salt> {
        self.salt
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    fn is_current(&self, message: &WorkerMessage) -> bool {
        message.generation == self.generation && Some(message.salt) == self.salt
    }

    /// Next message of the current build, or `None` when nothing is pending.
    pub async fn next_update(&mut self) -> Option<BuildUpdate> {
        while self.pending {
            let message = self.events.recv().await?;
            if !self.is_current(&message) {
                debug!(
                    generation = message.generation,
                    salt = %message.salt,
                    current = self.generation,
                    "dropping stale tree build message"
                );
                continue;
            }
            let update = match message.event {
                WorkerEvent::Progress(progress) => BuildUpdate::Progress(progress),
                WorkerEvent::Done(tree) => {
                    self.pending = false;
                    info!(generation = self.generation, root = %hex::encode(tree.root), "tree build finished");
                    BuildUpdate::Done(tree)
                }
                WorkerEvent::Failed(reason) => {
                    self.pending = false;
                    BuildUpdate::Failed(reason)
                }
            };
            return Some(update);
        }
        None
    }

    /// Waits for the current build, skipping progress.
    pub async fn finish(&mut self) -> Result<ProofTree> {
        loop {
            match self.next_update().await {
                Some(BuildUpdate::Progress(_)) => continue,
                Some(BuildUpdate::Done(tree)) => return Ok(*tree),
                Some(BuildUpdate::Failed(reason)) => return Err(OtpSdkError::Worker(reason)),
                None => return Err(OtpSdkError::Worker("no tree build pending".into())),
            }
        }
    }

    pub async fn close(self) -> Result<()> {
        self.worker.shutdown().await
    }
}
