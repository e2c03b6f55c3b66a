//! Dedicated execution context for tree builds.
//!
//! The worker owns no caller state. Jobs arrive over a channel, each build
//! runs on the blocking pool, and every progress report and result goes back
//! over the events channel tagged with the job's `(generation, salt)`.

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

use super::{build_tree, Progress, ProofTree, TreeParams};
use crate::error::{OtpSdkError, Result};

/// Freshness token of one build request.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Salt([u8; 16]);

impl Salt {
    pub fn random() -> Self {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({self})")
    }
}

#[derive(Debug)]
pub struct BuildJob {
    pub salt: Salt,
    pub generation: u64,
    pub params: TreeParams,
}

#[derive(Debug)]
pub enum WorkerEvent {
    Progress(Progress),
    Done(Box<ProofTree>),
    Failed(String),
}

#[derive(Debug)]
pub struct WorkerMessage {
    pub salt: Salt,
    pub generation: u64,
    pub event: WorkerEvent,
}

pub struct TreeWorker {
    jobs: Option<mpsc::UnboundedSender<BuildJob>>,
    handle: Option<JoinHandle<()>>,
}

impl TreeWorker {
    /// Starts the worker on the current tokio runtime.
    pub fn spawn(events: mpsc::UnboundedSender<WorkerMessage>) -> Self {
        let (jobs, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_worker(receiver, events));
        Self {
            jobs: Some(jobs),
            handle: Some(handle),
        }
    }

    pub fn submit(&self, job: BuildJob) -> Result<()> {
        let jobs = self
            .jobs
            .as_ref()
            .ok_or_else(|| OtpSdkError::Worker("worker is shut down".into()))?;
        jobs.send(job)
            .map_err(|_| OtpSdkError::Worker("worker stopped".into()))
    }

    /// Stops accepting jobs and waits for in-flight builds to finish.
    pub async fn shutdown(mut self) -> Result<()> {
        self.jobs.take();
        match self.handle.take() {
            Some(handle) => handle
                .await
                .map_err(|e| OtpSdkError::Worker(format!("worker task failed: {e}"))),
            None => Ok(()),
        }
    }
}

impl Drop for TreeWorker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn run_worker(
    mut jobs: mpsc::UnboundedReceiver<BuildJob>,
    events: mpsc::UnboundedSender<WorkerMessage>,
) {
    let mut builds = JoinSet::new();
    loop {
        tokio::select! {
            job = jobs.recv() => match job {
                Some(job) => {
                    debug!(generation = job.generation, salt = %job.salt, "tree build started");
                    let events = events.clone();
                    builds.spawn_blocking(move || run_job(job, events));
                }
                None => break,
            },
            Some(joined) = builds.join_next(), if !builds.is_empty() => {
                if let Err(e) = joined {
                    warn!(error = %e, "tree build task panicked");
                }
            }
        }
    }
    while let Some(joined) = builds.join_next().await {
        if let Err(e) = joined {
            warn!(error = %e, "tree build task panicked");
        }
    }
}

fn run_job(job: BuildJob, events: mpsc::UnboundedSender<WorkerMessage>) {
    let BuildJob {
        salt,
        generation,
        params,
    } = job;
    // A closed receiver only means nobody is listening any more.
    let send = |event| {
        let _ = events.send(WorkerMessage {
            salt,
            generation,
            event,
        });
    };
    let result = build_tree(&params, &mut |progress| send(WorkerEvent::Progress(progress)));
    match result {
        Ok(tree) => send(WorkerEvent::Done(Box::new(tree))),
        Err(e) => send(WorkerEvent::Failed(e.to_string())),
    }
}
