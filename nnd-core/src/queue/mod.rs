//! Runs jobs one at a time, in the order they were submitted.
//!
//! [`JobQueue`] is the bookkeeping: at most one current job, a FIFO of pending ones and the
//! reports of the finished ones. Identical jobs (see [`JobSpec::key`]) are refused while one of
//! them is current or pending.
//!
//! [`spawn_queue`] moves a `JobQueue` into a worker task. Everything else only holds a
//! [`QueueHandle`], which talks to the worker through messages.
//!
//! # Example usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use nnd_common::Site;
//! use nnd_core::{downloader::Downloader, job::JobSpec, progress::ChannelProgressListener, queue::spawn_queue};
//!
//! async fn download(downloader: Downloader) {
//!     let (listener, mut messages) = ChannelProgressListener::channel(64);
//!
//!     let queue = spawn_queue(downloader, Arc::new(listener));
//!
//!     queue.enqueue(JobSpec::new(Site::E621, "wolf solo")).await.unwrap();
//!     queue.enqueue(JobSpec::new(Site::Yiffer, "https://yiffer.xyz/Some_Comic")).await.unwrap();
//!
//!     tokio::spawn(async move {
//!         while let Some(msg) = messages.recv().await {
//!             println!("{msg}");
//!         }
//!     });
//!
//!     let history = queue.finish().await.unwrap();
//!     println!("{} jobs done", history.len());
//! }
//! ```
use std::{collections::VecDeque, future::Future, sync::Arc};

use log::{debug, error};
use tokio::{
    select,
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::{
    engine::JobReport,
    error::QueueError,
    job::{JobKey, JobSpec},
    progress::SharedProgressListener,
};

/// Commands waiting for the worker. Senders wait when it is full.
const COMMAND_BUFFER: usize = 32;

/// Answer to an enqueue request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The same job is already current or pending.
    Rejected,
    /// The job entered the queue. `started` is true when it became the current job right away.
    Accepted { started: bool },
}

/// A job and how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedJob {
    pub job: JobSpec,
    pub report: JobReport,
}

#[derive(Debug, Default)]
pub struct JobQueue {
    current: Option<JobSpec>,
    pending: VecDeque<JobSpec>,
    history: Vec<FinishedJob>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_known(&self, key: &JobKey) -> bool {
        self.current.as_ref().is_some_and(|job| &job.key() == key)
            || self.pending.iter().any(|job| &job.key() == key)
    }

    /// Adds `job` at the end of the queue, promoting it to current when nothing runs.
    pub fn enqueue(&mut self, job: JobSpec) -> Admission {
        if self.is_known(&job.key()) {
            return Admission::Rejected;
        }

        if self.current.is_none() {
            self.current = Some(job);
            return Admission::Accepted { started: true };
        }

        self.pending.push_back(job);
        Admission::Accepted { started: false }
    }

    /// Closes the current job with `report` and promotes the next pending one.
    ///
    /// Returns the new current job, if any.
    pub fn complete(&mut self, report: JobReport) -> Option<&JobSpec> {
        if let Some(job) = self.current.take() {
            self.history.push(FinishedJob { job, report });
        }

        self.current = self.pending.pop_front();
        self.current.as_ref()
    }

    /// Drops a pending job. The current job can't be removed.
    pub fn remove(&mut self, job: &JobSpec) -> bool {
        let key = job.key();
        let before = self.pending.len();
        self.pending.retain(|queued| queued.key() != key);
        self.pending.len() != before
    }

    /// Drops every pending job and returns how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    pub fn current(&self) -> Option<&JobSpec> {
        self.current.as_ref()
    }

    pub fn pending(&self) -> impl Iterator<Item = &JobSpec> {
        self.pending.iter()
    }

    pub fn history(&self) -> &[FinishedJob] {
        &self.history
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.pending.is_empty()
    }
}

/// Something that can carry a job to its end.
pub trait JobRunner: Send + Sync + 'static {
    fn run(
        &self,
        job: JobSpec,
        progress: SharedProgressListener,
    ) -> impl Future<Output = JobReport> + Send;
}

/// What the queue looks like at a given moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub current: Option<JobSpec>,
    pub pending: Vec<JobSpec>,
    pub finished: usize,
}

enum Command {
    Enqueue(JobSpec, oneshot::Sender<Admission>),
    Remove(JobSpec, oneshot::Sender<bool>),
    Clear(oneshot::Sender<usize>),
    Snapshot(oneshot::Sender<QueueSnapshot>),
    Finish(oneshot::Sender<Vec<FinishedJob>>),
}

/// Cheap to clone entry point to the queue worker.
#[derive(Debug, Clone)]
pub struct QueueHandle {
    sender: mpsc::Sender<Command>,
}

/// Starts the worker task that owns the queue and runs its jobs with `runner`.
pub fn spawn_queue<R: JobRunner>(runner: R, progress: SharedProgressListener) -> QueueHandle {
    let (sender, receiver) = mpsc::channel(COMMAND_BUFFER);

    tokio::spawn(worker(Arc::new(runner), progress, receiver));

    QueueHandle { sender }
}

impl QueueHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, QueueError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(command(tx))
            .await
            .map_err(|_| QueueError::WorkerGone)?;
        rx.await.map_err(|_| QueueError::WorkerGone)
    }

    /// Validates `job` and submits it.
    pub async fn enqueue(&self, job: JobSpec) -> Result<Admission, QueueError> {
        job.validate()?;
        self.request(|tx| Command::Enqueue(job, tx)).await
    }

    pub async fn remove(&self, job: JobSpec) -> Result<bool, QueueError> {
        self.request(|tx| Command::Remove(job, tx)).await
    }

    pub async fn clear(&self) -> Result<usize, QueueError> {
        self.request(Command::Clear).await
    }

    pub async fn snapshot(&self) -> Result<QueueSnapshot, QueueError> {
        self.request(Command::Snapshot).await
    }

    /// Waits until every queued job has run, then stops the worker.
    ///
    /// Returns every finished job, in completion order.
    pub async fn finish(&self) -> Result<Vec<FinishedJob>, QueueError> {
        self.request(Command::Finish).await
    }
}

/// Resolves when the running job ends. Never resolves when nothing runs.
async fn join_running(running: &mut Option<JoinHandle<JobReport>>) -> JobReport {
    match running {
        Some(handle) => handle.await.unwrap_or_else(|e| {
            error!("Job task died: {e}");
            JobReport::rejected(format!("job task died: {e}"))
        }),
        None => std::future::pending().await,
    }
}

async fn worker<R: JobRunner>(
    runner: Arc<R>,
    progress: SharedProgressListener,
    mut receiver: mpsc::Receiver<Command>,
) {
    let mut queue = JobQueue::new();
    let mut running: Option<JoinHandle<JobReport>> = None;
    let mut finishing: Option<oneshot::Sender<Vec<FinishedJob>>> = None;
    let mut closed = false;

    loop {
        if running.is_none() {
            if let Some(job) = queue.current().cloned() {
                progress.notify(&format!("Starting job: {job}"));

                let runner = runner.clone();
                let progress = progress.clone();
                running = Some(tokio::spawn(async move { runner.run(job, progress).await }));
            } else if let Some(reply) = finishing.take() {
                progress.notify("All jobs finished");
                let _ = reply.send(queue.history().to_vec());
                break;
            } else if closed {
                break;
            }
        }

        select! {
            command = receiver.recv(), if !closed && finishing.is_none() => {
                let Some(command) = command else {
                    debug!("Every queue handle is gone");
                    closed = true;
                    continue;
                };

                match command {
                    Command::Enqueue(job, reply) => {
                        let admission = queue.enqueue(job.clone());
                        match admission {
                            Admission::Rejected => {
                                progress.notify(&format!("Already queued: {job}"));
                            }
                            Admission::Accepted { started: false } => {
                                progress.notify(&format!(
                                    "Added to queue: {} (position {})",
                                    job,
                                    queue.pending().count()
                                ));
                            }
                            Admission::Accepted { started: true } => (),
                        }
                        let _ = reply.send(admission);
                    }
                    Command::Remove(job, reply) => {
                        let removed = queue.remove(&job);
                        if removed {
                            progress.notify(&format!("Removed from queue: {job}"));
                        }
                        let _ = reply.send(removed);
                    }
                    Command::Clear(reply) => {
                        let count = queue.clear();
                        progress.notify(&format!("Cleared {count} queued jobs"));
                        let _ = reply.send(count);
                    }
                    Command::Snapshot(reply) => {
                        let _ = reply.send(QueueSnapshot {
                            current: queue.current().cloned(),
                            pending: queue.pending().cloned().collect(),
                            finished: queue.history().len(),
                        });
                    }
                    Command::Finish(reply) => {
                        finishing = Some(reply);
                    }
                }
            }
            report = join_running(&mut running) => {
                running = None;

                if let Some(job) = queue.current() {
                    if report.success() {
                        progress.notify(&format!("Finished job: {job}"));
                    } else {
                        progress.notify(&format!(
                            "Job failed: {} ({})",
                            job,
                            report.reason.as_deref().unwrap_or("unknown error")
                        ));
                    }
                }

                queue.complete(report);
            }
        }
    }
}
