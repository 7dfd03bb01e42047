//! Deferred task queue shared by adapters.
//!
//! Submitting work never waits for it: [`TaskScheduler::schedule`] pushes the
//! task onto an unbounded channel and returns. A single worker drains the
//! channel and keeps one lane per key (the device id):
//!
//! - tasks with the same key run one at a time in submission order
//! - tasks with different keys run concurrently, so a stalled operation on
//!   one device never holds up another
//! - each task runs on its own spawned task; a panic is logged and audited
//!   and the lane moves on

use crate::audit::{AuditCategory, AuditRecord};
use crate::audit_log;
use crate::error::{AdapterError, AdapterResult};
use log::{debug, error};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle, JoinSet};

type ScheduledTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

const SCHEDULER_SOURCE: &str = "task-scheduler";

struct Submission {
    key: String,
    task: ScheduledTask,
}

/// Submission handle for the shared task queue.
///
/// Cheap to clone. The worker exits once every handle has been dropped and
/// all queued tasks have finished.
#[derive(Debug, Clone)]
pub struct TaskScheduler {
    sender: mpsc::UnboundedSender<Submission>,
}

impl TaskScheduler {
    /// Spawns the worker on the current tokio runtime.
    ///
    /// Must be called from within a runtime context.
    pub fn start() -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(receiver));
        (Self { sender }, worker)
    }

    /// Enqueues a task on the lane for `key` and returns without waiting
    /// for it to run.
    pub fn schedule<F>(&self, key: impl Into<String>, task: F) -> AdapterResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.sender
            .send(Submission {
                key: key.into(),
                task: Box::pin(task),
            })
            .map_err(|_| AdapterError::SchedulerStopped)
    }

    /// Returns true while the worker is accepting tasks.
    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }
}

/// Audit record for a scheduled task that panicked or was cancelled.
fn aborted_task_record(key: &str, reason: &str) -> AuditRecord {
    AuditRecord::new(AuditCategory::ErrorCondition, SCHEDULER_SOURCE, "scheduled_task")
        .with_object_id(key)
        .with_object_type("device")
        .with_error(reason)
}

/// Per-key queues. A key is present while one of its tasks is running;
/// the deque holds the ones waiting behind it.
#[derive(Default)]
struct Lanes {
    waiting: HashMap<String, VecDeque<ScheduledTask>>,
    running: JoinSet<(String, Result<(), JoinError>)>,
}

impl Lanes {
    fn submit(&mut self, submission: Submission) {
        let Submission { key, task } = submission;
        match self.waiting.get_mut(&key) {
            Some(queue) => queue.push_back(task),
            None => {
                self.waiting.insert(key.clone(), VecDeque::new());
                self.launch(key, task);
            }
        }
    }

    fn launch(&mut self, key: String, task: ScheduledTask) {
        // The inner spawn turns a panic into a JoinError so the lane key survives.
        self.running.spawn(async move {
            let result = tokio::spawn(task).await;
            (key, result)
        });
    }

    /// Starts the next task for `key`, or closes the lane if none is waiting.
    fn advance(&mut self, key: String) {
        match self.waiting.get_mut(&key).and_then(VecDeque::pop_front) {
            Some(next) => self.launch(key, next),
            None => {
                self.waiting.remove(&key);
            }
        }
    }
}

async fn run_worker(mut receiver: mpsc::UnboundedReceiver<Submission>) {
    debug!("Task scheduler worker started");
    let mut lanes = Lanes::default();
    let mut accepting = true;

    loop {
        tokio::select! {
            submission = receiver.recv(), if accepting => match submission {
                Some(submission) => lanes.submit(submission),
                None => accepting = false,
            },
            Some(finished) = lanes.running.join_next(), if !lanes.running.is_empty() => {
                match finished {
                    Ok((key, Ok(()))) => lanes.advance(key),
                    Ok((key, Err(e))) => {
                        error!("Scheduled task for {} aborted: {}", key, e);
                        audit_log!(aborted_task_record(&key, &e.to_string()));
                        lanes.advance(key);
                    }
                    Err(e) => error!("Scheduled task lane aborted: {}", e),
                }
            }
            else => break,
        }
    }
    debug!("Task scheduler worker stopped");
}
