use std::{
    collections::{HashMap, HashSet, VecDeque},
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Instant,
};

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

pub type JobId = u64;

type Job = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Normal,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("job was cancelled before it started")]
    Cancelled,

    #[error("job stopped without producing a result")]
    Aborted,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueStats {
    pub max_concurrent: usize,
    pub running: usize,
    pub pending: usize,
}

#[derive(Serialize, Clone, Debug)]
pub struct JobInfo {
    pub id: JobId,
    pub label: String,
    pub priority: Priority,
    /// Milliseconds since the job was queued (pending) or started (in flight).
    pub age_ms: u64,
}

#[derive(Serialize, Clone, Debug)]
pub struct QueueSnapshot {
    pub stats: QueueStats,
    pub pending: Vec<JobInfo>,
    pub in_flight: Vec<JobInfo>,
}

struct Pending {
    id: JobId,
    label: String,
    priority: Priority,
    queued_at: Instant,
    job: Job,
}

struct InFlight {
    label: String,
    priority: Priority,
    started_at: Instant,
}

struct Inner {
    max_concurrent: usize,
    next_id: JobId,
    pending: VecDeque<Pending>,
    in_flight: HashMap<JobId, InFlight>,
    cancelled: HashSet<JobId>,
}

/// In-memory limiter for outbound calls.
///
/// Jobs wait in a FIFO, `High` priority jobs are put in front of it, and at
/// most `max_concurrent` of them run at once. Nothing is persisted or
/// retried.
#[derive(Clone)]
pub struct RequestQueue {
    inner: Arc<Mutex<Inner>>,
}

impl RequestQueue {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                max_concurrent: max_concurrent.max(1),
                next_id: 1,
                pending: VecDeque::new(),
                in_flight: HashMap::new(),
                cancelled: HashSet::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues `task` and starts it right away when a slot is free.
    ///
    /// Must be called from within a tokio runtime.
    pub fn enqueue<T, F, Fut>(&self, label: impl Into<String>, priority: Priority, task: F) -> Ticket<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::new(move || {
            Box::pin(async move {
                let _ = tx.send(task().await);
            })
        });

        let label = label.into();
        let id = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;

            let pending = Pending {
                id,
                label: label.to_owned(),
                priority,
                queued_at: Instant::now(),
                job,
            };

            match priority {
                Priority::High => inner.pending.push_front(pending),
                Priority::Normal => inner.pending.push_back(pending),
            }

            id
        };

        tracing::debug!(job = id, label = %label, ?priority, "request queued");

        self.pump();

        Ticket {
            id,
            rx,
            queue: self.clone(),
        }
    }

    /// Removes a job that has not started yet.
    pub fn cancel(&self, id: JobId) -> bool {
        let removed = {
            let mut inner = self.lock();
            let Some(pos) = inner.pending.iter().position(|p| p.id == id) else {
                return false;
            };

            inner.cancelled.insert(id);
            inner.pending.remove(pos)
        };

        if let Some(job) = removed {
            tracing::debug!(job = id, label = %job.label, "request cancelled");
        }

        true
    }

    pub fn stats(&self) -> QueueStats {
        let inner = self.lock();

        QueueStats {
            max_concurrent: inner.max_concurrent,
            running: inner.in_flight.len(),
            pending: inner.pending.len(),
        }
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        let inner = self.lock();

        let pending = inner
            .pending
            .iter()
            .map(|p| JobInfo {
                id: p.id,
                label: p.label.to_owned(),
                priority: p.priority,
                age_ms: elapsed_ms(p.queued_at),
            })
            .collect();

        let mut in_flight = inner
            .in_flight
            .iter()
            .map(|(id, job)| JobInfo {
                id: *id,
                label: job.label.to_owned(),
                priority: job.priority,
                age_ms: elapsed_ms(job.started_at),
            })
            .collect::<Vec<_>>();
        in_flight.sort_by_key(|job| job.id);

        QueueSnapshot {
            stats: QueueStats {
                max_concurrent: inner.max_concurrent,
                running: inner.in_flight.len(),
                pending: inner.pending.len(),
            },
            pending,
            in_flight,
        }
    }

    /// Starts pending jobs until every slot is taken.
    fn pump(&self) {
        loop {
            let next = {
                let mut inner = self.lock();
                if inner.in_flight.len() >= inner.max_concurrent {
                    return;
                }

                let Some(next) = inner.pending.pop_front() else {
                    return;
                };

                inner.in_flight.insert(
                    next.id,
                    InFlight {
                        label: next.label.to_owned(),
                        priority: next.priority,
                        started_at: Instant::now(),
                    },
                );

                next
            };

            tracing::info!(job = next.id, label = %next.label, "request started");

            let slot = Slot {
                id: next.id,
                queue: self.clone(),
            };
            let job = next.job;

            tokio::spawn(async move {
                let _slot = slot;
                job().await;
            });
        }
    }

    fn was_cancelled(&self, id: JobId) -> bool {
        self.lock().cancelled.contains(&id)
    }
}

/// Releases the running slot when the job ends, including on panic.
struct Slot {
    id: JobId,
    queue: RequestQueue,
}

impl Drop for Slot {
    fn drop(&mut self) {
        let finished = self.queue.lock().in_flight.remove(&self.id);

        if let Some(job) = finished {
            tracing::info!(
                job = self.id,
                label = %job.label,
                elapsed_ms = elapsed_ms(job.started_at),
                "request finished"
            );
        }

        self.queue.pump();
    }
}

pub struct Ticket<T> {
    id: JobId,
    rx: oneshot::Receiver<T>,
    queue: RequestQueue,
}

impl<T> Ticket<T> {
    pub fn id(&self) -> JobId {
        self.id
    }

    pub async fn wait(mut self) -> Result<T, QueueError> {
        match (&mut self.rx).await {
            Ok(value) => Ok(value),
            Err(_) if self.queue.was_cancelled(self.id) => Err(QueueError::Cancelled),
            Err(_) => Err(QueueError::Aborted),
        }
    }
}

impl<T> Drop for Ticket<T> {
    fn drop(&mut self) {
        self.queue.lock().cancelled.remove(&self.id);
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}
