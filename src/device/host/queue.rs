use std::panic::AssertUnwindSafe;
use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex, PoisonError};

use crate::device::WaitMode;
use crate::device::host::HostCommand;
use crate::device::host::exec;
use crate::foundation::error::{RasterError, RasterResult};

#[derive(Debug, Default, Clone)]
struct Counters {
    submitted: u64,
    scheduled: u64,
    completed: u64,
    /// First submission that panicked. Every later completion wait fails with it.
    failed: Option<(u64, String)>,
}

#[derive(Default)]
struct QueueState {
    counters: Mutex<Counters>,
    changed: Condvar,
}

struct Submission {
    ticket: u64,
    commands: Vec<HostCommand>,
}

/// FIFO submission queue drained by one worker thread.
///
/// Kernels inside a submission run on the device's rayon pool; submissions never overlap.
#[derive(Clone)]
pub(crate) struct HostQueue {
    tx: mpsc::Sender<Submission>,
    state: Arc<QueueState>,
}

impl HostQueue {
    pub(crate) fn spawn(pool: Arc<rayon::ThreadPool>) -> RasterResult<Self> {
        let (tx, rx) = mpsc::channel::<Submission>();
        let state = Arc::new(QueueState::default());
        let worker_state = Arc::clone(&state);
        std::thread::Builder::new()
            .name("gpraster-host-queue".to_owned())
            .spawn(move || worker(&rx, &worker_state, &pool))
            .map_err(|e| RasterError::encoder(format!("failed to start host queue: {e}")))?;
        Ok(Self { tx, state })
    }

    /// Hand `commands` to the worker and return the submission ticket.
    pub(crate) fn submit(&self, commands: Vec<HostCommand>) -> RasterResult<u64> {
        let mut c = self.lock();
        let ticket = c.submitted + 1;
        // Sent under the lock so tickets reach the worker in order.
        self.tx
            .send(Submission { ticket, commands })
            .map_err(|_| RasterError::encoder("host queue has stopped"))?;
        c.submitted = ticket;
        Ok(ticket)
    }

    /// Block until `ticket` reaches `mode`. A completion wait fails once any submission up to
    /// `ticket` has panicked; the host device is lost from then on.
    pub(crate) fn wait(&self, ticket: u64, mode: WaitMode) -> RasterResult<()> {
        let mut c = self.lock();
        loop {
            let reached = match mode {
                WaitMode::None => true,
                WaitMode::Scheduled => c.scheduled >= ticket,
                WaitMode::Completed => c.completed >= ticket,
            };
            if reached {
                return match (&c.failed, mode) {
                    (Some((failed, msg)), WaitMode::Completed) if *failed <= ticket => {
                        Err(RasterError::encoder(format!(
                            "host submission {failed} panicked: {msg}"
                        )))
                    }
                    _ => Ok(()),
                };
            }
            c = self
                .state
                .changed
                .wait(c)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Block until every submission so far has completed.
    pub(crate) fn wait_idle(&self) -> RasterResult<()> {
        let ticket = self.lock().submitted;
        self.wait(ticket, WaitMode::Completed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Counters> {
        self.state
            .counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn worker(rx: &mpsc::Receiver<Submission>, state: &QueueState, pool: &rayon::ThreadPool) {
    while let Ok(sub) = rx.recv() {
        update(state, |c| c.scheduled = sub.ticket);

        let count = sub.commands.len();
        let run = std::panic::catch_unwind(AssertUnwindSafe(|| {
            pool.install(|| {
                for cmd in &sub.commands {
                    exec::run(cmd);
                }
            })
        }));
        let failure = run.err().map(|payload| panic_message(payload.as_ref()));
        if let Some(msg) = &failure {
            tracing::error!(ticket = sub.ticket, panic = %msg, "host submission panicked");
        }
        tracing::trace!(ticket = sub.ticket, commands = count, "host submission done");

        update(state, |c| {
            c.completed = sub.ticket;
            if c.failed.is_none()
                && let Some(msg) = failure
            {
                c.failed = Some((sub.ticket, msg));
            }
        });
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

fn update(state: &QueueState, f: impl FnOnce(&mut Counters)) {
    let mut c = state
        .counters
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    f(&mut c);
    state.changed.notify_all();
}
