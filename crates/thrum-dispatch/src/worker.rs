//! NRT worker loop (§4.9, §5).
//!
//! The source runs this as a `WorkerThread` parked on a condvar, woken
//! whenever the RT thread enqueues a job. `ringbuf`'s queues have no built-in
//! wake signal, so this loop instead polls with a short sleep between empty
//! drains — simpler than threading a condvar through the SPSC queue, at the
//! cost of up to one sleep interval of added latency on deferred NRT work.
//! Noted as a simplification in the workspace's grounding ledger rather than
//! a literal translation of the source's wait-free wakeup.

use std::thread;
use std::time::Duration;

use thrum_core::{Host, NrtJobReceiver};

/// How long the worker parks between empty polls of the job queue.
const POLL_INTERVAL: Duration = Duration::from_micros(500);

/// Drains [`thrum_core::NrtJob`]s enqueued by the RT thread via
/// `World::schedule_nrt`, running each against a [`Host`] implementation.
pub struct NrtWorker<H> {
    jobs: NrtJobReceiver,
    host: H,
}

impl<H: Host> NrtWorker<H> {
    /// Build a worker around the receiver half of the RT-to-NRT job queue
    /// and the host facet jobs run against.
    #[must_use]
    pub fn new(jobs: NrtJobReceiver, host: H) -> Self {
        Self { jobs, host }
    }

    /// Drain every currently queued job without blocking. Returns the
    /// number of jobs run.
    pub fn poll(&mut self) -> usize {
        let mut count = 0;
        self.jobs.drain(|job| {
            job(&mut self.host);
            count += 1;
        });
        count
    }

    /// Run forever: poll, and sleep for [`POLL_INTERVAL`] whenever the queue
    /// was found empty. Intended to run on its own dedicated thread.
    pub fn run(mut self) -> ! {
        loop {
            if self.poll() == 0 {
                thread::sleep(POLL_INTERVAL);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use thrum_core::{EngineError, EngineResult, LogLevel, RtCommandSender, RtJob, SoundFileApi, SynthDef};
    use thrum_registry::PluginRegistry;

    struct StubHost {
        registry: Arc<Mutex<PluginRegistry>>,
        rt_commands: RtCommandSender,
    }

    impl Host for StubHost {
        fn lookup(&self, uri: &str) -> EngineResult<Arc<dyn SynthDef>> {
            self.registry.lock().unwrap().lookup(uri)
        }
        fn register(&mut self, uri: String, def: Arc<dyn SynthDef>) -> EngineResult<()> {
            self.registry.lock().unwrap().register(uri, def)
        }
        fn sound_files(&self) -> Option<&dyn SoundFileApi> {
            None
        }
        fn schedule_rt(&mut self, job: RtJob) -> EngineResult<()> {
            self.rt_commands.try_send(thrum_core::RtCommand::Job(job))
        }
        fn log(&self, _level: LogLevel, _message: &str) {}
    }

    #[test]
    fn poll_runs_every_queued_job() {
        let (_env, tx, _jobs) = thrum_core::Environment::new(thrum_core::Options::default());
        let (mut job_tx, job_rx) = thrum_core::queue::channel::<thrum_core::NrtJob>(4);
        let registry = Arc::new(Mutex::new(PluginRegistry::new()));
        let host = StubHost {
            registry,
            rt_commands: tx,
        };
        let mut worker = NrtWorker::new(job_rx, host);

        let ran = Arc::new(AtomicBool::new(false));
        let ran2 = ran.clone();
        job_tx
            .try_send(Box::new(move |_host: &mut dyn Host| {
                ran2.store(true, Ordering::SeqCst);
            }))
            .unwrap();

        assert_eq!(worker.poll(), 1);
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn poll_counts_zero_on_empty_queue() {
        let (_env, tx, jobs) = thrum_core::Environment::new(thrum_core::Options::default());
        let registry = Arc::new(Mutex::new(PluginRegistry::new()));
        let host = StubHost {
            registry,
            rt_commands: tx,
        };
        let mut worker = NrtWorker::new(jobs, host);
        assert_eq!(worker.poll(), 0);
        assert_eq!(worker.poll(), 0);
    }
}
