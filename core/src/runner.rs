use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use crate::config::BatchConfig;
use crate::error::ProcessingError;
use crate::events::{BatchEvent, Outcome};
use crate::naming::RunTag;
use crate::scan;
use crate::transform::{CodecTransform, ImageTransform};
use crate::worker;

/// Backpressure buffer between workers and the event consumer.
const EVENT_BUFFER: usize = 64;

/// Orchestrates one batch: enumerate once, convert every item under the
/// concurrency bound, stream outcomes in completion order, finish with a
/// terminal event.
pub struct BatchRunner {
    config: Arc<BatchConfig>,
    transform: Arc<dyn ImageTransform>,
}

impl BatchRunner {
    pub fn new(config: BatchConfig) -> Self {
        let transform = Arc::new(CodecTransform::new(config.target, config.quality));
        Self {
            config: Arc::new(config),
            transform,
        }
    }

    /// Substitute the codec, used to instrument the pipeline in tests.
    pub fn with_transform(config: BatchConfig, transform: Arc<dyn ImageTransform>) -> Self {
        Self {
            config: Arc::new(config),
            transform,
        }
    }

    /// Start the batch and hand back its event stream.
    ///
    /// The receiver yields `Started`, then one `Item` per enumerated file in
    /// completion order, then `Done` — or a single `Fatal` if the source
    /// directory cannot be read. The channel closes after the terminal event.
    /// Dropping the receiver does not cancel the batch.
    pub fn start(self) -> mpsc::Receiver<BatchEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        tokio::spawn(Self::drive(self.config, self.transform, tx));
        rx
    }

    async fn drive(
        config: Arc<BatchConfig>,
        transform: Arc<dyn ImageTransform>,
        tx: mpsc::Sender<BatchEvent>,
    ) {
        // Idempotent and race-free; if it fails, every write surfaces as a
        // per-item failure rather than a fatal stop.
        if let Err(e) = fs::create_dir_all(&config.dest_dir) {
            log::warn!(
                "could not create destination directory {}: {e}",
                config.dest_dir.display()
            );
        }

        let run = RunTag::new();
        let items = match scan::enumerate(&config.source_dir, &run, config.target) {
            Ok(items) => items,
            Err(e) => {
                log::error!("{e}");
                let _ = tx.send(BatchEvent::Fatal(fatal_message(&e))).await;
                return;
            }
        };

        log::info!(
            "batch {run}: converting {} file(s) from {} to {}",
            items.len(),
            config.source_dir.display(),
            config.dest_dir.display()
        );
        let _ = tx.send(BatchEvent::Started { total: items.len() }).await;

        let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for item in items {
            let semaphore = semaphore.clone();
            let tx = tx.clone();
            let transform = transform.clone();
            let dest_dir: PathBuf = config.dest_dir.clone();

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                let name = item.name.clone();
                // The read/transform/write chain is blocking and CPU-bound;
                // run it on the blocking pool so conversions truly overlap.
                let outcome = match tokio::task::spawn_blocking(move || {
                    worker::convert_item(&item, &dest_dir, transform.as_ref())
                })
                .await
                {
                    Ok(outcome) => outcome,
                    Err(e) => Outcome::Failed {
                        name,
                        reason: format!("conversion task aborted: {e}"),
                    },
                };
                // Push downstream the moment the item completes.
                let _ = tx.send(BatchEvent::Item(outcome)).await;
            });
        }

        while tasks.join_next().await.is_some() {}
        let _ = tx.send(BatchEvent::Done).await;
        log::info!("batch {run}: done");
    }
}

fn fatal_message(err: &ProcessingError) -> String {
    format!("Error reading source directory: {err}")
}
