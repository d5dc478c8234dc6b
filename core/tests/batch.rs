//! End-to-end batch pipeline tests: outcome accounting, failure isolation,
//! fatal enumeration, the concurrency bound, and subscriber independence.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use imgstream_core::{
    BatchConfig, BatchEvent, BatchRunner, ImageTransform, Outcome, ProcessingError, ProgressHub,
    TargetFormat,
};

fn write_png(path: &Path) {
    let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_fn(24, 24, |x, y| {
        image::Rgba([(x * 10) as u8, (y * 10) as u8, 90, 255])
    }));
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

fn config_for(source: &Path, dest: &Path, concurrency: usize) -> BatchConfig {
    BatchConfig {
        source_dir: source.to_path_buf(),
        dest_dir: dest.to_path_buf(),
        target: TargetFormat::Webp,
        quality: 20,
        concurrency,
    }
}

async fn collect(mut events: tokio::sync::mpsc::Receiver<BatchEvent>) -> Vec<BatchEvent> {
    let mut all = Vec::new();
    while let Some(event) = events.recv().await {
        all.push(event);
    }
    all
}

fn outcomes(events: &[BatchEvent]) -> Vec<&Outcome> {
    events
        .iter()
        .filter_map(|e| match e {
            BatchEvent::Item(o) => Some(o),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn every_item_yields_exactly_one_outcome() {
    let source = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    for name in ["a.png", "b.png", "c.png"] {
        write_png(&source.path().join(name));
    }

    let runner = BatchRunner::new(config_for(source.path(), dest.path(), 2));
    let events = timeout(Duration::from_secs(30), collect(runner.start()))
        .await
        .unwrap();

    assert!(matches!(events.first(), Some(BatchEvent::Started { total: 3 })));
    assert!(matches!(events.last(), Some(BatchEvent::Done)));

    let items = outcomes(&events);
    assert_eq!(items.len(), 3);
    let names: HashSet<_> = items.iter().map(|o| o.name()).collect();
    assert_eq!(names, HashSet::from(["a.png", "b.png", "c.png"]));
    assert!(items.iter().all(|o| !o.is_failure()));
}

#[tokio::test]
async fn empty_source_directory_completes_immediately() {
    let source = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();

    let runner = BatchRunner::new(config_for(source.path(), dest.path(), 4));
    let events = collect(runner.start()).await;

    assert!(matches!(events[..], [BatchEvent::Started { total: 0 }, BatchEvent::Done]));
}

#[tokio::test]
async fn corrupt_image_does_not_abort_the_batch() {
    let source = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    write_png(&source.path().join("good1.png"));
    write_png(&source.path().join("good2.png"));
    fs::write(source.path().join("broken.png"), b"not an image").unwrap();

    let runner = BatchRunner::new(config_for(source.path(), dest.path(), 2));
    let events = collect(runner.start()).await;

    let items = outcomes(&events);
    assert_eq!(items.len(), 3);
    assert_eq!(items.iter().filter(|o| o.is_failure()).count(), 1);
    assert_eq!(
        items.iter().find(|o| o.is_failure()).unwrap().name(),
        "broken.png"
    );
    assert!(matches!(events.last(), Some(BatchEvent::Done)));
}

#[tokio::test]
async fn unreadable_source_directory_is_fatal() {
    let scratch = tempfile::tempdir().unwrap();
    let missing = scratch.path().join("no_such_dir");
    let dest = scratch.path().join("out");

    let runner = BatchRunner::new(config_for(&missing, &dest, 2));
    let events = timeout(Duration::from_secs(10), collect(runner.start()))
        .await
        .expect("fatal batch must terminate, not hang");

    assert_eq!(events.len(), 1);
    match &events[0] {
        BatchEvent::Fatal(msg) => {
            assert!(msg.starts_with("Error reading source directory:"))
        }
        other => panic!("expected Fatal, got {other:?}"),
    }
}

#[tokio::test]
async fn reruns_never_overwrite_earlier_output() {
    let source = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    write_png(&source.path().join("a.png"));
    write_png(&source.path().join("b.png"));

    for _ in 0..2 {
        let runner = BatchRunner::new(config_for(source.path(), dest.path(), 2));
        collect(runner.start()).await;
    }

    let produced: Vec<_> = fs::read_dir(dest.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    // Two runs over two sources: four distinct files, nothing clobbered.
    assert_eq!(produced.len(), 4);
}

/// Codec double that records how many transforms run at once.
struct CountingTransform {
    current: AtomicUsize,
    max_seen: AtomicUsize,
}

impl CountingTransform {
    fn new() -> Self {
        Self {
            current: AtomicUsize::new(0),
            max_seen: AtomicUsize::new(0),
        }
    }
}

impl ImageTransform for CountingTransform {
    fn transform(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
    ) -> Result<(), ProcessingError> {
        let in_flight = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_seen.fetch_max(in_flight, Ordering::SeqCst);
        // Hold the slot long enough for the runner to try to overlap.
        std::thread::sleep(Duration::from_millis(30));
        io::copy(input, output)?;
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrency_bound_is_respected() {
    let source = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    for i in 0..8 {
        write_png(&source.path().join(format!("img{i}.png")));
    }

    let counting = Arc::new(CountingTransform::new());
    let runner = BatchRunner::with_transform(
        config_for(source.path(), dest.path(), 2),
        counting.clone(),
    );
    let events = collect(runner.start()).await;

    assert_eq!(outcomes(&events).len(), 8);
    let max_seen = counting.max_seen.load(Ordering::SeqCst);
    assert!(max_seen <= 2, "bound exceeded: {max_seen} in flight");
    assert!(max_seen >= 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn dropped_subscriber_does_not_disturb_the_rest() {
    let source = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    for name in ["a.png", "b.png", "c.png", "d.png"] {
        write_png(&source.path().join(name));
    }

    let hub = Arc::new(ProgressHub::default());
    let mut early_quitter = hub.subscribe();
    let mut watcher = hub.subscribe();

    let runner = BatchRunner::new(config_for(source.path(), dest.path(), 2));
    let events = runner.start();
    let forward_hub = hub.clone();
    tokio::spawn(async move { forward_hub.forward(events).await });

    // First subscriber bails after a single event.
    let _ = early_quitter.recv().await;
    drop(early_quitter);

    let mut seen_items = 0;
    loop {
        match timeout(Duration::from_secs(30), watcher.recv()).await {
            Ok(Ok(BatchEvent::Item(_))) => seen_items += 1,
            Ok(Ok(BatchEvent::Done)) => break,
            Ok(Ok(_)) => {}
            Ok(Err(e)) => panic!("watcher lost the feed: {e}"),
            Err(_) => panic!("watcher timed out"),
        }
    }
    assert_eq!(seen_items, 4);
}
