use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use frame_dispatch_core::{
    FilteredListener, FrameError, FrameId, FrameMetadata, FrameOwner, FrameProcessor,
    ProcessorConfig,
};
use frame_dispatch_sources::{QueueFrameSource, ReplayFrameSource, SourceOwner};

#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<FrameId>>,
}

impl FilteredListener for Recorder {
    fn on_frame_available(&self, frame_id: FrameId, _frame: &FrameMetadata) {
        self.seen.lock().push(frame_id);
    }
}

struct Counting {
    calls: Arc<AtomicUsize>,
}

impl FilteredListener for Counting {
    fn on_frame_available(&self, _frame_id: FrameId, _frame: &FrameMetadata) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn processor() -> FrameProcessor {
    FrameProcessor::new(ProcessorConfig {
        wait_timeout: Duration::from_millis(10),
        thread_name: "frame-processor-test".into(),
        ..Default::default()
    })
    .unwrap()
}

fn weak<L: FilteredListener + 'static>(listener: &Arc<L>) -> Weak<dyn FilteredListener> {
    let weak: Weak<L> = Arc::downgrade(listener);
    weak
}

fn frames(ids: &[FrameId]) -> Vec<FrameMetadata> {
    ids.iter()
        .enumerate()
        .map(|(count, &id)| FrameMetadata::with_request(id, count as i32))
        .collect()
}

fn wait_for<F: Fn() -> bool>(condition: F) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not met within 5s");
        thread::sleep(Duration::from_millis(2));
    }
}

fn start(processor: &FrameProcessor, source: &Arc<QueueFrameSource>) -> Arc<dyn FrameOwner> {
    let owner: Arc<dyn FrameOwner> = Arc::new(SourceOwner::new(1, source.clone()));
    processor.start(Arc::downgrade(&owner)).unwrap();
    owner
}

#[test]
fn single_range_sees_only_ids_inside_it() {
    let processor = processor();
    let listener = Arc::new(Recorder::default());
    processor.register_listener(10, 20, weak(&listener)).unwrap();

    let source = Arc::new(QueueFrameSource::new());
    source.push_all(frames(&[9, 10, 15, 19, 20]));
    let owner = start(&processor, &source);

    wait_for(|| processor.diagnostics().frames_processed == 5);
    assert_eq!(*listener.seen.lock(), vec![10, 15, 19]);

    drop(owner);
    processor.join();
}

#[test]
fn overlapping_ranges_both_fire() {
    let processor = processor();
    let order = Arc::new(Mutex::new(Vec::new()));

    struct Tagged {
        name: &'static str,
        order: Arc<Mutex<Vec<(&'static str, FrameId)>>>,
    }
    impl FilteredListener for Tagged {
        fn on_frame_available(&self, frame_id: FrameId, _frame: &FrameMetadata) {
            self.order.lock().push((self.name, frame_id));
        }
    }

    let l1 = Arc::new(Tagged {
        name: "l1",
        order: order.clone(),
    });
    let l2 = Arc::new(Tagged {
        name: "l2",
        order: order.clone(),
    });
    processor.register_listener(0, 100, weak(&l1)).unwrap();
    processor.register_listener(50, 150, weak(&l2)).unwrap();

    let source = Arc::new(QueueFrameSource::new());
    let owner = start(&processor, &source);

    source.push(FrameMetadata::with_request(75, 0));
    wait_for(|| order.lock().len() == 2);
    source.push(FrameMetadata::with_request(10, 1));
    wait_for(|| order.lock().len() == 3);

    assert_eq!(*order.lock(), vec![("l1", 75), ("l2", 75), ("l1", 10)]);

    drop(owner);
    processor.join();
}

#[test]
fn released_listener_is_never_called_and_gets_reaped() {
    let processor = processor();
    let calls = Arc::new(AtomicUsize::new(0));
    let listener = Arc::new(Counting { calls: calls.clone() });
    processor.register_listener(0, 10, weak(&listener)).unwrap();
    assert_eq!(processor.listener_count(), 1);

    drop(listener);

    let source = Arc::new(QueueFrameSource::new());
    let owner = start(&processor, &source);
    source.push(FrameMetadata::with_request(5, 0));

    wait_for(|| processor.diagnostics().frames_processed == 1);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(processor.listener_count(), 0);

    drop(owner);
    processor.join();
}

#[test]
fn dropping_owner_terminates_the_loop() {
    let processor = processor();
    let listener = Arc::new(Recorder::default());
    processor.register_listener(0, 100, weak(&listener)).unwrap();

    let source = Arc::new(QueueFrameSource::new());
    let owner = start(&processor, &source);
    source.push(FrameMetadata::with_request(1, 0));
    wait_for(|| listener.seen.lock().len() == 1);

    drop(owner);
    processor.join();
    assert!(processor.state().is_terminal());

    source.push(FrameMetadata::with_request(2, 1));
    thread::sleep(Duration::from_millis(30));
    assert_eq!(*listener.seen.lock(), vec![1]);
    assert_eq!(source.pending(), 1);
}

#[test]
fn detaching_source_terminates_the_loop() {
    let processor = processor();
    let source = Arc::new(QueueFrameSource::new());
    let owner = Arc::new(SourceOwner::new(2, source.clone()));
    let owner_dyn: Arc<dyn FrameOwner> = owner.clone();
    processor.start(Arc::downgrade(&owner_dyn)).unwrap();

    owner.detach_source();
    processor.join();

    assert!(processor.state().is_terminal());
}

#[test]
fn errors_do_not_stop_dispatch() {
    let processor = processor();
    let listener = Arc::new(Recorder::default());
    processor.register_listener(0, 100, weak(&listener)).unwrap();

    let source = Arc::new(QueueFrameSource::new());
    source.fail_next_wait(FrameError::Source("device busy".into()));
    let owner = start(&processor, &source);
    wait_for(|| processor.diagnostics().source_errors == 1);

    source.fail_next_fetch(FrameError::Source("read failed".into()));
    source.push(FrameMetadata::with_request(3, 0));
    wait_for(|| processor.diagnostics().source_errors == 2);

    // The frame stayed buffered and goes out on the next pass.
    wait_for(|| listener.seen.lock().len() == 1);
    assert_eq!(*listener.seen.lock(), vec![3]);
    assert!(processor.state().is_running());

    drop(owner);
    processor.join();
}

#[test]
fn listeners_change_from_another_thread_while_frames_flow() {
    const LAST_FRAME: FrameId = 1_000_000;

    let processor = Arc::new(processor());
    let watcher = Arc::new(Recorder::default());
    processor.register_listener(0, i32::MAX, weak(&watcher)).unwrap();

    let source = Arc::new(QueueFrameSource::new());
    let owner = start(&processor, &source);

    let stop = Arc::new(AtomicBool::new(false));
    let producer = {
        let source = source.clone();
        let stop = stop.clone();
        thread::spawn(move || {
            let mut id = 0;
            while !stop.load(Ordering::SeqCst) {
                source.push(FrameMetadata::with_request(id, id));
                id += 1;
                thread::sleep(Duration::from_millis(1));
            }
        })
    };

    let late = Arc::new(Recorder::default());
    let control = {
        let processor = processor.clone();
        let late = late.clone();
        thread::spawn(move || {
            let late_ref = weak(&late);
            processor.register_listener(0, i32::MAX, late_ref.clone()).unwrap();
            wait_for(|| late.seen.lock().len() >= 3);
            processor.remove_listener(0, i32::MAX, &late_ref).unwrap();
        })
    };
    control.join().unwrap();

    stop.store(true, Ordering::SeqCst);
    producer.join().unwrap();
    source.push(FrameMetadata::with_request(LAST_FRAME, 0));
    wait_for(|| watcher.seen.lock().contains(&LAST_FRAME));

    let seen = late.seen.lock().clone();
    assert!(seen.len() >= 3);
    assert!(!seen.contains(&LAST_FRAME));
    assert!(seen.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(processor.listener_count(), 1);

    drop(owner);
    processor.join();
}

#[test]
fn replayed_recording_is_dispatched_and_dumped() {
    let path = std::env::temp_dir().join("frame_dispatch_test_replay.jsonl");
    let lines: Vec<String> = frames(&[4, 5, 6])
        .iter()
        .map(|frame| serde_json::to_string(frame).unwrap())
        .collect();
    std::fs::write(&path, lines.join("\n")).unwrap();

    let processor = processor();
    let listener = Arc::new(Recorder::default());
    processor.register_listener(5, 7, weak(&listener)).unwrap();

    let source = Arc::new(ReplayFrameSource::open(&path).unwrap().with_batch_size(2));
    let owner: Arc<dyn FrameOwner> = Arc::new(SourceOwner::new(3, source.clone()));
    processor.start(Arc::downgrade(&owner)).unwrap();

    wait_for(|| processor.diagnostics().frames_processed == 3);
    assert_eq!(*listener.seen.lock(), vec![5, 6]);
    assert_eq!(source.remaining(), 0);

    let mut out = Vec::new();
    processor.dump(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("    Latest received frame:\n"));
    assert!(text.contains("request.id (0x000c0001): int32[1] 6"));
    assert!(text.contains("    State: running\n"));

    drop(owner);
    processor.join();
    std::fs::remove_file(&path).ok();
}
