//! Tests for position-triggered callbacks.

use std::sync::mpsc;
use std::time::Duration;

use parking_lot::Mutex;

use super::*;
use crate::{SILENCE, Watcher};

const ASYNC_TIMEOUT: Duration = Duration::from_secs(5);

#[test]
fn test_streams_without_events() {
    let (s, data) = random_data_streamer(100);
    let mut watcher = Watcher::new(s);
    assert_eq!(collect(&mut watcher), data);
    assert_eq!(watcher.position(), 100);
}

#[test]
fn test_sync_trigger_keeps_sample_count() {
    let (s, _) = random_data_streamer(75);
    let mut watcher = Watcher::new(s);
    watcher.at_sync(25, |_| {});

    let mut buf = [SILENCE; 50];
    assert_eq!(watcher.stream(&mut buf), (50, true));
    assert_eq!(watcher.stream(&mut buf), (25, true));
    assert_eq!(watcher.stream(&mut buf), (0, false));
}

#[test]
fn test_sync_triggers_see_exact_position() {
    let (s, _) = random_data_streamer(100);
    let source_pos = s.position_handle();
    let observed = Arc::new(Mutex::new(Vec::new()));

    let mut watcher = Watcher::new(s);
    for at in [50, 0, 100, 101] {
        let source_pos = Arc::clone(&source_pos);
        let observed = Arc::clone(&observed);
        watcher.at_sync(at, move |pos| {
            observed.lock().push((pos, source_pos.load(Ordering::SeqCst)));
        });
    }

    collect(&mut watcher);
    assert_eq!(
        *observed.lock(),
        vec![(0, 0), (50, 50), (100, 100)]
    );
}

#[test]
fn test_sync_triggers_at_same_position_fire_in_order() {
    let (s, _) = random_data_streamer(10);
    let order = Arc::new(Mutex::new(Vec::new()));

    let mut watcher = Watcher::new(s);
    for id in 0..4 {
        let order = Arc::clone(&order);
        watcher.at_sync(5, move |_| order.lock().push(id));
    }
    collect(&mut watcher);
    assert_eq!(*order.lock(), vec![0, 1, 2, 3]);
}

#[test]
fn test_sync_trigger_in_the_past_fires_on_next_pull() {
    let (s, _) = random_data_streamer(100);
    let mut watcher = Watcher::new(s);
    let mut buf = [SILENCE; 40];
    watcher.stream(&mut buf);

    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    watcher.at_sync(10, move |pos| {
        assert_eq!(pos, 10);
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(watcher.stream(&mut buf), (40, true));
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn test_async_triggers_fire_after_pull() {
    let (s, _) = random_data_streamer(100);
    let source_pos = s.position_handle();
    let (tx, rx) = mpsc::channel();

    let mut watcher = Watcher::new(s);
    for at in [0, 50, 100, 101] {
        let tx = tx.clone();
        let source_pos = Arc::clone(&source_pos);
        watcher.at_async(at, move |pos| {
            let _ = tx.send((pos, source_pos.load(Ordering::SeqCst)));
        });
    }
    drop(tx);

    let mut buf = [SILENCE; 200];
    assert_eq!(watcher.stream(&mut buf), (100, true));

    let fired: Vec<_> = (0..3)
        .map(|_| rx.recv_timeout(ASYNC_TIMEOUT).unwrap())
        .collect();
    assert_eq!(fired, vec![(0, 100), (50, 100), (100, 100)]);

    // The trigger at 101 is never reached.
    assert_eq!(watcher.stream(&mut buf), (0, false));
    assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
}

#[test]
fn test_started_triggers() {
    let (s, _) = random_data_streamer(10);
    let (tx, rx) = mpsc::channel();
    let sync_fired = Arc::new(AtomicUsize::new(0));

    let mut watcher = Watcher::new(s);
    let counter = Arc::clone(&sync_fired);
    watcher.started_sync(move |pos| {
        assert_eq!(pos, 0);
        counter.fetch_add(1, Ordering::SeqCst);
    });
    watcher.started_async(move |pos| {
        let _ = tx.send(pos);
    });

    let mut buf = [SILENCE; 4];
    watcher.stream(&mut buf);
    assert_eq!(sync_fired.load(Ordering::SeqCst), 1);
    assert_eq!(rx.recv_timeout(ASYNC_TIMEOUT).unwrap(), 0);
}

#[test]
fn test_ended_sync_fires_once() {
    let (s, _) = random_data_streamer(100);
    let source_pos = s.position_handle();
    let calls = Arc::new(Mutex::new(Vec::new()));

    let mut watcher = Watcher::new(s);
    let observed = Arc::clone(&calls);
    watcher.ended_sync(move |pos| {
        observed.lock().push((pos, source_pos.load(Ordering::SeqCst)));
    });

    collect(&mut watcher);
    let mut buf = [SILENCE; 8];
    assert_eq!(watcher.stream(&mut buf), (0, false));
    assert_eq!(*calls.lock(), vec![(100, 100)]);
}

#[test]
fn test_ended_async_fires_once() {
    let (s, _) = random_data_streamer(100);
    let (tx, rx) = mpsc::channel();

    let mut watcher = Watcher::new(s);
    watcher.ended_async(move |pos| {
        let _ = tx.send(pos);
    });

    collect(&mut watcher);
    let mut buf = [SILENCE; 8];
    assert_eq!(watcher.stream(&mut buf), (0, false));

    assert_eq!(rx.recv_timeout(ASYNC_TIMEOUT).unwrap(), 100);
    // The sender was moved into the trigger, so the channel closes once it
    // has run and cannot fire again.
    assert!(rx.recv_timeout(ASYNC_TIMEOUT).is_err());
}

#[test]
fn test_watcher_passes_errors_through() {
    let mut watcher = Watcher::new(ErrorStreamer(StreamError::decode("bad block")));
    let mut buf = [SILENCE; 8];
    assert_eq!(watcher.stream(&mut buf), (0, false));
    assert!(matches!(watcher.err(), Some(StreamError::Decode(_))));
}

#[test]
fn test_watcher_contract() {
    let (s, _) = random_data_streamer(3_000);
    let mut watcher = Watcher::new(s);
    for at in (0..3_000).step_by(97) {
        watcher.at_sync(at, |_| {});
    }
    assert_streamer_contract(&mut watcher, 3_000);
}
