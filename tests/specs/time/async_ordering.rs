//! Async ordering specs
//!
//! Verify that ready runtime tasks run before fake timers fire, and that
//! real-time waits work while time is faked.

use crate::prelude::*;
use similar_asserts::assert_eq;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::Notify;

type Log = Arc<Mutex<Vec<&'static str>>>;

fn record(log: &Log, entry: &'static str) -> impl Fn() + Send + 'static {
    let log = Arc::clone(log);
    move || log.lock().unwrap().push(entry)
}

#[tokio::test]
async fn ready_tasks_run_before_due_timers() {
    let time = FakeTime::with_start(0i64).unwrap();
    let log = Log::default();
    FakeTime::set_timeout(record(&log, "timer"), ms(0)).unwrap();
    let first = tokio::spawn({
        let log = Arc::clone(&log);
        async move { log.lock().unwrap().push("first task") }
    });
    let second = tokio::spawn({
        let log = Arc::clone(&log);
        async move { log.lock().unwrap().push("second task") }
    });

    time.tick_async(ms(0)).await.unwrap();
    first.await.unwrap();
    second.await.unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec!["first task", "second task", "timer"]
    );
}

#[tokio::test]
async fn tasks_woken_by_a_timer_run_before_the_next_timer() {
    let time = FakeTime::with_start(0i64).unwrap();
    let log = Log::default();
    let wake = Arc::new(Notify::new());

    let waiter = Arc::clone(&wake);
    let task_log = Arc::clone(&log);
    let task = tokio::spawn(async move {
        waiter.notified().await;
        task_log.lock().unwrap().push("woken");
    });
    let waker = Arc::clone(&wake);
    FakeTime::set_timeout(move || waker.notify_one(), ms(10)).unwrap();
    FakeTime::set_timeout(record(&log, "second timer"), ms(20)).unwrap();

    time.run_all_async().await.unwrap();
    task.await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["woken", "second timer"]);
    assert_eq!(time.now(), 20);
}

#[tokio::test]
async fn spawned_tasks_schedule_on_the_fake_clock() {
    let time = FakeTime::with_start(0i64).unwrap();
    let log = Log::default();
    let task_log = Arc::clone(&log);
    let task = tokio::spawn(async move {
        timers::set_timeout(record(&task_log, "from task"), ms(50)).map(|_| ())
    });

    task.await.unwrap().unwrap();
    assert_eq!(time.pending(), 1);
    assert!(time.next_async().await.unwrap());
    assert_eq!(*log.lock().unwrap(), vec!["from task"]);
}

#[tokio::test]
async fn delay_waits_on_real_time_while_faking() {
    let time = FakeTime::with_start(0i64).unwrap();
    let started = Instant::now();

    delay(ms(20), None).await.unwrap();

    assert!(started.elapsed() >= ms(20));
    assert_eq!(time.now(), 0);
}

#[tokio::test]
async fn aborted_delay_rejects() {
    let _time = FakeTime::with_start(0i64).unwrap();
    let controller = AbortController::new();
    let signal = controller.signal();

    let (result, ()) = tokio::join!(delay(ms(60_000), Some(&signal)), async {
        tokio::time::sleep(ms(5)).await;
        controller.abort();
    });
    assert!(matches!(result, Err(TimeError::Aborted)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn delay_can_be_spawned_onto_worker_threads() {
    let controller = AbortController::new();
    let signal = controller.signal();
    let started = Instant::now();

    let waits = (0..4).map(|_| {
        let signal = signal.clone();
        tokio::spawn(async move { delay(ms(10), Some(&signal)).await })
    });
    for wait in waits.collect::<Vec<_>>() {
        wait.await.unwrap().unwrap();
    }

    assert!(started.elapsed() >= ms(10));
}
