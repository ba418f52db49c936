//! Fake time scheduling specs
//!
//! Verify timer ordering, intervals, cancellation, and the clock lifecycle.

use crate::prelude::*;
use similar_asserts::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Log = Rc<RefCell<Vec<String>>>;

fn record(log: &Log, entry: &str) -> impl Fn() + 'static {
    let log = Rc::clone(log);
    let entry = entry.to_string();
    move || log.borrow_mut().push(entry.clone())
}

#[test]
fn timeout_fires_on_the_millisecond_it_is_due() {
    let time = FakeTime::with_start(0i64).unwrap();
    let fired_at = Rc::new(RefCell::new(None));
    let seen = Rc::clone(&fired_at);
    FakeTime::set_timeout(move || *seen.borrow_mut() = Some(timers::now()), ms(1000)).unwrap();

    time.tick(ms(999)).unwrap();
    assert_eq!(*fired_at.borrow(), None);
    time.tick(ms(1)).unwrap();
    assert_eq!(*fired_at.borrow(), Some(1000));
}

#[test]
fn timers_fire_by_due_time_then_registration() {
    let time = FakeTime::with_start(0i64).unwrap();
    let log = Log::default();
    FakeTime::set_timeout(record(&log, "A"), ms(1000)).unwrap();
    FakeTime::set_timeout(record(&log, "B"), ms(1500)).unwrap();
    FakeTime::set_timeout(record(&log, "C"), ms(1000)).unwrap();

    time.tick(ms(2000)).unwrap();
    assert_eq!(*log.borrow(), vec!["A", "C", "B"]);
}

#[test]
fn interval_refires_until_cleared() {
    let time = FakeTime::with_start(0i64).unwrap();
    let count = Arc::new(AtomicUsize::new(0));
    let bump = Arc::clone(&count);
    let handle = timers::set_interval(
        move || {
            bump.fetch_add(1, Ordering::SeqCst);
        },
        ms(1000),
    )
    .unwrap();
    assert!(matches!(handle, TimerHandle::Fake(_)));

    time.tick(ms(999)).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 0);
    time.tick(ms(1)).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
    time.tick(ms(2000)).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 3);

    timers::clear_interval(handle);
    time.tick(ms(10_000)).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

#[test]
fn run_all_skips_timers_cancelled_along_the_way() {
    let time = FakeTime::with_start(0i64).unwrap();
    let log = Log::default();
    let doomed = FakeTime::set_timeout(record(&log, "doomed"), ms(200)).unwrap();
    let inner = Rc::clone(&log);
    FakeTime::set_timeout(
        move || {
            inner.borrow_mut().push("cancel".to_string());
            FakeTime::clear_timeout(doomed).unwrap();
        },
        ms(100),
    )
    .unwrap();
    FakeTime::set_timeout(record(&log, "survivor"), ms(300)).unwrap();

    time.run_all().unwrap();
    assert_eq!(*log.borrow(), vec!["cancel", "survivor"]);
    assert_eq!(time.now(), 300);
}

#[test]
fn time_only_moves_forward() {
    let time = FakeTime::with_start(1_000i64).unwrap();
    time.set_now(1_500).unwrap();
    assert!(matches!(
        time.set_now(1_499),
        Err(TimeError::Backwards {
            now: 1_500,
            target: 1_499
        })
    ));
    assert_eq!(time.now(), 1_500);
}

#[test]
fn restore_succeeds_only_once() {
    let time = FakeTime::with_start(0i64).unwrap();
    time.restore().unwrap();
    assert!(matches!(time.restore(), Err(TimeError::AlreadyRestored)));
    assert!(matches!(
        FakeTime::set_interval(|| (), ms(1)),
        Err(TimeError::NoFakeTime)
    ));
    assert!(timers::now() > 0);
}

#[test]
fn failing_callback_halts_the_advance_where_it_failed() {
    let time = FakeTime::with_start(0i64).unwrap();
    let log = Log::default();
    FakeTime::set_timeout(record(&log, "before"), ms(100)).unwrap();
    FakeTime::set_timeout(|| Err::<(), _>(Fault::msg("boom")), ms(200)).unwrap();
    FakeTime::set_timeout(record(&log, "after"), ms(300)).unwrap();

    let err = time.set_now(1_000).unwrap_err();
    assert!(matches!(&err, TimeError::Callback { fault, .. } if fault.to_string() == "boom"));
    assert_eq!(*log.borrow(), vec!["before"]);
    assert_eq!(time.now(), 200);

    time.run_all().unwrap();
    assert_eq!(*log.borrow(), vec!["before", "after"]);
}

#[test]
fn dates_follow_the_fake_clock() {
    let time = FakeTime::with_options(
        FakeTimeOptions::from_toml(r#"start = "2021-03-31T12:00:00Z""#).unwrap(),
    )
    .unwrap();
    assert_eq!(FakeDate::new().to_iso_string(), "2021-03-31T12:00:00.000Z");

    time.tick(ms(90 * 60 * 1000)).unwrap();
    assert_eq!(FakeDate::new().to_iso_string(), "2021-03-31T13:30:00.000Z");
    assert_eq!(FakeDate::now(), FakeDate::utc(2021, 2, 31, 13, 30, 0, 0).unwrap());
}
