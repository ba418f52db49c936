//! Spy specs
//!
//! Verify call recording and restoring of spied members.

use crate::prelude::*;
use similar_asserts::assert_eq;
use std::sync::Arc;

#[test]
fn spy_on_member_records_every_call() {
    let point = Point::new(2, 3);
    let action = Spy::on(&point.action).unwrap();

    point.action(vec![]).unwrap();
    point.action(vec![3, 5, 7]).unwrap();
    action.call(vec![9]).unwrap();

    assert_eq!(
        action.calls(),
        vec![
            SpyCall::with_args(vec![])
                .on(Point::new(2, 3))
                .returning(None),
            SpyCall::with_args(vec![3, 5, 7])
                .on(Point::new(2, 3))
                .returning(Some(3)),
            SpyCall::with_args(vec![9]).returning(Some(9)),
        ]
    );
}

#[test]
fn spy_records_faults_and_rethrows_them() {
    let fault = Fault::msg("bad input");
    let raised = fault.clone();
    let parse = Spy::fallible(move |text: String| {
        text.parse::<i32>().map_err(|_| raised.clone())
    });

    assert_eq!(parse.call("12".into()).unwrap(), 12);
    let err = parse.call("twelve".into()).unwrap_err();

    assert!(err.ptr_eq(&fault));
    assert_eq!(
        parse.calls(),
        vec![
            SpyCall::with_args("12".to_string()).returning(12),
            SpyCall::with_args("twelve".to_string()).raising(fault),
        ]
    );
}

#[test]
fn restore_puts_the_original_back_exactly_once() {
    let point = Point::new(2, 3);
    let original = point.action.current().unwrap();
    let action = Spy::on(&point.action).unwrap();
    assert!(!action.restored());

    action.restore().unwrap();

    assert!(action.restored());
    assert!(Arc::ptr_eq(&point.action.current().unwrap(), &original));
    assert_eq!(
        action.restore(),
        Err(MockError::AlreadyRestored("action".to_string()))
    );
    assert!(Arc::ptr_eq(&point.action.current().unwrap(), &original));
}

#[test]
fn member_cannot_be_spied_on_twice() {
    let point = Point::new(2, 3);
    let _action = Spy::on(&point.action).unwrap();
    assert_eq!(
        Spy::on(&point.action).err(),
        Some(MockError::AlreadySpying("action".to_string()))
    );
}

#[test]
fn free_function_spies_cannot_be_restored() {
    let double = Spy::new(|x: i32| x * 2);
    assert_eq!(double.call(4).unwrap(), 8);
    assert_eq!(double.restore(), Err(MockError::NotRestorable));
}
