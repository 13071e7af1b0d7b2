use num_bigint::BigInt;

use mimic_interpreter::interpreter::{self, Return};
use mimic_interpreter::message;
use mimic_interpreter::runtime::Runtime;

#[test]
fn chain_linking_test() {
    let rt = Runtime::new();
    let first = message::new(&rt, "foo");
    let second = message::new(&rt, "bar");

    message::link(&first, &second);

    assert_eq!(message::next(&first).unwrap(), second);
    assert_eq!(message::prev(&second).unwrap(), first);
    assert_eq!(message::last_of(&first), second);
    assert!(message::prev(&first).is_none());
}

#[test]
fn terminator_test() {
    let rt = Runtime::new();
    let terminator = message::terminator(&rt);

    assert!(message::is_terminator(&terminator));
    assert!(!message::is_terminator(&message::new(&rt, "foo")));
}

#[test]
fn code_rendering_test() {
    let rt = Runtime::new();
    let arg = message::new(&rt, "bar");
    let head = message::with_args(&rt, "foo", vec![arg]);
    let tail = message::new(&rt, "baz");
    message::link(&head, &tail);

    assert_eq!(message::code(&head), "foo(bar) baz");
}

#[test]
fn wrapped_value_evaluates_to_itself_test() {
    let mut rt = Runtime::new();
    let ctx = rt.ground_context();
    let value = rt.new_number(BigInt::from(42));
    let wrapped = message::wrap(&rt, &value);

    match interpreter::evaluate(&mut rt, &wrapped, &ctx, &ctx) {
        Return::Local(result) => assert_eq!(result, value),
        other => panic!("expected a value, got {:?}", other),
    }
}

#[test]
fn shallow_copy_shares_arguments_test() {
    let rt = Runtime::new();
    let arg = message::new(&rt, "arg");
    let head = message::with_args(&rt, "foo", vec![arg.clone()]);
    let tail = message::new(&rt, "bar");
    message::link(&head, &tail);

    let copy = message::copy(&rt, &head);

    assert_ne!(copy, head);
    assert_eq!(message::name(&copy), "foo");
    // The argument objects are shared, the chain links are not.
    assert_eq!(message::args(&copy).pop().unwrap(), arg);
    assert!(message::next(&copy).is_none());
    assert!(message::prev(&copy).is_none());
}

#[test]
fn deep_copy_is_isolated_test() {
    let rt = Runtime::new();
    let arg = message::new(&rt, "arg");
    let head = message::with_args(&rt, "foo", vec![arg.clone()]);
    let tail = message::new(&rt, "bar");
    message::link(&head, &tail);

    let copy = message::deep_copy(&rt, &head);

    // Fresh identities throughout, same structure.
    assert_ne!(copy, head);
    assert_eq!(message::name(&copy), "foo");
    let copied_tail = message::next(&copy).unwrap();
    assert_ne!(copied_tail, tail);
    assert_eq!(message::name(&copied_tail), "bar");
    assert_eq!(message::prev(&copied_tail).unwrap(), copy);
    let copied_arg = message::args(&copy).pop().unwrap();
    assert_ne!(copied_arg, arg);
    assert_eq!(message::name(&copied_arg), "arg");

    // Mutating the original leaves the copy alone.
    message::set_args(&head, Vec::new());
    assert_eq!(message::args(&copy).len(), 1);
}
