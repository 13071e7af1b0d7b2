use std::collections::HashSet;

use num_bigint::BigInt;

use mimic_interpreter::context;
use mimic_interpreter::data::Data;
use mimic_interpreter::object::Object;
use mimic_interpreter::runtime::Runtime;

#[test]
fn identity_equality_test() {
    let a = Object::new(Data::None);
    let b = a.clone();
    let c = Object::new(Data::None);

    assert_eq!(a, b);
    assert_ne!(a, c);

    let mut set = HashSet::new();
    set.insert(a);
    set.insert(b);
    set.insert(c);
    assert_eq!(set.len(), 2);
}

#[test]
fn become_preserves_identity_test() {
    let rt = Runtime::new();
    let a = Object::new(Data::None);
    let handle = a.clone();
    let other = rt.new_number(BigInt::from(5));

    a.become_other(&other);

    assert_eq!(a, handle);
    assert_ne!(a, other);
    assert_eq!(handle.display_string(), "5");
}

#[test]
fn breadth_first_lookup_test() {
    let rt = Runtime::new();
    let base = Object::new(Data::None);
    base.register_cell("x", rt.new_number(BigInt::from(1)));
    let left = Object::new(Data::None);
    left.register_mimic(&base);
    let right = Object::new(Data::None);
    right.register_cell("x", rt.new_number(BigInt::from(2)));
    right.register_mimic(&base);
    let child = Object::new(Data::None);
    child.register_mimic(&left);
    child.register_mimic(&right);

    // Siblings are searched before anything deeper.
    assert_eq!(child.find_cell("x").unwrap().display_string(), "2");

    // The first slot found for a name decides.
    left.register_cell("x", rt.new_number(BigInt::from(3)));
    assert_eq!(child.find_cell("x").unwrap().display_string(), "3");
}

#[test]
fn cyclic_mimic_graph_terminates_test() {
    let a = Object::new(Data::None);
    let b = Object::new(Data::None);
    a.register_mimic(&b);
    b.register_mimic(&a);

    assert!(a.find_cell("missing").is_none());
    assert!(!a.is_kind("Anything"));
}

#[test]
fn tombstone_masks_inherited_cell_test() {
    let mut rt = Runtime::new();
    let ctx = rt.ground_context();
    let proto = Object::new(Data::None);
    proto.register_cell("x", rt.new_number(BigInt::from(1)));
    let child = Object::new(Data::None);
    child.register_mimic(&proto);

    assert!(child.find_cell("x").is_some());
    child.undefine_cell(&mut rt, &ctx, "x");
    assert!(child.find_cell("x").is_none());
    assert!(proto.find_cell("x").is_some());
    assert!(!child.cell_names(true, None).contains(&"x".to_string()));
}

#[test]
fn cell_names_keep_insertion_order_test() {
    let rt = Runtime::new();
    let object = Object::new(Data::None);
    object.register_cell("b", rt.new_number(BigInt::from(1)));
    object.register_cell("a", rt.new_number(BigInt::from(2)));

    assert_eq!(
        object.cell_names(false, None),
        vec!["b".to_string(), "a".to_string()]
    );
}

#[test]
fn context_falls_back_to_receiver_test() {
    let rt = Runtime::new();
    let receiver = Object::new(Data::None);
    receiver.register_cell("x", rt.new_number(BigInt::from(7)));
    let ctx = context::new(&rt.ground, &receiver, false);

    assert_eq!(ctx.find_cell("x").unwrap().display_string(), "7");

    // Locals shadow anything reachable through the fallback.
    ctx.register_cell("x", rt.new_number(BigInt::from(9)));
    assert_eq!(ctx.find_cell("x").unwrap().display_string(), "9");
}

#[test]
fn kind_lookup_test() {
    let rt = Runtime::new();
    let child = Object::new(Data::None);
    child.register_mimic(&rt.origin);

    assert!(child.is_mimic_of(&rt.origin));
    assert!(child.is_mimic_of(&rt.base));
    assert!(!child.is_mimic_of(&rt.number));

    assert_eq!(child.lookup_kind().as_deref(), Some("Origin"));
    child.set_kind("Child");
    assert_eq!(child.lookup_kind().as_deref(), Some("Child"));
}
