//!
//! This is the interpreter for the Mimic language.
//!

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Facilities for compiling declared parameter lists and binding arguments.
pub mod arguments;
/// The per-object state: cells, mimics, flags, hooks.
pub mod body;
/// The dynamically scoped condition/restart machinery.
pub mod condition;
/// Facilities for manipulating activation contexts.
pub mod context;
/// The closed set of value kinds a cell can hold.
pub mod data;
/// The interface towards foreign (host-native) calls.
pub mod foreign;
/// The send/evaluate engine.
pub mod interpreter;
/// Facilities for manipulating message chains.
pub mod message;
/// The arithmetic backend behind number objects.
pub mod numeric;
/// Facilities for manipulating objects and their prototype graphs.
pub mod object;
/// The parser, producing message chains from tokens.
pub mod parser;
/// Definitions for all native methods.
pub mod primitives;
/// The interpreter's main data structure.
pub mod runtime;

/// A strong and owning reference to an object.
pub type MimicRef<T> = Rc<RefCell<T>>;
/// A weak reference to an object.
pub type MimicWeakRef<T> = Weak<RefCell<T>>;
