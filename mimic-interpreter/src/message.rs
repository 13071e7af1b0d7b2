use crate::data::Data;
use crate::object::{Object, WeakObject};
use crate::runtime::Runtime;

/// Name of the terminator message separating expressions in a chain.
pub const TERMINATOR: &str = ".";
/// Name given to messages that only carry an already-computed value.
pub const CACHED_RESULT: &str = "cachedResult";

/// A source position, tracked for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// The payload of one node in a message chain.
///
/// Chains are doubly linked: `next` owns the following node, `prev` is a
/// weak back-link so that a chain does not keep itself alive in a cycle.
#[derive(Debug, Clone)]
pub struct MessageState {
    pub name: String,
    pub args: Vec<Object>,
    pub prev: Option<WeakObject>,
    pub next: Option<Object>,
    /// A pre-computed result: evaluating this node yields the value directly.
    pub cached: Option<Object>,
    pub position: Option<Position>,
}

impl MessageState {
    pub fn is_terminator(&self) -> bool {
        self.name == TERMINATOR
    }
}

pub fn with_state<R>(message: &Object, f: impl FnOnce(&MessageState) -> R) -> R {
    match &message.state().data {
        Data::Message(state) => f(state),
        _ => panic!("expected a message object"),
    }
}

pub fn with_state_mut<R>(message: &Object, f: impl FnOnce(&mut MessageState) -> R) -> R {
    match &mut message.state_mut().data {
        Data::Message(state) => f(state),
        _ => panic!("expected a message object"),
    }
}

pub fn is_message(object: &Object) -> bool {
    matches!(&object.state().data, Data::Message(_))
}

// --- constructors ---------------------------------------------------------

pub fn new(rt: &Runtime, name: &str) -> Object {
    with_args(rt, name, Vec::new())
}

pub fn with_args(rt: &Runtime, name: &str, args: Vec<Object>) -> Object {
    let message = Object::new(Data::Message(MessageState {
        name: name.to_string(),
        args,
        prev: None,
        next: None,
        cached: None,
        position: None,
    }));
    message.single_mimics(&rt.message_proto());
    message
}

pub fn terminator(rt: &Runtime) -> Object {
    new(rt, TERMINATOR)
}

/// A message that evaluates to a fixed, already-computed value.
pub fn wrap(rt: &Runtime, value: &Object) -> Object {
    let message = new(rt, CACHED_RESULT);
    with_state_mut(&message, |state| state.cached = Some(value.clone()));
    message
}

// --- accessors ------------------------------------------------------------

pub fn name(message: &Object) -> String {
    with_state(message, |state| state.name.clone())
}

pub fn args(message: &Object) -> Vec<Object> {
    with_state(message, |state| state.args.clone())
}

pub fn arg_count(message: &Object) -> usize {
    with_state(message, |state| state.args.len())
}

pub fn set_args(message: &Object, args: Vec<Object>) {
    with_state_mut(message, |state| state.args = args);
}

pub fn next(message: &Object) -> Option<Object> {
    with_state(message, |state| state.next.clone())
}

pub fn prev(message: &Object) -> Option<Object> {
    with_state(message, |state| state.prev.as_ref().and_then(WeakObject::upgrade))
}

pub fn cached(message: &Object) -> Option<Object> {
    with_state(message, |state| state.cached.clone())
}

pub fn is_terminator(message: &Object) -> bool {
    with_state(message, MessageState::is_terminator)
}

pub fn position(message: &Object) -> Option<Position> {
    with_state(message, |state| state.position.clone())
}

pub fn set_position(message: &Object, position: Position) {
    with_state_mut(message, |state| state.position = Some(position));
}

pub fn set_next(message: &Object, next: Option<Object>) {
    with_state_mut(message, |state| state.next = next);
}

pub fn set_prev(message: &Object, prev: Option<Object>) {
    with_state_mut(message, |state| state.prev = prev.as_ref().map(Object::downgrade));
}

/// Link two nodes in both directions.
pub fn link(first: &Object, second: &Object) {
    set_next(first, Some(second.clone()));
    set_prev(second, Some(first.clone()));
}

/// The last node of the chain starting at `message`.
pub fn last_of(message: &Object) -> Object {
    let mut current = message.clone();
    while let Some(following) = next(&current) {
        current = following;
    }
    current
}

// --- copying --------------------------------------------------------------

/// A shallow copy of one node: fresh identity, same name and cached value,
/// sharing the original's argument objects, with no chain links.
pub fn copy(rt: &Runtime, message: &Object) -> Object {
    with_state(message, |state| {
        let copied = with_args(rt, &state.name, state.args.clone());
        with_state_mut(&copied, |copy| {
            copy.cached = state.cached.clone();
            copy.position = state.position.clone();
        });
        copied
    })
}

/// A deep copy of a whole chain, including argument sub-chains. The copy
/// has fresh identities throughout and a rebuilt `prev` spine; the original
/// is left untouched.
pub fn deep_copy(rt: &Runtime, message: &Object) -> Object {
    let head = copy_node(rt, message);
    let mut source = next(message);
    let mut tail = head.clone();
    while let Some(node) = source {
        let copied = copy_node(rt, &node);
        link(&tail, &copied);
        tail = copied;
        source = next(&node);
    }
    head
}

fn copy_node(rt: &Runtime, message: &Object) -> Object {
    with_state(message, |state| {
        let args = state.args.iter().map(|arg| deep_copy(rt, arg)).collect();
        let copied = with_args(rt, &state.name, args);
        with_state_mut(&copied, |copy| {
            copy.cached = state.cached.clone();
            copy.position = state.position.clone();
        });
        copied
    })
}

// --- presentation ---------------------------------------------------------

/// Render a chain back to (normalized) source text.
pub fn code(message: &Object) -> String {
    let mut out = String::new();
    let mut current = Some(message.clone());
    while let Some(node) = current {
        let rendered = code_node(&node);
        if !out.is_empty() && !rendered.starts_with('.') {
            out.push(' ');
        }
        out.push_str(&rendered);
        current = next(&node);
    }
    out
}

fn code_node(message: &Object) -> String {
    with_state(message, |state| {
        if let Some(cached) = &state.cached {
            if let Data::Text(text) = &cached.state().data {
                return format!("\"{}\"", text);
            }
            return cached.display_string();
        }
        if state.is_terminator() {
            return TERMINATOR.to_string();
        }
        if state.args.is_empty() {
            state.name.clone()
        } else {
            let args: Vec<String> = state.args.iter().map(code).collect();
            format!("{}({})", state.name, args.join(", "))
        }
    })
}
