use crate::data::Data;
use crate::object::Object;

/// The payload of an activation context.
///
/// A context is an ordinary object whose own cells hold the activation's
/// locals. Lookup first searches the context itself (and anything it
/// mimics), then falls back to `fallback`: the receiver for method
/// activations, the captured creation context for lexical blocks.
#[derive(Debug, Clone)]
pub struct ContextState {
    /// The original ground this activation descends from.
    pub ground: Object,
    /// Where cell lookup continues after the context's own graph misses.
    pub fallback: Object,
    /// Whether this is a lexical (block) context rather than a method one.
    pub lexical: bool,
}

/// A fresh, bare activation context. Contexts carry no mimics of their own
/// so that locals can never be shadowed by prototype cells.
pub fn new(ground: &Object, fallback: &Object, lexical: bool) -> Object {
    Object::new(Data::Context(ContextState {
        ground: ground.clone(),
        fallback: fallback.clone(),
        lexical,
    }))
}

pub fn is_context(object: &Object) -> bool {
    matches!(&object.state().data, Data::Context(_))
}

/// The ground of a context, or the object itself when it is not one.
pub fn ground(object: &Object) -> Object {
    match &object.state().data {
        Data::Context(state) => state.ground.clone(),
        _ => object.clone(),
    }
}

/// The nearest enclosing method context, skipping lexical block contexts.
/// Non-local returns unwind to this scope.
pub fn method_scope(object: &Object) -> Object {
    let mut current = object.clone();
    loop {
        let next = match &current.state().data {
            Data::Context(state) if state.lexical => Some(state.fallback.clone()),
            _ => None,
        };
        match next {
            Some(fallback) => current = fallback,
            None => return current,
        }
    }
}
