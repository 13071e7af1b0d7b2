use indexmap::IndexMap;

use crate::object::Object;

/// One named slot in an object's cell store.
///
/// An `Undefined` slot is a tombstone: it masks any cell of the same name
/// inherited through the mimic graph without being enumerable itself.
#[derive(Debug, Clone)]
pub enum CellSlot {
    Value(Object),
    Undefined,
}

impl CellSlot {
    pub fn value(&self) -> Option<&Object> {
        match self {
            CellSlot::Value(value) => Some(value),
            CellSlot::Undefined => None,
        }
    }
}

/// The mutable state shared by every object: its cells, mimics, flags,
/// kind/documentation strings and observer hooks.
///
/// Cells are kept in an insertion-ordered map so that enumeration is stable.
#[derive(Debug, Clone, Default)]
pub struct Body {
    /// The kind name of this object, if it has one of its own.
    pub kind: Option<String>,
    /// The documentation text attached to this object.
    pub documentation: Option<String>,
    /// Whether looking this object up as a cell value triggers activation.
    pub activatable: bool,
    /// Whether this object is the nil oddball.
    pub nil: bool,
    /// Whether this object counts as false in boolean positions.
    pub falsy: bool,
    /// Whether this object is a sealed singleton that cannot be mimicked.
    pub oddball: bool,
    /// The ordered prototype list.
    pub mimics: Vec<Object>,
    /// The cell store, in insertion order.
    pub cells: IndexMap<String, CellSlot>,
    /// Hook objects observing this object, if any.
    pub hooks: Vec<Object>,
}
