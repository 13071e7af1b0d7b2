use std::cell::{Ref, RefCell, RefMut};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::body::{Body, CellSlot};
use crate::data::Data;
use crate::interpreter::Return;
use crate::message;
use crate::propagate;
use crate::runtime::Runtime;
use crate::{MimicRef, MimicWeakRef};

/// The full state behind one object handle.
#[derive(Debug, Clone)]
pub struct ObjectState {
    pub body: Body,
    pub data: Data,
}

/// A handle to an object.
///
/// Identity (equality, hashing) is the handle itself, never the content: the
/// pointed-to state can be replaced wholesale ("become") while every existing
/// handle keeps observing the same object.
#[derive(Clone)]
pub struct Object(pub(crate) MimicRef<ObjectState>);

/// A non-owning handle to an object, used for back-links.
#[derive(Debug, Clone)]
pub struct WeakObject(pub(crate) MimicWeakRef<ObjectState>);

impl WeakObject {
    pub fn upgrade(&self) -> Option<Object> {
        self.0.upgrade().map(Object)
    }
}

enum Found {
    Slot(Option<Object>),
    Missing,
}

impl Object {
    pub fn new(data: Data) -> Object {
        Object(Rc::new(RefCell::new(ObjectState {
            body: Body::default(),
            data,
        })))
    }

    /// A stable identifier for this object, for visited sets and hashing.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn downgrade(&self) -> WeakObject {
        WeakObject(Rc::downgrade(&self.0))
    }

    pub fn state(&self) -> Ref<'_, ObjectState> {
        self.0.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, ObjectState> {
        self.0.borrow_mut()
    }

    /// Replace this object's entire content in place, preserving identity.
    pub fn become_other(&self, other: &Object) {
        if self == other {
            return;
        }
        let state = other.0.borrow().clone();
        *self.0.borrow_mut() = state;
    }

    // --- flags, kind, documentation ---------------------------------------

    pub fn kind(&self) -> Option<String> {
        self.0.borrow().body.kind.clone()
    }

    pub fn has_kind(&self) -> bool {
        self.0.borrow().body.kind.is_some()
    }

    pub fn set_kind(&self, kind: &str) {
        self.0.borrow_mut().body.kind = Some(kind.to_string());
    }

    /// The first kind name found walking the mimic graph breadth-first.
    pub fn lookup_kind(&self) -> Option<String> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(self.clone());
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.id()) {
                continue;
            }
            if let Some(kind) = current.kind() {
                return Some(kind);
            }
            for mimic in current.0.borrow().body.mimics.iter() {
                queue.push_back(mimic.clone());
            }
        }
        None
    }

    pub fn documentation(&self) -> Option<String> {
        self.0.borrow().body.documentation.clone()
    }

    pub fn set_documentation(&self, documentation: Option<String>) {
        self.0.borrow_mut().body.documentation = documentation;
    }

    pub fn is_activatable(&self) -> bool {
        self.0.borrow().body.activatable
    }

    pub fn set_activatable(&self, value: bool) {
        self.0.borrow_mut().body.activatable = value;
    }

    pub fn is_nil(&self) -> bool {
        self.0.borrow().body.nil
    }

    pub fn is_truthy(&self) -> bool {
        !self.0.borrow().body.falsy
    }

    pub fn is_oddball(&self) -> bool {
        self.0.borrow().body.oddball
    }

    // --- raw (hook-free) manipulation, for bootstrap and internals --------

    /// Set a cell without firing hooks.
    pub fn register_cell(&self, name: &str, value: Object) {
        self.0
            .borrow_mut()
            .body
            .cells
            .insert(name.to_string(), CellSlot::Value(value));
    }

    /// Append a mimic without the oddball check and without firing hooks.
    pub fn register_mimic(&self, proto: &Object) {
        self.0.borrow_mut().body.mimics.push(proto.clone());
    }

    /// Replace the mimic list with a single prototype, without hooks.
    pub fn single_mimics(&self, proto: &Object) {
        self.0.borrow_mut().body.mimics = vec![proto.clone()];
    }

    pub fn local_cell(&self, name: &str) -> Option<CellSlot> {
        self.0.borrow().body.cells.get(name).cloned()
    }

    pub fn mimics(&self) -> Vec<Object> {
        self.0.borrow().body.mimics.clone()
    }

    pub fn add_hook(&self, hook: &Object) {
        let mut state = self.0.borrow_mut();
        if !state.body.hooks.iter().any(|h| h == hook) {
            state.body.hooks.push(hook.clone());
        }
    }

    // --- lookup -----------------------------------------------------------

    /// Search the mimic graph breadth-first for a cell.
    ///
    /// The first slot found for the name decides: a value is returned, a
    /// tombstone masks anything further out. A visited set keyed on identity
    /// guarantees termination on diamond or cyclic mimic graphs. Activation
    /// contexts fall back to their ground after their own graph misses.
    pub fn find_cell(&self, name: &str) -> Option<Object> {
        self.find_cell_with_cutoff(name, None)
    }

    pub fn find_cell_with_cutoff(&self, name: &str, cutoff: Option<&Object>) -> Option<Object> {
        match self.find_slot(name, cutoff) {
            Found::Slot(value) => value,
            Found::Missing => {
                let fallback = match &self.0.borrow().data {
                    Data::Context(state) => Some(state.fallback.clone()),
                    _ => None,
                };
                fallback.and_then(|ground| ground.find_cell_with_cutoff(name, cutoff))
            }
        }
    }

    fn find_slot(&self, name: &str, cutoff: Option<&Object>) -> Found {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(self.clone());
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.id()) {
                continue;
            }
            if let Some(slot) = current.local_cell(name) {
                return Found::Slot(slot.value().cloned());
            }
            if cutoff.map(|c| *c == current).unwrap_or(false) {
                continue;
            }
            for mimic in current.0.borrow().body.mimics.iter() {
                queue.push_back(mimic.clone());
            }
        }
        Found::Missing
    }

    /// Whether any object in the mimic graph carries this kind name.
    pub fn is_kind(&self, name: &str) -> bool {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(self.clone());
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.id()) {
                continue;
            }
            if current.kind().as_deref() == Some(name) {
                return true;
            }
            for mimic in current.0.borrow().body.mimics.iter() {
                queue.push_back(mimic.clone());
            }
        }
        false
    }

    /// Whether `proto` appears in this object's mimic graph (or is the
    /// object itself).
    pub fn is_mimic_of(&self, proto: &Object) -> bool {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(self.clone());
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.id()) {
                continue;
            }
            if current == *proto {
                return true;
            }
            for mimic in current.0.borrow().body.mimics.iter() {
                queue.push_back(mimic.clone());
            }
        }
        false
    }

    /// Cell names in insertion order, skipping tombstones.
    ///
    /// With `include_mimics`, the breadth-first order over the graph decides
    /// which occurrence of a name is seen first, and a tombstone encountered
    /// on the way masks all further occurrences of that name.
    pub fn cell_names(&self, include_mimics: bool, cutoff: Option<&Object>) -> Vec<String> {
        if !include_mimics {
            return self
                .0
                .borrow()
                .body
                .cells
                .iter()
                .filter(|(_, slot)| slot.value().is_some())
                .map(|(name, _)| name.clone())
                .collect();
        }
        let mut visited = HashSet::new();
        let mut undefined: HashSet<String> = HashSet::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut names = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(self.clone());
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.id()) {
                continue;
            }
            if cutoff.map(|c| *c != current).unwrap_or(true) {
                for mimic in current.0.borrow().body.mimics.iter() {
                    queue.push_back(mimic.clone());
                }
            }
            for (name, slot) in current.0.borrow().body.cells.iter() {
                if undefined.contains(name) {
                    continue;
                }
                match slot {
                    CellSlot::Undefined => {
                        undefined.insert(name.clone());
                    }
                    CellSlot::Value(_) => {
                        if seen.insert(name.clone()) {
                            names.push(name.clone());
                        }
                    }
                }
            }
        }
        names
    }

    /// Visible cells as (name, value) pairs, same traversal as `cell_names`.
    pub fn cells(&self, include_mimics: bool) -> Vec<(String, Object)> {
        let names = self.cell_names(include_mimics, None);
        names
            .into_iter()
            .filter_map(|name| self.find_cell(&name).map(|value| (name, value)))
            .collect()
    }

    // --- hook-firing mutation ---------------------------------------------

    /// Assign a cell, firing the cell-added or cell-changed hook.
    pub fn set_cell(
        &self,
        rt: &mut Runtime,
        ctx: &Object,
        name: &str,
        value: Object,
    ) -> Return {
        let previous = {
            let mut state = self.0.borrow_mut();
            state
                .body
                .cells
                .insert(name.to_string(), CellSlot::Value(value.clone()))
        };
        let symbol = rt.new_symbol(name);
        match previous {
            Some(CellSlot::Value(old)) => {
                propagate!(self.fire_hooks(rt, ctx, "cellChanged", vec![self.clone(), symbol, old]));
            }
            _ => {
                propagate!(self.fire_hooks(rt, ctx, "cellAdded", vec![self.clone(), symbol]));
            }
        }
        Return::Local(value)
    }

    /// Delete a cell, firing the cell-removed hook. Signals `NoSuchCell`
    /// when the cell is not locally present.
    pub fn remove_cell(
        &self,
        rt: &mut Runtime,
        ctx: &Object,
        msg: &Object,
        name: &str,
    ) -> Return {
        let removed = self.0.borrow_mut().body.cells.shift_remove(name);
        match removed {
            Some(slot) => {
                let old = slot.value().cloned().unwrap_or_else(|| rt.nil());
                let symbol = rt.new_symbol(name);
                propagate!(self.fire_hooks(rt, ctx, "cellRemoved", vec![self.clone(), symbol, old]));
                Return::Local(rt.nil())
            }
            None => {
                let condition = rt.new_condition(
                    &["Error", "NoSuchCell"],
                    ctx,
                    Some(msg),
                    Some(self),
                    &format!("couldn't find cell '{}' to remove", name),
                );
                condition.register_cell("cellName", rt.new_symbol(name));
                rt.error_condition(condition, ctx)
            }
        }
    }

    /// Mark a cell as undefined, masking anything inherited under that name.
    /// Idempotent: undefining a name that never existed still leaves a
    /// tombstone. Fires the cell-undefined hook.
    pub fn undefine_cell(&self, rt: &mut Runtime, ctx: &Object, name: &str) -> Return {
        let previous = {
            let mut state = self.0.borrow_mut();
            state
                .body
                .cells
                .insert(name.to_string(), CellSlot::Undefined)
        };
        let old = previous
            .and_then(|slot| slot.value().cloned())
            .unwrap_or_else(|| rt.nil());
        let symbol = rt.new_symbol(name);
        propagate!(self.fire_hooks(rt, ctx, "cellUndefined", vec![self.clone(), symbol, old]));
        Return::Local(rt.nil())
    }

    /// Append a mimic, checking for oddballs and firing hooks.
    pub fn add_mimic(
        &self,
        rt: &mut Runtime,
        ctx: &Object,
        msg: &Object,
        new_mimic: &Object,
    ) -> Return {
        if new_mimic.is_oddball() {
            let condition = rt.new_condition(
                &["Error", "CantMimicOddball"],
                ctx,
                Some(msg),
                Some(new_mimic),
                "can't mimic an oddball object",
            );
            return rt.error_condition(condition, ctx);
        }
        self.0.borrow_mut().body.mimics.push(new_mimic.clone());
        propagate!(self.fire_hooks(rt, ctx, "mimicAdded", vec![
            self.clone(),
            new_mimic.clone(),
        ]));
        propagate!(self.fire_hooks(rt, ctx, "mimicsChanged", vec![
            self.clone(),
            new_mimic.clone(),
        ]));
        propagate!(new_mimic.fire_hooks(rt, ctx, "mimicked", vec![
            new_mimic.clone(),
            self.clone(),
        ]));
        Return::Local(self.clone())
    }

    /// Remove a mimic; signals `NotAMimic` when the object is not in the
    /// mimic list.
    pub fn remove_mimic(
        &self,
        rt: &mut Runtime,
        ctx: &Object,
        msg: &Object,
        target: &Object,
    ) -> Return {
        let position = {
            let state = self.0.borrow();
            state.body.mimics.iter().position(|m| m == target)
        };
        match position {
            Some(index) => {
                self.0.borrow_mut().body.mimics.remove(index);
                propagate!(self.fire_hooks(rt, ctx, "mimicRemoved", vec![
                    self.clone(),
                    target.clone(),
                ]));
                propagate!(self.fire_hooks(rt, ctx, "mimicsChanged", vec![
                    self.clone(),
                    target.clone(),
                ]));
                Return::Local(self.clone())
            }
            None => {
                let condition = rt.new_condition(
                    &["Error", "NotAMimic"],
                    ctx,
                    Some(msg),
                    Some(self),
                    "the given object is not a mimic of the receiver",
                );
                rt.error_condition(condition, ctx)
            }
        }
    }

    /// Derive a fresh object with this object as its single mimic.
    /// Signals `CantMimicOddball` for sealed singletons.
    pub fn mimic(&self, rt: &mut Runtime, ctx: &Object, msg: &Object) -> Return {
        if self.is_oddball() {
            let condition = rt.new_condition(
                &["Error", "CantMimicOddball"],
                ctx,
                Some(msg),
                Some(self),
                "can't mimic an oddball object",
            );
            return rt.error_condition(condition, ctx);
        }
        let data = self.0.borrow().data.clone();
        let child = Object::new(data);
        child.single_mimics(self);
        propagate!(self.fire_hooks(rt, ctx, "mimicked", vec![self.clone(), child.clone()]));
        Return::Local(child)
    }

    /// Deliver one observer event to every hook attached to this object,
    /// as a message send carrying the given arguments.
    fn fire_hooks(
        &self,
        rt: &mut Runtime,
        ctx: &Object,
        event: &str,
        args: Vec<Object>,
    ) -> Return {
        let hooks = self.0.borrow().body.hooks.clone();
        if hooks.is_empty() {
            return Return::Local(rt.nil());
        }
        let wrapped: Vec<Object> = args.iter().map(|arg| message::wrap(rt, arg)).collect();
        let event_message = message::with_args(rt, event, wrapped);
        for hook in hooks {
            propagate!(crate::interpreter::send(rt, &event_message, ctx, &hook));
        }
        Return::Local(rt.nil())
    }

    // --- presentation -----------------------------------------------------

    /// A short human-readable rendition, used by the shell and `println`.
    pub fn display_string(&self) -> String {
        let state = self.0.borrow();
        if state.body.oddball {
            if let Some(kind) = &state.body.kind {
                return kind.clone();
            }
        }
        match &state.data {
            Data::Number(value) => value.to_string(),
            Data::Text(value) => value.clone(),
            Data::Symbol(value) => format!(":{}", value),
            Data::Tuple(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.display_string()).collect();
                format!("({})", parts.join(", "))
            }
            Data::List(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.display_string()).collect();
                format!("[{}]", parts.join(", "))
            }
            // Shared borrows are reentrant, so rendering below may borrow
            // this object's state again.
            Data::Message(_) => message::code(self),
            _ => match self.lookup_kind() {
                Some(kind) => format!("{}_0x{:x}", kind, self.id()),
                None => format!("Object_0x{:x}", self.id()),
            },
        }
    }

    /// The report text of a condition, for error output.
    pub fn report(&self) -> String {
        match self.find_cell("report") {
            Some(text) => text.display_string(),
            None => self.display_string(),
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Object {}

impl Hash for Object {
    fn hash<H: Hasher>(&self, hasher: &mut H) {
        self.id().hash(hasher);
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Deliberately shallow: object graphs are cyclic.
        write!(f, "Object({:?}, 0x{:x})", self.0.borrow().body.kind, self.id())
    }
}
