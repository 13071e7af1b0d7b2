use std::rc::Rc;

use num_bigint::BigInt;

use crate::arguments::ArgumentsDefinition;
use crate::context::ContextState;
use crate::message::MessageState;
use crate::object::Object;
use crate::primitives::NativeFn;

/// What a cell value *is*, beyond its cells and mimics.
///
/// This is a closed set: the interpreter dispatches activation on it with a
/// single exhaustive match instead of virtual calls spread over a hierarchy.
#[derive(Debug, Clone)]
pub enum Data {
    /// A plain value with no native payload.
    None,
    /// An exact integer.
    Number(BigInt),
    /// A text value.
    Text(String),
    /// An interned-by-value symbol.
    Symbol(String),
    /// A fixed-size tuple of values.
    Tuple(Vec<Object>),
    /// An ordered list of values.
    List(Vec<Object>),
    /// A node in a message chain.
    Message(MessageState),
    /// An activation context.
    Context(ContextState),
    /// The reified information about one activation.
    Call(CallState),
    /// A user-defined method (arguments evaluated in the caller's context).
    Method(CodeState),
    /// A user-defined macro (arguments passed unevaluated).
    Macro(CodeState),
    /// A user-defined syntax macro (expansion rewrites the chain in place).
    Syntax(CodeState),
    /// A native (host-implemented) method.
    Native(NativeMethod),
    /// A delegating alias for another activatable.
    Alias(Object),
    /// A lexical block, closing over its creation context.
    Block(BlockState),
    /// An observer hook, connected to one or more objects.
    Hook(HookState),
}

/// Shared state for user-defined methods, macros and syntax.
#[derive(Debug, Clone)]
pub struct CodeState {
    /// The cell name this entity was first assigned to, if any.
    pub name: Option<String>,
    /// The context the definition was evaluated in.
    pub context: Object,
    /// The body chain, or `None` for the bodiless prototype.
    pub code: Option<Object>,
    pub arguments: Rc<ArgumentsDefinition>,
}

/// State for a lexical block.
#[derive(Debug, Clone)]
pub struct BlockState {
    /// The captured creation context.
    pub context: Object,
    pub code: Object,
    pub arguments: Rc<ArgumentsDefinition>,
}

/// A native method: a bare function pointer plus its declared arguments.
#[derive(Debug, Clone)]
pub struct NativeMethod {
    pub name: &'static str,
    pub documentation: &'static str,
    pub arguments: Rc<ArgumentsDefinition>,
    pub func: NativeFn,
}

/// The reified activation record exposed to method bodies as `call`.
#[derive(Debug, Clone)]
pub struct CallState {
    /// The activation context itself.
    pub ctx: Object,
    /// The message that started this call.
    pub message: Object,
    /// The context the call originated from.
    pub surrounding: Object,
    /// The receiver of the call.
    pub on: Object,
    /// Fast-path storage for already-evaluated positional arguments.
    pub cached_positional: Option<Vec<Object>>,
}

/// State for hook objects: the objects this hook observes.
#[derive(Debug, Clone, Default)]
pub struct HookState {
    pub connected: Vec<Object>,
}

impl Data {
    /// The name carried by method-like data, used for assignment naming.
    pub fn name(&self) -> Option<Option<String>> {
        match self {
            Data::Method(state) | Data::Macro(state) | Data::Syntax(state) => {
                Some(state.name.clone())
            }
            Data::Native(native) => Some(Some(native.name.to_string())),
            _ => None,
        }
    }

    /// Set the name of method-like data; no-op for anything else.
    pub fn set_name(&mut self, name: &str) {
        if let Data::Method(state) | Data::Macro(state) | Data::Syntax(state) = self {
            state.name = Some(name.to_string());
        }
    }
}
