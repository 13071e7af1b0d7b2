use std::fmt;

use num_bigint::BigInt;
use num_traits::Zero;

use crate::condition::{self, HandlerFrame, RestartEntry, RestartFrame, SignalResult};
use crate::data::{Data, HookState};
use crate::message::MessageState;
use crate::foreign::ForeignBridge;
use crate::interpreter::{self, Return};
use crate::object::Object;
use crate::parser::{self, ParseError};
use crate::primitives;

/// The interpreter's world: every bootstrapped prototype, the dynamically
/// scoped handler and restart stacks, and the optional foreign bridge.
pub struct Runtime {
    pub base: Object,
    pub default_behavior: Object,
    pub ground: Object,
    pub origin: Object,

    pub nil_object: Object,
    pub true_object: Object,
    pub false_object: Object,

    pub number: Object,
    pub text: Object,
    pub symbol: Object,
    pub tuple: Object,
    pub list: Object,
    pub message: Object,
    pub call: Object,
    pub method: Object,
    pub default_macro: Object,
    pub syntax: Object,
    pub lexical_block: Object,
    pub native_method: Object,
    pub condition: Object,
    pub hook: Object,

    handlers: Vec<HandlerFrame>,
    restarts: Vec<RestartFrame>,
    next_token: u64,
    bridge: Option<Box<dyn ForeignBridge>>,
}

impl Runtime {
    pub fn new() -> Runtime {
        let base = Object::new(Data::None);
        base.set_kind("Base");

        let default_behavior = Object::new(Data::None);
        default_behavior.set_kind("DefaultBehavior");
        default_behavior.register_mimic(&base);

        let ground = Object::new(Data::None);
        ground.set_kind("Ground");
        ground.register_mimic(&default_behavior);

        let origin = Object::new(Data::None);
        origin.set_kind("Origin");
        origin.register_mimic(&ground);

        let nil_object = oddball(&origin, "nil", true, true);
        let true_object = oddball(&origin, "true", false, false);
        let false_object = oddball(&origin, "false", false, true);

        let number = proto(&origin, "Number", Data::Number(BigInt::zero()));
        let text = proto(&origin, "Text", Data::Text(String::new()));
        let symbol = proto(&origin, "Symbol", Data::Symbol(String::new()));
        let tuple = proto(&origin, "Tuple", Data::Tuple(Vec::new()));
        let list = proto(&origin, "List", Data::List(Vec::new()));
        let message = proto(
            &origin,
            "Message",
            Data::Message(MessageState {
                name: String::new(),
                args: Vec::new(),
                prev: None,
                next: None,
                cached: None,
                position: None,
            }),
        );
        let call = proto(&origin, "Call", Data::None);
        let condition = proto(&origin, "Condition", Data::None);
        let hook = proto(&origin, "Hook", Data::Hook(HookState::default()));
        let native_method = proto(&origin, "NativeMethod", Data::None);
        let lexical_block = proto(&origin, "LexicalBlock", Data::None);

        // The bodiless activatable prototypes: activating one of these
        // directly signals NotActivatable.
        let method = proto(
            &origin,
            "DefaultMethod",
            Data::Method(crate::data::CodeState {
                name: None,
                context: ground.clone(),
                code: None,
                arguments: crate::arguments::ArgumentsDefinition::empty(),
            }),
        );
        method.set_activatable(true);
        let default_macro = proto(
            &origin,
            "DefaultMacro",
            Data::Macro(crate::data::CodeState {
                name: None,
                context: ground.clone(),
                code: None,
                arguments: crate::arguments::ArgumentsDefinition::empty(),
            }),
        );
        default_macro.set_activatable(true);
        let syntax = proto(
            &origin,
            "DefaultSyntax",
            Data::Syntax(crate::data::CodeState {
                name: None,
                context: ground.clone(),
                code: None,
                arguments: crate::arguments::ArgumentsDefinition::empty(),
            }),
        );
        syntax.set_activatable(true);

        let mut rt = Runtime {
            base,
            default_behavior,
            ground,
            origin,
            nil_object,
            true_object,
            false_object,
            number,
            text,
            symbol,
            tuple,
            list,
            message,
            call,
            method,
            default_macro,
            syntax,
            lexical_block,
            native_method,
            condition,
            hook,
            handlers: Vec::new(),
            restarts: Vec::new(),
            next_token: 0,
            bridge: None,
        };

        rt.bootstrap_conditions();
        rt.register_ground_cells();
        primitives::install(&mut rt);
        rt
    }

    fn bootstrap_conditions(&mut self) {
        let error = derive_condition(&self.condition, "Error");
        derive_condition(&self.condition, "Warning");

        let typ = derive_condition(&error, "Type");
        derive_condition(&typ, "IncorrectType");

        derive_condition(&error, "NoSuchCell");
        derive_condition(&error, "NotAMimic");
        derive_condition(&error, "CantMimicOddball");
        derive_condition(&error, "DestructuringMismatch");
        derive_condition(&error, "NoSuchRestart");
        derive_condition(&error, "NativeException");

        let invocation = derive_condition(&error, "Invocation");
        derive_condition(&invocation, "NotActivatable");
        derive_condition(&invocation, "ArgumentCount");

        let arithmetic = derive_condition(&error, "Arithmetic");
        derive_condition(&arithmetic, "DivisionByZero");
        derive_condition(&arithmetic, "NotParseable");
    }

    fn register_ground_cells(&mut self) {
        let entries: Vec<(&str, Object)> = vec![
            ("Base", self.base.clone()),
            ("DefaultBehavior", self.default_behavior.clone()),
            ("Ground", self.ground.clone()),
            ("Origin", self.origin.clone()),
            ("nil", self.nil_object.clone()),
            ("true", self.true_object.clone()),
            ("false", self.false_object.clone()),
            ("Number", self.number.clone()),
            ("Text", self.text.clone()),
            ("Symbol", self.symbol.clone()),
            ("Tuple", self.tuple.clone()),
            ("List", self.list.clone()),
            ("Message", self.message.clone()),
            ("Call", self.call.clone()),
            ("DefaultMethod", self.method.clone()),
            ("DefaultMacro", self.default_macro.clone()),
            ("DefaultSyntax", self.syntax.clone()),
            ("LexicalBlock", self.lexical_block.clone()),
            ("NativeMethod", self.native_method.clone()),
            ("Condition", self.condition.clone()),
            ("Hook", self.hook.clone()),
        ];
        for (name, value) in entries {
            self.ground.register_cell(name, value);
        }
    }

    // --- prototype access -------------------------------------------------

    pub fn nil(&self) -> Object {
        self.nil_object.clone()
    }

    pub fn truth(&self, value: bool) -> Object {
        if value {
            self.true_object.clone()
        } else {
            self.false_object.clone()
        }
    }

    pub fn message_proto(&self) -> Object {
        self.message.clone()
    }

    pub fn call_proto(&self) -> Object {
        self.call.clone()
    }

    // --- value construction -----------------------------------------------

    pub fn new_number(&self, value: BigInt) -> Object {
        let object = Object::new(Data::Number(value));
        object.single_mimics(&self.number);
        object
    }

    pub fn new_text(&self, value: &str) -> Object {
        let object = Object::new(Data::Text(value.to_string()));
        object.single_mimics(&self.text);
        object
    }

    pub fn new_symbol(&self, value: &str) -> Object {
        let object = Object::new(Data::Symbol(value.to_string()));
        object.single_mimics(&self.symbol);
        object
    }

    pub fn new_tuple(&self, values: Vec<Object>) -> Object {
        let object = Object::new(Data::Tuple(values));
        object.single_mimics(&self.tuple);
        object
    }

    pub fn new_list(&self, values: Vec<Object>) -> Object {
        let object = Object::new(Data::List(values));
        object.single_mimics(&self.list);
        object
    }

    /// The context top-level code evaluates in: the ground itself, so that
    /// top-level assignments are visible from every method body.
    pub fn ground_context(&self) -> Object {
        self.ground.clone()
    }

    // --- conditions and restarts ------------------------------------------

    /// Instantiate a condition from the bootstrapped hierarchy, filling in
    /// the standard cells.
    pub fn new_condition(
        &mut self,
        path: &[&str],
        ctx: &Object,
        msg: Option<&Object>,
        receiver: Option<&Object>,
        text: &str,
    ) -> Object {
        let mut proto = self.condition.clone();
        for part in path {
            proto = proto
                .local_cell(part)
                .and_then(|slot| slot.value().cloned())
                .expect("condition hierarchy is bootstrapped");
        }
        let instance = Object::new(Data::None);
        instance.single_mimics(&proto);
        instance.register_cell("text", self.new_text(text));
        let kind = proto.lookup_kind().unwrap_or_else(|| "Condition".to_string());
        instance.register_cell("report", self.new_text(&format!("{}: {}", kind, text)));
        instance.register_cell("context", ctx.clone());
        if let Some(msg) = msg {
            instance.register_cell("message", msg.clone());
        }
        if let Some(receiver) = receiver {
            instance.register_cell("receiver", receiver.clone());
        }
        instance
    }

    /// Signal a condition; `Unhandled` means no handler accepted it.
    pub fn signal_condition(&mut self, condition: &Object, ctx: &Object) -> SignalResult {
        condition::signal(self, condition, ctx)
    }

    /// Signal an error condition; unhandled errors escape as exceptions.
    pub fn error_condition(&mut self, condition: Object, ctx: &Object) -> Return {
        match condition::signal(self, &condition, ctx) {
            SignalResult::Flow(flow) => flow,
            SignalResult::Unhandled => Return::Exception(condition),
        }
    }

    pub fn next_token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    pub fn push_handler(&mut self, frame: HandlerFrame) {
        self.handlers.push(frame);
    }

    pub fn push_restart_frame(&mut self, frame: RestartFrame) {
        self.restarts.push(frame);
    }

    /// Establish a group of natively interpreted restarts; the caller is
    /// responsible for popping the returned token again.
    pub fn push_restarts(&mut self, names: &[&str]) -> u64 {
        let token = self.next_token();
        let entries = names
            .iter()
            .map(|name| RestartEntry {
                name: (*name).to_string(),
                handler: None,
            })
            .collect();
        self.restarts.push(RestartFrame { token, entries });
        token
    }

    pub fn pop_restarts(&mut self, token: u64) {
        self.restarts.retain(|frame| frame.token != token);
    }

    /// Drop every handler and restart frame established under this token.
    pub fn pop_token(&mut self, token: u64) {
        self.handlers.retain(|frame| frame.token != token);
        self.restarts.retain(|frame| frame.token != token);
    }

    /// The innermost restart frame offering this name.
    pub fn find_restart(&self, name: &str) -> Option<u64> {
        self.restarts
            .iter()
            .rev()
            .find(|frame| frame.entries.iter().any(|entry| entry.name == name))
            .map(|frame| frame.token)
    }

    pub fn handler_frames(&self) -> Vec<HandlerFrame> {
        self.handlers.clone()
    }

    /// Run with every handler from `index` upwards hidden, so a running
    /// handler cannot catch its own signals.
    pub fn with_handlers_masked<R>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut Runtime) -> R,
    ) -> R {
        let masked = self.handlers.split_off(index);
        let result = f(self);
        self.handlers.extend(masked);
        result
    }

    // --- foreign bridge ---------------------------------------------------

    pub fn set_bridge(&mut self, bridge: Box<dyn ForeignBridge>) {
        self.bridge = Some(bridge);
    }

    pub fn take_bridge(&mut self) -> Option<Box<dyn ForeignBridge>> {
        self.bridge.take()
    }

    pub fn restore_bridge(&mut self, bridge: Option<Box<dyn ForeignBridge>>) {
        self.bridge = bridge;
    }

    // --- running source ---------------------------------------------------

    /// Parse and evaluate a whole source text in the given context.
    pub fn evaluate_source(&mut self, source: &str, ctx: &Object) -> Result<Object, EvalError> {
        let chain = parser::parse(self, source).map_err(EvalError::Parse)?;
        let chain = match chain {
            Some(chain) => chain,
            None => return Ok(self.nil()),
        };
        match interpreter::evaluate(self, &chain, ctx, ctx) {
            Return::Local(value) => Ok(value),
            Return::Exception(condition) => Err(EvalError::Unhandled(condition.report())),
            Return::Spliced => Ok(self.nil()),
            other => Err(EvalError::StrayControlFlow(flow_name(&other))),
        }
    }
}

impl Default for Runtime {
    fn default() -> Runtime {
        Runtime::new()
    }
}

fn oddball(origin: &Object, kind: &str, nil: bool, falsy: bool) -> Object {
    let object = Object::new(Data::None);
    object.set_kind(kind);
    object.register_mimic(origin);
    {
        let mut state = object.state_mut();
        state.body.nil = nil;
        state.body.falsy = falsy;
        state.body.oddball = true;
    }
    object
}

fn proto(origin: &Object, kind: &str, data: Data) -> Object {
    let object = Object::new(data);
    object.set_kind(kind);
    object.register_mimic(origin);
    object
}

/// Derive one condition kind under a parent, registering it as a cell and
/// scoping its kind name under the parent's.
fn derive_condition(parent: &Object, name: &str) -> Object {
    let child = Object::new(Data::None);
    child.register_mimic(parent);
    match parent.kind() {
        Some(kind) => child.set_kind(&format!("{} {}", kind, name)),
        None => child.set_kind(name),
    }
    parent.register_cell(name, child.clone());
    child
}

fn flow_name(flow: &Return) -> &'static str {
    match flow {
        Return::NonLocal { .. } => "return",
        Return::Break(_) => "break",
        Return::Continue => "continue",
        Return::Unwind(_) => "restart invocation",
        _ => "control flow",
    }
}

/// Failure of a top-level evaluation.
#[derive(Debug)]
pub enum EvalError {
    Parse(ParseError),
    /// An error condition escaped every handler; the report text is kept.
    Unhandled(String),
    /// Control flow escaped the top level, for instance a stray `break`.
    StrayControlFlow(&'static str),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Parse(error) => write!(f, "{}", error),
            EvalError::Unhandled(report) => write!(f, "unhandled condition: {}", report),
            EvalError::StrayControlFlow(kind) => {
                write!(f, "'{}' outside of any valid scope", kind)
            }
        }
    }
}

impl std::error::Error for EvalError {}
