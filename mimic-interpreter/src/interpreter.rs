use crate::context;
use crate::data::{CallState, Data};
use crate::message;
use crate::object::Object;
use crate::runtime::Runtime;

/// The result of evaluating anything: either a value, or control flow on
/// its way out to whoever handles it.
#[derive(Debug, Clone)]
pub enum Return {
    /// A plain value.
    Local(Object),
    /// A syntax expansion removed the current node from its chain; there is
    /// no value and the chain evaluator keeps its current receiver.
    Spliced,
    /// A non-local return, targeted at one specific method activation.
    NonLocal { scope: Object, value: Object },
    /// Breaking out of the nearest iteration.
    Break(Object),
    /// Skipping to the next round of the nearest iteration.
    Continue,
    /// Unwinding towards a dynamically scoped frame, identified by token.
    Unwind(Unwind),
    /// An unhandled error condition escaping to the top level.
    Exception(Object),
}

/// The payload of a token-targeted unwind.
#[derive(Debug, Clone)]
pub enum Unwind {
    /// A restart was invoked: unwind to the frame that established it.
    Restart {
        token: u64,
        name: String,
        arguments: Vec<Object>,
    },
    /// A rescuing handler accepted a condition: unwind to its `bind` frame,
    /// which runs the handler there.
    Rescue {
        token: u64,
        handler: Object,
        condition: Object,
    },
}

/// Unwrap a `Return::Local` value, forwarding any control flow outwards.
#[macro_export]
macro_rules! propagate {
    ($expr:expr) => {
        match $expr {
            $crate::interpreter::Return::Local(value) => value,
            other => return other,
        }
    };
}

/// Evaluate a message chain against a receiver.
///
/// The receiver for the first message is `receiver`; each following message
/// is sent to the previous result, and a terminator resets back to
/// `receiver`. The value of the chain is the last real result, or nil for
/// an empty chain.
pub fn evaluate(rt: &mut Runtime, head: &Object, ctx: &Object, receiver: &Object) -> Return {
    let mut current = receiver.clone();
    let mut last_real = rt.nil();
    let mut node = Some(head.clone());
    while let Some(m) = node {
        if message::is_terminator(&m) {
            current = receiver.clone();
        } else {
            match send(rt, &m, ctx, &current) {
                Return::Local(value) => {
                    current = value.clone();
                    last_real = value;
                }
                // The chain was rewritten at this node; keep the receiver.
                Return::Spliced => {}
                other => return other,
            }
        }
        node = message::next(&m);
    }
    Return::Local(last_real)
}

/// Send one message to a receiver: look the name up through the receiver's
/// mimic graph (with context fallback) and activate what is found.
pub fn send(rt: &mut Runtime, msg: &Object, ctx: &Object, receiver: &Object) -> Return {
    if let Some(cached) = message::cached(msg) {
        return Return::Local(cached);
    }
    let name = message::name(msg);
    let value = match receiver.find_cell(&name) {
        Some(value) => value,
        None => return signal_no_such_cell(rt, ctx, msg, receiver, &name),
    };
    if value.is_activatable() {
        return activate(rt, &value, ctx, msg, receiver);
    }
    // A plain value short-circuits; any arguments stay unevaluated.
    Return::Local(value)
}

/// Activate a cell value found by `send`, dispatching on what it is.
pub fn activate(
    rt: &mut Runtime,
    value: &Object,
    ctx: &Object,
    msg: &Object,
    on: &Object,
) -> Return {
    let data = value.state().data.clone();
    match data {
        Data::Method(state) => match &state.code {
            Some(code) => activate_method(rt, value, &state.arguments, code, ctx, msg, on),
            None => signal_not_activatable(rt, ctx, msg, value, &message::name(msg)),
        },
        Data::Macro(state) => match &state.code {
            Some(code) => activate_macro(rt, code, ctx, msg, on),
            None => signal_not_activatable(rt, ctx, msg, value, &message::name(msg)),
        },
        Data::Syntax(state) => match &state.code {
            Some(code) => activate_syntax(rt, code, ctx, msg, on),
            None => signal_not_activatable(rt, ctx, msg, value, &message::name(msg)),
        },
        Data::Native(native) => (native.func)(rt, value, ctx, msg, on),
        Data::Alias(target) => activate(rt, &target, ctx, msg, on),
        _ => signal_not_activatable(rt, ctx, msg, value, &message::name(msg)),
    }
}

/// Activate a user-defined method: fresh activation context grounded on the
/// receiver, arguments evaluated in the caller's context, non-local returns
/// targeting this activation caught here.
fn activate_method(
    rt: &mut Runtime,
    method: &Object,
    arguments: &std::rc::Rc<crate::arguments::ArgumentsDefinition>,
    code: &Object,
    ctx: &Object,
    msg: &Object,
    on: &Object,
) -> Return {
    let ground = context::ground(on);
    let activation = context::new(&ground, on, false);
    let call = Object::new(Data::Call(CallState {
        ctx: activation.clone(),
        message: msg.clone(),
        surrounding: ctx.clone(),
        on: on.clone(),
        cached_positional: None,
    }));
    call.single_mimics(&rt.call_proto());
    register_activation_cells(&activation, on, msg, ctx, &call);
    if let Some(name) = method_name(method) {
        activation.register_cell("currentMethod", rt.new_text(&name));
    }
    propagate!(arguments.assign(rt, ctx, msg, &activation, Some(&call)));
    match evaluate(rt, code, &activation, &activation) {
        Return::NonLocal { scope, value } if scope == activation => Return::Local(value),
        other => other,
    }
}

/// Activate a macro: like a method, but the arguments stay unevaluated and
/// reachable only through `call`.
fn activate_macro(rt: &mut Runtime, code: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let ground = context::ground(on);
    let activation = context::new(&ground, on, false);
    let call = Object::new(Data::Call(CallState {
        ctx: activation.clone(),
        message: msg.clone(),
        surrounding: ctx.clone(),
        on: on.clone(),
        cached_positional: None,
    }));
    call.single_mimics(&rt.call_proto());
    register_activation_cells(&activation, on, msg, ctx, &call);
    match evaluate(rt, code, &activation, &activation) {
        Return::NonLocal { scope, value } if scope == activation => Return::Local(value),
        other => other,
    }
}

/// Activate a syntax macro: run its body like a macro, then splice the
/// result back into the chain in place of the activating message.
///
/// A nil expansion removes the node. A message expansion replaces it; any
/// other value is wrapped as a literal-carrying message first. The rewritten
/// node is then re-sent, to the context when it starts an expression and to
/// the original receiver otherwise.
fn activate_syntax(rt: &mut Runtime, code: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let result = {
        let ground = context::ground(on);
        let activation = context::new(&ground, on, false);
        let call = Object::new(Data::Call(CallState {
            ctx: activation.clone(),
            message: msg.clone(),
            surrounding: ctx.clone(),
            on: on.clone(),
            cached_positional: None,
        }));
        call.single_mimics(&rt.call_proto());
        register_activation_cells(&activation, on, msg, ctx, &call);
        match evaluate(rt, code, &activation, &activation) {
            Return::NonLocal { scope, value } if scope == activation => value,
            Return::Local(value) => value,
            other => return other,
        }
    };

    let prev = message::prev(msg);
    let next = message::next(msg);

    if result.is_nil() {
        match (&prev, &next) {
            (Some(prev), _) => {
                message::set_next(prev, next.clone());
                if let Some(next) = &next {
                    message::set_prev(next, Some(prev.clone()));
                }
            }
            (None, Some(next)) => {
                msg.become_other(next);
                message::set_prev(msg, None);
            }
            (None, None) => {
                // Nothing left in this chain; leave a literal nil behind.
                let nil = rt.nil();
                msg.become_other(&message::wrap(rt, &nil));
            }
        }
        return Return::Spliced;
    }

    let replacement = if message::is_message(&result) {
        result
    } else {
        message::wrap(rt, &result)
    };

    msg.become_other(&replacement);
    let last = message::last_of(msg);
    message::set_next(&last, next.clone());
    if let Some(next) = &next {
        message::set_prev(next, Some(last));
    }
    message::set_prev(msg, prev.clone());

    let starts_expression = match &prev {
        None => true,
        Some(prev) => message::is_terminator(prev),
    };
    let receiver = if starts_expression { ctx.clone() } else { on.clone() };
    send(rt, msg, ctx, &receiver)
}

/// Activate a lexical block: the new context chains lexically to the
/// block's creation context, and nothing rebinds `self`.
pub fn activate_block(
    rt: &mut Runtime,
    block_ctx: &Object,
    arguments: &std::rc::Rc<crate::arguments::ArgumentsDefinition>,
    code: &Object,
    ctx: &Object,
    msg: &Object,
) -> Return {
    let ground = context::ground(block_ctx);
    let activation = context::new(&ground, block_ctx, true);
    propagate!(arguments.assign(rt, ctx, msg, &activation, None));
    evaluate(rt, code, &activation, &activation)
}

fn register_activation_cells(
    activation: &Object,
    on: &Object,
    msg: &Object,
    surrounding: &Object,
    call: &Object,
) {
    activation.register_cell("self", on.clone());
    activation.register_cell("@", on.clone());
    activation.register_cell("currentMessage", msg.clone());
    activation.register_cell("surroundingContext", surrounding.clone());
    activation.register_cell("call", call.clone());
}

fn method_name(method: &Object) -> Option<String> {
    match &method.state().data {
        Data::Method(state) | Data::Macro(state) | Data::Syntax(state) => state.name.clone(),
        _ => None,
    }
}

/// Evaluate every argument of a message in the caller's context.
pub fn evaluated_args(rt: &mut Runtime, msg: &Object, ctx: &Object) -> Result<Vec<Object>, Return> {
    let args = message::args(msg);
    let mut values = Vec::with_capacity(args.len());
    for arg in &args {
        match evaluate(rt, arg, ctx, ctx) {
            Return::Local(value) => values.push(value),
            other => return Err(other),
        }
    }
    Ok(values)
}

/// Evaluate one argument of a message in the caller's context.
pub fn evaluated_arg(
    rt: &mut Runtime,
    msg: &Object,
    ctx: &Object,
    index: usize,
) -> Result<Object, Return> {
    let args = message::args(msg);
    match args.get(index) {
        Some(arg) => match evaluate(rt, arg, ctx, ctx) {
            Return::Local(value) => Ok(value),
            other => Err(other),
        },
        None => Ok(rt.nil()),
    }
}

// --- assignment -----------------------------------------------------------

/// Assign a cell, inferring kind and name on the way.
///
/// A capitalized name given a kindless value turns the value into a named
/// kind, scoped under the receiver's own kind unless assigned at the
/// ground. Method-like values without a name take the cell name as theirs.
pub fn assign_cell(
    rt: &mut Runtime,
    ctx: &Object,
    name: &str,
    value: Object,
    on: &Object,
) -> Return {
    let capitalized = name.chars().next().map(char::is_uppercase).unwrap_or(false);
    if capitalized && !value.has_kind() {
        let at_ground = *on == context::ground(ctx) || context::is_context(on);
        let parent = if at_ground { None } else { on.lookup_kind() };
        match parent {
            Some(parent) => value.set_kind(&format!("{} {}", parent, name)),
            None => value.set_kind(name),
        }
    }
    let unnamed = matches!(value.state().data.name(), Some(None));
    if unnamed {
        value.state_mut().data.set_name(name);
    }
    on.set_cell(rt, ctx, name, value)
}

/// Recursively destructure a tuple or list value over a grouped target.
///
/// Each target is assigned its positional element; `_` skips one element,
/// and a trailing `_` absorbs any number of excess elements. A nested group
/// destructures its element in turn. Anything that does not line up signals
/// a destructuring mismatch.
pub fn destructure(
    rt: &mut Runtime,
    ctx: &Object,
    msg: &Object,
    targets: &[Object],
    value: &Object,
    on: &Object,
) -> Return {
    let elements = match &value.state().data {
        Data::Tuple(elements) | Data::List(elements) => elements.clone(),
        _ => {
            return signal_destructuring_mismatch(
                rt,
                ctx,
                msg,
                value,
                "destructuring requires a tuple or list value",
            )
        }
    };

    let trailing_wildcard = targets
        .last()
        .map(|t| message::name(t) == "_" && message::arg_count(t) == 0)
        .unwrap_or(false);
    let matches = if trailing_wildcard {
        elements.len() >= targets.len() - 1
    } else {
        elements.len() == targets.len()
    };
    if !matches {
        return signal_destructuring_mismatch(
            rt,
            ctx,
            msg,
            value,
            &format!(
                "expected {} values to destructure, got {}",
                targets.len(),
                elements.len()
            ),
        );
    }

    for (target, element) in targets.iter().zip(elements.iter()) {
        let name = message::name(target);
        if name == "_" && message::arg_count(target) == 0 {
            continue;
        }
        if name.is_empty() {
            let inner = message::args(target);
            propagate!(destructure(rt, ctx, msg, &inner, element, on));
            continue;
        }
        propagate!(assign_cell(rt, ctx, &name, element.clone(), on));
    }
    Return::Local(value.clone())
}

// --- condition entry points used by the core ------------------------------

/// Signal `NoSuchCell`, restartable with `useValue(value)` (use a value in
/// place of the missing cell) and `storeValue(value)` (also store it on the
/// receiver first).
pub fn signal_no_such_cell(
    rt: &mut Runtime,
    ctx: &Object,
    msg: &Object,
    receiver: &Object,
    name: &str,
) -> Return {
    let condition = rt.new_condition(
        &["Error", "NoSuchCell"],
        ctx,
        Some(msg),
        Some(receiver),
        &format!("couldn't find cell '{}'", name),
    );
    condition.register_cell("cellName", rt.new_symbol(name));
    let token = rt.push_restarts(&["useValue", "storeValue"]);
    let result = rt.error_condition(condition, ctx);
    rt.pop_restarts(token);
    match result {
        Return::Unwind(Unwind::Restart {
            token: t,
            name: restart,
            mut arguments,
        }) if t == token => {
            let value = if arguments.is_empty() {
                rt.nil()
            } else {
                arguments.remove(0)
            };
            if restart == "storeValue" {
                propagate!(receiver.set_cell(rt, ctx, name, value.clone()));
            }
            Return::Local(value)
        }
        other => other,
    }
}

pub fn signal_not_activatable(
    rt: &mut Runtime,
    ctx: &Object,
    msg: &Object,
    value: &Object,
    name: &str,
) -> Return {
    let condition = rt.new_condition(
        &["Error", "Invocation", "NotActivatable"],
        ctx,
        Some(msg),
        Some(value),
        &format!("tried to activate '{}', which is not activatable", name),
    );
    rt.error_condition(condition, ctx)
}

pub fn signal_argument_count(
    rt: &mut Runtime,
    ctx: &Object,
    msg: &Object,
    text: &str,
) -> Return {
    let condition = rt.new_condition(
        &["Error", "Invocation", "ArgumentCount"],
        ctx,
        Some(msg),
        None,
        text,
    );
    rt.error_condition(condition, ctx)
}

fn signal_destructuring_mismatch(
    rt: &mut Runtime,
    ctx: &Object,
    msg: &Object,
    value: &Object,
    text: &str,
) -> Return {
    let condition = rt.new_condition(
        &["Error", "DestructuringMismatch"],
        ctx,
        Some(msg),
        Some(value),
        text,
    );
    rt.error_condition(condition, ctx)
}

pub fn signal_incorrect_type(
    rt: &mut Runtime,
    ctx: &Object,
    msg: &Object,
    value: &Object,
    expected: &str,
) -> Return {
    let condition = rt.new_condition(
        &["Error", "Type", "IncorrectType"],
        ctx,
        Some(msg),
        Some(value),
        &format!("expected a {}", expected),
    );
    rt.error_condition(condition, ctx)
}
