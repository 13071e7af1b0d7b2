use crate::arguments::ArgumentsDefinition;
use crate::condition::{self, HandlerFrame, RestartEntry, RestartFrame, SignalResult};
use crate::data::Data;
use crate::fetch;
use crate::interpreter::{self, Return, Unwind};
use crate::message;
use crate::object::Object;
use crate::primitives::{self, expect_name};
use crate::propagate;
use crate::runtime::Runtime;

/// The condition system natives: establishing handlers and restarts,
/// signalling, and invoking restarts.
pub fn install(rt: &mut Runtime) {
    let behavior = rt.default_behavior.clone();

    primitives::native(
        rt,
        &behavior,
        "bind",
        "establishes the given handlers and restarts around the evaluation of the last argument",
        ArgumentsDefinition::builder().rest_unevaluated("specsAndBody").build(),
        bind,
    );
    primitives::native(
        rt,
        &behavior,
        "handle",
        "creates a handler that runs at the signal point and lets the signal continue when it returns normally",
        ArgumentsDefinition::builder().rest("conditionsAndHandler").build(),
        handle,
    );
    primitives::native(
        rt,
        &behavior,
        "rescue",
        "creates a handler that unwinds to its 'bind' before running",
        ArgumentsDefinition::builder().rest("conditionsAndHandler").build(),
        rescue,
    );
    primitives::native(
        rt,
        &behavior,
        "restart",
        "creates a named restart whose handler runs at the 'bind' that established it",
        ArgumentsDefinition::builder()
            .required("name")
            .required("handler")
            .build(),
        restart,
    );
    primitives::native(
        rt,
        &behavior,
        "signal!",
        "signals a condition; returns nil when nothing handles it",
        ArgumentsDefinition::builder().required("condition").build(),
        signal,
    );
    primitives::native(
        rt,
        &behavior,
        "error!",
        "signals an error condition; unhandled errors abort the evaluation",
        ArgumentsDefinition::builder().required("condition").build(),
        error,
    );
    primitives::native(
        rt,
        &behavior,
        "invokeRestart",
        "unwinds to the innermost establishment of the named restart, passing the remaining arguments to it",
        ArgumentsDefinition::builder().required("name").rest("values").build(),
        invoke_restart,
    );
}

fn bind(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    let mut args = message::args(msg);
    let body = match args.pop() {
        Some(body) => body,
        None => return Return::Local(rt.nil()),
    };

    // Specs are evaluated before anything is established, so a failing
    // spec can never leak frames.
    let token = rt.next_token();
    let mut handlers = Vec::new();
    let mut restarts = Vec::new();
    for spec_chain in &args {
        let spec = propagate!(interpreter::evaluate(rt, spec_chain, ctx, ctx));
        if spec.is_kind("Restart") {
            let name = match spec.find_cell("name") {
                Some(name) => match &name.state().data {
                    Data::Symbol(name) | Data::Text(name) => name.clone(),
                    _ => return bad_spec(rt, ctx, msg, &spec),
                },
                None => return bad_spec(rt, ctx, msg, &spec),
            };
            let handler = spec.find_cell("handler");
            restarts.push(RestartEntry { name, handler });
        } else if spec.is_kind("Handler") || spec.is_kind("Rescue") {
            let conditions = match spec.find_cell("conditions") {
                Some(list) => match &list.state().data {
                    Data::List(conditions) => conditions.clone(),
                    _ => return bad_spec(rt, ctx, msg, &spec),
                },
                None => return bad_spec(rt, ctx, msg, &spec),
            };
            let handler = match spec.find_cell("handler") {
                Some(handler) => handler,
                None => return bad_spec(rt, ctx, msg, &spec),
            };
            handlers.push(HandlerFrame {
                token,
                conditions,
                handler,
                rescue: spec.is_kind("Rescue"),
            });
        } else {
            return bad_spec(rt, ctx, msg, &spec);
        }
    }
    for frame in handlers {
        rt.push_handler(frame);
    }
    if !restarts.is_empty() {
        rt.push_restart_frame(RestartFrame {
            token,
            entries: restarts.clone(),
        });
    }

    let result = interpreter::evaluate(rt, &body, ctx, ctx);
    rt.pop_token(token);

    match result {
        Return::Unwind(Unwind::Rescue {
            token: unwound,
            handler,
            condition,
        }) if unwound == token => condition::run_handler(rt, &handler, ctx, &condition),
        Return::Unwind(Unwind::Restart {
            token: unwound,
            name,
            arguments,
        }) if unwound == token => {
            let entry = restarts.iter().find(|entry| entry.name == name);
            match entry.and_then(|entry| entry.handler.clone()) {
                Some(handler) => {
                    let wrapped: Vec<Object> =
                        arguments.iter().map(|value| message::wrap(rt, value)).collect();
                    let call = message::with_args(rt, "call", wrapped);
                    interpreter::send(rt, &call, ctx, &handler)
                }
                None => Return::Local(rt.nil()),
            }
        }
        other => other,
    }
}

fn bad_spec(rt: &mut Runtime, ctx: &Object, msg: &Object, spec: &Object) -> Return {
    interpreter::signal_incorrect_type(rt, ctx, msg, spec, "handler, rescue or restart")
}

fn handler_spec(rt: &mut Runtime, ctx: &Object, msg: &Object, kind: &str, m: &Object) -> Return {
    let (mut args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    let handler = match args.pop() {
        Some(handler) => handler,
        None => {
            return interpreter::signal_argument_count(rt, ctx, msg, "a handler callable is required")
        }
    };
    let conditions = if args.is_empty() {
        vec![rt.condition.clone()]
    } else {
        args
    };
    let spec = Object::new(Data::None);
    spec.single_mimics(&rt.origin);
    spec.set_kind(kind);
    let conditions = rt.new_list(conditions);
    spec.register_cell("conditions", conditions);
    spec.register_cell("handler", handler);
    Return::Local(spec)
}

fn handle(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    handler_spec(rt, ctx, msg, "Handler", m)
}

fn rescue(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    handler_spec(rt, ctx, msg, "Rescue", m)
}

fn restart(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    let name = fetch!(expect_name(rt, ctx, msg, &args[0]));
    let spec = Object::new(Data::None);
    spec.single_mimics(&rt.origin);
    spec.set_kind("Restart");
    let name = rt.new_symbol(&name);
    spec.register_cell("name", name);
    spec.register_cell("handler", args[1].clone());
    Return::Local(spec)
}

/// Turn a `signal!`/`error!` argument into a condition instance: an object
/// already mimicking `Condition` is signalled as is, a text becomes a fresh
/// condition carrying it.
fn as_condition(
    rt: &mut Runtime,
    ctx: &Object,
    msg: &Object,
    argument: &Object,
    error: bool,
) -> Result<Object, Return> {
    if argument.is_mimic_of(&rt.condition.clone()) {
        return Ok(argument.clone());
    }
    let text = match &argument.state().data {
        Data::Text(text) => Some(text.clone()),
        _ => None,
    };
    match text {
        Some(text) => {
            let path: &[&str] = if error { &["Error"] } else { &[] };
            Ok(rt.new_condition(path, ctx, Some(msg), None, &text))
        }
        None => Err(interpreter::signal_incorrect_type(
            rt,
            ctx,
            msg,
            argument,
            "Condition or Text",
        )),
    }
}

fn signal(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    let condition = fetch!(as_condition(rt, ctx, msg, &args[0], false));
    match rt.signal_condition(&condition, ctx) {
        SignalResult::Unhandled => Return::Local(rt.nil()),
        SignalResult::Flow(flow) => flow,
    }
}

fn error(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    let condition = fetch!(as_condition(rt, ctx, msg, &args[0], true));
    rt.error_condition(condition, ctx)
}

fn invoke_restart(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    let name = fetch!(expect_name(rt, ctx, msg, &args[0]));
    match rt.find_restart(&name) {
        Some(token) => Return::Unwind(Unwind::Restart {
            token,
            name,
            arguments: args[1..].to_vec(),
        }),
        None => {
            let condition = rt.new_condition(
                &["Error", "NoSuchRestart"],
                ctx,
                Some(msg),
                None,
                &format!("no restart named '{}' is currently established", name),
            );
            condition.register_cell("restartName", rt.new_symbol(&name));
            rt.error_condition(condition, ctx)
        }
    }
}
