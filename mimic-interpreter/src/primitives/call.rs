use crate::arguments::ArgumentsDefinition;
use crate::data::{CallState, Data};
use crate::fetch;
use crate::interpreter::{self, Return};
use crate::message;
use crate::object::Object;
use crate::primitives;
use crate::runtime::Runtime;

/// Natives on `Call`, the reified activation record.
pub fn install(rt: &mut Runtime) {
    let proto = rt.call.clone();

    primitives::native(
        rt,
        &proto,
        "arguments",
        "returns the evaluated positional arguments of this activation; re-uses values already evaluated by the fast argument path",
        ArgumentsDefinition::empty(),
        arguments,
    );
    primitives::native(
        rt,
        &proto,
        "message",
        "returns the message that started this activation",
        ArgumentsDefinition::empty(),
        message_,
    );
    primitives::native(
        rt,
        &proto,
        "receiver",
        "returns the receiver of this activation",
        ArgumentsDefinition::empty(),
        receiver,
    );
    primitives::native(
        rt,
        &proto,
        "ground",
        "returns the context this activation was called from",
        ArgumentsDefinition::empty(),
        ground,
    );
    primitives::native(
        rt,
        &proto,
        "currentContext",
        "returns the activation context itself",
        ArgumentsDefinition::empty(),
        current_context,
    );
}

fn expect_call(
    rt: &mut Runtime,
    ctx: &Object,
    msg: &Object,
    object: &Object,
) -> Result<CallState, Return> {
    let state = match &object.state().data {
        Data::Call(state) => Some(state.clone()),
        _ => None,
    };
    state.ok_or_else(|| interpreter::signal_incorrect_type(rt, ctx, msg, object, "Call"))
}

/// The evaluated positional arguments. When the fast path already
/// evaluated them at activation time, those exact values are returned;
/// otherwise the raw chains are evaluated now, in the calling context.
fn arguments(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let state = fetch!(expect_call(rt, ctx, msg, on));
    if let Some(cached) = state.cached_positional {
        return Return::Local(rt.new_list(cached));
    }
    let mut values = Vec::new();
    for arg in message::args(&state.message) {
        match interpreter::evaluate(rt, &arg, &state.surrounding, &state.surrounding) {
            Return::Local(value) => values.push(value),
            other => return other,
        }
    }
    Return::Local(rt.new_list(values))
}

fn message_(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let state = fetch!(expect_call(rt, ctx, msg, on));
    Return::Local(state.message)
}

fn receiver(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let state = fetch!(expect_call(rt, ctx, msg, on));
    Return::Local(state.on)
}

fn ground(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let state = fetch!(expect_call(rt, ctx, msg, on));
    Return::Local(state.surrounding)
}

fn current_context(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let state = fetch!(expect_call(rt, ctx, msg, on));
    Return::Local(state.ctx)
}
