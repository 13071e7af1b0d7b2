use crate::arguments::ArgumentsDefinition;
use crate::data::Data;
use crate::interpreter::{self, Return};
use crate::message;
use crate::object::Object;
use crate::primitives;
use crate::runtime::Runtime;

/// Reflection natives on `Message`.
pub fn install(rt: &mut Runtime) {
    let proto = rt.message.clone();

    primitives::native(
        rt,
        &proto,
        "name",
        "returns the name of the receiving message as a symbol",
        ArgumentsDefinition::empty(),
        name,
    );
    primitives::native(
        rt,
        &proto,
        "arguments",
        "returns the argument chains of the receiving message",
        ArgumentsDefinition::empty(),
        arguments,
    );
    primitives::native(
        rt,
        &proto,
        "next",
        "returns the following message in the chain, or nil",
        ArgumentsDefinition::empty(),
        next,
    );
    primitives::native(
        rt,
        &proto,
        "prev",
        "returns the preceding message in the chain, or nil",
        ArgumentsDefinition::empty(),
        prev,
    );
    primitives::native(
        rt,
        &proto,
        "code",
        "returns the chain starting at the receiver, rendered back to source text",
        ArgumentsDefinition::empty(),
        code,
    );
    primitives::native(
        rt,
        &proto,
        "copy",
        "returns a copy of the receiving message alone, sharing its arguments and carrying no chain links",
        ArgumentsDefinition::empty(),
        copy,
    );
    primitives::native(
        rt,
        &proto,
        "deepCopy",
        "returns a copy of the chain starting at the receiver, with fresh identities throughout",
        ArgumentsDefinition::empty(),
        deep_copy,
    );
    primitives::native(
        rt,
        &proto,
        "evaluateOn",
        "evaluates the chain starting at the receiver, against the argument as both context and receiver",
        ArgumentsDefinition::builder().required("ground").build(),
        evaluate_on,
    );
}

fn expect_message(
    rt: &mut Runtime,
    ctx: &Object,
    msg: &Object,
    object: &Object,
) -> Result<(), Return> {
    if matches!(&object.state().data, Data::Message(_)) {
        Ok(())
    } else {
        Err(interpreter::signal_incorrect_type(rt, ctx, msg, object, "Message"))
    }
}

fn name(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    crate::fetch!(expect_message(rt, ctx, msg, on));
    Return::Local(rt.new_symbol(&message::name(on)))
}

fn arguments(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    crate::fetch!(expect_message(rt, ctx, msg, on));
    Return::Local(rt.new_list(message::args(on)))
}

fn next(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    crate::fetch!(expect_message(rt, ctx, msg, on));
    Return::Local(message::next(on).unwrap_or_else(|| rt.nil()))
}

fn prev(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    crate::fetch!(expect_message(rt, ctx, msg, on));
    Return::Local(message::prev(on).unwrap_or_else(|| rt.nil()))
}

fn code(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    crate::fetch!(expect_message(rt, ctx, msg, on));
    Return::Local(rt.new_text(&message::code(on)))
}

fn copy(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    crate::fetch!(expect_message(rt, ctx, msg, on));
    Return::Local(message::copy(rt, on))
}

fn deep_copy(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    crate::fetch!(expect_message(rt, ctx, msg, on));
    Return::Local(message::deep_copy(rt, on))
}

fn evaluate_on(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    crate::fetch!(expect_message(rt, ctx, msg, on));
    let (args, _) = crate::fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    interpreter::evaluate(rt, on, &args[0], &args[0])
}
