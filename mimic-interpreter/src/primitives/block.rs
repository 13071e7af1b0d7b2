use crate::arguments::ArgumentsDefinition;
use crate::data::Data;
use crate::interpreter::{self, Return};
use crate::message;
use crate::object::Object;
use crate::primitives;
use crate::runtime::Runtime;

/// Natives on `LexicalBlock`.
pub fn install(rt: &mut Runtime) {
    let proto = rt.lexical_block.clone();

    primitives::native(
        rt,
        &proto,
        "call",
        "activates the receiving block with the given arguments",
        ArgumentsDefinition::builder().rest_unevaluated("values").build(),
        call,
    );
    primitives::native(
        rt,
        &proto,
        "code",
        "returns the body of the receiving block, rendered back to source text",
        ArgumentsDefinition::empty(),
        code,
    );
}

fn call(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let state = match &on.state().data {
        Data::Block(state) => Some(state.clone()),
        _ => None,
    };
    match state {
        Some(state) => {
            interpreter::activate_block(rt, &state.context, &state.arguments, &state.code, ctx, msg)
        }
        None => interpreter::signal_incorrect_type(rt, ctx, msg, on, "LexicalBlock"),
    }
}

fn code(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let state = match &on.state().data {
        Data::Block(state) => Some(state.clone()),
        _ => None,
    };
    match state {
        Some(state) => Return::Local(rt.new_text(&message::code(&state.code))),
        None => interpreter::signal_incorrect_type(rt, ctx, msg, on, "LexicalBlock"),
    }
}
