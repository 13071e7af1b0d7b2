use crate::arguments::ArgumentsDefinition;
use crate::data::Data;
use crate::interpreter::{self, Return};
use crate::message;
use crate::object::Object;
use crate::primitives;
use crate::runtime::Runtime;

/// Introspection natives shared by methods, macros and syntax macros.
/// These are reached through `cell(:name)`, since plain lookup activates.
pub fn install(rt: &mut Runtime) {
    for proto in &[rt.method.clone(), rt.default_macro.clone(), rt.syntax.clone()] {
        primitives::native(
            rt,
            proto,
            "name",
            "returns the name this definition was first assigned to, or nil",
            ArgumentsDefinition::empty(),
            name,
        );
        primitives::native(
            rt,
            proto,
            "code",
            "returns the body of this definition, rendered back to source text",
            ArgumentsDefinition::empty(),
            code,
        );
    }
}

fn code_state(object: &Object) -> Option<crate::data::CodeState> {
    match &object.state().data {
        Data::Method(state) | Data::Macro(state) | Data::Syntax(state) => Some(state.clone()),
        _ => None,
    }
}

fn name(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    match code_state(on) {
        Some(state) => match state.name {
            Some(name) => Return::Local(rt.new_text(&name)),
            None => Return::Local(rt.nil()),
        },
        None => interpreter::signal_incorrect_type(rt, ctx, msg, on, "DefaultMethod"),
    }
}

fn code(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    match code_state(on) {
        Some(state) => match state.code {
            Some(code) => Return::Local(rt.new_text(&message::code(&code))),
            None => Return::Local(rt.nil()),
        },
        None => interpreter::signal_incorrect_type(rt, ctx, msg, on, "DefaultMethod"),
    }
}
