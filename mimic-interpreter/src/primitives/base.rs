use num_bigint::BigInt;

use crate::arguments::ArgumentsDefinition;
use crate::data::Data;
use crate::fetch;
use crate::interpreter::{self, Return};
use crate::message;
use crate::object::Object;
use crate::primitives::{self, expect_name};
use crate::propagate;
use crate::runtime::Runtime;

/// Natives every object responds to: cell access, mimic manipulation,
/// assignment, kind and documentation introspection.
pub fn install(rt: &mut Runtime) {
    let base = rt.base.clone();

    primitives::native(
        rt,
        &base,
        "=",
        "assigns the cell named by the first argument to the value of the second argument, on the receiver. A parenthesized target destructures a tuple or list value; a target carrying arguments activates the matching '<name>=' setter instead.",
        ArgumentsDefinition::builder()
            .required_unevaluated("place")
            .required_unevaluated("value")
            .build(),
        assign,
    );
    primitives::native(
        rt,
        &base,
        "==",
        "returns true if the argument is the same object as the receiver, or an equal value",
        ArgumentsDefinition::builder().required("other").build(),
        equal,
    );
    primitives::native(
        rt,
        &base,
        "!=",
        "returns true if the argument is neither the same object as the receiver nor an equal value",
        ArgumentsDefinition::builder().required("other").build(),
        not_equal,
    );
    primitives::native(
        rt,
        &base,
        "cell",
        "returns the value of the named cell, found through the receiver's mimic graph",
        ArgumentsDefinition::builder().required("name").build(),
        cell,
    );
    primitives::native(
        rt,
        &base,
        "cell=",
        "assigns the named cell on the receiver",
        ArgumentsDefinition::builder()
            .required("name")
            .required("value")
            .build(),
        cell_assign,
    );
    primitives::native(
        rt,
        &base,
        "cell?",
        "returns true if the named cell is visible from the receiver",
        ArgumentsDefinition::builder().required("name").build(),
        cell_query,
    );
    primitives::native(
        rt,
        &base,
        "removeCell!",
        "removes the named cell from the receiver itself",
        ArgumentsDefinition::builder().required("name").build(),
        remove_cell,
    );
    primitives::native(
        rt,
        &base,
        "undefineCell!",
        "masks the named cell so that nothing inherited under that name is visible from the receiver",
        ArgumentsDefinition::builder().required("name").build(),
        undefine_cell,
    );
    primitives::native(
        rt,
        &base,
        "cellNames",
        "returns the names of the receiver's cells as symbols; a true argument includes cells found through mimics",
        ArgumentsDefinition::builder()
            .optional("includeMimics", None)
            .build(),
        cell_names,
    );
    primitives::native(
        rt,
        &base,
        "cells",
        "returns (name, value) tuples for the receiver's cells; a true argument includes cells found through mimics",
        ArgumentsDefinition::builder()
            .optional("includeMimics", None)
            .build(),
        cells,
    );
    primitives::native(
        rt,
        &base,
        "kind",
        "returns the kind name of the receiver, found through its mimic graph",
        ArgumentsDefinition::empty(),
        kind,
    );
    primitives::native(
        rt,
        &base,
        "kind?",
        "returns true if the named kind appears anywhere in the receiver's mimic graph",
        ArgumentsDefinition::builder().required("name").build(),
        kind_query,
    );
    primitives::native(
        rt,
        &base,
        "mimic",
        "returns a fresh object with the receiver as its only mimic",
        ArgumentsDefinition::empty(),
        mimic,
    );
    primitives::native(
        rt,
        &base,
        "mimics",
        "returns the receiver's mimic list",
        ArgumentsDefinition::empty(),
        mimics,
    );
    primitives::native(
        rt,
        &base,
        "mimic!",
        "appends the argument to the receiver's mimic list",
        ArgumentsDefinition::builder().required("other").build(),
        add_mimic,
    );
    primitives::native(
        rt,
        &base,
        "removeMimic!",
        "removes the argument from the receiver's mimic list",
        ArgumentsDefinition::builder().required("other").build(),
        remove_mimic,
    );
    primitives::native(
        rt,
        &base,
        "documentation",
        "returns the documentation text of the receiver",
        ArgumentsDefinition::empty(),
        documentation,
    );
    primitives::native(
        rt,
        &base,
        "documentation=",
        "sets the documentation text of the receiver",
        ArgumentsDefinition::builder().required("text").build(),
        set_documentation,
    );
    primitives::native(
        rt,
        &base,
        "activatable",
        "returns whether looking up the receiver as a cell activates it",
        ArgumentsDefinition::empty(),
        activatable,
    );
    primitives::native(
        rt,
        &base,
        "activatable=",
        "sets whether looking up the receiver as a cell activates it",
        ArgumentsDefinition::builder().required("value").build(),
        set_activatable,
    );
    primitives::native(
        rt,
        &base,
        "identity",
        "returns a number identifying the receiver object itself",
        ArgumentsDefinition::empty(),
        identity,
    );
    primitives::native(
        rt,
        &base,
        "inspect",
        "returns a text describing the receiver and its own cell names",
        ArgumentsDefinition::empty(),
        inspect,
    );
    primitives::native(
        rt,
        &base,
        "aliasMethod!",
        "registers a second cell name whose activation delegates to an existing cell of the receiver",
        ArgumentsDefinition::builder()
            .required("oldName")
            .required("newName")
            .build(),
        alias_method,
    );
}

fn assign(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let args = message::args(msg);
    if args.len() != 2 {
        return interpreter::signal_argument_count(rt, ctx, msg, "'=' takes a place and a value");
    }
    let place = &args[0];
    let name = message::name(place);
    let value = propagate!(interpreter::evaluate(rt, &args[1], ctx, ctx));
    if name.is_empty() {
        let targets = message::args(place);
        return interpreter::destructure(rt, ctx, msg, &targets, &value, on);
    }
    if message::arg_count(place) > 0 {
        // `place(args) = value` activates the matching `place=` setter.
        let mut setter_args = message::args(place);
        setter_args.push(message::wrap(rt, &value));
        let setter = message::with_args(rt, &format!("{}=", name), setter_args);
        return interpreter::send(rt, &setter, ctx, on);
    }
    interpreter::assign_cell(rt, ctx, &name, value, on)
}

fn equal(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    Return::Local(rt.truth(primitives::objects_equal(on, &args[0])))
}

fn not_equal(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    Return::Local(rt.truth(!primitives::objects_equal(on, &args[0])))
}

fn cell(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    let name = fetch!(expect_name(rt, ctx, msg, &args[0]));
    match on.find_cell(&name) {
        Some(value) => Return::Local(value),
        None => interpreter::signal_no_such_cell(rt, ctx, msg, on, &name),
    }
}

fn cell_assign(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    let name = fetch!(expect_name(rt, ctx, msg, &args[0]));
    interpreter::assign_cell(rt, ctx, &name, args[1].clone(), on)
}

fn cell_query(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    let name = fetch!(expect_name(rt, ctx, msg, &args[0]));
    Return::Local(rt.truth(on.find_cell(&name).is_some()))
}

fn remove_cell(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    let name = fetch!(expect_name(rt, ctx, msg, &args[0]));
    on.remove_cell(rt, ctx, msg, &name)
}

fn undefine_cell(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    let name = fetch!(expect_name(rt, ctx, msg, &args[0]));
    on.undefine_cell(rt, ctx, &name)
}

fn cell_names(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    let include_mimics = args.get(0).map(Object::is_truthy).unwrap_or(false);
    let names = on
        .cell_names(include_mimics, None)
        .into_iter()
        .map(|name| rt.new_symbol(&name))
        .collect();
    Return::Local(rt.new_list(names))
}

fn cells(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    let include_mimics = args.get(0).map(Object::is_truthy).unwrap_or(false);
    let pairs = on
        .cells(include_mimics)
        .into_iter()
        .map(|(name, value)| {
            let symbol = rt.new_symbol(&name);
            rt.new_tuple(vec![symbol, value])
        })
        .collect();
    Return::Local(rt.new_list(pairs))
}

fn kind(rt: &mut Runtime, _m: &Object, _ctx: &Object, _msg: &Object, on: &Object) -> Return {
    match on.lookup_kind() {
        Some(kind) => Return::Local(rt.new_text(&kind)),
        None => Return::Local(rt.nil()),
    }
}

fn kind_query(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    let name = fetch!(expect_name(rt, ctx, msg, &args[0]));
    Return::Local(rt.truth(on.is_kind(&name)))
}

fn mimic(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    on.mimic(rt, ctx, msg)
}

fn mimics(rt: &mut Runtime, _m: &Object, _ctx: &Object, _msg: &Object, on: &Object) -> Return {
    Return::Local(rt.new_list(on.mimics()))
}

fn add_mimic(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    on.add_mimic(rt, ctx, msg, &args[0])
}

fn remove_mimic(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    on.remove_mimic(rt, ctx, msg, &args[0])
}

fn documentation(rt: &mut Runtime, _m: &Object, _ctx: &Object, _msg: &Object, on: &Object) -> Return {
    match on.documentation() {
        Some(text) => Return::Local(rt.new_text(&text)),
        None => Return::Local(rt.nil()),
    }
}

fn set_documentation(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    let text = fetch!(primitives::expect_text(rt, ctx, msg, &args[0]));
    on.set_documentation(Some(text));
    Return::Local(args[0].clone())
}

fn activatable(rt: &mut Runtime, _m: &Object, _ctx: &Object, _msg: &Object, on: &Object) -> Return {
    Return::Local(rt.truth(on.is_activatable()))
}

fn set_activatable(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    on.set_activatable(args[0].is_truthy());
    Return::Local(args[0].clone())
}

fn identity(rt: &mut Runtime, _m: &Object, _ctx: &Object, _msg: &Object, on: &Object) -> Return {
    Return::Local(rt.new_number(BigInt::from(on.id() as u64)))
}

fn alias_method(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    let old_name = fetch!(expect_name(rt, ctx, msg, &args[0]));
    let new_name = fetch!(expect_name(rt, ctx, msg, &args[1]));
    let target = match on.find_cell(&old_name) {
        Some(value) => value,
        None => return interpreter::signal_no_such_cell(rt, ctx, msg, on, &old_name),
    };
    let alias = Object::new(Data::Alias(target));
    alias.single_mimics(&rt.method);
    alias.set_activatable(true);
    propagate!(on.set_cell(rt, ctx, &new_name, alias));
    Return::Local(on.clone())
}

fn inspect(rt: &mut Runtime, _m: &Object, _ctx: &Object, _msg: &Object, on: &Object) -> Return {
    let names = on.cell_names(false, None);
    let text = if names.is_empty() {
        on.display_string()
    } else {
        format!("{}({})", on.display_string(), names.join(", "))
    };
    Return::Local(rt.new_text(&text))
}
