use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::arguments::ArgumentsDefinition;
use crate::data::Data;
use crate::fetch;
use crate::interpreter::{self, Return};
use crate::object::Object;
use crate::primitives::{self, expect_list, expect_number};
use crate::runtime::Runtime;

/// Natives on `List` and `Tuple`.
pub fn install(rt: &mut Runtime) {
    let list = rt.list.clone();
    let tuple = rt.tuple.clone();

    primitives::native(
        rt,
        &list,
        "length",
        "returns the number of elements in the receiver",
        ArgumentsDefinition::empty(),
        list_length,
    );
    primitives::native(
        rt,
        &list,
        "first",
        "returns the first element of the receiver, or nil when empty",
        ArgumentsDefinition::empty(),
        list_first,
    );
    primitives::native(
        rt,
        &list,
        "at",
        "returns the element at the given zero-based index, or nil when out of range",
        ArgumentsDefinition::builder().required("index").build(),
        list_at,
    );
    primitives::native(
        rt,
        &list,
        "<<",
        "appends the argument to the receiver and returns the receiver",
        ArgumentsDefinition::builder().required("value").build(),
        list_append,
    );
    primitives::native(
        rt,
        &list,
        "asTuple",
        "returns a tuple of the receiver's elements",
        ArgumentsDefinition::empty(),
        list_as_tuple,
    );

    primitives::native(
        rt,
        &tuple,
        "length",
        "returns the number of elements in the receiver",
        ArgumentsDefinition::empty(),
        tuple_length,
    );
    primitives::native(
        rt,
        &tuple,
        "at",
        "returns the element at the given zero-based index, or nil when out of range",
        ArgumentsDefinition::builder().required("index").build(),
        tuple_at,
    );
    primitives::native(
        rt,
        &tuple,
        "asList",
        "returns a list of the receiver's elements",
        ArgumentsDefinition::empty(),
        tuple_as_list,
    );
}

fn expect_tuple(
    rt: &mut Runtime,
    ctx: &Object,
    msg: &Object,
    object: &Object,
) -> Result<Vec<Object>, Return> {
    let value = match &object.state().data {
        Data::Tuple(values) => Some(values.clone()),
        _ => None,
    };
    value.ok_or_else(|| interpreter::signal_incorrect_type(rt, ctx, msg, object, "Tuple"))
}

fn index_into(values: &[Object], index: &BigInt) -> Option<Object> {
    index
        .to_usize()
        .and_then(|index| values.get(index))
        .cloned()
}

fn list_length(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let values = fetch!(expect_list(rt, ctx, msg, on));
    Return::Local(rt.new_number(values.len().into()))
}

fn list_first(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let values = fetch!(expect_list(rt, ctx, msg, on));
    Return::Local(values.first().cloned().unwrap_or_else(|| rt.nil()))
}

fn list_at(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let values = fetch!(expect_list(rt, ctx, msg, on));
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    let index = fetch!(expect_number(rt, ctx, msg, &args[0]));
    Return::Local(index_into(&values, &index).unwrap_or_else(|| rt.nil()))
}

fn list_append(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    let is_list = matches!(&on.state().data, Data::List(_));
    if !is_list {
        return interpreter::signal_incorrect_type(rt, ctx, msg, on, "List");
    }
    if let Data::List(values) = &mut on.state_mut().data {
        values.push(args[0].clone());
    }
    Return::Local(on.clone())
}

fn list_as_tuple(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let values = fetch!(expect_list(rt, ctx, msg, on));
    Return::Local(rt.new_tuple(values))
}

fn tuple_length(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let values = fetch!(expect_tuple(rt, ctx, msg, on));
    Return::Local(rt.new_number(values.len().into()))
}

fn tuple_at(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let values = fetch!(expect_tuple(rt, ctx, msg, on));
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    let index = fetch!(expect_number(rt, ctx, msg, &args[0]));
    Return::Local(index_into(&values, &index).unwrap_or_else(|| rt.nil()))
}

fn tuple_as_list(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let values = fetch!(expect_tuple(rt, ctx, msg, on));
    Return::Local(rt.new_list(values))
}
