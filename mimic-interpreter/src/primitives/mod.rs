pub mod base;
pub mod behavior;
pub mod block;
pub mod call;
pub mod collections;
pub mod conditions;
pub mod hook;
pub mod message;
pub mod method;
pub mod number;
pub mod text;

use std::rc::Rc;

use num_bigint::BigInt;

use crate::arguments::ArgumentsDefinition;
use crate::data::{Data, NativeMethod};
use crate::interpreter::{self, Return};
use crate::object::Object;
use crate::runtime::Runtime;

/// The signature shared by all native methods.
pub type NativeFn = fn(&mut Runtime, &Object, &Object, &Object, &Object) -> Return;

/// Unwrap a `Result<T, Return>`, forwarding the flow on failure.
#[macro_export]
macro_rules! fetch {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(flow) => return flow,
        }
    };
}

/// Install every native method onto the bootstrapped prototypes.
pub fn install(rt: &mut Runtime) {
    base::install(rt);
    behavior::install(rt);
    block::install(rt);
    call::install(rt);
    collections::install(rt);
    conditions::install(rt);
    hook::install(rt);
    message::install(rt);
    method::install(rt);
    number::install(rt);
    text::install(rt);
}

/// Register one native method as a cell on a prototype.
pub fn native(
    rt: &Runtime,
    target: &Object,
    name: &'static str,
    documentation: &'static str,
    arguments: Rc<ArgumentsDefinition>,
    func: NativeFn,
) {
    let method = Object::new(Data::Native(NativeMethod {
        name,
        documentation,
        arguments,
        func,
    }));
    method.single_mimics(&rt.native_method);
    method.set_activatable(true);
    method.set_documentation(Some(documentation.to_string()));
    target.register_cell(name, method);
}

/// The compiled parameter list of a native method object.
pub fn definition_of(method: &Object) -> Rc<ArgumentsDefinition> {
    match &method.state().data {
        Data::Native(native) => native.arguments.clone(),
        _ => panic!("expected a native method object"),
    }
}

// --- receiver and argument extraction -------------------------------------

pub fn expect_number(
    rt: &mut Runtime,
    ctx: &Object,
    msg: &Object,
    object: &Object,
) -> Result<BigInt, Return> {
    let value = match &object.state().data {
        Data::Number(value) => Some(value.clone()),
        _ => None,
    };
    value.ok_or_else(|| interpreter::signal_incorrect_type(rt, ctx, msg, object, "Number"))
}

pub fn expect_text(
    rt: &mut Runtime,
    ctx: &Object,
    msg: &Object,
    object: &Object,
) -> Result<String, Return> {
    let value = match &object.state().data {
        Data::Text(value) => Some(value.clone()),
        _ => None,
    };
    value.ok_or_else(|| interpreter::signal_incorrect_type(rt, ctx, msg, object, "Text"))
}

/// A cell or restart name: a symbol or a text.
pub fn expect_name(
    rt: &mut Runtime,
    ctx: &Object,
    msg: &Object,
    object: &Object,
) -> Result<String, Return> {
    let value = match &object.state().data {
        Data::Symbol(value) | Data::Text(value) => Some(value.clone()),
        _ => None,
    };
    value.ok_or_else(|| interpreter::signal_incorrect_type(rt, ctx, msg, object, "Symbol"))
}

pub fn expect_list(
    rt: &mut Runtime,
    ctx: &Object,
    msg: &Object,
    object: &Object,
) -> Result<Vec<Object>, Return> {
    let value = match &object.state().data {
        Data::List(values) => Some(values.clone()),
        _ => None,
    };
    value.ok_or_else(|| interpreter::signal_incorrect_type(rt, ctx, msg, object, "List"))
}

/// Whether two objects are the same value: identity, except for numbers,
/// texts and symbols, which compare by content.
pub fn objects_equal(lhs: &Object, rhs: &Object) -> bool {
    if lhs == rhs {
        return true;
    }
    match (&lhs.state().data, &rhs.state().data) {
        (Data::Number(a), Data::Number(b)) => a == b,
        (Data::Text(a), Data::Text(b)) => a == b,
        (Data::Symbol(a), Data::Symbol(b)) => a == b,
        _ => false,
    }
}
