use crate::arguments::ArgumentsDefinition;
use crate::fetch;
use crate::interpreter::{Return, Unwind};
use crate::numeric;
use crate::object::Object;
use crate::primitives::{self, expect_text};
use crate::runtime::Runtime;

/// Natives on `Text`.
pub fn install(rt: &mut Runtime) {
    let text = rt.text.clone();

    primitives::native(
        rt,
        &text,
        "asNumber",
        "parses the receiver as a number; an unparseable text signals a condition restartable with useValue(number) or takeLongest",
        ArgumentsDefinition::empty(),
        as_number,
    );
    primitives::native(
        rt,
        &text,
        "+",
        "returns the concatenation of the receiver and the argument",
        ArgumentsDefinition::builder().required("other").build(),
        concat,
    );
    primitives::native(
        rt,
        &text,
        "length",
        "returns the number of characters in the receiver",
        ArgumentsDefinition::empty(),
        length,
    );
    primitives::native(
        rt,
        &text,
        "asSymbol",
        "returns a symbol with the receiver as its name",
        ArgumentsDefinition::empty(),
        as_symbol,
    );
}

/// Parse the receiver, signalling `NotParseable` with two recovery
/// strategies: `useValue(number)` substitutes a result outright, and
/// `takeLongest` settles for the longest parseable prefix.
fn as_number(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let value = fetch!(expect_text(rt, ctx, msg, on));
    if let Ok(number) = numeric::parse(&value) {
        return Return::Local(rt.new_number(number));
    }
    let condition = rt.new_condition(
        &["Error", "Arithmetic", "NotParseable"],
        ctx,
        Some(msg),
        Some(on),
        &format!("couldn't parse '{}' as a number", value),
    );
    let token = rt.push_restarts(&["useValue", "takeLongest"]);
    let result = rt.error_condition(condition, ctx);
    rt.pop_restarts(token);
    match result {
        Return::Unwind(Unwind::Restart {
            token: unwound,
            name,
            mut arguments,
        }) if unwound == token => {
            if name == "useValue" {
                let replacement = if arguments.is_empty() {
                    rt.nil()
                } else {
                    arguments.remove(0)
                };
                let number = fetch!(primitives::expect_number(rt, ctx, msg, &replacement));
                return Return::Local(rt.new_number(number));
            }
            match numeric::parse_longest(&value) {
                Ok(number) => Return::Local(rt.new_number(number)),
                Err(_) => {
                    let condition = rt.new_condition(
                        &["Error", "Arithmetic", "NotParseable"],
                        ctx,
                        Some(msg),
                        Some(on),
                        &format!("'{}' has no parseable prefix", value),
                    );
                    rt.error_condition(condition, ctx)
                }
            }
        }
        other => other,
    }
}

fn concat(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let lhs = fetch!(expect_text(rt, ctx, msg, on));
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    let rhs = fetch!(expect_text(rt, ctx, msg, &args[0]));
    Return::Local(rt.new_text(&format!("{}{}", lhs, rhs)))
}

fn length(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let value = fetch!(expect_text(rt, ctx, msg, on));
    Return::Local(rt.new_number(value.chars().count().into()))
}

fn as_symbol(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let value = fetch!(expect_text(rt, ctx, msg, on));
    Return::Local(rt.new_symbol(&value))
}
