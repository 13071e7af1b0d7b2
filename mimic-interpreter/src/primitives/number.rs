use num_bigint::BigInt;

use crate::arguments::ArgumentsDefinition;
use crate::fetch;
use crate::interpreter::{Return, Unwind};
use crate::numeric::{self, NumericError};
use crate::object::Object;
use crate::primitives::{self, expect_number};
use crate::runtime::Runtime;

/// Arithmetic, comparison and bitwise natives on `Number`.
pub fn install(rt: &mut Runtime) {
    let number = rt.number.clone();

    binary(rt, &number, "+", "adds the argument to the receiver", add);
    binary(rt, &number, "-", "subtracts the argument from the receiver", sub);
    binary(rt, &number, "*", "multiplies the receiver by the argument", mul);
    binary(
        rt,
        &number,
        "/",
        "divides the receiver by the argument, truncating toward zero; division by zero signals a condition restartable with useValue(divisor)",
        div,
    );
    binary(
        rt,
        &number,
        "%",
        "the remainder of dividing the receiver by the argument; division by zero signals a condition restartable with useValue(divisor)",
        rem,
    );
    binary(rt, &number, "**", "raises the receiver to the argument's power", pow);
    binary(rt, &number, "==", "returns true if the argument is the same number", eq);
    binary(rt, &number, "!=", "returns true if the argument is a different number", ne);
    binary(rt, &number, "<", "returns true if the receiver is smaller than the argument", lt);
    binary(rt, &number, ">", "returns true if the receiver is greater than the argument", gt);
    binary(rt, &number, "<=", "returns true if the receiver is not greater than the argument", le);
    binary(rt, &number, ">=", "returns true if the receiver is not smaller than the argument", ge);
    binary(rt, &number, "&", "bitwise and of the receiver and the argument", bitand);
    binary(rt, &number, "|", "bitwise or of the receiver and the argument", bitor);
    binary(rt, &number, "^", "bitwise xor of the receiver and the argument", bitxor);

    primitives::native(
        rt,
        &number,
        "asText",
        "returns the decimal rendition of the receiver",
        ArgumentsDefinition::empty(),
        as_text,
    );
    primitives::native(
        rt,
        &number,
        "negation",
        "returns the receiver with its sign flipped",
        ArgumentsDefinition::empty(),
        negation,
    );
}

fn binary(
    rt: &mut Runtime,
    target: &Object,
    name: &'static str,
    doc: &'static str,
    func: primitives::NativeFn,
) {
    primitives::native(
        rt,
        target,
        name,
        doc,
        ArgumentsDefinition::builder().required("other").build(),
        func,
    );
}

fn operands(
    rt: &mut Runtime,
    m: &Object,
    ctx: &Object,
    msg: &Object,
    on: &Object,
) -> Result<(BigInt, BigInt), Return> {
    let lhs = expect_number(rt, ctx, msg, on)?;
    let (args, _) = primitives::definition_of(m).collect(rt, ctx, msg)?;
    let rhs = expect_number(rt, ctx, msg, &args[0])?;
    Ok((lhs, rhs))
}

fn add(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (lhs, rhs) = fetch!(operands(rt, m, ctx, msg, on));
    Return::Local(rt.new_number(lhs + rhs))
}

fn sub(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (lhs, rhs) = fetch!(operands(rt, m, ctx, msg, on));
    Return::Local(rt.new_number(lhs - rhs))
}

fn mul(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (lhs, rhs) = fetch!(operands(rt, m, ctx, msg, on));
    Return::Local(rt.new_number(lhs * rhs))
}

/// Run a division-like operation, signalling `DivisionByZero` on a zero
/// divisor. The signal is restartable with `useValue(divisor)`: invoking it
/// retries the operation with the replacement divisor.
fn dividing(
    rt: &mut Runtime,
    ctx: &Object,
    msg: &Object,
    lhs: BigInt,
    rhs: BigInt,
    op: fn(&BigInt, &BigInt) -> Result<BigInt, NumericError>,
) -> Return {
    let mut divisor = rhs;
    loop {
        match op(&lhs, &divisor) {
            Ok(value) => return Return::Local(rt.new_number(value)),
            Err(_) => {
                let condition = rt.new_condition(
                    &["Error", "Arithmetic", "DivisionByZero"],
                    ctx,
                    Some(msg),
                    None,
                    &format!("tried to divide {} by zero", lhs),
                );
                let token = rt.push_restarts(&["useValue"]);
                let result = rt.error_condition(condition, ctx);
                rt.pop_restarts(token);
                match result {
                    Return::Unwind(Unwind::Restart {
                        token: unwound,
                        mut arguments,
                        ..
                    }) if unwound == token => {
                        let replacement = if arguments.is_empty() {
                            rt.nil()
                        } else {
                            arguments.remove(0)
                        };
                        divisor = fetch!(expect_number(rt, ctx, msg, &replacement));
                    }
                    other => return other,
                }
            }
        }
    }
}

fn div(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (lhs, rhs) = fetch!(operands(rt, m, ctx, msg, on));
    dividing(rt, ctx, msg, lhs, rhs, numeric::div)
}

fn rem(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (lhs, rhs) = fetch!(operands(rt, m, ctx, msg, on));
    dividing(rt, ctx, msg, lhs, rhs, numeric::rem)
}

fn pow(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (lhs, rhs) = fetch!(operands(rt, m, ctx, msg, on));
    match numeric::pow(&lhs, &rhs) {
        Ok(value) => Return::Local(rt.new_number(value)),
        Err(NumericError::DivisionByZero) => dividing(rt, ctx, msg, lhs, rhs, numeric::pow),
        Err(_) => {
            let condition = rt.new_condition(
                &["Error", "Arithmetic"],
                ctx,
                Some(msg),
                None,
                &format!("exponent {} is out of range", rhs),
            );
            rt.error_condition(condition, ctx)
        }
    }
}

fn eq(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (lhs, rhs) = fetch!(operands(rt, m, ctx, msg, on));
    Return::Local(rt.truth(lhs == rhs))
}

fn ne(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (lhs, rhs) = fetch!(operands(rt, m, ctx, msg, on));
    Return::Local(rt.truth(lhs != rhs))
}

fn lt(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (lhs, rhs) = fetch!(operands(rt, m, ctx, msg, on));
    Return::Local(rt.truth(lhs < rhs))
}

fn gt(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (lhs, rhs) = fetch!(operands(rt, m, ctx, msg, on));
    Return::Local(rt.truth(lhs > rhs))
}

fn le(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (lhs, rhs) = fetch!(operands(rt, m, ctx, msg, on));
    Return::Local(rt.truth(lhs <= rhs))
}

fn ge(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (lhs, rhs) = fetch!(operands(rt, m, ctx, msg, on));
    Return::Local(rt.truth(lhs >= rhs))
}

fn bitand(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (lhs, rhs) = fetch!(operands(rt, m, ctx, msg, on));
    Return::Local(rt.new_number(lhs & rhs))
}

fn bitor(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (lhs, rhs) = fetch!(operands(rt, m, ctx, msg, on));
    Return::Local(rt.new_number(lhs | rhs))
}

fn bitxor(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (lhs, rhs) = fetch!(operands(rt, m, ctx, msg, on));
    Return::Local(rt.new_number(lhs ^ rhs))
}

fn as_text(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let value = fetch!(expect_number(rt, ctx, msg, on));
    Return::Local(rt.new_text(&value.to_string()))
}

fn negation(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let value = fetch!(expect_number(rt, ctx, msg, on));
    Return::Local(rt.new_number(-value))
}
