use crate::arguments::ArgumentsDefinition;
use crate::context;
use crate::data::{BlockState, CodeState, Data};
use crate::fetch;
use crate::foreign;
use crate::interpreter::{self, Return};
use crate::message;
use crate::object::Object;
use crate::primitives::{self, expect_name};
use crate::propagate;
use crate::runtime::Runtime;

/// Natives on `DefaultBehavior`: the definition forms, control flow,
/// grouping, collection literals and the foreign bridge entry points.
pub fn install(rt: &mut Runtime) {
    let behavior = rt.default_behavior.clone();

    primitives::native(
        rt,
        &behavior,
        "method",
        "creates a method from an optional documentation text, parameter declarations and a body",
        ArgumentsDefinition::builder().rest_unevaluated("declaration").build(),
        method,
    );
    primitives::native(
        rt,
        &behavior,
        "macro",
        "creates a macro from an optional documentation text and a body; the body reaches its unevaluated arguments through 'call'",
        ArgumentsDefinition::builder().rest_unevaluated("declaration").build(),
        macro_,
    );
    primitives::native(
        rt,
        &behavior,
        "syntax",
        "creates a syntax macro from an optional documentation text and a body; its result replaces the activating message in the chain",
        ArgumentsDefinition::builder().rest_unevaluated("declaration").build(),
        syntax,
    );
    primitives::native(
        rt,
        &behavior,
        "fn",
        "creates a lexical block closing over the current context",
        ArgumentsDefinition::builder().rest_unevaluated("declaration").build(),
        fn_,
    );
    primitives::native(
        rt,
        &behavior,
        "if",
        "evaluates the condition, then the second argument if it was true, otherwise the third",
        ArgumentsDefinition::builder()
            .required_unevaluated("condition")
            .optional("then", None)
            .optional("else", None)
            .build(),
        if_,
    );
    primitives::native(
        rt,
        &behavior,
        "while",
        "evaluates the body arguments for as long as the condition stays true",
        ArgumentsDefinition::builder()
            .required_unevaluated("condition")
            .rest_unevaluated("body")
            .build(),
        while_,
    );
    primitives::native(
        rt,
        &behavior,
        "loop",
        "evaluates the body arguments until something breaks out",
        ArgumentsDefinition::builder().rest_unevaluated("body").build(),
        loop_,
    );
    primitives::native(
        rt,
        &behavior,
        "break",
        "breaks out of the nearest iteration, with an optional value",
        ArgumentsDefinition::builder().optional("value", None).build(),
        break_,
    );
    primitives::native(
        rt,
        &behavior,
        "continue",
        "skips to the next round of the nearest iteration",
        ArgumentsDefinition::empty(),
        continue_,
    );
    primitives::native(
        rt,
        &behavior,
        "return",
        "returns from the nearest enclosing method activation, with an optional value",
        ArgumentsDefinition::builder().optional("value", None).build(),
        return_,
    );
    primitives::native(
        rt,
        &behavior,
        "tuple",
        "creates a tuple of its evaluated arguments",
        ArgumentsDefinition::builder().rest("values").build(),
        tuple,
    );
    primitives::native(
        rt,
        &behavior,
        "list",
        "creates a list of its evaluated arguments",
        ArgumentsDefinition::builder().rest("values").build(),
        list,
    );
    primitives::native(
        rt,
        &behavior,
        "println",
        "prints its evaluated arguments, each on its own line",
        ArgumentsDefinition::builder().rest("values").build(),
        println_,
    );
    primitives::native(
        rt,
        &behavior,
        "",
        "evaluates its arguments one at a time and returns the last result; this is what a parenthesized group activates",
        ArgumentsDefinition::builder().rest_unevaluated("expressions").build(),
        group,
    );
    primitives::native(
        rt,
        &behavior,
        "-",
        "negates its single argument, for a minus at the start of an expression",
        ArgumentsDefinition::builder().required("value").build(),
        negate,
    );
    primitives::native(
        rt,
        &behavior,
        "foreign",
        "invokes a named callable on the installed foreign bridge, passing the remaining arguments over the boundary",
        ArgumentsDefinition::builder().required("name").rest("values").build(),
        foreign_invoke,
    );
    primitives::native(
        rt,
        &behavior,
        "foreignNames",
        "returns the names the installed foreign bridge exposes",
        ArgumentsDefinition::empty(),
        foreign_names,
    );
}

/// A chain that is exactly one text literal, for leading documentation.
fn lone_text_literal(chain: &Object) -> Option<String> {
    if message::next(chain).is_some() {
        return None;
    }
    let cached = message::cached(chain)?;
    let text = match &cached.state().data {
        Data::Text(text) => Some(text.clone()),
        _ => None,
    };
    text
}

/// Split a definition form's arguments into documentation, parameter
/// declarations and body.
fn split_declaration(rt: &Runtime, msg: &Object) -> (Option<String>, Vec<Object>, Object) {
    let mut args = message::args(msg);
    let mut documentation = None;
    if args.len() > 1 {
        if let Some(text) = lone_text_literal(&args[0]) {
            documentation = Some(text);
            args.remove(0);
        }
    }
    let nil = rt.nil();
    let code = args.pop().unwrap_or_else(|| message::wrap(rt, &nil));
    (documentation, args, code)
}

fn method(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    let (documentation, specs, code) = split_declaration(rt, msg);
    let arguments = match ArgumentsDefinition::from_messages(rt, ctx, msg, &specs) {
        Ok(arguments) => arguments,
        Err(flow) => return flow,
    };
    let method = Object::new(Data::Method(CodeState {
        name: None,
        context: ctx.clone(),
        code: Some(code),
        arguments,
    }));
    method.single_mimics(&rt.method);
    method.set_activatable(true);
    method.set_documentation(documentation);
    Return::Local(method)
}

fn macro_(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    let (documentation, specs, code) = split_declaration(rt, msg);
    if !specs.is_empty() {
        return interpreter::signal_argument_count(
            rt,
            ctx,
            msg,
            "a macro declares no parameters; its arguments arrive through 'call'",
        );
    }
    let created = Object::new(Data::Macro(CodeState {
        name: None,
        context: ctx.clone(),
        code: Some(code),
        arguments: ArgumentsDefinition::empty(),
    }));
    created.single_mimics(&rt.default_macro);
    created.set_activatable(true);
    created.set_documentation(documentation);
    Return::Local(created)
}

fn syntax(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    let (documentation, specs, code) = split_declaration(rt, msg);
    if !specs.is_empty() {
        return interpreter::signal_argument_count(
            rt,
            ctx,
            msg,
            "a syntax macro declares no parameters; its arguments arrive through 'call'",
        );
    }
    let created = Object::new(Data::Syntax(CodeState {
        name: None,
        context: ctx.clone(),
        code: Some(code),
        arguments: ArgumentsDefinition::empty(),
    }));
    created.single_mimics(&rt.syntax);
    created.set_activatable(true);
    created.set_documentation(documentation);
    Return::Local(created)
}

fn fn_(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    let (documentation, specs, code) = split_declaration(rt, msg);
    let arguments = match ArgumentsDefinition::from_messages(rt, ctx, msg, &specs) {
        Ok(arguments) => arguments,
        Err(flow) => return flow,
    };
    let block = Object::new(Data::Block(BlockState {
        context: ctx.clone(),
        code,
        arguments,
    }));
    block.single_mimics(&rt.lexical_block);
    block.set_documentation(documentation);
    Return::Local(block)
}

fn if_(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    let args = message::args(msg);
    if args.is_empty() {
        return interpreter::signal_argument_count(rt, ctx, msg, "'if' takes a condition");
    }
    let condition = propagate!(interpreter::evaluate(rt, &args[0], ctx, ctx));
    if condition.is_truthy() {
        match args.get(1) {
            Some(then) => interpreter::evaluate(rt, then, ctx, ctx),
            None => Return::Local(condition),
        }
    } else {
        match args.get(2) {
            Some(otherwise) => interpreter::evaluate(rt, otherwise, ctx, ctx),
            None => Return::Local(rt.nil()),
        }
    }
}

fn while_(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    let args = message::args(msg);
    if args.is_empty() {
        return interpreter::signal_argument_count(rt, ctx, msg, "'while' takes a condition");
    }
    'rounds: loop {
        let condition = propagate!(interpreter::evaluate(rt, &args[0], ctx, ctx));
        if !condition.is_truthy() {
            return Return::Local(rt.nil());
        }
        for body in &args[1..] {
            match interpreter::evaluate(rt, body, ctx, ctx) {
                Return::Local(_) => {}
                Return::Break(value) => return Return::Local(value),
                Return::Continue => continue 'rounds,
                other => return other,
            }
        }
    }
}

fn loop_(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    let args = message::args(msg);
    'rounds: loop {
        for body in &args {
            match interpreter::evaluate(rt, body, ctx, ctx) {
                Return::Local(_) => {}
                Return::Break(value) => return Return::Local(value),
                Return::Continue => continue 'rounds,
                other => return other,
            }
        }
    }
}

fn break_(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    let value = fetch!(interpreter::evaluated_arg(rt, msg, ctx, 0));
    Return::Break(value)
}

fn continue_(_rt: &mut Runtime, _m: &Object, _ctx: &Object, _msg: &Object, _on: &Object) -> Return {
    Return::Continue
}

fn return_(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    let value = fetch!(interpreter::evaluated_arg(rt, msg, ctx, 0));
    Return::NonLocal {
        scope: context::method_scope(ctx),
        value,
    }
}

fn tuple(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    let values = fetch!(interpreter::evaluated_args(rt, msg, ctx));
    Return::Local(rt.new_tuple(values))
}

fn list(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    let values = fetch!(interpreter::evaluated_args(rt, msg, ctx));
    Return::Local(rt.new_list(values))
}

fn println_(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    let values = fetch!(interpreter::evaluated_args(rt, msg, ctx));
    if values.is_empty() {
        println!();
    }
    for value in values {
        println!("{}", value.display_string());
    }
    Return::Local(rt.nil())
}

fn group(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    let mut last = rt.nil();
    for arg in message::args(msg) {
        last = propagate!(interpreter::evaluate(rt, &arg, ctx, ctx));
    }
    Return::Local(last)
}

fn negate(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    let value = fetch!(primitives::expect_number(rt, ctx, msg, &args[0]));
    Return::Local(rt.new_number(-value))
}

fn foreign_invoke(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    let name = fetch!(expect_name(rt, ctx, msg, &args[0]));
    let mut converted = Vec::with_capacity(args.len() - 1);
    for arg in &args[1..] {
        match foreign::from_object(rt, arg) {
            Some(value) => converted.push(value),
            None => {
                return interpreter::signal_incorrect_type(
                    rt,
                    ctx,
                    msg,
                    arg,
                    "value representable over the foreign bridge",
                )
            }
        }
    }
    let mut bridge = match rt.take_bridge() {
        Some(bridge) => bridge,
        None => return signal_native_exception(rt, ctx, msg, "no foreign bridge installed"),
    };
    let result = bridge.invoke(&name, converted);
    rt.restore_bridge(Some(bridge));
    match result {
        Ok(value) => Return::Local(foreign::to_object(rt, value)),
        Err(error) => signal_native_exception(rt, ctx, msg, &error.to_string()),
    }
}

fn foreign_names(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    let bridge = match rt.take_bridge() {
        Some(bridge) => bridge,
        None => return signal_native_exception(rt, ctx, msg, "no foreign bridge installed"),
    };
    let names: Vec<Object> = bridge
        .descriptors()
        .into_iter()
        .map(|descriptor| rt.new_text(&descriptor.name))
        .collect();
    rt.restore_bridge(Some(bridge));
    Return::Local(rt.new_list(names))
}

fn signal_native_exception(rt: &mut Runtime, ctx: &Object, msg: &Object, text: &str) -> Return {
    let condition = rt.new_condition(&["Error", "NativeException"], ctx, Some(msg), None, text);
    rt.error_condition(condition, ctx)
}
