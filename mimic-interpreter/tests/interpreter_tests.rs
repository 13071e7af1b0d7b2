use mimic_interpreter::object::Object;
use mimic_interpreter::runtime::{EvalError, Runtime};

fn setup() -> (Runtime, Object) {
    let rt = Runtime::new();
    let ctx = rt.ground_context();
    (rt, ctx)
}

fn eval(rt: &mut Runtime, ctx: &Object, source: &str) -> Object {
    match rt.evaluate_source(source, ctx) {
        Ok(value) => value,
        Err(error) => panic!("evaluation of '{}' failed: {}", source, error),
    }
}

fn eval_display(rt: &mut Runtime, ctx: &Object, source: &str) -> String {
    eval(rt, ctx, source).display_string()
}

fn eval_report(rt: &mut Runtime, ctx: &Object, source: &str) -> String {
    match rt.evaluate_source(source, ctx) {
        Ok(value) => panic!(
            "evaluation of '{}' unexpectedly succeeded with {}",
            source,
            value.display_string()
        ),
        Err(EvalError::Unhandled(report)) => report,
        Err(error) => panic!("evaluation of '{}' failed in the wrong way: {}", source, error),
    }
}

#[test]
fn literals_and_operator_chains_test() {
    let (mut rt, ctx) = setup();

    assert_eq!(eval_display(&mut rt, &ctx, "42"), "42");
    assert_eq!(eval_display(&mut rt, &ctx, "\"hello\""), "hello");
    assert_eq!(eval_display(&mut rt, &ctx, ":useValue"), ":useValue");
    assert_eq!(eval_display(&mut rt, &ctx, "40 + 2"), "42");
    // No precedence: strictly left to right.
    assert_eq!(eval_display(&mut rt, &ctx, "2 + 3 * 4"), "20");
    assert_eq!(eval_display(&mut rt, &ctx, "2 + (3 * 4)"), "14");
    assert_eq!(eval_display(&mut rt, &ctx, "7 % 3"), "1");
    assert_eq!(eval_display(&mut rt, &ctx, "2 ** 10"), "1024");
    assert_eq!(eval_display(&mut rt, &ctx, "6 & 3"), "2");
    assert_eq!(eval_display(&mut rt, &ctx, "5 negation"), "-5");
}

#[test]
fn terminator_resets_receiver_test() {
    let (mut rt, ctx) = setup();

    assert_eq!(eval_display(&mut rt, &ctx, "1 + 1. 5"), "5");
    assert_eq!(eval_display(&mut rt, &ctx, "1 + 1\n5 + 5"), "10");
}

#[test]
fn assignment_and_lookup_test() {
    let (mut rt, ctx) = setup();

    assert_eq!(eval_display(&mut rt, &ctx, "x = 3. x + 4"), "7");
    // Top-level assignments land on the ground, visible from method bodies.
    eval(&mut rt, &ctx, "base = 100");
    assert_eq!(
        eval_display(&mut rt, &ctx, "f = method(n, base + n). f(5)"),
        "105"
    );
}

#[test]
fn kind_inference_test() {
    let (mut rt, ctx) = setup();

    assert_eq!(eval_display(&mut rt, &ctx, "Foo = Origin mimic. Foo kind"), "Foo");
    assert_eq!(
        eval_display(&mut rt, &ctx, "Pet = Origin mimic. Pet Dog = Pet mimic. Pet Dog kind"),
        "Pet Dog"
    );
    // Lowercase names never name a kind.
    assert_eq!(eval_display(&mut rt, &ctx, "thing = Origin mimic. thing kind"), "Origin");
    assert!(eval(&mut rt, &ctx, "Pet Dog kind?(\"Pet\")").is_truthy());
    assert!(!eval(&mut rt, &ctx, "Pet kind?(\"Number\")").is_truthy());
}

#[test]
fn method_definition_and_activation_test() {
    let (mut rt, ctx) = setup();

    assert_eq!(
        eval_display(&mut rt, &ctx, "double = method(x, x * 2). double(21)"),
        "42"
    );
    assert_eq!(
        eval_display(
            &mut rt,
            &ctx,
            "Counter = Origin mimic. Counter value = 10. Counter bump = method(n, Counter value = Counter value + n). Counter bump(5). Counter value",
        ),
        "15"
    );
    // `self` names the receiver inside a method body.
    assert_eq!(
        eval_display(
            &mut rt,
            &ctx,
            "Box = Origin mimic. Box content = 7. Box peek = method(self content + 1). Box peek",
        ),
        "8"
    );
}

#[test]
fn method_parameters_test() {
    let (mut rt, ctx) = setup();

    // Optional parameter with a default chain.
    eval(&mut rt, &ctx, "greet = method(name, punct \"!\", name + punct)");
    assert_eq!(eval_display(&mut rt, &ctx, "greet(\"hi\")"), "hi!");
    assert_eq!(eval_display(&mut rt, &ctx, "greet(\"hi\", \"?\")"), "hi?");

    // Keyword parameter.
    eval(&mut rt, &ctx, "f = method(a, b: 2, a + b)");
    assert_eq!(eval_display(&mut rt, &ctx, "f(1)"), "3");
    assert_eq!(eval_display(&mut rt, &ctx, "f(1, b: 10)"), "11");

    // Rest and keyword rest.
    assert_eq!(
        eval_display(&mut rt, &ctx, "g = method(+rest, rest length). g(1, 2, 3)"),
        "3"
    );
    assert_eq!(
        eval_display(&mut rt, &ctx, "h = method(+:opts, opts length). h(a: 1, b: 2)"),
        "2"
    );
}

#[test]
fn defaults_evaluate_in_calling_context_test() {
    let (mut rt, ctx) = setup();

    eval(&mut rt, &ctx, "y = 10. f = method(a y, a)");
    assert_eq!(eval_display(&mut rt, &ctx, "f"), "10");
    assert_eq!(eval_display(&mut rt, &ctx, "y = 20. f"), "20");
}

#[test]
fn argument_count_mismatch_test() {
    let (mut rt, ctx) = setup();

    eval(&mut rt, &ctx, "f = method(a, a)");
    let report = eval_report(&mut rt, &ctx, "f(1, 2)");
    assert!(report.contains("ArgumentCount"), "unexpected report: {}", report);

    let report = eval_report(&mut rt, &ctx, "f");
    assert!(report.contains("ArgumentCount"), "unexpected report: {}", report);

    let report = eval_report(&mut rt, &ctx, "f(1, b: 2)");
    assert!(report.contains("ArgumentCount"), "unexpected report: {}", report);
    assert!(report.contains("unknown keyword"), "unexpected report: {}", report);
}

#[test]
fn call_reflection_test() {
    let (mut rt, ctx) = setup();

    // The fast argument path caches evaluated positionals on the call.
    assert_eq!(
        eval_display(&mut rt, &ctx, "f = method(a, b, call arguments first). f(42, 9)"),
        "42"
    );
    assert_eq!(
        eval_display(&mut rt, &ctx, "g = method(call receiver kind). g"),
        "Ground"
    );
}

#[test]
fn control_flow_test() {
    let (mut rt, ctx) = setup();

    assert_eq!(eval_display(&mut rt, &ctx, "if(true, 1, 2)"), "1");
    assert_eq!(eval_display(&mut rt, &ctx, "if(false, 1, 2)"), "2");
    assert_eq!(eval_display(&mut rt, &ctx, "if(1 < 2, \"yes\", \"no\")"), "yes");
    // nil is falsy, everything else is truthy.
    assert_eq!(eval_display(&mut rt, &ctx, "if(nil, 1, 2)"), "2");
    assert_eq!(eval_display(&mut rt, &ctx, "if(0, 1, 2)"), "1");

    assert_eq!(
        eval_display(&mut rt, &ctx, "i = 0. while(i < 5, i = i + 1). i"),
        "5"
    );
    assert_eq!(eval_display(&mut rt, &ctx, "r = while(true, break(7)). r"), "7");
    assert_eq!(
        eval_display(
            &mut rt,
            &ctx,
            "i = 0. total = 0. loop(i = i + 1. if(i > 5, break(total)). if(i == 2, continue). total = total + i)",
        ),
        "13"
    );
}

#[test]
fn lexical_blocks_test() {
    let (mut rt, ctx) = setup();

    assert_eq!(eval_display(&mut rt, &ctx, "x = 10. f = fn(x + 1). f call"), "11");
    assert_eq!(
        eval_display(&mut rt, &ctx, "add = fn(a, b, a + b). add call(1, 2)"),
        "3"
    );
    // Blocks do not rebind self; a method-created block still sees the
    // method's locals.
    assert_eq!(
        eval_display(
            &mut rt,
            &ctx,
            "m = method(local = 5. inner = fn(local * 2). inner call). m",
        ),
        "10"
    );
}

#[test]
fn non_local_return_test() {
    let (mut rt, ctx) = setup();

    assert_eq!(
        eval_display(&mut rt, &ctx, "f = method(g = fn(return(5)). g call. 10). f"),
        "5"
    );
    assert_eq!(eval_display(&mut rt, &ctx, "h = method(return(1). 2). h"), "1");
    // A stray return escapes the top level as control flow, not a value.
    let error = rt.evaluate_source("return(1)", &ctx).unwrap_err();
    assert!(matches!(error, EvalError::StrayControlFlow(_)));
}

#[test]
fn macro_activation_test() {
    let (mut rt, ctx) = setup();

    assert_eq!(eval_display(&mut rt, &ctx, "m = macro(call message name). m"), ":m");
    assert_eq!(
        eval_display(&mut rt, &ctx, "n = macro(call arguments length). n(1, 2, 3)"),
        "3"
    );
    // Macro arguments stay unevaluated until the body asks for them.
    assert_eq!(
        eval_display(
            &mut rt,
            &ctx,
            "touched = 0. quiet = macro(nil). quiet(touched = 99). touched",
        ),
        "0"
    );
    let report = eval_report(&mut rt, &ctx, "bad = macro(x, x)");
    assert!(report.contains("ArgumentCount"), "unexpected report: {}", report);
}

#[test]
fn syntax_expansion_test() {
    let (mut rt, ctx) = setup();

    // A value expansion replaces the activating message and re-sends it.
    assert_eq!(eval_display(&mut rt, &ctx, "answer = syntax(42). answer + 1"), "43");
    // A message expansion is spliced in as is.
    assert_eq!(
        eval_display(
            &mut rt,
            &ctx,
            "pass = syntax(call message arguments first). pass(5 + 5) + 1",
        ),
        "11"
    );
}

#[test]
fn syntax_nil_expansion_removes_node_test() {
    let (mut rt, ctx) = setup();

    eval(&mut rt, &ctx, "nothing = syntax(nil)");
    // Mid-chain: the node disappears, the receiver carries through.
    assert_eq!(eval_display(&mut rt, &ctx, "10 nothing + 1"), "11");
    // Head of a statement: the rest of the chain still evaluates.
    assert_eq!(eval_display(&mut rt, &ctx, "1 + 1. nothing. 42"), "42");
}

#[test]
fn destructuring_test() {
    let (mut rt, ctx) = setup();

    assert_eq!(eval_display(&mut rt, &ctx, "(a, b) = tuple(1, 2). a + b"), "3");
    assert_eq!(
        eval_display(&mut rt, &ctx, "(c, d, e) = list(1, 2, 3). c + d + e"),
        "6"
    );
    // Nested groups destructure their element in turn.
    assert_eq!(
        eval_display(&mut rt, &ctx, "(f, (g, h)) = tuple(1, tuple(2, 3)). f + g + h"),
        "6"
    );
    // `_` skips one element; a trailing `_` absorbs any excess.
    assert_eq!(eval_display(&mut rt, &ctx, "(i, _, k) = tuple(1, 2, 3). i + k"), "4");
    assert_eq!(eval_display(&mut rt, &ctx, "(l, _) = tuple(1, 2, 3, 4). l"), "1");

    let report = eval_report(&mut rt, &ctx, "(p, q, r) = tuple(1, 2)");
    assert!(
        report.contains("DestructuringMismatch"),
        "unexpected report: {}",
        report
    );
    let report = eval_report(&mut rt, &ctx, "(p, q) = 5");
    assert!(
        report.contains("DestructuringMismatch"),
        "unexpected report: {}",
        report
    );
}

#[test]
fn setter_rewrite_test() {
    let (mut rt, ctx) = setup();

    assert_eq!(
        eval_display(
            &mut rt,
            &ctx,
            "Counter = Origin mimic. Counter value = 10. Counter cell(:value) = 20. Counter value",
        ),
        "20"
    );
}

#[test]
fn cell_manipulation_test() {
    let (mut rt, ctx) = setup();

    assert_eq!(eval_display(&mut rt, &ctx, "x = 5. cell(:x)"), "5");
    assert!(eval(&mut rt, &ctx, "cell?(:x)").is_truthy());
    assert!(!eval(&mut rt, &ctx, "cell?(:missing)").is_truthy());

    eval(&mut rt, &ctx, "Foo = Origin mimic. Foo a = 1. Foo b = 2");
    assert_eq!(eval_display(&mut rt, &ctx, "Foo cellNames"), "[:a, :b]");
    assert_eq!(eval_display(&mut rt, &ctx, "Foo cells first at(0)"), ":a");

    eval(&mut rt, &ctx, "Foo removeCell!(:a)");
    assert!(!eval(&mut rt, &ctx, "Foo cell?(:a)").is_truthy());
    let report = eval_report(&mut rt, &ctx, "Foo removeCell!(:a)");
    assert!(report.contains("NoSuchCell"), "unexpected report: {}", report);
}

#[test]
fn undefine_cell_masks_inherited_test() {
    let (mut rt, ctx) = setup();

    eval(&mut rt, &ctx, "Foo = Origin mimic. Foo x = 1. Bar = Foo mimic");
    assert_eq!(eval_display(&mut rt, &ctx, "Bar x"), "1");
    eval(&mut rt, &ctx, "Bar undefineCell!(:x)");
    assert!(!eval(&mut rt, &ctx, "Bar cell?(:x)").is_truthy());
    // The prototype keeps its cell.
    assert_eq!(eval_display(&mut rt, &ctx, "Foo x"), "1");
    // Assigning again removes the mask.
    assert_eq!(eval_display(&mut rt, &ctx, "Bar x = 3. Bar x"), "3");
}

#[test]
fn mimic_manipulation_test() {
    let (mut rt, ctx) = setup();

    eval(&mut rt, &ctx, "A = Origin mimic. A x = 1. B = Origin mimic");
    assert!(!eval(&mut rt, &ctx, "B cell?(:x)").is_truthy());
    eval(&mut rt, &ctx, "B mimic!(A)");
    assert_eq!(eval_display(&mut rt, &ctx, "B x"), "1");
    eval(&mut rt, &ctx, "B removeMimic!(A)");
    assert!(!eval(&mut rt, &ctx, "B cell?(:x)").is_truthy());

    let report = eval_report(&mut rt, &ctx, "B removeMimic!(A)");
    assert!(report.contains("NotAMimic"), "unexpected report: {}", report);
    let report = eval_report(&mut rt, &ctx, "nil mimic");
    assert!(report.contains("CantMimicOddball"), "unexpected report: {}", report);
}

#[test]
fn object_equality_test() {
    let (mut rt, ctx) = setup();

    assert!(eval(&mut rt, &ctx, "a = Origin mimic. b = a. a == b").is_truthy());
    assert!(eval(&mut rt, &ctx, "Origin mimic != Origin mimic").is_truthy());
    // Numbers, texts and symbols compare by content.
    assert!(eval(&mut rt, &ctx, "40 + 2 == 42").is_truthy());
    assert!(eval(&mut rt, &ctx, "\"a\" + \"b\" == \"ab\"").is_truthy());
    assert!(eval(&mut rt, &ctx, ":foo == (\"foo\" asSymbol)").is_truthy());
}

#[test]
fn collections_test() {
    let (mut rt, ctx) = setup();

    assert_eq!(eval_display(&mut rt, &ctx, "list(1, 2, 3) at(1)"), "2");
    assert_eq!(eval_display(&mut rt, &ctx, "list(1, 2, 3) at(9)"), "nil");
    assert_eq!(eval_display(&mut rt, &ctx, "l = list(). l << 5. l length"), "1");
    assert_eq!(eval_display(&mut rt, &ctx, "tuple(1, 2) asList length"), "2");
    assert_eq!(eval_display(&mut rt, &ctx, "list(1, 2) asTuple"), "(1, 2)");
}

#[test]
fn text_natives_test() {
    let (mut rt, ctx) = setup();

    assert_eq!(eval_display(&mut rt, &ctx, "\"foo\" + \"bar\""), "foobar");
    assert_eq!(eval_display(&mut rt, &ctx, "\"abc\" length"), "3");
    assert_eq!(eval_display(&mut rt, &ctx, "\"42\" asNumber + 1"), "43");
    assert_eq!(eval_display(&mut rt, &ctx, "7 asText + \"!\""), "7!");
}

#[test]
fn division_by_zero_restart_test() {
    let (mut rt, ctx) = setup();

    let report = eval_report(&mut rt, &ctx, "10 / 0");
    assert!(report.contains("DivisionByZero"), "unexpected report: {}", report);

    // The handler runs at the signal point and retries with the
    // replacement divisor.
    assert_eq!(
        eval_display(
            &mut rt,
            &ctx,
            "bind(handle(fn(c, invokeRestart(:useValue, 1))), 10 / 0)",
        ),
        "10"
    );
    assert_eq!(
        eval_display(
            &mut rt,
            &ctx,
            "bind(handle(fn(c, invokeRestart(:useValue, 4))), 10 % 0)",
        ),
        "2"
    );
}

#[test]
fn unparseable_text_restarts_test() {
    let (mut rt, ctx) = setup();

    let report = eval_report(&mut rt, &ctx, "\"xyz\" asNumber");
    assert!(report.contains("NotParseable"), "unexpected report: {}", report);

    assert_eq!(
        eval_display(
            &mut rt,
            &ctx,
            "bind(handle(fn(c, invokeRestart(:useValue, 0))), \"xyz\" asNumber)",
        ),
        "0"
    );
    assert_eq!(
        eval_display(
            &mut rt,
            &ctx,
            "bind(handle(fn(c, invokeRestart(:takeLongest))), \"42abc\" asNumber)",
        ),
        "42"
    );
}

#[test]
fn no_such_cell_restarts_test() {
    let (mut rt, ctx) = setup();

    let report = eval_report(&mut rt, &ctx, "missing");
    assert!(report.contains("NoSuchCell"), "unexpected report: {}", report);

    // useValue substitutes without storing anything.
    assert_eq!(
        eval_display(
            &mut rt,
            &ctx,
            "bind(handle(fn(c, invokeRestart(:useValue, 3))), missing * 2)",
        ),
        "6"
    );
    assert!(!eval(&mut rt, &ctx, "cell?(:missing)").is_truthy());

    // storeValue also assigns the cell on the receiver.
    assert_eq!(
        eval_display(
            &mut rt,
            &ctx,
            "bind(handle(fn(c, invokeRestart(:storeValue, 7))), absent + 1)",
        ),
        "8"
    );
    assert_eq!(eval_display(&mut rt, &ctx, "absent"), "7");
}

#[test]
fn rescue_unwinds_to_bind_test() {
    let (mut rt, ctx) = setup();

    assert_eq!(
        eval_display(&mut rt, &ctx, "bind(rescue(fn(c, 99)), error!(\"boom\"))"),
        "99"
    );
    assert_eq!(
        eval_display(&mut rt, &ctx, "bind(rescue(fn(c, c text)), error!(\"boom\"))"),
        "boom"
    );
    // A rescue scoped to one condition kind lets others escape.
    assert_eq!(
        eval_display(
            &mut rt,
            &ctx,
            "bind(rescue(Condition Error Arithmetic, fn(c, 1)), 10 / 0)",
        ),
        "1"
    );
    let report = eval_report(
        &mut rt,
        &ctx,
        "bind(rescue(Condition Error Type, fn(c, 1)), 10 / 0)",
    );
    assert!(report.contains("DivisionByZero"), "unexpected report: {}", report);
}

#[test]
fn handler_decline_continues_signalling_test() {
    let (mut rt, ctx) = setup();

    // A handler returning normally declines; the error is still unhandled.
    let report = eval_report(&mut rt, &ctx, "bind(handle(fn(c, nil)), 10 / 0)");
    assert!(report.contains("DivisionByZero"), "unexpected report: {}", report);
}

#[test]
fn signal_without_handler_is_quiet_test() {
    let (mut rt, ctx) = setup();

    // Unhandled non-error signals evaluate to nil and continue.
    assert_eq!(eval_display(&mut rt, &ctx, "signal!(\"meh\"). 42"), "42");
}

#[test]
fn user_restart_runs_at_establishing_bind_test() {
    let (mut rt, ctx) = setup();

    assert_eq!(
        eval_display(
            &mut rt,
            &ctx,
            "bind(restart(:fallback, fn(42)), bind(handle(fn(c, invokeRestart(:fallback))), error!(\"x\")))",
        ),
        "42"
    );
    assert_eq!(
        eval_display(
            &mut rt,
            &ctx,
            "bind(restart(:supply, fn(v, v * 2)), bind(handle(fn(c, invokeRestart(:supply, 21))), error!(\"x\")))",
        ),
        "42"
    );

    let report = eval_report(&mut rt, &ctx, "invokeRestart(:nowhere)");
    assert!(report.contains("NoSuchRestart"), "unexpected report: {}", report);
}

#[test]
fn not_activatable_test() {
    let (mut rt, ctx) = setup();

    // Looking up a plain value short-circuits; arguments stay unevaluated.
    assert_eq!(eval_display(&mut rt, &ctx, "x = 5. x(1)"), "5");
    assert_eq!(
        eval_display(&mut rt, &ctx, "touched = 0. x(touched = 9). touched"),
        "0"
    );
    // The bodiless method prototype itself cannot be activated.
    let report = eval_report(&mut rt, &ctx, "DefaultMethod");
    assert!(report.contains("NotActivatable"), "unexpected report: {}", report);
}

#[test]
fn definition_introspection_test() {
    let (mut rt, ctx) = setup();

    eval(&mut rt, &ctx, "f = method(\"adds one\", x, x + 1)");
    assert_eq!(eval_display(&mut rt, &ctx, "cell(:f) documentation"), "adds one");
    assert_eq!(eval_display(&mut rt, &ctx, "cell(:f) name"), "f");
    assert_eq!(eval_display(&mut rt, &ctx, "g = method(41 + 1). cell(:g) code"), "41 +(1)");
    // The first name sticks.
    assert_eq!(eval_display(&mut rt, &ctx, "h = cell(:f). cell(:h) name"), "f");
}

#[test]
fn message_reflection_test() {
    let (mut rt, ctx) = setup();

    eval(&mut rt, &ctx, "pick = macro(call message arguments first)");
    assert_eq!(eval_display(&mut rt, &ctx, "e = pick(5 + 5). e evaluateOn(Ground)"), "10");
    assert_eq!(eval_display(&mut rt, &ctx, "e code"), "5 +(5)");
    assert_eq!(eval_display(&mut rt, &ctx, "pick(foo bar) name"), ":foo");
    assert_eq!(eval_display(&mut rt, &ctx, "pick(foo bar) next name"), ":bar");
    assert_eq!(eval_display(&mut rt, &ctx, "pick(foo bar) deepCopy next name"), ":bar");
}

#[test]
fn hooks_observe_mutation_test() {
    let (mut rt, ctx) = setup();

    eval(
        &mut rt,
        &ctx,
        "Obs = Origin mimic. Log = Origin mimic. Log names = list(). \
         h = Hook into(Obs). h cellAdded = method(obj, name, Log names << name)",
    );
    eval(&mut rt, &ctx, "Obs x = 5");
    assert_eq!(eval_display(&mut rt, &ctx, "Log names length"), "1");
    assert_eq!(eval_display(&mut rt, &ctx, "Log names first"), ":x");
    // Events without a matching cell on the hook are ignored.
    eval(&mut rt, &ctx, "Obs mimic!(Log)");
    assert_eq!(eval_display(&mut rt, &ctx, "Log names length"), "1");
    assert_eq!(eval_display(&mut rt, &ctx, "h connectedObjects length"), "1");
}

#[test]
fn hook_cell_changed_test() {
    let (mut rt, ctx) = setup();

    eval(
        &mut rt,
        &ctx,
        "Obs = Origin mimic. Obs x = 1. Log = Origin mimic. Log old = nil. \
         h = Hook into(Obs). h cellChanged = method(obj, name, previous, Log old = previous)",
    );
    eval(&mut rt, &ctx, "Obs x = 2");
    assert_eq!(eval_display(&mut rt, &ctx, "Log old"), "1");
}

#[test]
fn oddballs_test() {
    let (mut rt, ctx) = setup();

    assert_eq!(eval_display(&mut rt, &ctx, "nil"), "nil");
    assert_eq!(eval_display(&mut rt, &ctx, "true"), "true");
    assert_eq!(eval_display(&mut rt, &ctx, "false"), "false");
    assert!(eval(&mut rt, &ctx, "nil").is_nil());
    assert!(!eval(&mut rt, &ctx, "false").is_truthy());
    assert!(eval(&mut rt, &ctx, "0").is_truthy());
}

#[test]
fn parse_error_test() {
    let (mut rt, ctx) = setup();

    let error = rt.evaluate_source("f(1, 2", &ctx).unwrap_err();
    assert!(matches!(error, EvalError::Parse(_)));
    let error = rt.evaluate_source("= 5", &ctx).unwrap_err();
    assert!(matches!(error, EvalError::Parse(_)));
}

#[test]
fn inspect_test() {
    let (mut rt, ctx) = setup();

    assert_eq!(eval_display(&mut rt, &ctx, "42 inspect"), "42");
    eval(&mut rt, &ctx, "Foo = Origin mimic. Foo a = 1. Foo b = 2");
    let text = eval_display(&mut rt, &ctx, "Foo inspect");
    assert!(text.starts_with("Foo"), "unexpected inspect text: {}", text);
    assert!(text.ends_with("(a, b)"), "unexpected inspect text: {}", text);
}

#[test]
fn alias_method_test() {
    let (mut rt, ctx) = setup();

    eval(
        &mut rt,
        &ctx,
        "Counter = Origin mimic. Counter value = 10. \
         Counter bump = method(n, Counter value = Counter value + n). \
         Counter aliasMethod!(:bump, :grow)",
    );
    assert_eq!(
        eval_display(&mut rt, &ctx, "Counter grow(5). Counter grow(2). Counter value"),
        "17"
    );
    // The alias delegates activation; it is not a copy of the cell.
    eval(&mut rt, &ctx, "Counter bump = method(n, Counter value = 0)");
    assert_eq!(eval_display(&mut rt, &ctx, "Counter value"), "17");

    let report = eval_report(&mut rt, &ctx, "Counter aliasMethod!(:missing, :gone)");
    assert!(report.contains("NoSuchCell"), "unexpected report: {}", report);
}
