use mimic_interpreter::foreign::{ForeignBridge, ForeignDescriptor, ForeignError, ForeignValue};
use mimic_interpreter::object::Object;
use mimic_interpreter::runtime::{EvalError, Runtime};

struct Calculator;

impl ForeignBridge for Calculator {
    fn descriptors(&self) -> Vec<ForeignDescriptor> {
        vec![ForeignDescriptor {
            name: "add".to_string(),
            arity: 2,
            documentation: "adds two integers".to_string(),
        }]
    }

    fn invoke(
        &mut self,
        name: &str,
        arguments: Vec<ForeignValue>,
    ) -> Result<ForeignValue, ForeignError> {
        match name {
            "add" => {
                if arguments.len() != 2 {
                    return Err(ForeignError::ArgumentMismatch {
                        name: name.to_string(),
                        expected: 2,
                        got: arguments.len(),
                    });
                }
                match (&arguments[0], &arguments[1]) {
                    (ForeignValue::Integer(a), ForeignValue::Integer(b)) => {
                        Ok(ForeignValue::Integer(a + b))
                    }
                    _ => Err(ForeignError::Failed("add expects integers".to_string())),
                }
            }
            _ => Err(ForeignError::NoSuchMethod(name.to_string())),
        }
    }
}

fn setup() -> (Runtime, Object) {
    let mut rt = Runtime::new();
    rt.set_bridge(Box::new(Calculator));
    let ctx = rt.ground_context();
    (rt, ctx)
}

fn eval_display(rt: &mut Runtime, ctx: &Object, source: &str) -> String {
    match rt.evaluate_source(source, ctx) {
        Ok(value) => value.display_string(),
        Err(error) => panic!("evaluation of '{}' failed: {}", source, error),
    }
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
fn invoke_over_bridge_test() {
    let (mut rt, ctx) = setup();

    assert_eq!(eval_display(&mut rt, &ctx, "foreign(:add, 20, 22)"), "42");
}

#[test]
fn bridge_names_test() {
    let (mut rt, ctx) = setup();

    assert_eq!(eval_display(&mut rt, &ctx, "foreignNames"), "[add]");
}

#[test]
fn unknown_foreign_method_test() {
    let (mut rt, ctx) = setup();

    let report = eval_report(&mut rt, &ctx, "foreign(:nope)");
    assert!(report.contains("NativeException"), "unexpected report: {}", report);
    assert!(report.contains("nope"), "unexpected report: {}", report);
}

#[test]
fn arity_mismatch_test() {
    let (mut rt, ctx) = setup();

    let report = eval_report(&mut rt, &ctx, "foreign(:add, 1)");
    assert!(report.contains("NativeException"), "unexpected report: {}", report);
    assert!(report.contains("expects 2 arguments"), "unexpected report: {}", report);
}

#[test]
fn unrepresentable_argument_test() {
    let (mut rt, ctx) = setup();

    let report = eval_report(&mut rt, &ctx, "foreign(:add, list(1), 2)");
    assert!(report.contains("IncorrectType"), "unexpected report: {}", report);
}

#[test]
fn missing_bridge_test() {
    let mut rt = Runtime::new();
    let ctx = rt.ground_context();

    let report = eval_report(&mut rt, &ctx, "foreign(:add, 1, 2)");
    assert!(report.contains("NativeException"), "unexpected report: {}", report);
}

#[test]
fn bridge_failure_is_rescuable_test() {
    let (mut rt, ctx) = setup();

    assert_eq!(
        eval_display(&mut rt, &ctx, "bind(rescue(fn(c, c text)), foreign(:nope))"),
        "no foreign method named 'nope'"
    );
}
