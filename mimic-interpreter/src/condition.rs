use crate::interpreter::{self, Return, Unwind};
use crate::message;
use crate::object::Object;
use crate::runtime::Runtime;

/// One dynamically scoped handler, established by `bind`.
///
/// A rescuing handler unwinds the stack to its `bind` frame before running;
/// a plain handler runs right at the signal point, which is what lets a
/// handler invoke a restart established below it.
#[derive(Debug, Clone)]
pub struct HandlerFrame {
    pub token: u64,
    /// Condition prototypes this handler applies to.
    pub conditions: Vec<Object>,
    /// The callable run with the condition as its argument.
    pub handler: Object,
    pub rescue: bool,
}

/// One named restart available for invocation.
#[derive(Debug, Clone)]
pub struct RestartEntry {
    pub name: String,
    /// The user handler to run at the establishing frame, or `None` for
    /// restarts interpreted natively at their establishing site.
    pub handler: Option<Object>,
}

/// A group of restarts established together, all unwinding to one frame.
#[derive(Debug, Clone)]
pub struct RestartFrame {
    pub token: u64,
    pub entries: Vec<RestartEntry>,
}

/// What signalling a condition came to.
#[derive(Debug)]
pub enum SignalResult {
    /// No handler accepted the condition.
    Unhandled,
    /// Control flow produced by handling: a rescue unwind, a restart
    /// invocation, or anything else a handler body did.
    Flow(Return),
}

impl HandlerFrame {
    pub fn applies_to(&self, condition: &Object) -> bool {
        self.conditions.iter().any(|proto| condition.is_mimic_of(proto))
    }
}

/// Walk the handler stack innermost-first, offering the condition to every
/// applicable handler.
///
/// Plain handlers run here, at the signal point, with the handlers above
/// them masked against re-entry; a handler that returns normally declines,
/// and the walk continues outwards. A rescuing handler does not run here:
/// accepting it means unwinding to its `bind` frame first.
pub fn signal(rt: &mut Runtime, condition: &Object, ctx: &Object) -> SignalResult {
    let frames = rt.handler_frames();
    for (index, frame) in frames.iter().enumerate().rev() {
        if !frame.applies_to(condition) {
            continue;
        }
        if frame.rescue {
            return SignalResult::Flow(Return::Unwind(Unwind::Rescue {
                token: frame.token,
                handler: frame.handler.clone(),
                condition: condition.clone(),
            }));
        }
        let result = rt.with_handlers_masked(index, |rt| {
            run_handler(rt, &frame.handler, ctx, condition)
        });
        match result {
            Return::Local(_) => continue,
            other => return SignalResult::Flow(other),
        }
    }
    SignalResult::Unhandled
}

/// Run a handler callable with the condition as its single argument.
pub fn run_handler(rt: &mut Runtime, handler: &Object, ctx: &Object, condition: &Object) -> Return {
    let argument = message::wrap(rt, condition);
    let call = message::with_args(rt, "call", vec![argument]);
    interpreter::send(rt, &call, ctx, handler)
}
