use crate::arguments::ArgumentsDefinition;
use crate::data::{Data, HookState};
use crate::fetch;
use crate::interpreter::{self, Return};
use crate::object::Object;
use crate::primitives;
use crate::runtime::Runtime;

/// Natives on `Hook`, the observer for object mutation events.
///
/// A connected hook receives `cellAdded`, `cellChanged`, `cellRemoved`,
/// `cellUndefined`, `mimicAdded`, `mimicRemoved`, `mimicsChanged` and
/// `mimicked` as ordinary message sends.
pub fn install(rt: &mut Runtime) {
    let proto = rt.hook.clone();

    primitives::native(
        rt,
        &proto,
        "into",
        "creates a hook observing every argument object",
        ArgumentsDefinition::builder().rest("targets").build(),
        into,
    );
    primitives::native(
        rt,
        &proto,
        "connectedObjects",
        "returns the objects this hook observes",
        ArgumentsDefinition::empty(),
        connected_objects,
    );
    primitives::native(
        rt,
        &proto,
        "connect!",
        "additionally observes the argument object",
        ArgumentsDefinition::builder().required("target").build(),
        connect,
    );

    // The default for every event is to ignore it, so a hook only has to
    // define the events it cares about.
    for event in &[
        "cellAdded",
        "cellChanged",
        "cellRemoved",
        "cellUndefined",
        "mimicAdded",
        "mimicRemoved",
        "mimicsChanged",
        "mimicked",
    ] {
        primitives::native(
            rt,
            &proto,
            *event,
            "ignores the event; redefine on a hook to observe it",
            ArgumentsDefinition::builder().rest("values").build(),
            ignore_event,
        );
    }
}

fn ignore_event(rt: &mut Runtime, _m: &Object, _ctx: &Object, _msg: &Object, _on: &Object) -> Return {
    Return::Local(rt.nil())
}

fn into(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, _on: &Object) -> Return {
    let targets = fetch!(interpreter::evaluated_args(rt, msg, ctx));
    if targets.is_empty() {
        return interpreter::signal_argument_count(
            rt,
            ctx,
            msg,
            "a hook needs at least one object to observe",
        );
    }
    let hook = Object::new(Data::Hook(HookState {
        connected: targets.clone(),
    }));
    hook.single_mimics(&rt.hook);
    for target in &targets {
        target.add_hook(&hook);
    }
    Return::Local(hook)
}

fn connected_objects(rt: &mut Runtime, _m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let connected = match &on.state().data {
        Data::Hook(state) => Some(state.connected.clone()),
        _ => None,
    };
    match connected {
        Some(connected) => Return::Local(rt.new_list(connected)),
        None => interpreter::signal_incorrect_type(rt, ctx, msg, on, "Hook"),
    }
}

fn connect(rt: &mut Runtime, m: &Object, ctx: &Object, msg: &Object, on: &Object) -> Return {
    let (args, _) = fetch!(primitives::definition_of(m).collect(rt, ctx, msg));
    let target = &args[0];
    let is_hook = matches!(&on.state().data, Data::Hook(_));
    if !is_hook {
        return interpreter::signal_incorrect_type(rt, ctx, msg, on, "Hook");
    }
    if let Data::Hook(state) = &mut on.state_mut().data {
        if !state.connected.iter().any(|existing| existing == target) {
            state.connected.push(target.clone());
        }
    }
    target.add_hook(on);
    Return::Local(on.clone())
}
