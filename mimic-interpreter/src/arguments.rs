use std::rc::Rc;

use crate::data::Data;
use crate::interpreter::{self, Return};
use crate::message;
use crate::object::Object;
use crate::propagate;
use crate::runtime::Runtime;

/// One declared parameter.
#[derive(Debug, Clone)]
pub enum Parameter {
    /// Evaluated in the caller's context before binding.
    Required { name: String },
    /// Bound as the raw argument chain, unevaluated.
    RequiredUnevaluated { name: String },
    /// Like required, but with a default chain evaluated in the caller's
    /// context when the argument is absent.
    Optional { name: String, default: Option<Object> },
    /// Passed by name at the call site.
    Keyword { name: String, default: Option<Object> },
}

impl Parameter {
    fn name(&self) -> &str {
        match self {
            Parameter::Required { name }
            | Parameter::RequiredUnevaluated { name }
            | Parameter::Optional { name, .. }
            | Parameter::Keyword { name, .. } => name,
        }
    }
}

/// Specialization marker computed once per definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fast {
    None,
    /// Exactly this many required, evaluated, positional parameters.
    Fixed(usize),
}

/// A compiled parameter list, shared by every activation of a definition.
#[derive(Debug, Clone)]
pub struct ArgumentsDefinition {
    pub parameters: Vec<Parameter>,
    /// Collects excess positional arguments into a list.
    pub rest: Option<String>,
    /// Whether the rest list holds raw argument chains instead of values.
    pub rest_unevaluated: bool,
    /// Collects unknown keyword arguments into a list of (symbol, value)
    /// tuples.
    pub krest: Option<String>,
    pub fast: Fast,
}

impl ArgumentsDefinition {
    pub fn empty() -> Rc<ArgumentsDefinition> {
        Builder::new().build()
    }

    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Compile a parameter list from the declaration messages of a
    /// `method`/`macro`/`syntax`/`fn` form.
    ///
    /// Each spec is a chain: a bare name declares a required parameter, a
    /// name followed by more chain declares an optional one with that
    /// default, a name ending in `:` declares a keyword, `+name` a rest
    /// parameter and `+:name` a keyword rest.
    pub fn from_messages(
        rt: &mut Runtime,
        ctx: &Object,
        msg: &Object,
        specs: &[Object],
    ) -> Result<Rc<ArgumentsDefinition>, Return> {
        let mut builder = Builder::new();
        for spec in specs {
            let name = message::name(spec);
            let args = message::args(spec);
            match name.as_str() {
                "+" | "+:" if args.len() == 1 => {
                    let inner = message::name(&args[0]);
                    builder = if name == "+" {
                        builder.rest(&inner)
                    } else {
                        builder.krest(&inner)
                    };
                }
                _ if name.ends_with(':') && name.len() > 1 => {
                    let keyword = name[..name.len() - 1].to_string();
                    builder = builder.keyword_with_default(&keyword, message::next(spec));
                }
                _ if !name.is_empty() && !args.is_empty() => {
                    return Err(malformed(rt, ctx, msg, &name));
                }
                _ if !name.is_empty() => match message::next(spec) {
                    Some(default) => builder = builder.optional(&name, Some(default)),
                    None => builder = builder.required(&name),
                },
                _ => return Err(malformed(rt, ctx, msg, &name)),
            }
        }
        Ok(builder.build())
    }

    fn min_positional(&self) -> usize {
        self.parameters
            .iter()
            .filter(|p| {
                matches!(
                    p,
                    Parameter::Required { .. } | Parameter::RequiredUnevaluated { .. }
                )
            })
            .count()
    }

    fn max_positional(&self) -> Option<usize> {
        if self.rest.is_some() {
            return None;
        }
        Some(
            self.parameters
                .iter()
                .filter(|p| !matches!(p, Parameter::Keyword { .. }))
                .count(),
        )
    }

    fn keyword_names(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter_map(|p| match p {
                Parameter::Keyword { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Bind a call site's arguments into an activation context.
    ///
    /// Positional arguments are evaluated in the caller's context, in call
    /// order; defaults are evaluated there too, only when used. When the
    /// fast specialization matches the call site exactly, the evaluated
    /// values are also stored on the call object for cheap re-access.
    pub fn assign(
        &self,
        rt: &mut Runtime,
        ctx: &Object,
        msg: &Object,
        activation: &Object,
        call: Option<&Object>,
    ) -> Return {
        let (positional, keywords) = split_call_site(msg);

        if let Fast::Fixed(count) = self.fast {
            if keywords.is_empty() && positional.len() == count {
                let mut values = Vec::with_capacity(count);
                for chain in &positional {
                    values.push(propagate!(interpreter::evaluate(rt, chain, ctx, ctx)));
                }
                for (parameter, value) in self.parameters.iter().zip(values.iter()) {
                    activation.register_cell(parameter.name(), value.clone());
                }
                if let Some(call) = call {
                    if let Data::Call(state) = &mut call.state_mut().data {
                        state.cached_positional = Some(values);
                    }
                }
                return Return::Local(rt.nil());
            }
        }

        match self.check_counts(rt, ctx, msg, positional.len(), &keywords) {
            Ok(()) => {}
            Err(flow) => return flow,
        }

        let mut next_positional = positional.iter();
        let mut remaining = positional.len();
        let mut optional_budget = remaining.saturating_sub(self.min_positional());

        for parameter in &self.parameters {
            match parameter {
                Parameter::Required { name } => {
                    let chain = next_positional.next().expect("count checked above");
                    remaining -= 1;
                    let value = propagate!(interpreter::evaluate(rt, chain, ctx, ctx));
                    activation.register_cell(name, value);
                }
                Parameter::RequiredUnevaluated { name } => {
                    let chain = next_positional.next().expect("count checked above");
                    remaining -= 1;
                    activation.register_cell(name, (*chain).clone());
                }
                Parameter::Optional { name, default } => {
                    if optional_budget > 0 {
                        let chain = next_positional.next().expect("budget checked above");
                        remaining -= 1;
                        optional_budget -= 1;
                        let value = propagate!(interpreter::evaluate(rt, chain, ctx, ctx));
                        activation.register_cell(name, value);
                    } else {
                        let value = match default {
                            Some(chain) => {
                                propagate!(interpreter::evaluate(rt, chain, ctx, ctx))
                            }
                            None => rt.nil(),
                        };
                        activation.register_cell(name, value);
                    }
                }
                Parameter::Keyword { name, default } => {
                    let provided = keywords.iter().find(|(key, _)| key == name);
                    let value = match provided {
                        Some((_, Some(chain))) => {
                            propagate!(interpreter::evaluate(rt, chain, ctx, ctx))
                        }
                        Some((_, None)) => rt.nil(),
                        None => match default {
                            Some(chain) => {
                                propagate!(interpreter::evaluate(rt, chain, ctx, ctx))
                            }
                            None => rt.nil(),
                        },
                    };
                    activation.register_cell(name, value);
                }
            }
        }

        if let Some(rest) = &self.rest {
            let mut values = Vec::with_capacity(remaining);
            for chain in next_positional {
                if self.rest_unevaluated {
                    values.push((*chain).clone());
                } else {
                    values.push(propagate!(interpreter::evaluate(rt, chain, ctx, ctx)));
                }
            }
            let list = rt.new_list(values);
            activation.register_cell(rest, list);
        }

        if let Some(krest) = &self.krest {
            let known = self.keyword_names();
            let mut entries = Vec::new();
            for (key, chain) in &keywords {
                if known.contains(&key.as_str()) {
                    continue;
                }
                let value = match chain {
                    Some(chain) => propagate!(interpreter::evaluate(rt, chain, ctx, ctx)),
                    None => rt.nil(),
                };
                let symbol = rt.new_symbol(key);
                let pair = rt.new_tuple(vec![symbol, value]);
                entries.push(pair);
            }
            let list = rt.new_list(entries);
            activation.register_cell(krest, list);
        }

        Return::Local(rt.nil())
    }

    /// Evaluate a call site's arguments without binding them anywhere,
    /// for native methods.
    pub fn collect(
        &self,
        rt: &mut Runtime,
        ctx: &Object,
        msg: &Object,
    ) -> Result<(Vec<Object>, Vec<(String, Object)>), Return> {
        let (positional, keywords) = split_call_site(msg);
        if let Err(flow) = self.check_counts(rt, ctx, msg, positional.len(), &keywords) {
            return Err(flow);
        }
        let mut values = Vec::with_capacity(positional.len());
        for chain in &positional {
            match interpreter::evaluate(rt, chain, ctx, ctx) {
                Return::Local(value) => values.push(value),
                other => return Err(other),
            }
        }
        let mut named = Vec::with_capacity(keywords.len());
        for (key, chain) in &keywords {
            let value = match chain {
                Some(chain) => match interpreter::evaluate(rt, chain, ctx, ctx) {
                    Return::Local(value) => value,
                    other => return Err(other),
                },
                None => rt.nil(),
            };
            named.push((key.clone(), value));
        }
        Ok((values, named))
    }

    fn check_counts(
        &self,
        rt: &mut Runtime,
        ctx: &Object,
        msg: &Object,
        positional: usize,
        keywords: &[(String, Option<Object>)],
    ) -> Result<(), Return> {
        let min = self.min_positional();
        if positional < min {
            return Err(interpreter::signal_argument_count(
                rt,
                ctx,
                msg,
                &format!("expected at least {} arguments, got {}", min, positional),
            ));
        }
        if let Some(max) = self.max_positional() {
            if positional > max {
                return Err(interpreter::signal_argument_count(
                    rt,
                    ctx,
                    msg,
                    &format!("expected at most {} arguments, got {}", max, positional),
                ));
            }
        }
        if self.krest.is_none() {
            let known = self.keyword_names();
            for (key, _) in keywords {
                if !known.contains(&key.as_str()) {
                    return Err(interpreter::signal_argument_count(
                        rt,
                        ctx,
                        msg,
                        &format!("unknown keyword argument '{}:'", key),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Partition a call site's argument chains into positional chains and
/// keyword entries. A keyword entry is a chain headed by a `name:` message;
/// its value is the rest of that chain.
fn split_call_site(msg: &Object) -> (Vec<Object>, Vec<(String, Option<Object>)>) {
    let mut positional = Vec::new();
    let mut keywords = Vec::new();
    for arg in message::args(msg) {
        let head = message::name(&arg);
        if head.len() > 1 && head.ends_with(':') && message::arg_count(&arg) == 0 {
            let name = head[..head.len() - 1].to_string();
            keywords.push((name, message::next(&arg)));
        } else {
            positional.push(arg);
        }
    }
    (positional, keywords)
}

fn malformed(rt: &mut Runtime, ctx: &Object, msg: &Object, name: &str) -> Return {
    interpreter::signal_argument_count(
        rt,
        ctx,
        msg,
        &format!("malformed parameter declaration '{}'", name),
    )
}

/// Builds parameter lists for native methods (and the message compiler).
#[derive(Debug, Default)]
pub struct Builder {
    parameters: Vec<Parameter>,
    rest: Option<String>,
    rest_unevaluated: bool,
    krest: Option<String>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    pub fn required(mut self, name: &str) -> Builder {
        self.parameters.push(Parameter::Required {
            name: name.to_string(),
        });
        self
    }

    pub fn required_unevaluated(mut self, name: &str) -> Builder {
        self.parameters.push(Parameter::RequiredUnevaluated {
            name: name.to_string(),
        });
        self
    }

    pub fn optional(mut self, name: &str, default: Option<Object>) -> Builder {
        self.parameters.push(Parameter::Optional {
            name: name.to_string(),
            default,
        });
        self
    }

    pub fn keyword(mut self, name: &str) -> Builder {
        self.keyword_with_default(name, None)
    }

    pub fn keyword_with_default(mut self, name: &str, default: Option<Object>) -> Builder {
        self.parameters.push(Parameter::Keyword {
            name: name.to_string(),
            default,
        });
        self
    }

    pub fn rest(mut self, name: &str) -> Builder {
        self.rest = Some(name.to_string());
        self
    }

    pub fn rest_unevaluated(mut self, name: &str) -> Builder {
        self.rest = Some(name.to_string());
        self.rest_unevaluated = true;
        self
    }

    pub fn krest(mut self, name: &str) -> Builder {
        self.krest = Some(name.to_string());
        self
    }

    pub fn build(self) -> Rc<ArgumentsDefinition> {
        let fast = if self.rest.is_none()
            && self.krest.is_none()
            && self
                .parameters
                .iter()
                .all(|p| matches!(p, Parameter::Required { .. }))
        {
            Fast::Fixed(self.parameters.len())
        } else {
            Fast::None
        };
        Rc::new(ArgumentsDefinition {
            parameters: self.parameters,
            rest: self.rest,
            rest_unevaluated: self.rest_unevaluated,
            krest: self.krest,
            fast,
        })
    }
}
