use tracing::trace;

use crate::{
    ast::{Case, Conditional, Node},
    interpreter::{
        evaluator::core::{Behavior, Context, EvalResult, Outcome},
        value::core::Value,
    },
};

impl Context {
    /// Evaluates statements in order.
    ///
    /// Behavior is reset before each statement; the sequence stops as soon as
    /// a statement leaves a non-default behavior behind, so the signal
    /// reaches the enclosing node unchanged.
    ///
    /// # Parameters
    /// - `statements`: The statements to evaluate.
    /// - `substitute`: Whether to evaluate in a fresh child namespace.
    ///
    /// # Returns
    /// The value of the last evaluated statement, or `null` if there is none.
    pub(crate) fn eval_sequence(&mut self, statements: &[Node], substitute: bool) -> EvalResult<Value> {
        if substitute {
            let scope = self.child_scope();
            return self.substitute(scope, |ctx| ctx.eval_sequence(statements, false));
        }

        let mut last = Value::null();
        for statement in statements {
            self.behavior = Behavior::Default;
            last = self.eval(statement)?;
            if self.behavior != Behavior::Default {
                trace!(behavior = %self.behavior, "sequence interrupted");
                break;
            }
        }
        Ok(last)
    }

    /// Evaluates the first arm whose condition holds, else the `else` body.
    pub(crate) fn eval_branch(&mut self,
                              conditionals: &[Conditional],
                              otherwise: Option<&Node>)
                              -> EvalResult<Value> {
        for conditional in conditionals {
            if let Outcome::Value(value) = self.eval_conditional(conditional)? {
                return Ok(value);
            }
        }
        match otherwise {
            Some(body) => self.eval(body),
            None => Ok(Value::null()),
        }
    }

    /// Repeats a guarded body until its condition fails.
    ///
    /// `break` ends the loop with `null`, `continue` ends the iteration and
    /// `return` ends the loop with the returned value, leaving the behavior
    /// set for the enclosing call. `post` runs after every iteration that
    /// was not ended by `break` or `return`.
    pub(crate) fn eval_loop(&mut self, conditional: &Conditional, post: Option<&Node>) -> EvalResult<Value> {
        loop {
            let value = match self.eval_conditional(conditional)? {
                Outcome::ConditionNotMet => return Ok(Value::null()),
                Outcome::Value(value) => value,
            };

            match self.behavior {
                Behavior::Return => return Ok(value),
                Behavior::Break => {
                    self.behavior = Behavior::Default;
                    return Ok(Value::null());
                },
                Behavior::Continue | Behavior::Fallthrough | Behavior::Default => {
                    self.behavior = Behavior::Default;
                },
            }

            if let Some(post) = post {
                self.eval(post)?;
            }
        }
    }

    /// Runs the cases whose value equals the scrutinee.
    ///
    /// The scrutinee is evaluated once, in a fresh namespace that the case
    /// values and bodies share. After a case body ends in `fallthrough` the
    /// next case runs without being compared; `default` runs when it is
    /// reached.
    pub(crate) fn eval_match(&mut self,
                             scrutinee: &Node,
                             cases: &[Case],
                             default: Option<&Node>)
                             -> EvalResult<Value> {
        let scope = self.child_scope();
        self.substitute(scope, |ctx| {
                let scrutinee = ctx.eval(scrutinee)?;
                let mut falling = false;
                let mut result = Value::null();

                for case in cases {
                    if !falling && !scrutinee.equal_to(&ctx.eval(&case.value)?) {
                        continue;
                    }
                    result = ctx.eval(&case.body)?;
                    if ctx.behavior != Behavior::Fallthrough {
                        return Ok(result);
                    }
                    ctx.behavior = Behavior::Default;
                    falling = true;
                }

                if let Some(default) = default {
                    result = ctx.eval(default)?;
                }
                if ctx.behavior == Behavior::Fallthrough {
                    ctx.behavior = Behavior::Default;
                }
                Ok(result)
            })
    }

    /// Evaluates the returned value, then sets the behavior.
    pub(crate) fn eval_controller(&mut self, behavior: Behavior, value: Option<&Node>) -> EvalResult<Value> {
        let value = match value {
            Some(node) => self.eval(node)?,
            None => Value::null(),
        };
        self.behavior = behavior;
        Ok(value)
    }
}
