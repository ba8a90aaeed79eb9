use tracing::trace;

use crate::{
    ast::Node,
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::{core::Value, namespace::Item},
    },
};

impl Context {
    /// Evaluates a `let`/`var` declaration.
    ///
    /// All initializers are evaluated before anything is stored, so
    /// `var a, b = b, a` cannot see the names it declares. Each result is
    /// renamed, flagged and stored in the current namespace.
    ///
    /// # Returns
    /// The last stored value.
    ///
    /// # Errors
    /// - `ArityMismatch` if the alias and value counts differ.
    /// - `AlreadyDeclared` if a name already exists in this namespace.
    pub(crate) fn eval_declaration(&mut self,
                                   aliases: &[String],
                                   constant: bool,
                                   values: &[Node],
                                   line: usize)
                                   -> EvalResult<Value> {
        if aliases.len() != values.len() {
            return Err(RuntimeError::ArityMismatch { expected: aliases.len(),
                                                     found: values.len(),
                                                     line });
        }

        let values = self.eval_all(values)?;
        let mut last = Value::null();
        for (alias, value) in aliases.iter().zip(values) {
            let value = value.renamed(alias).with_constant(constant);
            trace!(alias, constant, datatype = %value.type_name(), "declare");
            self.namespace
                .borrow_mut()
                .store(Item::Value(value.clone()), line)?;
            last = value;
        }
        Ok(last)
    }

    /// Evaluates a plain or update assignment.
    ///
    /// Values are evaluated first. For update assignments such as `x += 1`
    /// the named operator is applied to the current and the new value. The
    /// result replaces the value in the namespace that owns the alias.
    ///
    /// # Returns
    /// The last assigned value as stored.
    ///
    /// # Errors
    /// - `ArityMismatch` if the alias and value counts differ.
    /// - Any error of `Namespace::update`, such as `ConstantMutation`.
    pub(crate) fn eval_assignment(&mut self,
                                  aliases: &[String],
                                  operator: Option<&str>,
                                  values: &[Node],
                                  line: usize)
                                  -> EvalResult<Value> {
        if aliases.len() != values.len() {
            return Err(RuntimeError::ArityMismatch { expected: aliases.len(),
                                                     found: values.len(),
                                                     line });
        }

        let values = self.eval_all(values)?;
        let mut last = Value::null();
        for (alias, value) in aliases.iter().zip(values) {
            let value = match operator {
                Some(symbol) => {
                    let current = self.eval(&Node::Identifier { name: alias.clone(),
                                                                line })?;
                    self.apply_operator(symbol, vec![current, value], line)?
                },
                None => value,
            };
            let updated = self.namespace
                              .borrow_mut()
                              .update(&Item::Value(value.renamed(alias)), line)?;
            if let Item::Value(value) = updated {
                last = value;
            }
        }
        Ok(last)
    }
}
