use std::{cell::RefCell, fmt, rc::Rc};

use ordered_float::OrderedFloat;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        value::{datatype::Typeflag, function::Function},
    },
};

/// The payload of a runtime value.
///
/// Which variant is present is decided by the value's typeflag; the datatype
/// casters are the only code that builds payloads for a given type.
#[derive(Debug, Clone)]
pub enum Data {
    /// No payload; the data of `null` and of freshly declared untyped names.
    Null,
    /// Payload of `int`.
    Integer(i64),
    /// Payload of `float`.
    Float(OrderedFloat<f64>),
    /// Payload of `bool`.
    Bool(bool),
    /// Payload of `string`.
    String(Rc<str>),
    /// Payload of `func`.
    Function(Rc<Function>),
    /// Payload of `array`.
    Array(Rc<Vec<Value>>),
    /// A shared-mutable link to another value.
    ///
    /// No Tea syntax creates references; hosts bind them to share a cell
    /// they keep mutating with the scripts they run.
    Reference(Rc<RefCell<Value>>),
}

impl PartialEq for Data {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Array(a), Self::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equal_to(y))
            },
            (Self::Reference(a), Self::Reference(b)) => {
                Rc::ptr_eq(a, b) || a.borrow().equal_to(&b.borrow())
            },
            _ => false,
        }
    }
}

/// A runtime value: a typeflag, a payload and the binding it is stored under.
///
/// A value whose typeflag is `None` is `null`. `name`, `constant` and
/// `reference` only matter once the value is stored in a namespace.
#[derive(Debug, Clone)]
pub struct Value {
    /// The type of the value, `None` for `null`.
    pub typeflag:  Option<Typeflag>,
    /// The payload.
    pub data:      Data,
    /// The alias the value is stored under; empty for temporaries.
    pub name:      String,
    /// Whether updates are forbidden.
    pub constant:  bool,
    /// Whether `data` links to another value.
    pub reference: bool,
}

impl Value {
    /// Creates an unnamed, mutable value.
    #[must_use]
    pub fn new(typeflag: Typeflag, data: Data) -> Self {
        Self { typeflag: Some(typeflag),
               data,
               name: String::new(),
               constant: false,
               reference: false }
    }

    /// The `null` value.
    #[must_use]
    pub fn null() -> Self {
        Self { typeflag:  None,
               data:      Data::Null,
               name:      String::new(),
               constant:  false,
               reference: false, }
    }

    /// Creates a value that links to `target`.
    ///
    /// Updates through a reference rebind the link instead of casting into
    /// the stored payload.
    #[must_use]
    pub fn reference_to(target: Rc<RefCell<Self>>) -> Self {
        let typeflag = target.borrow().typeflag.clone();
        Self { typeflag,
               data: Data::Reference(target),
               name: String::new(),
               constant: false,
               reference: true }
    }

    /// Reads through a reference, keeping this value's name.
    ///
    /// Other values are returned unchanged.
    #[must_use]
    pub fn dereferenced(self) -> Self {
        if let Data::Reference(target) = &self.data {
            let target = target.borrow().clone();
            return target.renamed(&self.name);
        }
        self
    }

    /// Returns `true` for `null`, plain or wrapped as a bare `any`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.typeflag
            .as_ref()
            .is_none_or(|typeflag| typeflag.datatype.is_any() && typeflag.parameters.is_empty())
    }

    /// Returns a copy stored under another alias.
    #[must_use]
    pub fn renamed(mut self, name: &str) -> Self {
        name.clone_into(&mut self.name);
        self
    }

    /// Returns a copy with the given constness.
    #[must_use]
    pub const fn with_constant(mut self, constant: bool) -> Self {
        self.constant = constant;
        self
    }

    /// Strips an `any<T>` wrapper, returning the value typed as `T`.
    ///
    /// Values that are not wrapped are returned unchanged.
    #[must_use]
    pub fn unwrapped(&self) -> Self {
        match &self.typeflag {
            Some(typeflag) if typeflag.datatype.is_any() => {
                let mut inner = self.clone();
                inner.typeflag = typeflag.parameters.first().cloned();
                inner
            },
            _ => self.clone(),
        }
    }

    /// Compares two values by unwrapped typeflag and payload.
    ///
    /// Names and flags are ignored, so `x == 3` holds for a constant `x`.
    #[must_use]
    pub fn equal_to(&self, other: &Self) -> bool {
        let left = self.unwrapped();
        let right = other.unwrapped();
        left.typeflag == right.typeflag && left.data == right.data
    }

    /// Returns the name of the value's type, `null` for `null`.
    #[must_use]
    pub fn type_name(&self) -> String {
        self.typeflag
            .as_ref()
            .map_or_else(|| "null".to_string(), ToString::to_string)
    }

    /// Reads the boolean payload.
    ///
    /// # Errors
    /// Returns `RuntimeError::ExpectedBoolean` for any other payload.
    pub fn as_bool(&self, line: usize) -> EvalResult<bool> {
        match self.data {
            Data::Bool(b) => Ok(b),
            _ => Err(RuntimeError::ExpectedBoolean { found: self.type_name(),
                                                     line }),
        }
    }

    /// Applies an update to this stored value.
    ///
    /// - Constants refuse every update.
    /// - An untyped stored value takes the new value as is.
    /// - Otherwise the new value's type must be a kind of the stored type,
    ///   and both must agree on being a reference. Everything, `null`
    ///   included, is a kind of `any`.
    /// - References rebind their link; plain values receive the new payload
    ///   cast into the stored typeflag. An `any` slot takes the whole cast
    ///   result, so its `any<T>` follows the new value.
    ///
    /// Name, constness and reference flag of the stored value are kept.
    ///
    /// # Errors
    /// `ConstantMutation`, `TypeMismatch`, `ReferenceMismatch` or any cast
    /// error.
    pub fn update(&self, new: &Self, line: usize) -> EvalResult<Self> {
        if self.constant {
            return Err(RuntimeError::ConstantMutation { name: self.name.clone(),
                                                        line });
        }

        let Some(existing) = &self.typeflag else {
            let mut updated = new.clone();
            updated.name.clone_from(&self.name);
            updated.constant = false;
            updated.reference = self.reference;
            return Ok(updated);
        };

        let compatible = existing.datatype.is_any()
                         || new.unwrapped()
                               .typeflag
                               .is_some_and(|found| found.datatype.kind_of(&existing.datatype));
        if !compatible {
            return Err(RuntimeError::TypeMismatch { expected: existing.to_string(),
                                                    found: new.type_name(),
                                                    line });
        }
        if self.reference != new.reference {
            return Err(RuntimeError::ReferenceMismatch { name: self.name.clone(),
                                                         line });
        }

        if self.reference {
            let mut updated = self.clone();
            updated.data = new.data.clone();
            return Ok(updated);
        }
        let cast = existing.cast(new, line)?;
        let mut updated = self.clone();
        if existing.datatype.is_any() {
            updated.typeflag = cast.typeflag;
        }
        updated.data = cast.data;
        Ok(updated)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.typeflag, &self.data) {
            (None, _) => write!(f, "null"),
            (_, Data::Reference(target)) => write!(f, "{}", target.borrow()),
            (Some(typeflag), _) => write!(f, "{}", (typeflag.datatype.format)(self)),
        }
    }
}
