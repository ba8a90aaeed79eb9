use std::{fmt, rc::Rc};

use crate::interpreter::{evaluator::core::EvalResult, value::core::Value};

/// Shared handle to a datatype descriptor.
pub type DatatypeRef = Rc<Datatype>;

/// Converts a value into the given target typeflag.
///
/// The value passed in never carries an `any<T>` wrapper; the target is the
/// full typeflag so that parametrized casts such as `array<int>` can recast
/// their elements.
pub type Caster = fn(&Value, &Typeflag, usize) -> EvalResult<Value>;

/// Renders the payload of a value of this datatype.
pub type Formatter = fn(&Value) -> String;

/// A named node in the datatype tree.
///
/// `any` is the root. Every other datatype names its parent, which makes
/// `kind_of` a walk up the parent chain.
pub struct Datatype {
    /// Name used in source code and messages.
    pub name:   String,
    /// The parent datatype; `None` only for the root.
    pub parent: Option<DatatypeRef>,
    /// The cast function.
    pub cast:   Caster,
    /// The format function.
    pub format: Formatter,
}

impl fmt::Debug for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Datatype")
         .field("name", &self.name)
         .field("parent", &self.parent.as_ref().map(|p| p.name.clone()))
         .finish_non_exhaustive()
    }
}

impl Datatype {
    /// Creates a shared datatype descriptor.
    #[must_use]
    pub fn new(name: &str,
               parent: Option<DatatypeRef>,
               cast: Caster,
               format: Formatter)
               -> DatatypeRef {
        Rc::new(Self { name: name.to_string(),
                       parent,
                       cast,
                       format })
    }

    /// Returns `true` if `other` is this datatype or one of its ancestors.
    ///
    /// Comparison is by identity, not by name.
    #[must_use]
    pub fn kind_of(self: &Rc<Self>, other: &DatatypeRef) -> bool {
        let mut current = Some(self);
        while let Some(datatype) = current {
            if Rc::ptr_eq(datatype, other) {
                return true;
            }
            current = datatype.parent.as_ref();
        }
        false
    }

    /// Returns `true` for the root datatype, whose values wrap another type.
    #[must_use]
    pub fn is_any(&self) -> bool {
        self.parent.is_none()
    }
}

/// A datatype together with its parametrizing typeflags.
#[derive(Clone, Debug)]
pub struct Typeflag {
    /// The datatype.
    pub datatype:   DatatypeRef,
    /// Parameters such as the element type of an `array`.
    pub parameters: Vec<Self>,
}

impl Typeflag {
    /// Creates a typeflag without parameters.
    #[must_use]
    pub const fn new(datatype: DatatypeRef) -> Self {
        Self { datatype,
               parameters: Vec::new() }
    }

    /// Creates a typeflag with the given parameters.
    #[must_use]
    pub const fn with_parameters(datatype: DatatypeRef, parameters: Vec<Self>) -> Self {
        Self { datatype,
               parameters }
    }

    /// Casts a value into this typeflag.
    ///
    /// An `any<T>` wrapper on the input is removed first, so concrete casts
    /// see the payload type.
    pub fn cast(&self, value: &Value, line: usize) -> EvalResult<Value> {
        let value = value.unwrapped();
        (self.datatype.cast)(&value, self, line)
    }

    /// Returns `true` if this typeflag's datatype is a kind of `other`'s.
    #[must_use]
    pub fn kind_of(&self, other: &Self) -> bool {
        self.datatype.kind_of(&other.datatype)
    }
}

impl PartialEq for Typeflag {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.datatype, &other.datatype) && self.parameters == other.parameters
    }
}

impl fmt::Display for Typeflag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.datatype.name)?;
        if !self.parameters.is_empty() {
            let parameters = self.parameters
                                 .iter()
                                 .map(ToString::to_string)
                                 .collect::<Vec<_>>();
            write!(f, "<{}>", parameters.join(", "))?;
        }
        Ok(())
    }
}
