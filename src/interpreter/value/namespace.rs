use std::{cell::RefCell, collections::HashMap, rc::Rc};

use tracing::trace;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        value::{
            core::{Data, Value},
            datatype::DatatypeRef,
            function::{Function, Operator, Signature},
        },
    },
};

/// Shared handle to a namespace.
pub type NamespaceRef = Rc<RefCell<Namespace>>;

/// One of the disjoint symbol tables kept by every namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchSpace {
    /// Values bound to names.
    Identifier,
    /// Operators bound to symbols.
    Operator,
    /// Datatypes bound to type names.
    Datatype,
}

/// Anything that can be stored in a namespace.
#[derive(Debug, Clone)]
pub enum Item {
    /// A value, stored in `SearchSpace::Identifier`.
    Value(Value),
    /// An operator, stored in `SearchSpace::Operator`.
    Operator(Operator),
    /// A datatype, stored in `SearchSpace::Datatype`.
    Datatype(DatatypeRef),
}

impl Item {
    /// The search space the item belongs to.
    #[must_use]
    pub const fn search_space(&self) -> SearchSpace {
        match self {
            Self::Value(_) => SearchSpace::Identifier,
            Self::Operator(_) => SearchSpace::Operator,
            Self::Datatype(_) => SearchSpace::Datatype,
        }
    }

    /// The key the item is stored under.
    #[must_use]
    pub fn alias(&self) -> &str {
        match self {
            Self::Value(value) => &value.name,
            Self::Operator(operator) => &operator.symbol,
            Self::Datatype(datatype) => &datatype.name,
        }
    }

    /// Produces the item that replaces `self` when `new` is assigned to it.
    ///
    /// # Errors
    /// Values follow `Value::update`. Constant operators and every datatype
    /// refuse updates.
    pub fn update(&self, new: &Self, line: usize) -> EvalResult<Self> {
        match (self, new) {
            (Self::Value(current), Self::Value(new)) => Ok(Self::Value(current.update(new, line)?)),
            (Self::Operator(current), Self::Operator(new)) => {
                if current.constant {
                    return Err(RuntimeError::ConstantMutation { name: current.symbol.clone(),
                                                                line });
                }
                let mut updated = current.clone();
                updated.function = new.function.clone();
                Ok(Self::Operator(updated))
            },
            (Self::Datatype(current), _) => {
                Err(RuntimeError::DatatypeOverride { name: current.name.clone(),
                                                     line })
            },
            _ => Err(RuntimeError::TypeMismatch { expected: format!("{:?}", self.search_space()),
                                                  found: format!("{:?}", new.search_space()),
                                                  line }),
        }
    }
}

/// A scope: three search spaces plus a link to the enclosing scope.
///
/// Lookups and updates walk outward through `parent`; stores only ever touch
/// the namespace they are called on, which is what makes shadowing work.
#[derive(Debug, Default)]
pub struct Namespace {
    /// The enclosing namespace.
    pub parent: Option<NamespaceRef>,
    storage:    HashMap<SearchSpace, HashMap<String, Item>>,
}

impl Namespace {
    /// Creates an empty namespace below `parent`.
    #[must_use]
    pub fn new(parent: Option<NamespaceRef>) -> Self {
        Self { parent,
               storage: HashMap::new() }
    }

    /// Creates a shared namespace below `parent`.
    #[must_use]
    pub fn new_ref(parent: Option<NamespaceRef>) -> NamespaceRef {
        Rc::new(RefCell::new(Self::new(parent)))
    }

    fn local(&self, space: SearchSpace, alias: &str) -> Option<&Item> {
        self.storage.get(&space).and_then(|items| items.get(alias))
    }

    /// Looks an alias up in this namespace and then in its ancestors.
    ///
    /// # Returns
    /// A copy of the nearest item, or `None` when no namespace holds it.
    #[must_use]
    pub fn find(&self, space: SearchSpace, alias: &str) -> Option<Item> {
        if let Some(item) = self.local(space, alias) {
            return Some(item.clone());
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.borrow().find(space, alias))
    }

    /// Stores an item in this namespace.
    ///
    /// An alias that is already stored in an ancestor is shadowed.
    ///
    /// # Errors
    /// Returns `RuntimeError::AlreadyDeclared` if this namespace already
    /// holds the alias in the item's search space.
    ///
    /// # Example
    /// ```
    /// use tealang::interpreter::value::{
    ///     core::Value,
    ///     namespace::{Item, Namespace, SearchSpace},
    /// };
    ///
    /// let mut namespace = Namespace::new(None);
    /// namespace.store(Item::Value(Value::null().renamed("x")), 1).unwrap();
    ///
    /// assert!(namespace.find(SearchSpace::Identifier, "x").is_some());
    /// assert!(namespace.store(Item::Value(Value::null().renamed("x")), 2).is_err());
    /// ```
    pub fn store(&mut self, item: Item, line: usize) -> EvalResult<()> {
        let space = item.search_space();
        let alias = item.alias().to_string();
        if self.local(space, &alias).is_some() {
            return Err(RuntimeError::AlreadyDeclared { name: alias,
                                                       line });
        }
        trace!(?space, alias, "store");
        self.storage.entry(space).or_default().insert(alias, item);
        Ok(())
    }

    /// Replaces an item in the nearest namespace that owns the alias.
    ///
    /// The replacement is computed by `Item::update`, so constness and types
    /// of the stored item are enforced.
    ///
    /// # Errors
    /// An unknown alias is reported in terms of its search space
    /// (`UnknownIdentifier`, `UnknownOperator`, `UnknownType`); update
    /// failures are passed through.
    pub fn update(&mut self, item: &Item, line: usize) -> EvalResult<Item> {
        let space = item.search_space();
        let alias = item.alias().to_string();

        if let Some(current) = self.local(space, &alias) {
            let updated = current.update(item, line)?;
            self.storage
                .entry(space)
                .or_default()
                .insert(alias, updated.clone());
            return Ok(updated);
        }

        match &self.parent {
            Some(parent) => parent.borrow_mut().update(item, line),
            None => Err(unknown(space, alias, line)),
        }
    }

    /// Collects every operator stored under `symbol`, nearest scope first.
    #[must_use]
    pub fn find_operators(&self, symbol: &str) -> Vec<Operator> {
        let mut operators = Vec::new();
        if let Some(Item::Operator(operator)) = self.local(SearchSpace::Operator, symbol) {
            operators.push(operator.clone());
        }
        if let Some(parent) = &self.parent {
            operators.extend(parent.borrow().find_operators(symbol));
        }
        operators
    }

    /// Adds an overload for `symbol` to this namespace.
    ///
    /// If the namespace already holds an operator for the symbol, the
    /// signature is appended to it; otherwise a new constant operator is
    /// stored. Operators of enclosing namespaces are left untouched.
    pub fn define_operator(&mut self, symbol: &str, signature: Signature, source: Option<NamespaceRef>) {
        let operators = self.storage.entry(SearchSpace::Operator).or_default();
        match operators.get_mut(symbol) {
            Some(Item::Operator(operator)) => {
                let mut function = (*operator.function).clone();
                function.signatures.push(signature);
                operator.function = Rc::new(function);
            },
            _ => {
                let function = Function { signatures: vec![signature],
                                          source };
                let operator = Operator { symbol:   symbol.to_string(),
                                          function: Rc::new(function),
                                          constant: true, };
                operators.insert(symbol.to_string(), Item::Operator(operator));
            },
        }
        trace!(symbol, "operator defined");
    }

    /// Clears a finished scope that only its own functions keep alive.
    ///
    /// A function stored in the namespace it captured holds that namespace
    /// as its source, forming a cycle. If those functions are held nowhere
    /// else and are the only owners of `scope` besides the caller, nothing
    /// can reach the scope any more and its storage is dropped, freeing both
    /// sides. Scopes that escaped through a returned or copied function are
    /// left alone.
    pub fn release(scope: &NamespaceRef) {
        let own_functions = scope.borrow()
                                 .storage
                                 .values()
                                 .flat_map(HashMap::values)
                                 .filter(|item| {
                                     let function = match item {
                                         Item::Value(Value { data: Data::Function(function), .. }) => function,
                                         Item::Operator(operator) => &operator.function,
                                         _ => return false,
                                     };
                                     Rc::strong_count(function) == 1
                                     && function.source
                                                .as_ref()
                                                .is_some_and(|source| Rc::ptr_eq(source, scope))
                                 })
                                 .count();

        if own_functions > 0 && Rc::strong_count(scope) == own_functions + 1 {
            trace!(own_functions, "scope released");
            scope.borrow_mut().storage.clear();
        }
    }
}

/// Builds the error for a lookup that found nothing.
#[must_use]
pub fn unknown(space: SearchSpace, alias: String, line: usize) -> RuntimeError {
    match space {
        SearchSpace::Identifier => RuntimeError::UnknownIdentifier { name: alias,
                                                                     line },
        SearchSpace::Operator => RuntimeError::UnknownOperator { symbol: alias,
                                                                 line },
        SearchSpace::Datatype => RuntimeError::UnknownType { name: alias,
                                                             line },
    }
}
