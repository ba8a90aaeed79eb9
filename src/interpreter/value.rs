/// Nominal datatypes and typeflags.
///
/// Defines the `Datatype` descriptor, with its parent link and its cast and
/// format behavior, and the `Typeflag` that parametrizes a datatype, such as
/// `array<int>`.
pub mod datatype;

/// The dynamically tagged runtime value.
///
/// Defines `Value` and its payload `Data`, together with equality, unwrapping
/// of `any<T>` values and display through the datatype's formatter.
pub mod core;

/// Scopes and their three search spaces.
///
/// Defines `Namespace`, the parent-linked scope that stores identifiers,
/// operators and datatypes, and the `Item` enum stored in it.
pub mod namespace;

/// Callable values.
///
/// Defines `Signature`, `Function` and `Operator` and the binding of argument
/// lists to parameters.
pub mod function;

/// The builtin datatypes.
///
/// Builds `any`, `int`, `float`, `string`, `bool`, `func` and `array` with
/// their cast and format rules, and registers them into a namespace.
pub mod types;
