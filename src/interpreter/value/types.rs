use std::rc::Rc;

use ordered_float::OrderedFloat;
use tracing::{debug, error};

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        value::{
            core::{Data, Value},
            datatype::{Caster, Datatype, DatatypeRef, Formatter, Typeflag},
            function::Function,
            namespace::{Item, Namespace},
        },
    },
    util::num::{f64_to_i64_truncated, i64_to_f64_checked},
};

/// Handles to the builtin datatypes.
///
/// Built once per context. Natives use it to construct typed results, the
/// evaluator to type literals.
#[derive(Debug, Clone)]
pub struct Types {
    /// The root type; values cast to it are tagged `any<T>`.
    pub any:      DatatypeRef,
    /// 64-bit signed integers.
    pub int:      DatatypeRef,
    /// 64-bit floats.
    pub float:    DatatypeRef,
    /// Immutable strings.
    pub string:   DatatypeRef,
    /// Booleans.
    pub boolean:  DatatypeRef,
    /// Function values.
    pub function: DatatypeRef,
    /// Arrays, parametrized by their element type.
    pub array:    DatatypeRef,
}

#[allow(clippy::new_without_default)]
impl Types {
    /// Creates the builtin datatype tree.
    #[must_use]
    pub fn new() -> Self {
        let any = Datatype::new("any", None, cast_any, format_any);
        let child = |name: &str, cast: Caster, format: Formatter| Datatype::new(name, Some(any.clone()), cast, format);

        Self { int:      child("int", cast_int, format_payload),
               float:    child("float", cast_float, format_payload),
               string:   child("string", cast_string, format_payload),
               boolean:  child("bool", cast_bool, format_payload),
               function: child("func", cast_function, format_payload),
               array:    child("array", cast_array, format_payload),
               any }
    }

    /// All builtin datatypes, root first.
    #[must_use]
    pub fn all(&self) -> [&DatatypeRef; 7] {
        [&self.any,
         &self.int,
         &self.float,
         &self.string,
         &self.boolean,
         &self.function,
         &self.array]
    }

    /// Creates an `int` value.
    #[must_use]
    pub fn make_int(&self, value: i64) -> Value {
        Value::new(Typeflag::new(self.int.clone()), Data::Integer(value))
    }

    /// Creates a `float` value.
    #[must_use]
    pub fn make_float(&self, value: f64) -> Value {
        Value::new(Typeflag::new(self.float.clone()), Data::Float(OrderedFloat(value)))
    }

    /// Creates a `string` value.
    #[must_use]
    pub fn make_string(&self, value: &str) -> Value {
        Value::new(Typeflag::new(self.string.clone()), Data::String(Rc::from(value)))
    }

    /// Creates a `bool` value.
    #[must_use]
    pub fn make_bool(&self, value: bool) -> Value {
        Value::new(Typeflag::new(self.boolean.clone()), Data::Bool(value))
    }

    /// Creates a `func` value.
    #[must_use]
    pub fn make_function(&self, function: Function) -> Value {
        Value::new(Typeflag::new(self.function.clone()), Data::Function(Rc::new(function)))
    }

    /// Creates an array from evaluated elements.
    ///
    /// The array is typed `array<T>` when every element has typeflag `T`.
    /// Otherwise it is `array<any>` and every element is tagged `any<T>`.
    ///
    /// # Errors
    /// Propagates the error of tagging an element.
    pub fn make_array(&self, elements: Vec<Value>, line: usize) -> EvalResult<Value> {
        let shared = elements.first()
                             .and_then(|first| first.typeflag.clone())
                             .filter(|first| elements.iter().all(|e| e.typeflag.as_ref() == Some(first)));

        let (parameter, elements) = match shared {
            Some(typeflag) => (typeflag, elements),
            None => {
                let any = Typeflag::new(self.any.clone());
                let tagged = elements.iter()
                                     .map(|e| any.cast(e, line))
                                     .collect::<EvalResult<Vec<_>>>()?;
                (any, tagged)
            },
        };

        Ok(Value::new(Typeflag::with_parameters(self.array.clone(), vec![parameter]),
                      Data::Array(Rc::new(elements))))
    }

    /// Creates a parameter spec without default.
    #[must_use]
    pub fn parameter(&self, name: &str, datatype: &DatatypeRef) -> Value {
        let mut spec = Value::new(Typeflag::new(datatype.clone()), Data::Null);
        name.clone_into(&mut spec.name);
        spec
    }
}

/// Registers every builtin datatype in `namespace`.
pub fn load(namespace: &mut Namespace, types: &Types) {
    for datatype in types.all() {
        if let Err(e) = namespace.store(Item::Datatype(datatype.clone()), 0) {
            error!("failed to register datatype {}: {e}", datatype.name);
        }
    }
    debug!("registered {} datatypes", types.all().len());
}

fn invalid(value: &Value, target: &Typeflag, details: &str, line: usize) -> RuntimeError {
    RuntimeError::InvalidCast { from: value.type_name(),
                                to: target.to_string(),
                                details: details.to_string(),
                                line }
}

fn cast_any(value: &Value, target: &Typeflag, _line: usize) -> EvalResult<Value> {
    let parameters = value.typeflag.iter().cloned().collect();
    Ok(Value::new(Typeflag::with_parameters(target.datatype.clone(), parameters), value.data.clone()))
}

fn cast_int(value: &Value, target: &Typeflag, line: usize) -> EvalResult<Value> {
    let number = match &value.data {
        Data::Null => 0,
        Data::Integer(i) => *i,
        Data::Float(x) => f64_to_i64_truncated(x.into_inner(), line)?,
        Data::String(s) => s.trim()
                            .parse::<i64>()
                            .map_err(|e| invalid(value, target, &e.to_string(), line))?,
        _ => return Err(invalid(value, target, "no conversion", line)),
    };
    Ok(Value::new(target.clone(), Data::Integer(number)))
}

fn cast_float(value: &Value, target: &Typeflag, line: usize) -> EvalResult<Value> {
    let number = match &value.data {
        Data::Null => 0.0,
        Data::Float(x) => x.into_inner(),
        Data::Integer(i) => i64_to_f64_checked(*i, line)?,
        Data::String(s) => s.trim()
                            .parse::<f64>()
                            .map_err(|e| invalid(value, target, &e.to_string(), line))?,
        _ => return Err(invalid(value, target, "no conversion", line)),
    };
    Ok(Value::new(target.clone(), Data::Float(OrderedFloat(number))))
}

fn cast_string(value: &Value, target: &Typeflag, _line: usize) -> EvalResult<Value> {
    let text: Rc<str> = match &value.data {
        Data::Null => Rc::from(""),
        Data::String(s) => s.clone(),
        _ => Rc::from(value.to_string()),
    };
    Ok(Value::new(target.clone(), Data::String(text)))
}

fn cast_bool(value: &Value, target: &Typeflag, line: usize) -> EvalResult<Value> {
    match value.data {
        Data::Null => Ok(Value::new(target.clone(), Data::Bool(false))),
        Data::Bool(b) => Ok(Value::new(target.clone(), Data::Bool(b))),
        _ => Err(invalid(value, target, "no conversion", line)),
    }
}

fn cast_function(value: &Value, target: &Typeflag, line: usize) -> EvalResult<Value> {
    match &value.data {
        Data::Function(function) => Ok(Value::new(target.clone(), Data::Function(function.clone()))),
        _ => Err(invalid(value, target, "only functions convert to func", line)),
    }
}

fn cast_array(value: &Value, target: &Typeflag, line: usize) -> EvalResult<Value> {
    match &value.data {
        Data::Null => Ok(Value::new(target.clone(), Data::Array(Rc::new(Vec::new())))),
        Data::Array(elements) => match target.parameters.first() {
            Some(element) => {
                let elements = elements.iter()
                                       .map(|e| element.cast(e, line))
                                       .collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::new(target.clone(), Data::Array(Rc::new(elements))))
            },
            None => {
                let typeflag = value.typeflag.clone().unwrap_or_else(|| target.clone());
                Ok(Value::new(typeflag, value.data.clone()))
            },
        },
        _ => Err(invalid(value, target, "only arrays convert to array", line)),
    }
}

fn format_any(value: &Value) -> String {
    value.unwrapped().to_string()
}

fn format_payload(value: &Value) -> String {
    match &value.data {
        Data::Null => "null".to_string(),
        Data::Integer(i) => i.to_string(),
        Data::Float(x) => x.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::String(s) => s.to_string(),
        Data::Function(function) => function.to_string(),
        Data::Array(elements) => {
            let elements = elements.iter()
                                   .map(ToString::to_string)
                                   .collect::<Vec<_>>();
            format!("({})", elements.join(", "))
        },
        Data::Reference(target) => target.borrow().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn every_builtin_is_a_kind_of_any() {
        let types = Types::new();
        for datatype in types.all() {
            assert!(datatype.kind_of(&types.any), "{}", datatype.name);
        }
        assert!(!types.int.kind_of(&types.float));
        assert!(!types.any.kind_of(&types.int));
    }

    #[test]
    fn null_casts_to_zero_values() {
        let types = Types::new();
        let zero = |datatype: &DatatypeRef| Typeflag::new(datatype.clone()).cast(&Value::null(), 1)
                                                                           .unwrap()
                                                                           .to_string();

        assert_eq!(zero(&types.int), "0");
        assert_eq!(zero(&types.float), "0");
        assert_eq!(zero(&types.string), "");
        assert_eq!(zero(&types.boolean), "false");
        assert_eq!(zero(&types.array), "()");
        let null = Typeflag::new(types.any.clone()).cast(&Value::null(), 1).unwrap();
        assert_eq!(null.type_name(), "any");
        assert!(null.is_null());
        assert_eq!(null.to_string(), "null");
        assert!(Typeflag::new(types.function.clone()).cast(&Value::null(), 1).is_err());
    }

    #[test]
    fn numeric_casts() {
        let types = Types::new();
        let int = Typeflag::new(types.int.clone());
        let float = Typeflag::new(types.float.clone());

        assert_eq!(int.cast(&types.make_float(3.9), 1).unwrap().to_string(), "3");
        assert_eq!(int.cast(&types.make_string("42"), 1).unwrap().to_string(), "42");
        assert_eq!(float.cast(&types.make_int(2), 1).unwrap().to_string(), "2");
        assert!(int.cast(&types.make_string("abc"), 1).is_err());
        assert!(int.cast(&types.make_bool(true), 1).is_err());
    }

    #[test]
    fn arrays_recast_their_elements() {
        let types = Types::new();
        let array = types.make_array(vec![types.make_int(1), types.make_int(2)], 1).unwrap();
        assert_eq!(array.type_name(), "array<int>");

        let floats = Typeflag::with_parameters(types.array.clone(), vec![Typeflag::new(types.float.clone())]);
        let recast = floats.cast(&array, 1).unwrap();
        assert_eq!(recast.type_name(), "array<float>");
        assert_eq!(recast.to_string(), "(1, 2)");

        let mixed = types.make_array(vec![types.make_int(1), types.make_string("a")], 1).unwrap();
        assert_eq!(mixed.type_name(), "array<any>");
        assert_eq!(mixed.to_string(), "(1, a)");
    }

    #[test]
    fn strings_render_any_value() {
        let types = Types::new();
        let string = Typeflag::new(types.string.clone());
        let wrapped = Typeflag::new(types.any.clone()).cast(&types.make_bool(true), 1).unwrap();

        assert_eq!(string.cast(&wrapped, 1).unwrap().to_string(), "true");
        assert_eq!(string.cast(&types.make_float(1.5), 1).unwrap().type_name(), "string");
    }
}
