//! Typed node values.
//!
//! Node values are a tagged union rather than erased trait objects so the
//! binder can compare a rule's declared output type against the type other
//! rules already declared for the same node. Arbitrary Rust types still fit
//! through [`Value::object`], checked by type name.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// The value held by a model node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// No payload. Structural containers that only hold children carry this.
	Unit,
	Bool(bool),
	Int(i64),
	String(String),
	List(Vec<Value>),
	Map(BTreeMap<String, Value>),
	/// Arbitrary shared Rust object.
	Object(ObjectValue),
}

impl Value {
	/// Wraps an arbitrary Rust value.
	pub fn object<T: Any + Send + Sync>(value: T) -> Self {
		Value::Object(ObjectValue {
			type_name: std::any::type_name::<T>(),
			inner: Arc::new(value),
		})
	}

	/// Returns the [`ValueType`] tag of this value.
	pub fn value_type(&self) -> ValueType {
		match self {
			Value::Unit => ValueType::Unit,
			Value::Bool(_) => ValueType::Bool,
			Value::Int(_) => ValueType::Int,
			Value::String(_) => ValueType::String,
			Value::List(_) => ValueType::List,
			Value::Map(_) => ValueType::Map,
			Value::Object(obj) => ValueType::Object(obj.type_name),
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			Value::Int(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[Value]> {
		match self {
			Value::List(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
		match self {
			Value::Map(v) => Some(v),
			_ => None,
		}
	}

	/// Mutable access to a list payload.
	pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
		match self {
			Value::List(v) => Some(v),
			_ => None,
		}
	}

	/// Mutable access to a map payload.
	pub fn as_map_mut(&mut self) -> Option<&mut BTreeMap<String, Value>> {
		match self {
			Value::Map(v) => Some(v),
			_ => None,
		}
	}

	/// Borrows an object payload as `T`.
	pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
		match self {
			Value::Object(obj) => obj.inner.downcast_ref::<T>(),
			_ => None,
		}
	}

	/// Returns true if this value carries the given type tag.
	pub fn matches_type(&self, ty: ValueType) -> bool {
		self.value_type() == ty
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Bool(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Int(v)
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::String(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::String(v.to_string())
	}
}

impl From<Vec<Value>> for Value {
	fn from(v: Vec<Value>) -> Self {
		Value::List(v)
	}
}

impl From<BTreeMap<String, Value>> for Value {
	fn from(v: BTreeMap<String, Value>) -> Self {
		Value::Map(v)
	}
}

/// Shared handle to an arbitrary Rust object stored in the model.
#[derive(Clone)]
pub struct ObjectValue {
	type_name: &'static str,
	inner: Arc<dyn Any + Send + Sync>,
}

impl ObjectValue {
	/// Rust type name of the wrapped object.
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}
}

impl PartialEq for ObjectValue {
	fn eq(&self, other: &Self) -> bool {
		self.type_name == other.type_name && Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl fmt::Debug for ObjectValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ObjectValue").field(&self.type_name).finish()
	}
}

/// Type tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
	Unit,
	Bool,
	Int,
	String,
	List,
	Map,
	/// An object of the named Rust type.
	Object(&'static str),
}

impl ValueType {
	/// Type tag for objects of type `T`.
	pub fn object<T: Any + Send + Sync>() -> Self {
		ValueType::Object(std::any::type_name::<T>())
	}
}

impl fmt::Display for ValueType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ValueType::Unit => f.write_str("unit"),
			ValueType::Bool => f.write_str("bool"),
			ValueType::Int => f.write_str("int"),
			ValueType::String => f.write_str("string"),
			ValueType::List => f.write_str("list"),
			ValueType::Map => f.write_str("map"),
			ValueType::Object(name) => write!(f, "object<{name}>"),
		}
	}
}

// Seal the FromValue trait to prevent external implementations.
mod sealed {
	use std::collections::BTreeMap;

	pub trait Sealed {}
	impl Sealed for bool {}
	impl Sealed for i64 {}
	impl Sealed for String {}
	impl Sealed for Vec<super::Value> {}
	impl Sealed for BTreeMap<String, super::Value> {}
	impl Sealed for super::Value {}
}

/// Types that can be extracted from a [`Value`].
pub trait FromValue: sealed::Sealed + Sized {
	/// Extracts the value, returning `None` if the type doesn't match.
	fn from_value(value: &Value) -> Option<Self>;

	/// Name used in type mismatch diagnostics.
	fn expected() -> &'static str;
}

impl FromValue for bool {
	fn from_value(value: &Value) -> Option<Self> {
		value.as_bool()
	}

	fn expected() -> &'static str {
		"bool"
	}
}

impl FromValue for i64 {
	fn from_value(value: &Value) -> Option<Self> {
		value.as_int()
	}

	fn expected() -> &'static str {
		"int"
	}
}

impl FromValue for String {
	fn from_value(value: &Value) -> Option<Self> {
		value.as_str().map(str::to_string)
	}

	fn expected() -> &'static str {
		"string"
	}
}

impl FromValue for Vec<Value> {
	fn from_value(value: &Value) -> Option<Self> {
		value.as_list().map(<[Value]>::to_vec)
	}

	fn expected() -> &'static str {
		"list"
	}
}

impl FromValue for BTreeMap<String, Value> {
	fn from_value(value: &Value) -> Option<Self> {
		value.as_map().cloned()
	}

	fn expected() -> &'static str {
		"map"
	}
}

impl FromValue for Value {
	fn from_value(value: &Value) -> Option<Self> {
		Some(value.clone())
	}

	fn expected() -> &'static str {
		"any"
	}
}
