//! Depth-bounded deserialization of [`ArgValue`].
//!
//! Lists nested deeper than [`MAX_VALUE_DEPTH`] are a deserialization error,
//! so decoding untrusted callable bytes uses bounded stack.

use std::fmt;

use serde::de::{self, DeserializeSeed, EnumAccess, SeqAccess, VariantAccess, Visitor};
use serde::{Deserialize, Deserializer};

use super::{ArgValue, MAX_VALUE_DEPTH};

const VARIANTS: &[&str] = &["Unit", "Bool", "Int", "Float", "Str", "Bytes", "List"];

/// Upper bound on elements preallocated from an untrusted length prefix.
const PREALLOC_LIMIT: usize = 1024;

impl<'de> Deserialize<'de> for ArgValue {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		ValueSeed {
			remaining: MAX_VALUE_DEPTH,
		}
		.deserialize(deserializer)
	}
}

/// Variant index, in declaration order.
#[derive(Clone, Copy)]
enum Tag {
	Unit,
	Bool,
	Int,
	Float,
	Str,
	Bytes,
	List,
}

impl<'de> Deserialize<'de> for Tag {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_identifier(TagVisitor)
	}
}

struct TagVisitor;

impl Visitor<'_> for TagVisitor {
	type Value = Tag;

	fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("an argument value variant")
	}

	fn visit_u64<E: de::Error>(self, index: u64) -> Result<Tag, E> {
		Ok(match index {
			0 => Tag::Unit,
			1 => Tag::Bool,
			2 => Tag::Int,
			3 => Tag::Float,
			4 => Tag::Str,
			5 => Tag::Bytes,
			6 => Tag::List,
			_ => return Err(E::invalid_value(de::Unexpected::Unsigned(index), &"variant index 0 <= i < 7")),
		})
	}

	fn visit_str<E: de::Error>(self, name: &str) -> Result<Tag, E> {
		Ok(match name {
			"Unit" => Tag::Unit,
			"Bool" => Tag::Bool,
			"Int" => Tag::Int,
			"Float" => Tag::Float,
			"Str" => Tag::Str,
			"Bytes" => Tag::Bytes,
			"List" => Tag::List,
			_ => return Err(E::unknown_variant(name, VARIANTS)),
		})
	}
}

/// One value allowed to contain at most `remaining` more levels of lists.
struct ValueSeed {
	remaining: usize,
}

impl<'de> DeserializeSeed<'de> for ValueSeed {
	type Value = ArgValue;

	fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<ArgValue, D::Error> {
		deserializer.deserialize_enum("ArgValue", VARIANTS, self)
	}
}

impl<'de> Visitor<'de> for ValueSeed {
	type Value = ArgValue;

	fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("an argument value")
	}

	fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> Result<ArgValue, A::Error> {
		let (tag, variant) = data.variant::<Tag>()?;
		Ok(match tag {
			Tag::Unit => {
				variant.unit_variant()?;
				ArgValue::Unit
			}
			Tag::Bool => ArgValue::Bool(variant.newtype_variant()?),
			Tag::Int => ArgValue::Int(variant.newtype_variant()?),
			Tag::Float => ArgValue::Float(variant.newtype_variant()?),
			Tag::Str => ArgValue::Str(variant.newtype_variant()?),
			Tag::Bytes => ArgValue::Bytes(variant.newtype_variant()?),
			Tag::List => {
				let Some(remaining) = self.remaining.checked_sub(1) else {
					return Err(de::Error::custom(format_args!("lists nested deeper than {MAX_VALUE_DEPTH}")));
				};
				ArgValue::List(variant.newtype_variant_seed(ListSeed { remaining })?)
			}
		})
	}
}

struct ListSeed {
	remaining: usize,
}

impl<'de> DeserializeSeed<'de> for ListSeed {
	type Value = Vec<ArgValue>;

	fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Vec<ArgValue>, D::Error> {
		deserializer.deserialize_seq(self)
	}
}

impl<'de> Visitor<'de> for ListSeed {
	type Value = Vec<ArgValue>;

	fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("a list of argument values")
	}

	fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<ArgValue>, A::Error> {
		let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(PREALLOC_LIMIT));
		while let Some(item) = seq.next_element_seed(ValueSeed {
			remaining: self.remaining,
		})? {
			items.push(item);
		}
		Ok(items)
	}
}
