//! Fixed-length tuples of tagged values.
//!
//! Argument lists and result lists share one trait so that a single generic
//! invocation path covers every arity instead of one type per
//! argument/return count.

use crate::value::{ArgKind, ArgValue, ConvertError, FromArg, IntoArg};

/// Largest tuple length with a [`ValueTuple`] implementation.
pub const MAX_TUPLE_LEN: usize = 8;

/// Failure decoding a list of values into a tuple.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
	/// The list length differs from the tuple length.
	#[error("expected {expected} values, found {found}")]
	Count { expected: usize, found: usize },
	/// One position holds a value of the wrong kind or range.
	#[error("slot {slot}: {source}")]
	Value {
		slot: usize,
		#[source]
		source: ConvertError,
	},
}

/// A Rust tuple whose elements convert to and from [`ArgValue`]s.
pub trait ValueTuple: Sized {
	/// Number of elements.
	const LEN: usize;

	/// Declared kind of every element, in order.
	fn kinds() -> Vec<ArgKind>;

	/// Decodes `values` position by position.
	fn decode(values: Vec<ArgValue>) -> Result<Self, SlotError>;

	/// Encodes the tuple into its positional values.
	fn encode(self) -> Vec<ArgValue>;
}

macro_rules! impl_value_tuple {
	($len:expr; $($idx:tt $ty:ident),*) => {
		impl<$($ty: FromArg + IntoArg),*> ValueTuple for ($($ty,)*) {
			const LEN: usize = $len;

			fn kinds() -> Vec<ArgKind> {
				vec![$(<$ty as FromArg>::kind()),*]
			}

			#[allow(unused_mut, unused_variables)]
			fn decode(values: Vec<ArgValue>) -> Result<Self, SlotError> {
				if values.len() != Self::LEN {
					return Err(SlotError::Count {
						expected: Self::LEN,
						found: values.len(),
					});
				}
				let mut iter = values.into_iter();
				Ok(($(
					{
						let Some(value) = iter.next() else {
							return Err(SlotError::Count {
								expected: Self::LEN,
								found: $idx,
							});
						};
						<$ty as FromArg>::from_arg(value).map_err(|source| SlotError::Value { slot: $idx, source })?
					},
				)*))
			}

			fn encode(self) -> Vec<ArgValue> {
				vec![$(self.$idx.into_arg()),*]
			}
		}
	};
}

impl_value_tuple!(0;);
impl_value_tuple!(1; 0 T0);
impl_value_tuple!(2; 0 T0, 1 T1);
impl_value_tuple!(3; 0 T0, 1 T1, 2 T2);
impl_value_tuple!(4; 0 T0, 1 T1, 2 T2, 3 T3);
impl_value_tuple!(5; 0 T0, 1 T1, 2 T2, 3 T3, 4 T4);
impl_value_tuple!(6; 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5);
impl_value_tuple!(7; 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5, 6 T6);
impl_value_tuple!(8; 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5, 6 T6, 7 T7);
