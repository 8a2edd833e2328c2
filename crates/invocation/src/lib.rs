//! Invocation payloads for remote function calls.
//!
//! A remote call travels as a flat slot sequence: the positional arguments,
//! the identity of the handler it is routed to, and the encoded
//! [`FunctionRef`] naming the function and its captured state. This crate
//! holds the data model and codec; dispatch lives in `remcall-registry`.

pub mod codec;
pub mod error;
pub mod function_ref;
pub mod limits;
pub mod payload;
pub mod shape;
pub mod tuple;
pub mod value;

pub use codec::{CALLABLE_FORMAT_VERSION, decode_callable, encode_callable};
pub use error::{BoxError, DecodeError, EncodeError, InvokeError, LimitsError};
pub use function_ref::{CaptureError, Captured, FunctionRef};
pub use limits::{DEFAULT_LIMITS, InvocationLimits};
pub use payload::{Payload, TRAILER_SLOTS};
pub use shape::{HANDLER_PREFIX, Shape};
pub use tuple::{MAX_TUPLE_LEN, SlotError, ValueTuple};
pub use value::{ArgKind, ArgValue, Bytes, ConvertError, FromArg, IntoArg, MAX_VALUE_DEPTH};
