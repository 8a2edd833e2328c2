//! Remote function registry and invocation handlers.
//!
//! Functions are registered by name, either statically through
//! [`remote_fn!`] or on a [`RegistryBuilder`]. A [`Dispatcher`] executes
//! payloads of any shape against a registry; a [`Shim`] is the typed handler
//! for one fixed shape, such as [`Shim6x2`] for six arguments and two results.
//!
//! # Adding a function
//!
//! 1. Write a function taking `(&Captured, (T0, ..))` and returning `Result<(R0, ..), E>`
//! 2. Register it with `remote_fn!("crate.name" => func)`
//! 3. Build a [`FunctionRef`] naming it and invoke through the matching shim

mod macros;

mod dispatcher;
mod function;
mod handler;
mod registry;
mod shim;

pub use dispatcher::Dispatcher;
pub use function::{ErasedHandler, Function, Signature};
pub use handler::{FunctionReg, FunctionStatic};
#[doc(hidden)]
pub use inventory;
pub use registry::{FUNCTIONS, FunctionRegistry, RegistryBuilder, RegistryError};
pub use remcall_invocation as invocation;
pub use remcall_invocation::{ArgValue, Captured, FunctionRef, InvokeError, Payload};
pub use shim::{Shim, Shim6x2};
