//! Function registry construction and the process-wide accessor.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, LazyLock};

use crate::function::Function;
use crate::handler::{self, FunctionStatic};

/// Registration conflicts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
	#[error("duplicate function `{name}`: registered by {existing}, again by {new}")]
	Duplicate {
		name: String,
		existing: &'static str,
		new: &'static str,
	},
	#[error("function declared as `{declared}` built an entry named `{built}`")]
	NameMismatch { declared: &'static str, built: String },
}

/// Mutable registry under construction.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
	functions: HashMap<String, Function>,
}

impl RegistryBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds one function. Names are unique.
	pub fn register(&mut self, function: Function) -> Result<(), RegistryError> {
		match self.functions.entry(function.name().to_string()) {
			Entry::Occupied(existing) => Err(RegistryError::Duplicate {
				name: function.name().to_string(),
				existing: existing.get().crate_name(),
				new: function.crate_name(),
			}),
			Entry::Vacant(slot) => {
				slot.insert(function);
				Ok(())
			}
		}
	}

	/// Builds and adds one static registration.
	pub fn register_static(&mut self, reg: &FunctionStatic) -> Result<(), RegistryError> {
		let function = (reg.build)();
		if function.name() != reg.name {
			return Err(RegistryError::NameMismatch {
				declared: reg.name,
				built: function.name().to_string(),
			});
		}
		self.register(function)
	}

	/// Adds every function submitted through `remote_fn!`.
	///
	/// Stops at the first conflict; functions registered before it stay.
	pub fn register_builtins(&mut self) -> Result<(), RegistryError> {
		handler::submitted().try_for_each(|reg| self.register_static(reg))
	}

	/// Number of registered functions.
	pub fn len(&self) -> usize {
		self.functions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.functions.is_empty()
	}

	/// Freezes the builder.
	pub fn build(self) -> FunctionRegistry {
		FunctionRegistry {
			functions: Arc::new(self.functions),
		}
	}
}

/// Immutable, cheaply cloneable function table.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
	functions: Arc<HashMap<String, Function>>,
}

impl FunctionRegistry {
	/// Returns a builder for a new registry.
	pub fn builder() -> RegistryBuilder {
		RegistryBuilder::new()
	}

	/// Looks up a function by name.
	pub fn get(&self, name: &str) -> Option<&Function> {
		self.functions.get(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.functions.contains_key(name)
	}

	/// Registered names, sorted.
	pub fn names(&self) -> Vec<&str> {
		let mut names: Vec<_> = self.functions.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}

	pub fn len(&self) -> usize {
		self.functions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.functions.is_empty()
	}
}

/// Registry of every function submitted through `remote_fn!`.
///
/// Conflicting submissions are logged and skipped; the first one seen wins.
pub static FUNCTIONS: LazyLock<FunctionRegistry> = LazyLock::new(|| {
	let mut builder = RegistryBuilder::new();
	for reg in handler::submitted() {
		if let Err(e) = builder.register_static(reg) {
			tracing::error!(function = reg.name, crate_name = reg.crate_name, "Builtin registration failed: {}", e);
		}
	}
	tracing::debug!(functions = builder.len(), "registry.init");
	builder.build()
});

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn noop(name: &str) -> Function {
		Function::pure(name, |(): ()| Ok::<_, std::convert::Infallible>(()))
	}

	#[test]
	fn duplicate_names_are_rejected() {
		let mut builder = RegistryBuilder::new();
		builder.register(noop("a")).expect("first registration");
		let err = builder.register(noop("a").with_crate("other-crate")).expect_err("second registration");
		assert_eq!(
			err,
			RegistryError::Duplicate {
				name: "a".into(),
				existing: "remcall-registry",
				new: "other-crate",
			}
		);
		assert_eq!(builder.len(), 1);
	}

	#[test]
	fn frozen_registry_lists_sorted_names() {
		let mut builder = FunctionRegistry::builder();
		for name in ["zeta", "alpha", "mid"] {
			builder.register(noop(name)).expect("register");
		}
		let registry = builder.build();
		assert_eq!(registry.names(), vec!["alpha", "mid", "zeta"]);
		assert!(registry.contains("mid"));
		assert!(registry.get("missing").is_none());

		let shared = registry.clone();
		assert_eq!(shared.len(), 3);
	}

	fn build_mislabelled() -> Function {
		noop("other")
	}

	#[test]
	fn static_entry_must_build_its_declared_name() {
		let mut builder = RegistryBuilder::new();
		let mislabelled = FunctionStatic {
			name: "declared",
			crate_name: "remcall-registry",
			build: build_mislabelled,
		};
		assert_eq!(
			builder.register_static(&mislabelled),
			Err(RegistryError::NameMismatch {
				declared: "declared",
				built: "other".into(),
			})
		);
		assert!(builder.is_empty());

		let labelled = FunctionStatic {
			name: "other",
			crate_name: "remcall-registry",
			build: build_mislabelled,
		};
		builder.register_static(&labelled).expect("names agree");
		assert_eq!(builder.build().names(), vec!["other"]);
	}
}
