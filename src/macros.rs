// Support items for the code generated by `#[derive(IniBind)]`.
// The derive itself lives in the ini-bindr-macros crate.

use crate::{binding::TypeBinding, error::RegistrationError};

#[doc(hidden)]
pub use std::sync::OnceLock;

/// Unwrap a binding whose declarations the derive already checked
#[doc(hidden)]
pub fn registered<T>(
    result: Result<TypeBinding<T>, RegistrationError>,
    type_name: &str,
) -> TypeBinding<T> {
    match result {
        Ok(binding) => binding,
        Err(err) => panic!("invalid binding declared on {type_name}: {err}"),
    }
}
