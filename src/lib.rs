extern crate self as ini_bindr;

pub mod binder;
pub mod binding;
pub mod codec;
pub mod document;
pub mod error;
#[doc(hidden)]
pub mod macros;
pub mod section;

// Re-export main types
pub use binder::Binder;
pub use binding::{
    ConfigProperty, DataMember, DeclarationStyle, Field, IniBind, KeyBinding, PropertyBinding,
    SectionStrategy, TypeBinding, TypeBindingBuilder,
};
pub use codec::{ElementKind, IniEnum, IniScalar, IniValue, ListFormat, ValueKind};
pub use document::{Document, KeyValueCollection, Section};
pub use error::{BindError, ConversionError, FieldFailure, RegistrationError, format_bind_errors};
pub use section::Source;

// Re-export derive macros
pub use ini_bindr_macros::{IniBind, IniEnum};

/// Fill `object` from `source` with a default [`Binder`]
pub fn fill<'a, T: IniBind>(source: impl Into<Source<'a>>, object: &mut T) -> Result<(), BindError> {
    Binder::new().fill(source, object)
}

/// Create a `T` from `source` with a default [`Binder`]
pub fn create<'a, T: IniBind + Default>(source: impl Into<Source<'a>>) -> Result<T, BindError> {
    Binder::new().create(source)
}

/// Build the section for `object` with a default [`Binder`]
pub fn build_section<T: IniBind>(object: &T) -> Result<Section, BindError> {
    Binder::new().build_section(object)
}

/// Build a document holding `object` with a default [`Binder`]
pub fn build_document<T: IniBind>(object: &T) -> Document {
    Binder::new().build_document(object)
}
