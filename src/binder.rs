use crate::{
    binding::{IniBind, SectionStrategy, TypeBinding},
    codec::ListFormat,
    document::{Document, KeyValueCollection, Section},
    error::{BindError, FieldFailure},
    section::{self, Located, Source},
};
use tracing::debug;

/// Reads typed values out of documents and writes them back
///
/// A binder holds no state besides its [`ListFormat`]; build one wherever it
/// is needed. Per-type metadata is cached by [`IniBind::type_binding`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Binder {
    #[cfg_attr(feature = "serde", serde(default))]
    format: ListFormat,
}

impl Binder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(format: ListFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> &ListFormat {
        &self.format
    }

    /// Populate the bound fields of `object` from `source`
    ///
    /// Does nothing if the type's section is not in the document. A required
    /// property that is missing or fails to convert aborts the fill; fields
    /// handled before it keep their new values.
    pub fn fill<'a, T: IniBind>(
        &self,
        source: impl Into<Source<'a>>,
        object: &mut T,
    ) -> Result<(), BindError> {
        let binding = T::type_binding();
        match section::locate(source.into(), binding, object, &self.format) {
            Some(located) => self.fill_located(binding, located, object),
            None => {
                debug!(
                    type_name = binding.type_name(),
                    "no matching section, value left unchanged"
                );
                Ok(())
            }
        }
    }

    fn fill_located<T>(
        &self,
        binding: &TypeBinding<T>,
        located: Located<'_>,
        object: &mut T,
    ) -> Result<(), BindError> {
        for property in binding.properties() {
            let outcome = match located.keys.get(property.key()) {
                Some(raw) => property
                    .decode_into(object, raw, &self.format)
                    .map_err(FieldFailure::from),
                None => Err(FieldFailure::Missing),
            };

            let Err(cause) = outcome else {
                continue;
            };

            if property.is_required() {
                return Err(BindError::RequiredField {
                    key: property.key().to_string(),
                    section: located.section.map(str::to_string),
                    cause,
                });
            }

            if property.apply_default(object) {
                debug!(key = property.key(), %cause, "default value applied");
            } else {
                debug!(key = property.key(), %cause, "property left unchanged");
            }
        }

        if let (Some(key), Some(section)) = (binding.key(), located.section)
            && *binding.strategy() != SectionStrategy::Global
        {
            key.decode_into(object, section, &self.format)
                .map_err(|source| BindError::SectionName {
                    section: section.to_string(),
                    source,
                })?;
        }

        Ok(())
    }

    /// Default-construct a `T` and fill it from `source`
    pub fn create<'a, T: IniBind + Default>(
        &self,
        source: impl Into<Source<'a>>,
    ) -> Result<T, BindError> {
        let mut object = T::default();
        self.fill(source, &mut object)?;
        Ok(object)
    }

    /// Create one value per section, in document order
    pub fn create_all<T: IniBind + Default>(&self, document: &Document) -> Result<Vec<T>, BindError> {
        document
            .sections()
            .map(|section| self.create(section))
            .collect()
    }

    /// Encode every bound field of `object` under its key name
    pub fn build_keys<T: IniBind>(&self, object: &T) -> KeyValueCollection {
        T::type_binding()
            .properties()
            .iter()
            .map(|property| {
                (
                    property.key().to_string(),
                    property.encode_from(object, &self.format),
                )
            })
            .collect()
    }

    /// Build the section `object` belongs to
    ///
    /// Fails for types bound to the global collection, which have no section.
    pub fn build_section<T: IniBind>(&self, object: &T) -> Result<Section, BindError> {
        let binding = T::type_binding();
        let name = section::name(object, binding, &self.format).ok_or(BindError::GlobalSection {
            type_name: binding.type_name(),
        })?;
        Ok(Section::with_keys(name, self.build_keys(object)))
    }

    /// Build a new document holding `object`
    pub fn build_document<T: IniBind>(&self, object: &T) -> Document {
        let mut document = Document::new();
        self.write_into(&mut document, object);
        document
    }

    /// Build a document from many values; values naming the same section share it
    pub fn build_document_all<'o, T, I>(&self, objects: I) -> Document
    where
        T: IniBind,
        I: IntoIterator<Item = &'o T>,
    {
        let mut document = Document::new();
        for object in objects {
            self.write_into(&mut document, object);
        }
        document
    }

    /// Insert the bound keys of `object` into an existing document
    ///
    /// The target section is created when missing. Existing keys are
    /// overwritten; nothing is removed.
    pub fn write_into<T: IniBind>(&self, document: &mut Document, object: &T) {
        let binding = T::type_binding();
        let keys = self.build_keys(object);
        match section::name(object, binding, &self.format) {
            Some(name) => document.get_or_insert_section(&name).keys_mut().extend(keys),
            None => document.global_mut().extend(keys),
        }
    }
}
