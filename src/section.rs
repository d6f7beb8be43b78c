//! Picks the key/value collection a type binds to.

use crate::{
    binding::{SectionStrategy, TypeBinding},
    codec::ListFormat,
    document::{Document, KeyValueCollection, Section},
};
use tracing::trace;

/// Anything a value can be read from
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    Document(&'a Document),
    Section(&'a Section),
    Keys(&'a KeyValueCollection),
}

impl<'a> From<&'a Document> for Source<'a> {
    fn from(document: &'a Document) -> Self {
        Self::Document(document)
    }
}

impl<'a> From<&'a Section> for Source<'a> {
    fn from(section: &'a Section) -> Self {
        Self::Section(section)
    }
}

impl<'a> From<&'a KeyValueCollection> for Source<'a> {
    fn from(keys: &'a KeyValueCollection) -> Self {
        Self::Keys(keys)
    }
}

/// The collection found for a read, with the section name when there is one
#[derive(Debug, Clone, Copy)]
pub struct Located<'a> {
    pub keys: &'a KeyValueCollection,
    pub section: Option<&'a str>,
}

/// Find the collection `object` should be filled from
///
/// A document source resolves through the type's strategy; a dynamic type
/// looks up the section named by the object's current key value. Section
/// and bare collection sources are used as given.
pub fn locate<'a, T>(
    source: Source<'a>,
    binding: &TypeBinding<T>,
    object: &T,
    format: &ListFormat,
) -> Option<Located<'a>> {
    match source {
        Source::Document(document) => match binding.strategy() {
            SectionStrategy::Global => Some(Located {
                keys: document.global(),
                section: None,
            }),
            SectionStrategy::Fixed(name) => document.section(name).map(located),
            SectionStrategy::Dynamic => {
                let name = name(object, binding, format)?;
                trace!(section = %name, "locating section by key value");
                document.section(&name).map(located)
            }
        },
        Source::Section(section) => Some(located(section)),
        Source::Keys(keys) => Some(Located {
            keys,
            section: None,
        }),
    }
}

fn located(section: &Section) -> Located<'_> {
    Located {
        keys: section.keys(),
        section: Some(section.name()),
    }
}

/// Name of the section `object` is written to, `None` for the global collection
pub fn name<T>(object: &T, binding: &TypeBinding<T>, format: &ListFormat) -> Option<String> {
    match binding.strategy() {
        SectionStrategy::Fixed(name) => Some(name.clone()),
        SectionStrategy::Global => None,
        SectionStrategy::Dynamic => binding
            .key()
            .map(|key| key.encode_from(object, format)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{DataMember, Field};

    #[derive(Debug, Default)]
    struct Peer {
        id: u32,
        address: String,
    }

    const ID: Field<Peer, u32> = Field::new(|p| &p.id, |p| &mut p.id);
    const ADDRESS: Field<Peer, String> = Field::new(|p| &p.address, |p| &mut p.address);

    fn document() -> Document {
        let mut doc = Document::new();
        doc.global_mut().set("address", "global");
        doc.insert_section(Section::with_keys(
            "7",
            [("address", "10.0.0.7")].into_iter().collect(),
        ));
        doc.insert_section(Section::with_keys(
            "peers",
            [("address", "fixed")].into_iter().collect(),
        ));
        doc
    }

    #[test]
    fn test_locate_global() {
        let binding = TypeBinding::<Peer>::builder()
            .data_member(DataMember::new("address", ADDRESS))
            .build()
            .unwrap();
        let doc = document();

        let found = locate((&doc).into(), &binding, &Peer::default(), &ListFormat::default())
            .unwrap();
        assert_eq!(found.keys.get("address"), Some("global"));
        assert_eq!(found.section, None);
    }

    #[test]
    fn test_locate_fixed() {
        let binding = TypeBinding::<Peer>::builder()
            .section("peers")
            .data_member(DataMember::new("address", ADDRESS))
            .build()
            .unwrap();
        let doc = document();

        let found = locate((&doc).into(), &binding, &Peer::default(), &ListFormat::default())
            .unwrap();
        assert_eq!(found.keys.get("address"), Some("fixed"));
        assert_eq!(found.section, Some("peers"));
    }

    #[test]
    fn test_locate_fixed_missing_section() {
        let binding = TypeBinding::<Peer>::builder()
            .section("absent")
            .build()
            .unwrap();
        let doc = document();

        assert!(locate((&doc).into(), &binding, &Peer::default(), &ListFormat::default()).is_none());
    }

    #[test]
    fn test_locate_dynamic_uses_key_value() {
        let binding = TypeBinding::<Peer>::builder()
            .key("id", ID)
            .data_member(DataMember::new("address", ADDRESS))
            .build()
            .unwrap();
        let doc = document();
        let format = ListFormat::default();

        let peer = Peer {
            id: 7,
            ..Peer::default()
        };
        let found = locate((&doc).into(), &binding, &peer, &format).unwrap();
        assert_eq!(found.keys.get("address"), Some("10.0.0.7"));

        let stranger = Peer {
            id: 8,
            ..Peer::default()
        };
        assert!(locate((&doc).into(), &binding, &stranger, &format).is_none());
    }

    #[test]
    fn test_locate_section_source() {
        let binding = TypeBinding::<Peer>::builder().build().unwrap();
        let doc = document();
        let section = doc.section("7").unwrap();

        let found = locate(section.into(), &binding, &Peer::default(), &ListFormat::default())
            .unwrap();
        assert_eq!(found.section, Some("7"));
    }

    #[test]
    fn test_name() {
        let format = ListFormat::default();
        let peer = Peer {
            id: 42,
            ..Peer::default()
        };

        let fixed = TypeBinding::<Peer>::builder().section("peers").build().unwrap();
        assert_eq!(name(&peer, &fixed, &format).as_deref(), Some("peers"));

        let global = TypeBinding::<Peer>::builder().build().unwrap();
        assert_eq!(name(&peer, &global, &format), None);

        let dynamic = TypeBinding::<Peer>::builder().key("id", ID).build().unwrap();
        assert_eq!(name(&peer, &dynamic, &format).as_deref(), Some("42"));
        assert_eq!(name(&Peer::default(), &dynamic, &format).as_deref(), Some("0"));
    }
}
