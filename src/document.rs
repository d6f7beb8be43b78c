use crate::error::BindError;

/// Ordered key/value pairs of one section (or the global section)
///
/// Lookup is ASCII case-insensitive. Setting a key that already exists, in any
/// spelling, replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyValueCollection {
    entries: Vec<(String, String)>,
}

impl KeyValueCollection {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(key))
    }

    /// Value stored under `key`, ignoring case
    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key).map(|i| self.entries[i].1.as_str())
    }

    /// Insert or replace a value, returning the previous one
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Insert a key only if it is not present yet
    ///
    /// Returns `false` and leaves the collection untouched when the key exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.position(&key).is_some() {
            return false;
        }
        self.entries.push((key, value.into()));
        true
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn try_get_value(&self, key: &str) -> Option<&str> {
        self.get(key)
    }

    /// Like [`try_get_value`](Self::try_get_value) but a missing key is an error
    pub fn get_value(&self, key: &str) -> Result<&str, BindError> {
        self.get(key).ok_or_else(|| BindError::KeyNotFound {
            section: None,
            key: key.to_string(),
        })
    }
}

impl IntoIterator for KeyValueCollection {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyValueCollection {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut keys = Self::new();
        keys.extend(iter);
        keys
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for KeyValueCollection {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

/// A named key/value collection inside a [`Document`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Section {
    name: String,
    keys: KeyValueCollection,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_keys(name, KeyValueCollection::new())
    }

    pub fn with_keys(name: impl Into<String>, keys: KeyValueCollection) -> Self {
        Self {
            name: name.into(),
            keys,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keys(&self) -> &KeyValueCollection {
        &self.keys
    }

    pub fn keys_mut(&mut self) -> &mut KeyValueCollection {
        &mut self.keys
    }

    pub fn into_keys(self) -> KeyValueCollection {
        self.keys
    }
}

/// A parsed configuration document
///
/// Holds uniquely named sections in insertion order plus the unnamed global
/// collection, which is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    global: KeyValueCollection,
    sections: Vec<Section>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global(&self) -> &KeyValueCollection {
        &self.global
    }

    pub fn global_mut(&mut self) -> &mut KeyValueCollection {
        &mut self.global
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.name == name)
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Add an empty section; returns `false` if the name is already taken
    pub fn add_section(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.section(&name).is_some() {
            return false;
        }
        self.sections.push(Section::new(name));
        true
    }

    /// Insert a section, replacing (and returning) one with the same name
    pub fn insert_section(&mut self, section: Section) -> Option<Section> {
        match self.sections.iter_mut().find(|s| s.name == section.name) {
            Some(existing) => Some(std::mem::replace(existing, section)),
            None => {
                self.sections.push(section);
                None
            }
        }
    }

    pub fn get_or_insert_section(&mut self, name: &str) -> &mut Section {
        let index = match self.sections.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.sections.push(Section::new(name));
                self.sections.len() - 1
            }
        };
        &mut self.sections[index]
    }

    /// Number of named sections
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.global.is_empty()
    }

    /// Look up `key` in the named section, or in the global collection when
    /// `section` is `None`
    pub fn try_get_value(&self, section: Option<&str>, key: &str) -> Option<&str> {
        match section {
            Some(name) => self.section(name)?.keys.get(key),
            None => self.global.get(key),
        }
    }

    pub fn get_value(&self, section: Option<&str>, key: &str) -> Result<&str, BindError> {
        self.try_get_value(section, key)
            .ok_or_else(|| BindError::KeyNotFound {
                section: section.map(str::to_string),
                key: key.to_string(),
            })
    }
}
