use crate::{
    codec::{IniValue, ListFormat, ValueKind},
    error::{ConversionError, RegistrationError},
};
use std::{fmt, fs, path::Path};
use tracing::debug;

type DecodeFn<T> =
    Box<dyn Fn(&mut T, &str, &ListFormat) -> Result<(), ConversionError> + Send + Sync>;
type EncodeFn<T> = Box<dyn Fn(&T, &ListFormat) -> String + Send + Sync>;
type ApplyFn<T> = Box<dyn Fn(&mut T) + Send + Sync>;

/// Types whose fields are bound to document keys
///
/// Usually implemented with `#[derive(IniBind)]`. Manual implementations
/// build their [`TypeBinding`] once and keep it in a `OnceLock`.
pub trait IniBind: Sized + 'static {
    fn type_binding() -> &'static TypeBinding<Self>;
}

/// Where a type's keys live in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionStrategy {
    /// Always the named section
    Fixed(String),
    /// The unnamed global collection
    Global,
    /// A section named by the key property's value
    Dynamic,
}

/// Which declaration a property binding came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationStyle {
    /// Key name defaults to the field name, no default value
    DataMember,
    /// Explicit key name, may carry a default value
    ConfigurationProperty,
}

/// Accessor pair for one field of `T`
pub struct Field<T, V> {
    get: fn(&T) -> &V,
    get_mut: fn(&mut T) -> &mut V,
}

impl<T, V> Field<T, V> {
    pub const fn new(get: fn(&T) -> &V, get_mut: fn(&mut T) -> &mut V) -> Self {
        Self { get, get_mut }
    }
}

impl<T, V> Clone for Field<T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, V> Copy for Field<T, V> {}

fn decode_fn<T, V: IniValue>(field: Field<T, V>) -> DecodeFn<T>
where
    T: 'static,
    V: 'static,
{
    Box::new(move |target, raw, format| {
        *(field.get_mut)(target) = V::decode(raw, format)?;
        Ok(())
    })
}

fn encode_fn<T, V: IniValue>(field: Field<T, V>) -> EncodeFn<T>
where
    T: 'static,
    V: 'static,
{
    Box::new(move |source, format| (field.get)(source).encode(format))
}

struct DefaultValue<T> {
    display: String,
    apply: ApplyFn<T>,
}

/// How one field maps to one key
pub struct PropertyBinding<T> {
    property: &'static str,
    key: String,
    kind: ValueKind,
    style: DeclarationStyle,
    required: bool,
    default: Option<DefaultValue<T>>,
    decode: DecodeFn<T>,
    encode: EncodeFn<T>,
}

impl<T> PropertyBinding<T> {
    /// Name of the bound field
    pub fn property(&self) -> &'static str {
        self.property
    }

    /// Key looked up in the key/value collection
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn style(&self) -> DeclarationStyle {
        self.style
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// The declared default rendered as a document value
    pub fn default_display(&self) -> Option<&str> {
        self.default.as_ref().map(|d| d.display.as_str())
    }

    pub(crate) fn decode_into(
        &self,
        target: &mut T,
        raw: &str,
        format: &ListFormat,
    ) -> Result<(), ConversionError> {
        (self.decode)(target, raw, format)
    }

    /// Assign the declared default, returning `false` if there is none
    pub(crate) fn apply_default(&self, target: &mut T) -> bool {
        match &self.default {
            Some(default) => {
                (default.apply)(target);
                true
            }
            None => false,
        }
    }

    pub(crate) fn encode_from(&self, source: &T, format: &ListFormat) -> String {
        (self.encode)(source, format)
    }
}

impl<T> fmt::Debug for PropertyBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyBinding")
            .field("property", &self.property)
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("style", &self.style)
            .field("required", &self.required)
            .field("default", &self.default_display())
            .finish()
    }
}

/// The field that names a section on write and receives its name on read
pub struct KeyBinding<T> {
    property: &'static str,
    kind: ValueKind,
    decode: DecodeFn<T>,
    encode: EncodeFn<T>,
}

impl<T> KeyBinding<T> {
    pub fn property(&self) -> &'static str {
        self.property
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub(crate) fn decode_into(
        &self,
        target: &mut T,
        raw: &str,
        format: &ListFormat,
    ) -> Result<(), ConversionError> {
        (self.decode)(target, raw, format)
    }

    pub(crate) fn encode_from(&self, source: &T, format: &ListFormat) -> String {
        (self.encode)(source, format)
    }
}

impl<T> fmt::Debug for KeyBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyBinding")
            .field("property", &self.property)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Resolved binding metadata for a type
pub struct TypeBinding<T> {
    type_name: &'static str,
    strategy: SectionStrategy,
    properties: Vec<PropertyBinding<T>>,
    key: Option<KeyBinding<T>>,
}

impl<T: 'static> TypeBinding<T> {
    pub fn builder() -> TypeBindingBuilder<T> {
        TypeBindingBuilder::new(std::any::type_name::<T>())
    }
}

impl<T> TypeBinding<T> {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn strategy(&self) -> &SectionStrategy {
        &self.strategy
    }

    /// Bound properties in declaration order
    pub fn properties(&self) -> &[PropertyBinding<T>] {
        &self.properties
    }

    pub fn key(&self) -> Option<&KeyBinding<T>> {
        self.key.as_ref()
    }

    /// Binding of the named field, if it is bound
    pub fn property(&self, property: &str) -> Option<&PropertyBinding<T>> {
        self.properties.iter().find(|p| p.property == property)
    }

    /// Binding for a document key, ignoring case
    pub fn find_key(&self, key: &str) -> Option<&PropertyBinding<T>> {
        self.properties
            .iter()
            .find(|p| p.key.eq_ignore_ascii_case(key))
    }

    /// Render the bound keys as a markdown table
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        match &self.strategy {
            SectionStrategy::Fixed(name) => md.push_str(&format!("## Section `[{name}]`\n\n")),
            SectionStrategy::Global => md.push_str("## Global keys\n\n"),
            SectionStrategy::Dynamic => {
                let property = self.key.as_ref().map_or("?", |k| k.property);
                md.push_str(&format!("## Sections named by `{property}`\n\n"));
            }
        }

        md.push_str("| Key | Required | Default | Type | Values |\n");
        md.push_str("|-----|----------|---------|------|--------|\n");
        for property in &self.properties {
            let required_str = if property.required { "Yes" } else { "No" };
            let default_display = match property.default_display() {
                Some(value) if !value.is_empty() => value.to_string(),
                _ => "-".to_string(),
            };
            let members = property.kind.element.members();
            let values_display = if members.is_empty() {
                "-".to_string()
            } else {
                members.join(", ")
            };
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                property.key, required_str, default_display, property.kind, values_display
            ));
        }

        md
    }

    /// Write [`to_markdown`](Self::to_markdown) output to a file
    pub fn write_docs(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        fs::write(path, self.to_markdown())
    }
}

impl<T> fmt::Debug for TypeBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeBinding")
            .field("type_name", &self.type_name)
            .field("strategy", &self.strategy)
            .field("properties", &self.properties)
            .field("key", &self.key)
            .finish()
    }
}

/// Data-member style declaration: key name defaults to the field name
pub struct DataMember<T, V> {
    property: &'static str,
    key: Option<String>,
    required: bool,
    field: Field<T, V>,
}

impl<T, V> DataMember<T, V> {
    pub fn new(property: &'static str, field: Field<T, V>) -> Self {
        Self {
            property,
            key: None,
            required: false,
            field,
        }
    }

    pub fn name(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Configuration-property style declaration: explicit key name, optional default
pub struct ConfigProperty<T, V> {
    property: &'static str,
    key: String,
    required: bool,
    default: Option<DefaultValue<T>>,
    field: Field<T, V>,
}

impl<T, V> ConfigProperty<T, V> {
    pub fn new(key: impl Into<String>, property: &'static str, field: Field<T, V>) -> Self {
        Self {
            property,
            key: key.into(),
            required: false,
            default: None,
            field,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl<T: 'static, V> ConfigProperty<T, V>
where
    V: IniValue + Clone + Send + Sync + 'static,
{
    /// Value assigned when the key is missing or fails to convert
    pub fn default(mut self, value: V) -> Self {
        let field = self.field;
        self.default = Some(DefaultValue {
            display: value.encode(&ListFormat::default()),
            apply: Box::new(move |target: &mut T| *(field.get_mut)(target) = value.clone()),
        });
        self
    }
}

/// Registers properties and builds a [`TypeBinding`]
///
/// # Example
/// ```rust
/// use ini_bindr::{ConfigProperty, DataMember, Field, TypeBinding};
///
/// #[derive(Default)]
/// struct Server {
///     host: String,
///     port: u16,
/// }
///
/// const HOST: Field<Server, String> = Field::new(|s| &s.host, |s| &mut s.host);
/// const PORT: Field<Server, u16> = Field::new(|s| &s.port, |s| &mut s.port);
///
/// let binding = TypeBinding::<Server>::builder()
///     .section("server")
///     .data_member(DataMember::new("host", HOST).required())
///     .config_property(ConfigProperty::new("Port", "port", PORT).default(8080))
///     .build()
///     .unwrap();
///
/// assert_eq!(binding.properties().len(), 2);
/// ```
pub struct TypeBindingBuilder<T> {
    type_name: &'static str,
    section: Option<String>,
    properties: Vec<PropertyBinding<T>>,
    key: Option<KeyBinding<T>>,
    errors: Vec<RegistrationError>,
}

impl<T: 'static> TypeBindingBuilder<T> {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            section: None,
            properties: Vec::new(),
            key: None,
            errors: Vec::new(),
        }
    }

    /// Bind the type to a fixed section
    pub fn section(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if name.is_empty() {
            self.errors.push(RegistrationError::EmptySectionName);
        }
        self.section = Some(name);
        self
    }

    pub fn data_member<V>(mut self, member: DataMember<T, V>) -> Self
    where
        V: IniValue + 'static,
    {
        let key = member
            .key
            .unwrap_or_else(|| member.property.to_string());
        self.push(PropertyBinding {
            property: member.property,
            key,
            kind: V::kind(),
            style: DeclarationStyle::DataMember,
            required: member.required,
            default: None,
            decode: decode_fn(member.field),
            encode: encode_fn(member.field),
        });
        self
    }

    pub fn config_property<V>(mut self, property: ConfigProperty<T, V>) -> Self
    where
        V: IniValue + 'static,
    {
        if property.required && property.default.is_some() {
            self.errors.push(RegistrationError::RequiredWithDefault {
                property: property.property,
            });
        }

        self.push(PropertyBinding {
            property: property.property,
            key: property.key,
            kind: V::kind(),
            style: DeclarationStyle::ConfigurationProperty,
            required: property.required,
            default: property.default,
            decode: decode_fn(property.field),
            encode: encode_fn(property.field),
        });
        self
    }

    /// Mark the field that names the section
    ///
    /// Only one key property is allowed per type.
    pub fn key<V>(mut self, property: &'static str, field: Field<T, V>) -> Self
    where
        V: IniValue + 'static,
    {
        match &self.key {
            Some(first) => self.errors.push(RegistrationError::DuplicateKeyProperty {
                first: first.property,
                second: property,
            }),
            None => {
                self.key = Some(KeyBinding {
                    property,
                    kind: V::kind(),
                    decode: decode_fn(field),
                    encode: encode_fn(field),
                });
            }
        }
        self
    }

    fn push(&mut self, binding: PropertyBinding<T>) {
        if binding.key.is_empty() {
            self.errors.push(RegistrationError::EmptyKeyName {
                property: binding.property,
            });
        }

        // A data-member declaration takes priority over any other declaration
        // of the same field; otherwise the first declaration stays.
        match self
            .properties
            .iter()
            .position(|p| p.property == binding.property)
        {
            Some(index)
                if binding.style == DeclarationStyle::DataMember
                    && self.properties[index].style != DeclarationStyle::DataMember =>
            {
                self.properties[index] = binding;
            }
            Some(_) => {}
            None => self.properties.push(binding),
        }
    }

    pub fn build(mut self) -> Result<TypeBinding<T>, RegistrationError> {
        if !self.errors.is_empty() {
            return Err(self.errors.remove(0));
        }

        let strategy = match self.section {
            Some(name) => SectionStrategy::Fixed(name),
            None if self.key.is_some() => SectionStrategy::Dynamic,
            None => SectionStrategy::Global,
        };

        debug!(
            type_name = self.type_name,
            properties = self.properties.len(),
            ?strategy,
            "type binding registered"
        );

        Ok(TypeBinding {
            type_name: self.type_name,
            strategy,
            properties: self.properties,
            key: self.key,
        })
    }
}
