//! Conversion between raw document strings and typed values.
//!
//! Scalars go through `FromStr`/`Display`, enums through [`IniEnum`] with a
//! case-insensitive name match, and `Vec<T>` through a forgiving list parser
//! that drops elements it cannot convert.

use crate::error::ConversionError;
use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
    path::PathBuf,
};
use tracing::trace;

/// How lists are split, joined and expanded
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ListFormat {
    /// Character a raw list is split on
    pub separator: char,
    /// String placed between elements when encoding
    pub joiner: String,
    /// Token that expands to every member of an enum element type
    pub wildcard: String,
}

impl Default for ListFormat {
    fn default() -> Self {
        Self {
            separator: ',',
            joiner: ",".to_string(),
            wildcard: "*".to_string(),
        }
    }
}

/// Descriptor of a single (non-list) value type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Scalar {
        type_name: &'static str,
    },
    Enum {
        type_name: &'static str,
        members: &'static [&'static str],
    },
}

impl ElementKind {
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Scalar { type_name } | Self::Enum { type_name, .. } => *type_name,
        }
    }

    /// Accepted member names, empty for scalars
    pub const fn members(&self) -> &'static [&'static str] {
        match self {
            Self::Scalar { .. } => &[],
            Self::Enum { members, .. } => *members,
        }
    }
}

/// Descriptor of a bound property's value type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueKind {
    pub element: ElementKind,
    pub array: bool,
    pub optional: bool,
}

impl ValueKind {
    pub const fn single(element: ElementKind) -> Self {
        Self {
            element,
            array: false,
            optional: false,
        }
    }

    pub const fn array(element: ElementKind) -> Self {
        Self {
            element,
            array: true,
            optional: false,
        }
    }

    pub const fn optional(self) -> Self {
        Self {
            optional: true,
            ..self
        }
    }

    pub const fn is_enum(&self) -> bool {
        matches!(self.element, ElementKind::Enum { .. })
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.element.type_name();
        match (self.array, self.optional) {
            (false, false) => write!(f, "{name}"),
            (true, false) => write!(f, "Vec<{name}>"),
            (false, true) => write!(f, "Option<{name}>"),
            (true, true) => write!(f, "Option<Vec<{name}>>"),
        }
    }
}

/// A type that can be read from and written to a document value
pub trait IniValue: Sized {
    fn kind() -> ValueKind;

    fn decode(raw: &str, format: &ListFormat) -> Result<Self, ConversionError>;

    fn encode(&self, format: &ListFormat) -> String;
}

/// A value that may appear as a list element
pub trait IniScalar: IniValue {
    fn element_kind() -> ElementKind;

    /// Every member in declaration order, for enumerated types
    fn members() -> Option<Vec<Self>> {
        None
    }
}

/// Unit-only enums bound by member name, usually implemented with
/// `#[derive(IniEnum)]`
pub trait IniEnum: Sized + 'static {
    /// Member names in declaration order
    const NAMES: &'static [&'static str];

    fn from_index(index: usize) -> Option<Self>;

    fn index(&self) -> usize;

    fn name(&self) -> &'static str {
        Self::NAMES[self.index()]
    }
}

/// Case-insensitive member lookup used by derived enum codecs
pub fn decode_enum<E: IniEnum>(raw: &str, type_name: &'static str) -> Result<E, ConversionError> {
    let wanted = raw.trim();
    E::NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(wanted))
        .and_then(E::from_index)
        .ok_or_else(|| {
            ConversionError::new(
                raw,
                type_name,
                format!("expected one of: {}", E::NAMES.join(", ")),
            )
        })
}

/// All members of an enum in declaration order
pub fn enum_members<E: IniEnum>() -> Vec<E> {
    (0..E::NAMES.len()).filter_map(E::from_index).collect()
}

/// Parse a list, dropping elements that fail to convert
///
/// For enum elements a raw value equal to the wildcard yields every member.
pub fn decode_list<T: IniScalar>(raw: &str, format: &ListFormat) -> Vec<T> {
    if raw.trim() == format.wildcard
        && let Some(all) = T::members()
    {
        return all;
    }

    raw.split(format.separator)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| match T::decode(part, format) {
            Ok(value) => Some(value),
            Err(err) => {
                trace!(%err, "dropping list element");
                None
            }
        })
        .collect()
}

impl<T: IniScalar> IniValue for Vec<T> {
    fn kind() -> ValueKind {
        ValueKind::array(T::element_kind())
    }

    fn decode(raw: &str, format: &ListFormat) -> Result<Self, ConversionError> {
        Ok(decode_list(raw, format))
    }

    fn encode(&self, format: &ListFormat) -> String {
        self.iter()
            .map(|value| value.encode(format))
            .collect::<Vec<_>>()
            .join(&format.joiner)
    }
}

// An empty value reads as None, and None writes as an empty value
impl<T: IniValue> IniValue for Option<T> {
    fn kind() -> ValueKind {
        T::kind().optional()
    }

    fn decode(raw: &str, format: &ListFormat) -> Result<Self, ConversionError> {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        T::decode(raw, format).map(Some)
    }

    fn encode(&self, format: &ListFormat) -> String {
        self.as_ref()
            .map(|value| value.encode(format))
            .unwrap_or_default()
    }
}

macro_rules! impl_scalar {
    ($($t:ty),* $(,)?) => {$(
        impl IniValue for $t {
            fn kind() -> ValueKind {
                ValueKind::single(<Self as IniScalar>::element_kind())
            }

            fn decode(raw: &str, _format: &ListFormat) -> Result<Self, ConversionError> {
                raw.trim()
                    .parse::<$t>()
                    .map_err(|e| ConversionError::new(raw, stringify!($t), e))
            }

            fn encode(&self, _format: &ListFormat) -> String {
                self.to_string()
            }
        }

        impl IniScalar for $t {
            fn element_kind() -> ElementKind {
                ElementKind::Scalar {
                    type_name: stringify!($t),
                }
            }
        }
    )*};
}

impl_scalar!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char, IpAddr,
    Ipv4Addr, Ipv6Addr, SocketAddr,
);

impl IniValue for bool {
    fn kind() -> ValueKind {
        ValueKind::single(Self::element_kind())
    }

    fn decode(raw: &str, _format: &ListFormat) -> Result<Self, ConversionError> {
        let value = raw.trim();
        if value.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if value.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(ConversionError::new(raw, "bool", "expected 'true' or 'false'"))
        }
    }

    fn encode(&self, _format: &ListFormat) -> String {
        self.to_string()
    }
}

impl IniScalar for bool {
    fn element_kind() -> ElementKind {
        ElementKind::Scalar { type_name: "bool" }
    }
}

impl IniValue for String {
    fn kind() -> ValueKind {
        ValueKind::single(Self::element_kind())
    }

    fn decode(raw: &str, _format: &ListFormat) -> Result<Self, ConversionError> {
        Ok(raw.to_string())
    }

    fn encode(&self, _format: &ListFormat) -> String {
        self.clone()
    }
}

impl IniScalar for String {
    fn element_kind() -> ElementKind {
        ElementKind::Scalar {
            type_name: "String",
        }
    }
}

impl IniValue for PathBuf {
    fn kind() -> ValueKind {
        ValueKind::single(Self::element_kind())
    }

    fn decode(raw: &str, _format: &ListFormat) -> Result<Self, ConversionError> {
        Ok(PathBuf::from(raw.trim()))
    }

    fn encode(&self, _format: &ListFormat) -> String {
        self.display().to_string()
    }
}

impl IniScalar for PathBuf {
    fn element_kind() -> ElementKind {
        ElementKind::Scalar {
            type_name: "PathBuf",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IniEnum;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, IniEnum)]
    enum Level {
        One,
        Two,
        Three,
    }

    fn decode<T: IniValue>(raw: &str) -> Result<T, ConversionError> {
        T::decode(raw, &ListFormat::default())
    }

    #[test]
    fn test_decode_integers() {
        assert_eq!(decode::<i32>("42").unwrap(), 42);
        assert_eq!(decode::<i32>(" -7 ").unwrap(), -7);
        assert_eq!(decode::<u8>("255").unwrap(), 255);
    }

    #[test]
    fn test_decode_integer_failure() {
        let err = decode::<u8>("256").unwrap_err();
        assert_eq!(err.value, "256");
        assert_eq!(err.target, "u8");
    }

    #[test]
    fn test_decode_bool_ignores_case() {
        assert!(decode::<bool>("True").unwrap());
        assert!(!decode::<bool>("FALSE").unwrap());
        assert!(decode::<bool>("yes").is_err());
    }

    #[test]
    fn test_decode_string_keeps_raw() {
        assert_eq!(decode::<String>(" padded ").unwrap(), " padded ");
    }

    #[test]
    fn test_decode_enum_ignores_case() {
        assert_eq!(decode::<Level>("two").unwrap(), Level::Two);
        assert_eq!(decode::<Level>("THREE").unwrap(), Level::Three);
    }

    #[test]
    fn test_decode_enum_failure() {
        let err = decode::<Level>("four").unwrap_err();
        assert_eq!(err.target, "Level");
        assert!(err.reason.contains("One, Two, Three"));
    }

    #[test]
    fn test_enum_names() {
        assert_eq!(Level::NAMES, &["One", "Two", "Three"]);
        assert_eq!(Level::Two.name(), "Two");
        assert_eq!(enum_members::<Level>(), vec![Level::One, Level::Two, Level::Three]);
    }

    #[test]
    fn test_decode_int_list_drops_invalid() {
        let ints: Vec<i32> = decode("1,2,3,asd,4").unwrap();
        assert_eq!(ints, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_decode_string_list_trims() {
        let strings: Vec<String> = decode("hello, world").unwrap();
        assert_eq!(strings, vec!["hello", "world"]);
    }

    #[test]
    fn test_decode_list_drops_empty_segments() {
        let strings: Vec<String> = decode(" a,, ,b, ").unwrap();
        assert_eq!(strings, vec!["a", "b"]);
    }

    #[test]
    fn test_decode_enum_list() {
        let levels: Vec<Level> = decode("One,two").unwrap();
        assert_eq!(levels, vec![Level::One, Level::Two]);
    }

    #[test]
    fn test_decode_enum_wildcard() {
        let levels: Vec<Level> = decode(" * ").unwrap();
        assert_eq!(levels, vec![Level::One, Level::Two, Level::Three]);
    }

    #[test]
    fn test_wildcard_is_not_special_for_scalars() {
        let strings: Vec<String> = decode("*").unwrap();
        assert_eq!(strings, vec!["*"]);

        let ints: Vec<i32> = decode("*").unwrap();
        assert!(ints.is_empty());
    }

    #[test]
    fn test_decode_all_invalid_list_is_empty() {
        let ints: Vec<i32> = decode("a,b,c").unwrap();
        assert!(ints.is_empty());
    }

    #[test]
    fn test_custom_list_format() {
        let format = ListFormat {
            separator: ';',
            joiner: "; ".to_string(),
            wildcard: "all".to_string(),
        };

        let ints = Vec::<u16>::decode("1;2, 3;4", &format).unwrap();
        assert_eq!(ints, vec![1, 4]);

        let levels = Vec::<Level>::decode("ALL", &format).unwrap();
        assert!(levels.is_empty());
        let levels = Vec::<Level>::decode("all", &format).unwrap();
        assert_eq!(levels.len(), 3);

        assert_eq!(vec![1u16, 2].encode(&format), "1; 2");
    }

    #[test]
    fn test_encode_list() {
        let format = ListFormat::default();
        assert_eq!(vec![Level::One, Level::Three].encode(&format), "One,Three");
        assert_eq!(Vec::<i32>::new().encode(&format), "");
    }

    #[test]
    fn test_option_round_trip() {
        let format = ListFormat::default();
        assert_eq!(decode::<Option<u16>>("").unwrap(), None);
        assert_eq!(decode::<Option<u16>>("80").unwrap(), Some(80));
        assert!(decode::<Option<u16>>("x").is_err());
        assert_eq!(None::<u16>.encode(&format), "");
        assert_eq!(Some(3u16).encode(&format), "3");
    }

    #[test]
    fn test_value_kind_display() {
        assert_eq!(<u16 as IniValue>::kind().to_string(), "u16");
        assert_eq!(Vec::<Level>::kind().to_string(), "Vec<Level>");
        assert_eq!(Option::<String>::kind().to_string(), "Option<String>");
        assert!(Vec::<Level>::kind().is_enum());
        assert!(Vec::<Level>::kind().array);
        assert_eq!(Vec::<Level>::kind().element.members(), &["One", "Two", "Three"]);
        assert!(<u16 as IniValue>::kind().element.members().is_empty());
    }

    #[test]
    fn test_decode_addresses_and_paths() {
        let addr: SocketAddr = decode("127.0.0.1:8080").unwrap();
        assert_eq!(addr.port(), 8080);
        let path: PathBuf = decode(" /etc/app.ini ").unwrap();
        assert_eq!(path, PathBuf::from("/etc/app.ini"));
    }
}
