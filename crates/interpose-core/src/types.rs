//! JVM field types.
//!
//! A [`JType`] renders three ways:
//! - descriptor (`I`, `Ljava/lang/String;`, `[J`) for class files
//! - source-style name (`int`, `java.lang.String`, `long[]`) for humans and JSON
//! - internal name (`java/lang/String`, `[J`) for `CONSTANT_Class` entries

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors from parsing type names and descriptors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TypeParseError {
    #[error("empty type name")]
    Empty,
    #[error("invalid type name '{0}'")]
    InvalidName(String),
    #[error("'void' cannot be an array element")]
    VoidArray,
    #[error("invalid descriptor '{0}'")]
    InvalidDescriptor(String),
}

/// A JVM type as it appears in method signatures.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum JType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    /// Only valid as a return type.
    Void,
    /// Class or interface, by binary name (`java.lang.String`).
    Object(String),
    Array(Box<JType>),
}

impl JType {
    pub fn object(binary_name: impl Into<String>) -> Self {
        Self::Object(binary_name.into())
    }

    pub fn array_of(element: JType) -> Self {
        Self::Array(Box::new(element))
    }

    /// `java.lang.Object`.
    pub fn java_object() -> Self {
        Self::object("java.lang.Object")
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(self, Self::Object(_) | Self::Array(_) | Self::Void)
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Array(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// Local variable / operand stack slots occupied by a value of this type.
    pub fn slots(&self) -> u16 {
        match self {
            Self::Void => 0,
            Self::Long | Self::Double => 2,
            _ => 1,
        }
    }

    /// Append the descriptor form to `out`.
    pub fn write_descriptor(&self, out: &mut String) {
        match self {
            Self::Boolean => out.push('Z'),
            Self::Byte => out.push('B'),
            Self::Char => out.push('C'),
            Self::Short => out.push('S'),
            Self::Int => out.push('I'),
            Self::Long => out.push('J'),
            Self::Float => out.push('F'),
            Self::Double => out.push('D'),
            Self::Void => out.push('V'),
            Self::Object(name) => {
                out.push('L');
                out.extend(name.chars().map(|c| if c == '.' { '/' } else { c }));
                out.push(';');
            }
            Self::Array(element) => {
                out.push('[');
                element.write_descriptor(out);
            }
        }
    }

    pub fn descriptor(&self) -> String {
        let mut out = String::new();
        self.write_descriptor(&mut out);
        out
    }

    /// Name usable in a `CONSTANT_Class` entry, `None` for primitives.
    ///
    /// Arrays use their descriptor, objects their slash-separated name.
    pub fn internal_name(&self) -> Option<String> {
        match self {
            Self::Object(name) => Some(name.replace('.', "/")),
            Self::Array(_) => Some(self.descriptor()),
            _ => None,
        }
    }

    /// Name accepted by `Class.forName` (`[Ljava.lang.String;` for arrays).
    pub fn class_for_name(&self) -> Option<String> {
        match self {
            Self::Object(name) => Some(name.clone()),
            Self::Array(_) => Some(self.descriptor().replace('/', ".")),
            _ => None,
        }
    }

    /// Internal name of the canonical wrapper class for a primitive.
    pub fn wrapper(&self) -> Option<&'static str> {
        Some(match self {
            Self::Boolean => "java/lang/Boolean",
            Self::Byte => "java/lang/Byte",
            Self::Char => "java/lang/Character",
            Self::Short => "java/lang/Short",
            Self::Int => "java/lang/Integer",
            Self::Long => "java/lang/Long",
            Self::Float => "java/lang/Float",
            Self::Double => "java/lang/Double",
            _ => return None,
        })
    }

    /// Wrapper accessor that yields the primitive (`intValue`, `booleanValue`, ...).
    pub fn unbox_method(&self) -> Option<&'static str> {
        Some(match self {
            Self::Boolean => "booleanValue",
            Self::Byte => "byteValue",
            Self::Char => "charValue",
            Self::Short => "shortValue",
            Self::Int => "intValue",
            Self::Long => "longValue",
            Self::Float => "floatValue",
            Self::Double => "doubleValue",
            _ => return None,
        })
    }

    /// Parse a single field descriptor, consuming all of `desc`.
    pub fn from_descriptor(desc: &str) -> Result<Self, TypeParseError> {
        let (ty, rest) = Self::parse_descriptor_prefix(desc)?;
        if !rest.is_empty() {
            return Err(TypeParseError::InvalidDescriptor(desc.to_owned()));
        }
        Ok(ty)
    }

    /// Parse a method descriptor `(params)ret`.
    pub fn parse_method_descriptor(desc: &str) -> Result<(Vec<JType>, JType), TypeParseError> {
        let invalid = || TypeParseError::InvalidDescriptor(desc.to_owned());
        let mut rest = desc.strip_prefix('(').ok_or_else(invalid)?;
        let mut params = Vec::new();
        while !rest.starts_with(')') {
            if rest.is_empty() {
                return Err(invalid());
            }
            let (ty, tail) = Self::parse_descriptor_prefix(rest)?;
            if ty.is_void() {
                return Err(invalid());
            }
            params.push(ty);
            rest = tail;
        }
        let ret = Self::from_descriptor(&rest[1..])?;
        Ok((params, ret))
    }

    fn parse_descriptor_prefix(desc: &str) -> Result<(Self, &str), TypeParseError> {
        let invalid = || TypeParseError::InvalidDescriptor(desc.to_owned());
        let mut chars = desc.chars();
        let ty = match chars.next().ok_or_else(invalid)? {
            'Z' => Self::Boolean,
            'B' => Self::Byte,
            'C' => Self::Char,
            'S' => Self::Short,
            'I' => Self::Int,
            'J' => Self::Long,
            'F' => Self::Float,
            'D' => Self::Double,
            'V' => Self::Void,
            'L' => {
                let end = desc.find(';').ok_or_else(invalid)?;
                let name = &desc[1..end];
                if name.is_empty() {
                    return Err(invalid());
                }
                return Ok((Self::Object(name.replace('/', ".")), &desc[end + 1..]));
            }
            '[' => {
                let (element, rest) = Self::parse_descriptor_prefix(&desc[1..])?;
                if element.is_void() {
                    return Err(TypeParseError::VoidArray);
                }
                return Ok((Self::array_of(element), rest));
            }
            _ => return Err(invalid()),
        };
        Ok((ty, &desc[1..]))
    }
}

impl fmt::Display for JType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => f.write_str("boolean"),
            Self::Byte => f.write_str("byte"),
            Self::Char => f.write_str("char"),
            Self::Short => f.write_str("short"),
            Self::Int => f.write_str("int"),
            Self::Long => f.write_str("long"),
            Self::Float => f.write_str("float"),
            Self::Double => f.write_str("double"),
            Self::Void => f.write_str("void"),
            Self::Object(name) => f.write_str(name),
            Self::Array(element) => write!(f, "{element}[]"),
        }
    }
}

impl FromStr for JType {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TypeParseError::Empty);
        }
        if let Some(element) = s.strip_suffix("[]") {
            let element: JType = element.parse()?;
            if element.is_void() {
                return Err(TypeParseError::VoidArray);
            }
            return Ok(Self::array_of(element));
        }
        Ok(match s {
            "boolean" => Self::Boolean,
            "byte" => Self::Byte,
            "char" => Self::Char,
            "short" => Self::Short,
            "int" => Self::Int,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            "void" => Self::Void,
            _ if crate::names::is_valid_binary_name(s) => Self::Object(s.to_owned()),
            _ => return Err(TypeParseError::InvalidName(s.to_owned())),
        })
    }
}

impl TryFrom<String> for JType {
    type Error = TypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<JType> for String {
    fn from(value: JType) -> Self {
        value.to_string()
    }
}
