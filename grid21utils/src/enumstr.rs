//!
//! # Enum-String Mapping Module
//!
//! Defines the [enumstr] macro and paired [EnumStr] trait,
//! mapping fieldless enums to and from a fixed set of strings.
//! Policy and kind names in design files and on the command line
//! are written as these strings.
//!
//! Example:
//!
//! ```rust
//! use grid21utils::{enumstr, EnumStr};
//!
//! enumstr!(
//!     /// # Track Sides
//!     Side {
//!         Lo: "lo",
//!         Hi: "hi",
//!     }
//! );
//! assert_eq!(Side::from_str("hi"), Some(Side::Hi));
//! assert_eq!(Side::Lo.to_string(), "lo");
//! assert_eq!(Side::variants(), &[Side::Lo, Side::Hi]);
//! ```
//!

///
/// # String-Enumeration Trait
///
/// * `to_str(&self) -> &'static str` converts the enum to its string value.
/// * `from_str(&str) -> Option<Self>` does the opposite.
///
/// Primarily implemented by the [enumstr] macro.
///
pub trait EnumStr: std::marker::Sized {
    fn to_str(&self) -> &'static str;
    fn from_str(txt: &str) -> Option<Self>;
}

///
/// # Enum-String Pairing Macro
///
/// Creates an `enum` of fieldless variants, each paired with a string value, which:
/// * Implements [EnumStr] and [std::fmt::Display] in terms of those strings
/// * Serializes and deserializes *as* those strings
/// * Lists its variants, in declaration order, via `variants()`
///
/// The invoking crate must depend on `serde`.
///
#[macro_export]
macro_rules! enumstr {
    (   $(#[$meta: meta])*
        $enum_name: ident {
        $( $variant: ident : $strval: literal ),* $(,)?
    }) => {
        $(#[$meta])*
        #[allow(dead_code)]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::serde::Deserialize, ::serde::Serialize)]
        pub enum $enum_name {
            $( #[doc=$strval]
               #[serde(rename = $strval)]
                $variant ),*
        }
        impl $enum_name {
            /// All variants, in declaration order
            #[allow(dead_code)]
            pub fn variants() -> &'static [Self] {
                &[ $( Self::$variant ),* ]
            }
        }
        impl $crate::EnumStr for $enum_name {
            fn to_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $strval),*,
                }
            }
            /// Case-sensitive match against the string values
            fn from_str(txt: &str) -> Option<Self> {
                match txt {
                    $( $strval => Some(Self::$variant)),*,
                    _ => None,
                }
            }
        }
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(f, "{}", $crate::EnumStr::to_str(self))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{EnumStr, SerializationFormat};

    enumstr!(
        /// # Wire-Overlap Responses
        Response {
            Keep: "keep",
            Trim: "trim",
            Drop: "drop",
        }
    );

    #[test]
    fn strings() {
        assert_eq!(Response::Trim.to_str(), "trim");
        assert_eq!(Response::from_str("drop"), Some(Response::Drop));
        assert_eq!(Response::from_str("Drop"), None);
        assert_eq!(format!("{}", Response::Keep), "keep");
        assert_eq!(Response::variants().len(), 3);
    }
    #[test]
    fn serde_uses_string_values() -> Result<(), crate::ser::Error> {
        let s = SerializationFormat::Json.to_string(&Response::Trim)?;
        assert_eq!(s, "\"trim\"");
        let r: Response = SerializationFormat::Yaml.from_str("drop")?;
        assert_eq!(r, Response::Drop);
        Ok(())
    }
}
