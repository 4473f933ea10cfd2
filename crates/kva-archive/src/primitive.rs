//! Primitive value types and their text encoding.
//!
//! | Rust     | type tag  |
//! |----------|-----------|
//! | `bool`   | `bool`    |
//! | `char`   | `char`    |
//! | `i16`    | `short`   |
//! | `i32`    | `int`     |
//! | `i64`    | `long`    |
//! | `f32`    | `float`   |
//! | `f64`    | `double`  |
//! | `String` | `string`  |

/// A value stored as the text of a single leaf node.
pub trait Primitive: Sized + Default {
    /// Tag written to the node's `type` attribute.
    const TYPE_NAME: &'static str;

    /// Canonical text form.
    fn encode(&self) -> String;

    /// Parse the text form; `None` if the text is malformed.
    fn decode(text: &str) -> Option<Self>;
}

impl Primitive for bool {
    const TYPE_NAME: &'static str = "bool";

    fn encode(&self) -> String {
        self.to_string()
    }

    /// `1`, `J` and any casing of `true` read as true; everything else is false.
    fn decode(text: &str) -> Option<Self> {
        Some(text == "1" || text == "J" || text.eq_ignore_ascii_case("true"))
    }
}

impl Primitive for char {
    const TYPE_NAME: &'static str = "char";

    fn encode(&self) -> String {
        self.to_string()
    }

    /// The first character; `'\0'` for empty text.
    fn decode(text: &str) -> Option<Self> {
        Some(text.chars().next().unwrap_or('\0'))
    }
}

impl Primitive for String {
    const TYPE_NAME: &'static str = "string";

    fn encode(&self) -> String {
        self.clone()
    }

    fn decode(text: &str) -> Option<Self> {
        Some(text.to_string())
    }
}

macro_rules! numeric_primitive {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl Primitive for $ty {
                const TYPE_NAME: &'static str = $name;

                fn encode(&self) -> String {
                    self.to_string()
                }

                fn decode(text: &str) -> Option<Self> {
                    text.trim().parse().ok()
                }
            }
        )*
    };
}

numeric_primitive! {
    i16 => "short",
    i32 => "int",
    i64 => "long",
    f32 => "float",
    f64 => "double",
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bool_tokens() {
        assert_eq!(true.encode(), "true");
        assert_eq!(false.encode(), "false");
        for token in ["1", "J", "true", "TRUE", "True"] {
            assert_eq!(bool::decode(token), Some(true), "{token}");
        }
        for token in ["0", "false", "N", "", "yes"] {
            assert_eq!(bool::decode(token), Some(false), "{token}");
        }
    }

    #[test]
    fn char_reads_first_character() {
        assert_eq!(char::decode("xyz"), Some('x'));
        assert_eq!(char::decode(""), Some('\0'));
        assert_eq!(char::decode("é"), Some('é'));
    }

    #[test]
    fn numbers_tolerate_surrounding_whitespace() {
        assert_eq!(i32::decode("  12\n"), Some(12));
        assert_eq!(f64::decode(" 2.5 "), Some(2.5));
    }

    #[test]
    fn malformed_numbers_fail() {
        assert_eq!(i32::decode("twelve"), None);
        assert_eq!(i16::decode("70000"), None);
        assert_eq!(f32::decode(""), None);
    }

    #[test]
    fn type_names() {
        assert_eq!(<i16 as Primitive>::TYPE_NAME, "short");
        assert_eq!(<i64 as Primitive>::TYPE_NAME, "long");
        assert_eq!(<f32 as Primitive>::TYPE_NAME, "float");
        assert_eq!(<String as Primitive>::TYPE_NAME, "string");
    }

    proptest! {
        #[test]
        fn doubles_survive_text(v in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
            prop_assert_eq!(f64::decode(&v.encode()), Some(v));
        }

        #[test]
        fn floats_survive_text(v in proptest::num::f32::NORMAL) {
            prop_assert_eq!(f32::decode(&v.encode()), Some(v));
        }

        #[test]
        fn longs_survive_text(v in any::<i64>()) {
            prop_assert_eq!(i64::decode(&v.encode()), Some(v));
        }
    }
}
