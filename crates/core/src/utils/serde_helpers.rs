//! Serde helpers for configuration enums

/// Implement case-insensitive deserialization for a fieldless enum
///
/// Each variant is listed with its canonical lowercase spelling. Input is
/// lowercased before matching, so `"Intercept_Functions"` and
/// `"INTERCEPT_FUNCTIONS"` both select the same variant. Paths in the
/// expansion are fully qualified, so the macro works next to a local
/// `Result` alias.
///
/// ```
/// use aop_weaver_core::impl_case_insensitive_deserialize;
///
/// #[derive(Debug, PartialEq)]
/// enum Level {
///     Low,
///     High,
/// }
///
/// impl_case_insensitive_deserialize!(Level, Low => "low", High => "high");
///
/// let level: Level = serde_json::from_str("\"HIGH\"").unwrap();
/// assert_eq!(level, Level::High);
/// ```
#[macro_export]
macro_rules! impl_case_insensitive_deserialize {
    ($enum_type:ty, $($variant:ident => $str_val:literal),+ $(,)?) => {
        impl<'de> ::serde::Deserialize<'de> for $enum_type {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let raw = <::std::string::String as ::serde::Deserialize>::deserialize(deserializer)?;
                match raw.to_lowercase().as_str() {
                    $(
                        $str_val => ::std::result::Result::Ok(Self::$variant),
                    )+
                    _ => ::std::result::Result::Err(<D::Error as ::serde::de::Error>::custom(format!(
                        "unknown variant '{}', expected one of: {}",
                        raw,
                        [$($str_val),+].join(", ")
                    ))),
                }
            }
        }
    };
}
