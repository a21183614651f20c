//! Closed sets of lowercase labels stored as text columns.

/// Declares an enum whose variants round-trip through fixed string labels,
/// both for serde and for the database columns.
macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident($what:literal) {
            $($variant:ident => $label:literal),+ $(,)?
        }
        default = $default:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            pub fn from_str(s: &str) -> Option<Self> {
                match s {
                    $($label => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Lenient parse for query strings; the error names every accepted label.
            pub fn parse(s: &str) -> Result<Self, $crate::error::DomainError> {
                Self::from_str(&s.trim().to_lowercase()).ok_or_else(|| {
                    let expected: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                    $crate::error::DomainError::ValidationError(format!(
                        "Invalid {} '{}' (expected one of: {})",
                        $what,
                        s,
                        expected.join(", ")
                    ))
                })
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}
