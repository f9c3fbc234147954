//! Open string enumerations.
//!
//! The API documents closed sets of string constants (statuses, actions,
//! entity types) but adds new values over time. [`api_enum!`] generates an enum
//! with one variant per documented value plus an `Unknown(String)` catch-all,
//! so a value added upstream decodes successfully and round-trips verbatim
//! instead of failing the whole record.

/// Generate an open string enum.
///
/// ```
/// linode_core::api_enum! {
///     /// Disk filesystem.
///     pub enum Filesystem {
///         Raw => "raw",
///         Ext4 => "ext4",
///     }
/// }
///
/// assert_eq!(Filesystem::from("ext4"), Filesystem::Ext4);
/// assert_eq!(Filesystem::from("btrfs").as_str(), "btrfs");
/// ```
#[macro_export]
macro_rules! api_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                #[doc = concat!("`", $wire, "`")]
                $variant,
            )+
            /// A value this crate does not know about yet.
            Unknown(::std::string::String),
        }

        impl $name {
            /// All documented values, in declaration order.
            pub const KNOWN: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the wire representation.
            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Unknown(value) => value.as_str(),
                }
            }

            /// Returns true unless this is the `Unknown` catch-all.
            #[must_use]
            pub const fn is_known(&self) -> bool {
                !matches!(self, Self::Unknown(_))
            }
        }

        impl ::std::default::Default for $name {
            /// An empty `Unknown` value, used when the API omits the field.
            fn default() -> Self {
                Self::Unknown(::std::string::String::new())
            }
        }

        impl ::std::convert::From<&str> for $name {
            fn from(value: &str) -> Self {
                match value {
                    $($wire => Self::$variant,)+
                    other => Self::Unknown(other.to_string()),
                }
            }
        }

        impl ::std::convert::From<::std::string::String> for $name {
            fn from(value: ::std::string::String) -> Self {
                Self::from(value.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = ::std::convert::Infallible;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                Ok(Self::from(s))
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::__serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> $crate::__serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: $crate::__serde::Deserializer<'de>,
            {
                let value = <::std::string::String as $crate::__serde::Deserialize>::deserialize(
                    deserializer,
                )?;
                Ok(Self::from(value))
            }
        }
    };
}
