//! Strongly-typed identifiers shared across the workspace.
//!
//! Alter ids, instance ids and instance-type tags are all plain strings on the
//! wire; wrapping them keeps an instance id from being matched against an
//! alter's type filter by accident.

macro_rules! define_name {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
        #[serde(transparent)]
        $vis struct $Name(String);

        impl<'de> serde::Deserialize<'de> for $Name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $Name::try_new(s).ok_or_else(|| {
                    serde::de::Error::custom(concat!(stringify!($Name), " must not be blank"))
                })
            }
        }

        impl $Name {
            /// Create a new name. Blank input is a programming error.
            pub fn new(name: impl Into<String>) -> Self {
                let s = name.into();
                debug_assert!(!s.trim().is_empty(), concat!(stringify!($Name), " must not be blank"));
                Self(s)
            }

            /// Create a new name, returning `None` for blank input.
            pub fn try_new(name: impl Into<String>) -> Option<Self> {
                let s = name.into();
                if s.trim().is_empty() {
                    None
                } else {
                    Some(Self(s))
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $Name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::ops::Deref for $Name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $Name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $Name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $Name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

define_name! {
    /// Alter identity: the file or archive-entry name the alter was loaded from.
    pub struct AlterId;
}

define_name! {
    /// Unique id of one configured database instance.
    pub struct InstanceId;
}

define_name! {
    /// Instance-type tag. Alters select their targets by these tags.
    pub struct InstanceType;
}
