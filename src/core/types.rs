// shared value types for the matching core
use std::fmt;

use serde::{Deserialize, Serialize};

/// Reference meridian a township/range grid hangs off.
///
/// `IM` (Indian Meridian) covers most of the state, `CM` (Cimarron Meridian) covers the panhandle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Meridian {
    #[default]
    IM,
    CM,
}

impl Meridian {
    //accepts the short code or the long name, any case
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "IM" | "INDIAN" => Some(Meridian::IM),
            "CM" | "CIMARRON" => Some(Meridian::CM),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Meridian::IM => "IM",
            Meridian::CM => "CM",
        }
    }
}

impl fmt::Display for Meridian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The rule that justified linking a property to a well.
///
/// Variants are declared in priority order, so `Ord` sorts the strongest reason first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchReason {
    SurfaceLocation,
    LateralPath,
    BottomHole,
    AdjacentSection,
}

impl MatchReason {
    //1 is the strongest
    pub const fn priority(self) -> u8 {
        match self {
            MatchReason::SurfaceLocation => 1,
            MatchReason::LateralPath => 2,
            MatchReason::BottomHole => 3,
            MatchReason::AdjacentSection => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            MatchReason::SurfaceLocation => "Surface Location",
            MatchReason::LateralPath => "Lateral Path",
            MatchReason::BottomHole => "Bottom Hole",
            MatchReason::AdjacentSection => "Adjacent Section",
        }
    }
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LinkStatus {
    #[default]
    Active,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LinkType {
    #[default]
    Auto,
    Manual,
}

macro_rules! opaque_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

opaque_id!(PropertyId);
opaque_id!(WellId);

/// Who a sync run is performed for. Opaque to the core, only used to scope store reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum OwnerScope {
    User(String),
    Organization(String),
}

impl fmt::Display for OwnerScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerScope::User(id) => write!(f, "user:{id}"),
            OwnerScope::Organization(id) => write!(f, "org:{id}"),
        }
    }
}
