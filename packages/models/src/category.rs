use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Place category requested by the caller.
///
/// `All` is the sentinel meaning "cross-category" — it is never attached to
/// an individual place, only to a request or a cache key.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Category {
    All,
    Restaurant,
    Cafe,
    TouristAttraction,
    Museum,
    Park,
    Bar,
    Hotel,
    Shopping,
    Entertainment,
}

impl Category {
    /// Returns all variants, in declaration order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::All,
            Self::Restaurant,
            Self::Cafe,
            Self::TouristAttraction,
            Self::Museum,
            Self::Park,
            Self::Bar,
            Self::Hotel,
            Self::Shopping,
            Self::Entertainment,
        ]
    }

    /// The exact name used in cache keys and wire responses.
    ///
    /// Backed by `strum`'s `Display` so this stays in sync with the enum
    /// definition without a second hand-maintained table.
    #[must_use]
    pub fn name(self) -> String {
        self.to_string()
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::All
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_matches_pascal_case_variant() {
        assert_eq!(Category::TouristAttraction.name(), "TouristAttraction");
        assert_eq!(Category::All.name(), "All");
    }

    #[test]
    fn default_is_all() {
        assert_eq!(Category::default(), Category::All);
    }
}
