use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::domain::user::UserId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub i64);

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Business importance of a product, stored with its French label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportanceTier {
    Core,
    #[default]
    Secondary,
    Opportunistic,
}

impl ImportanceTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Core => "coeur",
            Self::Secondary => "secondaire",
            Self::Opportunistic => "opportuniste",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "coeur" => Some(Self::Core),
            "secondaire" => Some(Self::Secondary),
            "opportuniste" => Some(Self::Opportunistic),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub user_id: UserId,
    pub name: String,
    pub category: Option<String>,
    pub importance: ImportanceTier,
    pub active: bool,
}

/// Catalog order for product names: accents and case are ignored, then the raw name breaks ties.
pub fn compare_names(left: &str, right: &str) -> Ordering {
    collation_key(left).cmp(&collation_key(right)).then_with(|| left.cmp(right))
}

fn collation_key(name: &str) -> String {
    name.nfd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase).collect()
}
