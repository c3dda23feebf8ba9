//! Order-line domain types: categories, units, suppliers, requester roles,
//! and the live list record itself.

pub mod aggregate;
pub mod store;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::now_unix;
use crate::translate::{Lang, TranslationRecord};

/// Shopping category of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Metro,
    Veg,
    Meat,
    Drink,
    Other,
}

impl Category {
    pub fn tag(self) -> &'static str {
        match self {
            Category::Metro => "metro",
            Category::Veg => "veg",
            Category::Meat => "meat",
            Category::Drink => "drink",
            Category::Other => "other",
        }
    }

    /// Unknown tags land in the catch-all category.
    pub fn from_tag(tag: &str) -> Category {
        match tag {
            "metro" => Category::Metro,
            "veg" => Category::Veg,
            "meat" => Category::Meat,
            "drink" => Category::Drink,
            _ => Category::Other,
        }
    }

    pub fn label(self, lang: Lang) -> &'static str {
        match (self, lang) {
            (Category::Metro, _) => "Metro",
            (Category::Veg, Lang::Tr) => "Sebze",
            (Category::Veg, Lang::De) => "Gemüse",
            (Category::Veg, Lang::Pa) => "ਸਬਜ਼ੀ",
            (Category::Meat, Lang::Tr) => "Kasap",
            (Category::Meat, Lang::De) => "Fleisch",
            (Category::Meat, Lang::Pa) => "ਮੀਟ",
            (Category::Drink, Lang::Tr) => "İçecek",
            (Category::Drink, Lang::De) => "Getränke",
            (Category::Drink, Lang::Pa) => "ਪੀਣ ਵਾਲੇ",
            (Category::Other, Lang::Tr) => "Diğer",
            (Category::Other, Lang::De) => "Andere",
            (Category::Other, Lang::Pa) => "ਹੋਰ",
        }
    }
}

/// Order unit. Wire tags match what the submit form sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "kg")]
    Kg,
    #[serde(rename = "pcs")]
    Piece,
    #[serde(rename = "box")]
    Crate,
    #[serde(rename = "pack")]
    Pack,
    #[serde(rename = "bag")]
    Sack,
}

impl Unit {
    pub fn tag(self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::Piece => "pcs",
            Unit::Crate => "box",
            Unit::Pack => "pack",
            Unit::Sack => "bag",
        }
    }

    pub fn from_tag(tag: &str) -> Unit {
        match tag {
            "kg" => Unit::Kg,
            "box" => Unit::Crate,
            "pack" => Unit::Pack,
            "bag" => Unit::Sack,
            _ => Unit::Piece,
        }
    }

    pub fn label(self, lang: Lang) -> &'static str {
        match (self, lang) {
            (Unit::Kg, Lang::Tr) => "Kg",
            (Unit::Kg, Lang::De) => "Kg",
            (Unit::Kg, Lang::Pa) => "ਕਿਲੋ",
            (Unit::Piece, Lang::Tr) => "Adet",
            (Unit::Piece, Lang::De) => "Stück",
            (Unit::Piece, Lang::Pa) => "ਟੁਕੜਾ",
            (Unit::Crate, Lang::Tr) => "Kasa",
            (Unit::Crate, Lang::De) => "Kiste",
            (Unit::Crate, Lang::Pa) => "ਬਾਕਸ",
            (Unit::Pack, Lang::Tr) => "Paket",
            (Unit::Pack, Lang::De) => "Packung",
            (Unit::Pack, Lang::Pa) => "ਪੈਕਟ",
            (Unit::Sack, Lang::Tr) => "Çuval",
            (Unit::Sack, Lang::De) => "Sack",
            (Unit::Sack, Lang::Pa) => "ਬੋਰੀ",
        }
    }
}

/// Supplier a line is ordered from. Anything the store does not recognize
/// is bucketed under `Other` so no pending line ever drops out of the
/// dispatch view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Supplier {
    Metro,
    Hal,
    Kasap,
    Other,
}

impl Supplier {
    pub fn tag(self) -> &'static str {
        match self {
            Supplier::Metro => "metro",
            Supplier::Hal => "hal",
            Supplier::Kasap => "kasap",
            Supplier::Other => "other",
        }
    }

    pub fn from_tag(tag: &str) -> Supplier {
        match tag {
            "metro" => Supplier::Metro,
            "hal" => Supplier::Hal,
            "kasap" => Supplier::Kasap,
            _ => Supplier::Other,
        }
    }

    pub fn label(self, lang: Lang) -> &'static str {
        match (self, lang) {
            (Supplier::Metro, _) => "Metro",
            (Supplier::Hal, Lang::Tr) => "Hal",
            (Supplier::Hal, Lang::De) => "Großmarkt",
            (Supplier::Hal, Lang::Pa) => "ਮੰਡੀ",
            (Supplier::Kasap, Lang::Tr) => "Kasap",
            (Supplier::Kasap, Lang::De) => "Metzger",
            (Supplier::Kasap, Lang::Pa) => "ਕਸਾਈ",
            (Supplier::Other, Lang::Tr) => "Diğer",
            (Supplier::Other, Lang::De) => "Andere",
            (Supplier::Other, Lang::Pa) => "ਹੋਰ",
        }
    }
}

/// Who asked for the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Requester {
    Chef,
    Bar,
    Kitchen,
}

impl Requester {
    pub fn tag(self) -> &'static str {
        match self {
            Requester::Chef => "chef",
            Requester::Bar => "bar",
            Requester::Kitchen => "kitchen",
        }
    }

    pub fn from_tag(tag: &str) -> Requester {
        match tag {
            "bar" => Requester::Bar,
            "kitchen" => Requester::Kitchen,
            _ => Requester::Chef,
        }
    }
}

/// One requested product instance on the live list.
///
/// Translation sub-state: created `pending` with no names attached, patched
/// to resolved exactly once. Bought and archived are two independent
/// booleans, not a joint state machine; archived is terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: String,
    pub raw_name: String,
    pub input_lang: Lang,
    pub names: Option<TranslationRecord>,
    pub category: Category,
    pub quantity: f64,
    pub unit: Unit,
    pub requester: Requester,
    pub supplier: Supplier,
    pub estimated_cost: f64,
    pub bought: bool,
    pub archived: bool,
    pub pending: bool,
    pub created_at: i64,
    pub bought_at: Option<i64>,
}

impl OrderLine {
    /// Create a line in pending-translation state. Display falls back to
    /// the raw name until the resolution patch lands.
    #[allow(clippy::too_many_arguments)]
    pub fn new_pending(
        raw_name: &str,
        input_lang: Lang,
        category: Category,
        quantity: f64,
        unit: Unit,
        requester: Requester,
        supplier: Supplier,
        estimated_cost: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            raw_name: raw_name.trim().to_string(),
            input_lang,
            names: None,
            category,
            quantity,
            unit,
            requester,
            supplier,
            estimated_cost: sanitize_cost(estimated_cost),
            bought: false,
            archived: false,
            pending: true,
            created_at: now_unix(),
            bought_at: None,
        }
    }

    /// Display name in the given language, raw input while pending.
    pub fn display_name(&self, lang: Lang) -> &str {
        self.names
            .as_ref()
            .map(|n| n.get(lang))
            .unwrap_or(&self.raw_name)
    }
}

/// Missing or junk costs count as zero on the running budget.
fn sanitize_cost(cost: f64) -> f64 {
    if cost.is_finite() && cost > 0.0 {
        cost
    } else {
        0.0
    }
}

/// Partial-field update for one order line. Only set fields are written, so
/// concurrent patches on unrelated fields never clobber each other.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    /// Attaching names also clears the pending flag.
    pub names: Option<TranslationRecord>,
    /// Toggling bought sets or clears the bought timestamp.
    pub bought: Option<bool>,
    /// Only ever set to true; there is no unarchive.
    pub archived: Option<bool>,
}

impl OrderPatch {
    pub fn resolved(names: TranslationRecord) -> Self {
        Self {
            names: Some(names),
            ..Self::default()
        }
    }

    pub fn bought(value: bool) -> Self {
        Self {
            bought: Some(value),
            ..Self::default()
        }
    }

    pub fn archive() -> Self {
        Self {
            archived: Some(true),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_none() && self.bought.is_none() && self.archived.is_none()
    }
}
