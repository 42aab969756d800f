//! Normalized catalog types. These are what the rest of the engine works
//! with; the raw backend shapes never leave [`crate::catalog::normalize`].

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sugarplum_core::ProductId;
use sugarplum_core::VariantId;

/// Canonical size ordering for apparel, infant through adult. Unknown sizes
/// sort after these, alphabetically.
pub const MASTER_SIZES: &[&str] = &[
    "NB", "0-3M", "3-6M", "6-9M", "6-12M", "12M", "18M", "24M", "2T", "3T", "4T", "5T", "YS",
    "YM", "YL", "YXL", "XS", "S", "M", "L", "XL", "2XL", "3XL",
];

/// Canonical color ordering for the shop UI. Unknown colors sort after
/// these, alphabetically.
pub const MASTER_COLORS: &[&str] = &[
    "Beige",
    "Black",
    "Blue",
    "Dark Blue",
    "Dark Green",
    "Dark Pink",
    "Green",
    "Grey",
    "Hot Pink",
    "Light Blue",
    "Light Green",
    "Light Pink",
    "Light Purple",
    "Orange",
    "Pink",
    "Purple",
    "Red",
    "White",
    "Yellow",
];

/// Where a design is printed on a garment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrintLocation {
    Front,
    Back,
    #[serde(rename = "Front & Back")]
    FrontAndBack,
}

impl PrintLocation {
    /// Parses an explicit print-location value, e.g. from a dedicated
    /// backend field. Case-insensitive; both `"front & back"` and
    /// `"front and back"` are accepted.
    pub fn parse(text: &str) -> Option<Self> {
        let t = text.trim().to_lowercase();
        match t.as_str() {
            "front" => Some(Self::Front),
            "back" => Some(Self::Back),
            "front & back" | "front and back" | "front&back" | "both" => Some(Self::FrontAndBack),
            _ => None,
        }
    }

    /// Infers a print location from a free-text variation name. The combined
    /// phrase wins when both words appear, so `"Front and Back Print"` is
    /// never misread as front-only.
    pub fn infer_from_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        let front = lower.contains("front");
        let back = lower.contains("back");
        match (front, back) {
            (true, true) => Some(Self::FrontAndBack),
            (true, false) => Some(Self::Front),
            (false, true) => Some(Self::Back),
            (false, false) => None,
        }
    }

    /// Display order in pickers: front, combined, back.
    pub const fn sort_rank(self) -> u8 {
        match self {
            Self::Front => 0,
            Self::FrontAndBack => 1,
            Self::Back => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Front => "Front",
            Self::Back => "Back",
            Self::FrontAndBack => "Front & Back",
        }
    }
}

impl fmt::Display for PrintLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A sellable combination of color, size and print location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub color: String,
    pub size: String,
    pub print_location: Option<PrintLocation>,
    /// Unit price in dollars. `None` when the variation carried no usable
    /// price; callers fall back to the product base price.
    pub price: Option<Decimal>,
    /// Known on-hand quantity, if any quantity field was present.
    pub quantity_available: Option<i64>,
    pub external_variant_id: Option<VariantId>,
    pub sku: Option<String>,
}

/// Ribbon shown on product cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RibbonType {
    #[default]
    None,
    New,
    Featured,
    Custom,
}

/// Merchandising and visibility flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFlags {
    pub is_new: bool,
    pub is_featured: bool,
    pub pin_to_top: bool,
    pub hide_online: bool,
    pub hide_kiosk: bool,
    pub ribbon_type: RibbonType,
    pub ribbon_custom_text: String,
}

impl ProductFlags {
    /// Resolves the ribbon text to render, or `None` for no ribbon. A custom
    /// ribbon with blank text falls back to "Featured".
    pub fn ribbon_label(&self) -> Option<&str> {
        match self.ribbon_type {
            RibbonType::None => None,
            RibbonType::New => Some("New"),
            RibbonType::Featured => Some("Featured"),
            RibbonType::Custom => {
                let text = self.ribbon_custom_text.trim();
                Some(if text.is_empty() { "Featured" } else { text })
            }
        }
    }
}

/// A fully normalized product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Category, e.g. `"T-Shirts"` or `"Hoodies"`.
    pub kind: String,
    /// Audience tags, e.g. `"Adult"`, `"Youth"`.
    pub audience: Vec<String>,
    pub subcategory: Option<String>,
    pub image: Option<String>,
    /// Lowest positive variation price, in dollars. Zero when no variation
    /// priced above zero.
    pub base_price: Decimal,
    /// Distinct colors in master order.
    pub colors: Vec<String>,
    /// Distinct sizes in master order.
    pub sizes: Vec<String>,
    /// Distinct print locations in display order. Empty when no variation
    /// declares one.
    pub print_locations: Vec<PrintLocation>,
    pub variants: Vec<Variant>,
    /// Total known on-hand quantity across variations, falling back to the
    /// item-level count. Zero means genuinely out or never reported.
    pub aggregate_inventory: i64,
    /// Whether any quantity signal was present at all. Distinguishes a
    /// confirmed zero from a catalog that simply does not track stock.
    pub inventory_tracked: bool,
    pub flags: ProductFlags,
}

/// Coarse stock bucket for product cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    Out,
    Low(i64),
    In(i64),
}

/// At or below this count a product shows as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 3;

impl StockStatus {
    /// `None` when the product does not track inventory at all.
    pub fn of(product: &Product) -> Option<Self> {
        if !product.inventory_tracked {
            return None;
        }
        let n = product.aggregate_inventory;
        Some(if n <= 0 {
            Self::Out
        } else if n <= LOW_STOCK_THRESHOLD {
            Self::Low(n)
        } else {
            Self::In(n)
        })
    }

    pub fn label(self) -> String {
        match self {
            Self::Out => "Out of stock".to_owned(),
            Self::Low(n) => format!("Only {n} left!"),
            Self::In(n) => format!("{n} in stock"),
        }
    }
}

/// Sorts values by their position in a master list; values not in the list
/// go last, alphabetically among themselves. Comparison against the master
/// list is exact, matching how the backend spells option values.
pub fn sort_by_master_order(values: &mut [String], master: &[&str]) {
    values.sort_by(|a, b| {
        let ra = master.iter().position(|m| m == a).unwrap_or(usize::MAX);
        let rb = master.iter().position(|m| m == b).unwrap_or(usize::MAX);
        ra.cmp(&rb).then_with(|| a.cmp(b))
    });
}
