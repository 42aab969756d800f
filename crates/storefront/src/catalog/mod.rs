//! Catalog normalization, variant resolution and product filtering.

pub mod filter;
pub mod normalize;
pub mod resolve;
pub mod types;

pub use filter::{Channel, ProductFilter, all_colors, all_sizes, visible_on, visible_products};
pub use normalize::normalize_catalog;
pub use resolve::{STOCK_UNKNOWN_CAP, max_available, price_for, resolve};
pub use types::{
    MASTER_COLORS, MASTER_SIZES, PrintLocation, Product, ProductFlags, RibbonType, StockStatus,
    Variant,
};
