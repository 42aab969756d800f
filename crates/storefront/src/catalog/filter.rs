//! Channel visibility, shopper-facing filters and shop ordering.

use std::cmp::Ordering;

use crate::catalog::types::{MASTER_COLORS, MASTER_SIZES, Product, sort_by_master_order};

/// Sales channel a catalog view is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Online,
    Kiosk,
}

/// Whether a product may appear on the given channel.
pub const fn visible_on(product: &Product, channel: Channel) -> bool {
    match channel {
        Channel::Online => !product.flags.hide_online,
        Channel::Kiosk => !product.flags.hide_kiosk,
    }
}

/// Shopper-selected filters. Empty/`None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub kind: Option<String>,
    pub audience: Option<String>,
    pub search: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(kind) = non_blank(self.kind.as_deref())
            && !product.kind.eq_ignore_ascii_case(kind)
        {
            return false;
        }
        if let Some(audience) = non_blank(self.audience.as_deref())
            && !product.audience.iter().any(|a| a.eq_ignore_ascii_case(audience))
        {
            return false;
        }
        if let Some(color) = non_blank(self.color.as_deref())
            && !product.colors.iter().any(|c| c.eq_ignore_ascii_case(color))
        {
            return false;
        }
        if let Some(size) = non_blank(self.size.as_deref())
            && !product.sizes.iter().any(|s| s.eq_ignore_ascii_case(size))
        {
            return false;
        }
        if let Some(search) = non_blank(self.search.as_deref()) {
            let needle = search.to_lowercase();
            let haystack = format!(
                "{} {} {}",
                product.name.to_lowercase(),
                product.description.to_lowercase(),
                product.kind.to_lowercase()
            );
            if !haystack.contains(&needle) {
                return false;
            }
        }
        true
    }
}

/// Shop ordering: pinned first, then featured, then new, then by name.
pub fn shop_ordering(a: &Product, b: &Product) -> Ordering {
    fn rank(p: &Product) -> u8 {
        if p.flags.pin_to_top {
            0
        } else if p.flags.is_featured {
            1
        } else if p.flags.is_new {
            2
        } else {
            3
        }
    }
    rank(a)
        .cmp(&rank(b))
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

/// Products visible on `channel` and matching `filter`, in shop order.
pub fn visible_products<'a>(
    products: &'a [Product],
    channel: Channel,
    filter: &ProductFilter,
) -> Vec<&'a Product> {
    let mut out: Vec<&Product> = products
        .iter()
        .filter(|p| visible_on(p, channel) && filter.matches(p))
        .collect();
    out.sort_by(|a, b| shop_ordering(a, b));
    out
}

/// Distinct colors across a product set, in master order. Feeds the filter
/// dropdowns.
pub fn all_colors(products: &[Product]) -> Vec<String> {
    aggregate_options(products, |p| &p.colors, MASTER_COLORS)
}

/// Distinct sizes across a product set, in master order.
pub fn all_sizes(products: &[Product]) -> Vec<String> {
    aggregate_options(products, |p| &p.sizes, MASTER_SIZES)
}

fn aggregate_options(
    products: &[Product],
    pick: impl Fn(&Product) -> &Vec<String>,
    master: &[&str],
) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for p in products {
        for value in pick(p) {
            if !out.iter().any(|existing| existing == value) {
                out.push(value.clone());
            }
        }
    }
    sort_by_master_order(&mut out, master);
    out
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
