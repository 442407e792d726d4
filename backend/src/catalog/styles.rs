use std::borrow::Cow;
use std::str::FromStr;

use landscape_shared::{StyleCatalogEntry, StyleCategory, StyleKind};

const fn entry(
    id: StyleKind,
    name: &'static str,
    category: StyleCategory,
    prompt: &'static str,
) -> StyleCatalogEntry {
    StyleCatalogEntry {
        id,
        name: Cow::Borrowed(name),
        category,
        prompt: Cow::Borrowed(prompt),
    }
}

static STYLE_CATALOG: [StyleCatalogEntry; 6] = [
    entry(
        StyleKind::ConcreteCurbing,
        "Concrete Curbing",
        StyleCategory::Curbing,
        "Professional concrete landscape curbing, clean edges, gray concrete border",
    ),
    entry(
        StyleKind::StoneCurbing,
        "Natural Stone Curbing",
        StyleCategory::Curbing,
        "Natural stone landscape edging, irregular stone borders, earth tones",
    ),
    entry(
        StyleKind::BrownMulch,
        "Brown Wood Mulch",
        StyleCategory::Mulch,
        "Brown wood mulch ground cover, organic texture, natural landscaping material",
    ),
    entry(
        StyleKind::RedMulch,
        "Red Mulch",
        StyleCategory::Mulch,
        "Red-tinted wood mulch, vibrant color, landscaping ground cover",
    ),
    entry(
        StyleKind::FlagstonePatio,
        "Flagstone Patio",
        StyleCategory::Patio,
        "Natural flagstone patio, irregular stone pattern, outdoor living space",
    ),
    entry(
        StyleKind::ConcretePatio,
        "Concrete Patio",
        StyleCategory::Patio,
        "Smooth concrete patio, modern outdoor space, clean lines",
    ),
];

pub fn list_all() -> &'static [StyleCatalogEntry] {
    &STYLE_CATALOG
}

/// Unknown categories match nothing.
pub fn list_by_category(category: &str) -> Vec<&'static StyleCatalogEntry> {
    let Ok(category) = StyleCategory::from_str(category) else {
        return Vec::new();
    };
    STYLE_CATALOG
        .iter()
        .filter(|entry| entry.category == category)
        .collect()
}
