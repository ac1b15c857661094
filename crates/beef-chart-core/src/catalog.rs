//! The default catalog of French beef cuts.
//!
//! Used to seed an empty table and to restore the catalog on reset. The names
//! are region keys in the SVG map asset, so they are kept exactly as the map
//! expects them, spelling included.

use crate::cut::NewCut;
use crate::price::Price;

/// Number of cuts in a fully seeded catalog.
pub const EXPECTED_CUT_COUNT: u64 = 29;

/// Default `(name, price in cents)` pairs, in seeding order. All are available.
pub const DEFAULT_CATALOG: [(&str, i64); 29] = [
    ("Queue", 1500),
    ("Langue", 3500),
    ("Plat de joue", 1500),
    ("Gros bout de poitrine", 2500),
    ("Jumeau à pot-au-feu", 4500),
    ("Onglet", 8500),
    ("Plat de tranche", 2500),
    ("Araignée", 1500),
    ("Gîte à la noix", 5500),
    ("Bavette d'aloyau", 2500),
    ("Tende de tranche", 6500),
    ("Rond de gîte", 4500),
    ("Bavettede de flanchet", 8500),
    ("Flanchet", 3500),
    ("Hampe", 7500),
    ("Plat de côtes", 6500),
    ("Tendron Milieu de poitrine", 6500),
    ("Macreuse à pot-au-feu", 8500),
    ("Rumsteck", 7500),
    ("Faux-filet", 6500),
    ("Côtes Entrecôtes", 5500),
    ("Basses côtes", 4500),
    ("Collier", 8500),
    ("Jumeau à biftek", 1500),
    ("Paleron", 6500),
    ("Macreuse à bifteck", 4500),
    ("Gîte", 8500),
    ("Aiguillette baronne", 6500),
    ("Filet", 9500),
];

/// The default catalog as insert payloads.
#[must_use]
pub fn default_catalog() -> Vec<NewCut> {
    DEFAULT_CATALOG
        .iter()
        .map(|(name, cents)| NewCut::new(*name, Price::from_cents(*cents), true))
        .collect()
}
