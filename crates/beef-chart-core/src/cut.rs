//! Cut record types.

use serde::{Deserialize, Serialize};

use crate::ids::CutId;
use crate::price::Price;

/// A beef cut as stored in the catalog table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutRecord {
    /// Identifier assigned on insert.
    pub id: CutId,

    /// Human-readable cut name. Also the region key in the SVG map.
    pub name: String,

    /// Price in euros per kilogram.
    pub price: Price,

    /// Whether the cut is shown on the map.
    pub available: bool,
}

impl CutRecord {
    /// The mutable part of the record.
    #[must_use]
    pub const fn snapshot(&self) -> CutUpdate {
        CutUpdate {
            price: self.price,
            available: self.available,
        }
    }

    /// Reshape for the chart renderer.
    #[must_use]
    pub fn to_chart_point(&self) -> ChartPoint {
        ChartPoint {
            name: self.name.clone(),
            value: self.price.as_f64(),
        }
    }
}

/// Insert payload; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCut {
    /// Cut name.
    pub name: String,
    /// Initial price.
    pub price: Price,
    /// Initial availability.
    pub available: bool,
}

impl NewCut {
    /// Build an insert payload.
    #[must_use]
    pub fn new(name: impl Into<String>, price: Price, available: bool) -> Self {
        Self {
            name: name.into(),
            price,
            available,
        }
    }
}

/// The only mutation a cut supports: price and availability together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutUpdate {
    /// New price.
    pub price: Price,
    /// New availability.
    pub available: bool,
}

/// A `{name, value}` pair consumed by the SVG map renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Region name.
    pub name: String,
    /// Price shown for the region.
    pub value: f64,
}
