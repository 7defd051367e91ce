//! JSON request document and piece validation.
//!
//! Pieces are checked here, before they reach the packer, which assumes
//! positive finite dimensions.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{PackSettings, PieceItem, PieceRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceRow {
    pub id: String,
    #[serde(default)]
    pub typology: String,
    pub width_mm: f64,
    pub height_mm: f64,
    pub material: String,
    #[serde(default)]
    pub finish: String,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default = "default_qty")]
    pub qty: u32,
}

/// Upper bound on pieces after quantity expansion.
pub const MAX_PIECES: u64 = 20_000;

fn default_qty() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestingRequest {
    pub pieces: Vec<PieceRow>,
    #[serde(flatten)]
    pub settings: PackSettings,
}

impl NestingRequest {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl PieceRow {
    fn validate(&self) -> Result<()> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(self.width_mm) || !valid(self.height_mm) {
            return Err(Error::InvalidDimension {
                id: self.id.clone(),
                width: self.width_mm,
                height: self.height_mm,
            });
        }
        if self.qty == 0 {
            return Err(Error::InvalidQuantity {
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// Validates every row and expands quantities. A row with `qty > 1` yields
/// pieces `"{id}#1"`, `"{id}#2"`, ...
pub fn expand_rows(rows: &[PieceRow]) -> Result<Vec<PieceRecord>> {
    for row in rows {
        row.validate()?;
    }
    let count: u64 = rows.iter().map(|row| u64::from(row.qty)).sum();
    if count > MAX_PIECES {
        return Err(Error::TooManyPieces {
            count,
            max: MAX_PIECES,
        });
    }

    let mut pieces = Vec::with_capacity(count as usize);
    for row in rows {
        for n in 1..=row.qty {
            let id = if row.qty == 1 {
                row.id.clone()
            } else {
                format!("{}#{n}", row.id)
            };
            pieces.push(PieceRecord {
                item: PieceItem::new(id, row.typology.clone(), row.width_mm, row.height_mm),
                material: row.material.clone(),
                finish: row.finish.clone(),
                project: row.project.clone(),
            });
        }
    }
    Ok(pieces)
}
