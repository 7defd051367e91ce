//! Board rules per material, with finish-specific overrides.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::BoardRule;

/// Canonical form of a material or finish code: trimmed, inner whitespace
/// collapsed, upper case, accents stripped.
pub fn normalize_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .map(fold_diacritic)
        .flat_map(char::to_uppercase)
        .collect()
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' => 'a',
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ç' => 'c',
        'Ç' => 'C',
        other => other,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRule {
    pub material: String,
    pub board_width_mm: f64,
    pub board_height_mm: f64,
    pub rotation_allowed: bool,
}

/// Board size for one (material, finish) pair. Rotation comes from the material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishOverride {
    pub material: String,
    pub finish: String,
    pub board_width_mm: f64,
    pub board_height_mm: f64,
}

/// Serializable rule table, the on-disk form of a [`BoardRuleResolver`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    pub materials: Vec<MaterialRule>,
    #[serde(default)]
    pub overrides: Vec<FinishOverride>,
}

impl RuleTable {
    pub fn builtin() -> Self {
        let material = |name: &str, w: f64, h: f64, rotation_allowed: bool| MaterialRule {
            material: name.to_string(),
            board_width_mm: w,
            board_height_mm: h,
            rotation_allowed,
        };
        Self {
            materials: vec![
                material("MELAMINA", 2850.0, 2100.0, true),
                material("LACA", 2440.0, 1220.0, true),
                material("MDF", 2440.0, 1220.0, true),
                material("LAMINADO", 3050.0, 1300.0, true),
                // Veneer grain runs along the board height.
                material("CHAPA", 1250.0, 3050.0, false),
            ],
            overrides: vec![FinishOverride {
                material: "CHAPA".to_string(),
                finish: "ROBLE".to_string(),
                board_width_mm: 1250.0,
                board_height_mm: 2500.0,
            }],
        }
    }
}

#[derive(Debug, Clone)]
pub struct BoardRuleResolver {
    materials: HashMap<String, BoardRule>,
    overrides: HashMap<(String, String), (f64, f64)>,
}

impl Default for BoardRuleResolver {
    fn default() -> Self {
        Self::from_table(RuleTable::builtin()).expect("built-in rule table is valid")
    }
}

impl BoardRuleResolver {
    pub fn from_table(table: RuleTable) -> Result<Self> {
        let mut materials = HashMap::new();
        for rule in table.materials {
            check_board_size(&rule.material, rule.board_width_mm, rule.board_height_mm)?;
            let key = normalize_key(&rule.material);
            let board = BoardRule {
                board_width_mm: rule.board_width_mm,
                board_height_mm: rule.board_height_mm,
                rotation_allowed: rule.rotation_allowed,
            };
            if materials.insert(key.clone(), board).is_some() {
                return Err(Error::InvalidRuleTable(format!(
                    "material '{key}' is listed more than once"
                )));
            }
        }

        let mut overrides = HashMap::new();
        for o in table.overrides {
            check_board_size(&o.material, o.board_width_mm, o.board_height_mm)?;
            let key = (normalize_key(&o.material), normalize_key(&o.finish));
            if !materials.contains_key(&key.0) {
                return Err(Error::InvalidRuleTable(format!(
                    "override for '{}/{}' names an unknown material",
                    key.0, key.1
                )));
            }
            if overrides
                .insert(key.clone(), (o.board_width_mm, o.board_height_mm))
                .is_some()
            {
                return Err(Error::InvalidRuleTable(format!(
                    "override for '{}/{}' is listed more than once",
                    key.0, key.1
                )));
            }
        }

        Ok(Self {
            materials,
            overrides,
        })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let table: RuleTable = serde_json::from_str(&text)?;
        Self::from_table(table)
    }

    /// `None` when the material has no configured rule.
    pub fn resolve(&self, material: &str, finish: &str) -> Option<BoardRule> {
        let material = normalize_key(material);
        let base = *self.materials.get(&material)?;
        match self.overrides.get(&(material, normalize_key(finish))) {
            Some(&(w, h)) => Some(BoardRule {
                board_width_mm: w,
                board_height_mm: h,
                ..base
            }),
            None => Some(base),
        }
    }
}

fn check_board_size(material: &str, w: f64, h: f64) -> Result<()> {
    if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
        return Err(Error::InvalidRuleTable(format!(
            "board {w}x{h} for '{material}' must be positive"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  lacá   mate "), "LACA MATE");
        assert_eq!(normalize_key("Ñandú"), "NANDU");
        assert_eq!(normalize_key("MDF"), "MDF");
    }

    #[test]
    fn test_resolve_default_material() {
        let resolver = BoardRuleResolver::default();
        let rule = resolver.resolve("melamina", "blanco").unwrap();
        assert_eq!(rule.board_width_mm, 2850.0);
        assert_eq!(rule.board_height_mm, 2100.0);
        assert!(rule.rotation_allowed);
    }

    #[test]
    fn test_resolve_is_accent_insensitive() {
        let resolver = BoardRuleResolver::default();
        assert_eq!(resolver.resolve("Láca", "x"), resolver.resolve("LACA", "x"));
    }

    #[test]
    fn test_override_inherits_rotation() {
        let resolver = BoardRuleResolver::default();
        let plain = resolver.resolve("CHAPA", "NOGAL").unwrap();
        let oak = resolver.resolve("chapa", " Roble ").unwrap();
        assert_eq!(plain.board_height_mm, 3050.0);
        assert_eq!(oak.board_width_mm, 1250.0);
        assert_eq!(oak.board_height_mm, 2500.0);
        assert_eq!(oak.rotation_allowed, plain.rotation_allowed);
        assert!(!oak.rotation_allowed);
    }

    #[test]
    fn test_unknown_material() {
        let resolver = BoardRuleResolver::default();
        assert!(resolver.resolve("CRISTAL", "ROBLE").is_none());
    }

    #[test]
    fn test_table_from_json() {
        let json = r#"{
            "materials": [
                {"material": "Compacto", "board_width_mm": 4200, "board_height_mm": 1300, "rotation_allowed": false}
            ]
        }"#;
        let table: RuleTable = serde_json::from_str(json).unwrap();
        let resolver = BoardRuleResolver::from_table(table).unwrap();
        let rule = resolver.resolve("COMPACTO", "GRIS").unwrap();
        assert_eq!(rule.board_width_mm, 4200.0);
        assert!(resolver.resolve("MDF", "x").is_none());
    }

    #[test]
    fn test_duplicate_material_rejected() {
        let mut table = RuleTable::builtin();
        table.materials.push(MaterialRule {
            material: "mdf".to_string(),
            board_width_mm: 100.0,
            board_height_mm: 100.0,
            rotation_allowed: true,
        });
        assert!(matches!(
            BoardRuleResolver::from_table(table),
            Err(Error::InvalidRuleTable(_))
        ));
    }

    #[test]
    fn test_non_positive_board_rejected() {
        let table = RuleTable {
            materials: vec![MaterialRule {
                material: "MDF".to_string(),
                board_width_mm: 0.0,
                board_height_mm: 1220.0,
                rotation_allowed: true,
            }],
            overrides: vec![],
        };
        assert!(BoardRuleResolver::from_table(table).is_err());
    }

    #[test]
    fn test_override_for_unknown_material_rejected() {
        let mut table = RuleTable::builtin();
        table.overrides.push(FinishOverride {
            material: "CRISTAL".to_string(),
            finish: "MATE".to_string(),
            board_width_mm: 100.0,
            board_height_mm: 100.0,
        });
        assert!(BoardRuleResolver::from_table(table).is_err());
    }
}
