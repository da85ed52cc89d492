//! The closed category taxonomy (spec §4.2).
//!
//! Any category label the system produces — whether typed directly or
//! coerced from free text returned by a reasoning provider — belongs to this
//! set. There is no escape hatch: `Category::coerce` always returns a member
//! of the enum, defaulting to `Compras` per the tie-break rule in §4.1.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    // Essentials
    Vivienda,
    Servicios,
    Despensa,
    Transporte,
    Salud,
    Educacion,
    // Discretionary
    Restaurantes,
    CafeSnacks,
    Ocio,
    Compras,
    Regalos,
    // Financial movements
    Deuda,
    Inversion,
    Ingreso,
    Transferencia,
}

impl Category {
    /// The lowest-risk discretionary bucket, used whenever a terminal-state
    /// Transaction would otherwise be left without a category (spec §4.1
    /// tie-break rule).
    pub const DEFAULT: Category = Category::Compras;

    pub fn label(&self) -> &'static str {
        match self {
            Category::Vivienda => "Vivienda",
            Category::Servicios => "Servicios",
            Category::Despensa => "Despensa",
            Category::Transporte => "Transporte",
            Category::Salud => "Salud",
            Category::Educacion => "Educación",
            Category::Restaurantes => "Restaurantes",
            Category::CafeSnacks => "Café/Snacks",
            Category::Ocio => "Ocio",
            Category::Compras => "Compras",
            Category::Regalos => "Regalos",
            Category::Deuda => "Deuda",
            Category::Inversion => "Inversión",
            Category::Ingreso => "Ingreso",
            Category::Transferencia => "Transferencia",
        }
    }

    pub fn all() -> &'static [Category] {
        use Category::*;
        &[
            Vivienda, Servicios, Despensa, Transporte, Salud, Educacion, Restaurantes,
            CafeSnacks, Ocio, Compras, Regalos, Deuda, Inversion, Ingreso, Transferencia,
        ]
    }

    /// Parse a free-text label (typically something a reasoning provider
    /// returned) into a taxonomy member. Unrecognized labels are NOT an
    /// error here — callers that need the "coerce to Compras" behavior
    /// should use [`Category::coerce`]; this returns `None` so callers that
    /// care about the distinction (e.g. tests) still can.
    pub fn parse(label: &str) -> Option<Category> {
        let normalized = label.trim().to_lowercase();
        Category::all()
            .iter()
            .copied()
            .find(|c| c.label().to_lowercase() == normalized || format!("{:?}", c).to_lowercase() == normalized)
    }

    /// Parse a free-text label, coercing anything outside the closed
    /// taxonomy to the default bucket (spec §4.2: "anything else is mapped
    /// to `Compras`").
    pub fn coerce(label: &str) -> Category {
        Category::parse(label).unwrap_or(Category::DEFAULT)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_label_coerces_to_compras() {
        assert_eq!(Category::coerce("yacht maintenance"), Category::Compras);
    }

    #[test]
    fn known_label_roundtrips() {
        assert_eq!(Category::coerce("Servicios"), Category::Servicios);
        assert_eq!(Category::coerce("café/snacks"), Category::CafeSnacks);
    }
}
