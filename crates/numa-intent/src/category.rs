//! `classify_category` (spec §4.2) and the ant-expense override.
//!
//! Deterministic and keyword-based: classification feeding the closed
//! taxonomy must be a pure function of its inputs (spec §4.2 "Single-path
//! determinism"), so this never calls out to a reasoning provider.

use numa_types::Category;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

struct Rule {
    category: Category,
    keywords: &'static [&'static str],
    confidence: f32,
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule {
            category: Category::Vivienda,
            keywords: &["renta", "hipoteca", "alquiler", "mantenimiento del depto", "condominio"],
            confidence: 0.9,
        },
        Rule {
            category: Category::Servicios,
            keywords: &["luz", "agua", "gas", "internet", "telefono", "teléfono", "cfe", "wifi"],
            confidence: 0.9,
        },
        Rule {
            category: Category::Transporte,
            keywords: &["uber", "didi", "gasolina", "camion", "camión", "metro", "taxi", "estacionamiento"],
            confidence: 0.88,
        },
        Rule {
            category: Category::Salud,
            keywords: &["farmacia", "doctor", "medico", "médico", "hospital", "consulta", "medicina"],
            confidence: 0.9,
        },
        Rule {
            category: Category::Educacion,
            keywords: &["colegiatura", "escuela", "curso", "libros de texto", "universidad"],
            confidence: 0.88,
        },
        Rule {
            category: Category::Restaurantes,
            keywords: &["restaurante", "comida corrida", "cena", "comimos", "taqueria", "taquería"],
            confidence: 0.85,
        },
        Rule {
            category: Category::CafeSnacks,
            keywords: &["cafe", "café", "cafeteria", "cafetería", "starbucks", "snack", "antojito"],
            confidence: 0.8,
        },
        Rule {
            category: Category::Ocio,
            keywords: &["cine", "boletos", "concierto", "netflix", "spotify", "videojuego"],
            confidence: 0.85,
        },
        Rule {
            category: Category::Despensa,
            keywords: &["super", "súper", "abarrotes", "mercado", "oxxo", "tienda", "despensa"],
            confidence: 0.8,
        },
        Rule {
            category: Category::Regalos,
            keywords: &["regalo", "cumpleanos", "cumpleaños", "aniversario"],
            confidence: 0.85,
        },
        Rule {
            category: Category::Deuda,
            keywords: &["deuda", "prestamo", "préstamo", "tarjeta de credito", "tarjeta de crédito"],
            confidence: 0.9,
        },
        Rule {
            category: Category::Inversion,
            keywords: &["inversion", "inversión", "acciones", "afore", "cetes"],
            confidence: 0.9,
        },
        Rule {
            category: Category::Ingreso,
            keywords: &["nomina", "nómina", "sueldo", "pago de cliente", "honorarios"],
            confidence: 0.9,
        },
        Rule {
            category: Category::Transferencia,
            keywords: &["transferencia", "traspaso", "envio a", "envío a"],
            confidence: 0.85,
        },
    ]
});

static CAFE_OR_CONVENIENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)caf[eé]|starbucks|oxxo|kiosco|tienda de conveniencia|7-eleven").unwrap()
});

fn strip_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// `FIM.classify_category(concept, merchant) -> {category, confidence}`
/// (spec §4.2). Always returns a taxonomy member; unmatched input defaults
/// to `Compras` at low confidence rather than failing.
pub fn classify_category(concept: &str, merchant: Option<&str>) -> (Category, f32) {
    let haystack = strip_accents(&format!(
        "{} {}",
        concept.to_lowercase(),
        merchant.unwrap_or("").to_lowercase()
    ));

    for rule in RULES.iter() {
        if rule
            .keywords
            .iter()
            .any(|kw| haystack.contains(&strip_accents(kw)))
        {
            return (rule.category, rule.confidence);
        }
    }

    (Category::DEFAULT, 0.3)
}

/// Ant-expense rule (spec §4.2 glossary): a small spend at a café or
/// convenience merchant is preferred as `Café/Snacks` (or `Compras` absent
/// a clearer signal) over `Despensa`, which assumes a proper grocery trip.
/// Only applies below `threshold`; at or above it the classifier's own
/// result stands.
pub fn apply_ant_expense_rule(
    category: Category,
    amount: Decimal,
    concept: &str,
    merchant: Option<&str>,
    threshold: Decimal,
) -> Category {
    if category != Category::Despensa || amount >= threshold {
        return category;
    }
    let haystack = format!("{} {}", concept, merchant.unwrap_or(""));
    if CAFE_OR_CONVENIENCE.is_match(&haystack) {
        Category::CafeSnacks
    } else {
        category
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn unmatched_concept_defaults_to_compras() {
        let (category, confidence) = classify_category("xyz cosa rara", None);
        assert_eq!(category, Category::DEFAULT);
        assert!(confidence < 0.7);
    }

    #[test]
    fn utility_keyword_maps_to_servicios() {
        let (category, _) = classify_category("pago de luz", None);
        assert_eq!(category, Category::Servicios);
    }

    #[test]
    fn small_cafe_spend_prefers_cafe_snacks_over_despensa() {
        let base = classify_category("café", Some("Starbucks")).0;
        let adjusted = apply_ant_expense_rule(base, dec!(50), "café", Some("Starbucks"), dec!(200));
        assert_eq!(adjusted, Category::CafeSnacks);
    }

    #[test]
    fn large_despensa_spend_is_not_forced_to_cafe_snacks() {
        let adjusted = apply_ant_expense_rule(
            Category::Despensa,
            dec!(200.01),
            "super",
            Some("Soriana"),
            dec!(200),
        );
        assert_eq!(adjusted, Category::Despensa);
    }
}
