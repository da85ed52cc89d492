//! The deterministic 3-level decision tree (spec §4.2): Validity -> Domain
//! -> Financial Resolution. Pure and total: the same input text always
//! produces the same list of [`IntentRecord`]s (spec §4.2 "Single-path
//! determinism").

use chrono::Utc;
use numa_types::{Amount, Entities, Intent, IntentRecord, Period, SteerKind, TransactionType};
use once_cell::sync::Lazy;
use regex::{Match, Regex};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::category::{apply_ant_expense_rule, classify_category};

const MIN_SIGNIFICANT_CHARS: usize = 2;

static AMOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\$?\s*(\d+(?:[.,]\d+)?)\s*(?:pesos|mxn)?").unwrap());

static META_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)cambia(r)? el idioma|borra(r)? mis datos|elimina(r)? mi cuenta|configuraci[oó]n")
        .unwrap()
});

static SOCIAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(hola|buenos d[ií]as|buenas( tardes| noches)?|qu[eé] tal|gracias|adi[oó]s|c[oó]mo est[aá]s)\s*[!.¡¿?]*\s*$")
        .unwrap()
});

static READ_QUERY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)cu[aá]nto|cu[aá]ntos|balance|resumen|total gastado|c[oó]mo voy con mis gastos")
        .unwrap()
});

static PLAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)quiero ahorrar|plan de ahorro|meta de ahorro|ay[uú]dame a ahorrar").unwrap());

static ADVICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)qu[eé] me recomiendas|dame un consejo|consejo financiero|c[oó]mo voy con mis finanzas")
        .unwrap()
});

static CONFIRM_UPDATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)en realidad (fue|era)|corrige|actualiza (el|la)|cambia (el comercio|la categor[ií]a)")
        .unwrap()
});
static CONFIRM_MERCHANT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)en realidad (?:fue|era) en (.+)$").unwrap());
static CONFIRM_CATEGORY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)cambia la categor[ií]a a (.+)$").unwrap());

static DEBT_CUE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bdebo\b|deuda|pr[eé]stamo").unwrap());
static INCOME_CUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)recib[ií]|gan[eé]|cobr[eé]|ingreso|n[oó]mina|dep[oó]sito").unwrap()
});

static WEEK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)esta semana").unwrap());
static MONTH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)este mes").unwrap());
static TODAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bhoy\b").unwrap());

static STOPWORDS: &[&str] = &[
    "gaste", "gasté", "gasto", "pague", "pagué", "compre", "compré", "recibi", "recibí", "gane",
    "gané", "cobre", "cobré", "debo", "de", "del", "en", "el", "la", "los", "las", "un", "una",
    "y", "con", "por", "pesos", "mxn", "hoy", "esta", "semana", "este", "mes", "que", "cuanto",
    "cuánto", "cuanto", "cómo", "como",
];

fn is_significant(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let alnum_count = text.chars().filter(|c| c.is_alphanumeric()).count();
    if alnum_count < MIN_SIGNIFICANT_CHARS {
        return false;
    }
    let only_alphabetic = text.chars().all(|c| c.is_alphabetic() || c.is_whitespace());
    if only_alphabetic {
        let lower = text.to_lowercase();
        let has_vowel = lower.chars().any(|c| "aeiouáéíóú".contains(c));
        if !has_vowel {
            return false;
        }
    }
    true
}

fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    let cleaned = cleaned.replace(',', "");
    Decimal::from_str(&cleaned).ok()
}

fn extract_concept(clause: &str, amount_match: Option<Match>) -> Option<String> {
    let mut working = clause.to_lowercase();
    if let Some(m) = amount_match {
        working.replace_range(m.range(), " ");
    }
    let cleaned: String = working
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    let words: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|w| !STOPWORDS.contains(w))
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

fn split_clauses(text: &str) -> Vec<String> {
    let amount_count = AMOUNT_RE.find_iter(text).count();
    if amount_count <= 1 {
        return vec![text.to_string()];
    }
    text.split(" y ")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn resolve_period(clause: &str) -> Period {
    if WEEK_RE.is_match(clause) {
        Period::ThisWeek
    } else if MONTH_RE.is_match(clause) {
        Period::ThisMonth
    } else {
        Period::Today
    }
}

fn extract_read_query(clause: &str, confidence_threshold: f32) -> IntentRecord {
    let period = resolve_period(clause);
    let (category_guess, confidence) = classify_category(clause, None);
    let category = (confidence >= confidence_threshold).then_some(category_guess);

    IntentRecord {
        intent: Intent::ReadQuery,
        sub_intent: None,
        steer_kind: None,
        entities: Entities {
            period: Some(period),
            category,
            ..Default::default()
        },
        confidence: 0.9,
    }
}

fn extract_confirm_update(clause: &str) -> IntentRecord {
    let merchant = CONFIRM_MERCHANT_RE
        .captures(clause)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string());
    let category = CONFIRM_CATEGORY_RE
        .captures(clause)
        .and_then(|c| c.get(1))
        .map(|m| numa_types::Category::coerce(m.as_str().trim()));

    IntentRecord {
        intent: Intent::ConfirmUpdate,
        sub_intent: None,
        steer_kind: None,
        entities: Entities {
            merchant,
            category,
            ..Default::default()
        },
        confidence: 0.8,
    }
}

fn extract_write_log(
    clause: &str,
    confidence_threshold: f32,
    ant_expense_threshold: Decimal,
) -> IntentRecord {
    let amount_match = AMOUNT_RE.captures(clause).and_then(|c| c.get(1));
    let amount_value = amount_match.and_then(|m| parse_amount(m.as_str()));
    let concept = extract_concept(clause, amount_match);

    match (amount_value, concept) {
        (Some(amount_value), Some(concept)) if !concept.is_empty() => {
            let kind = if DEBT_CUE_RE.is_match(clause) {
                TransactionType::Debt
            } else if INCOME_CUE_RE.is_match(clause) {
                TransactionType::Income
            } else {
                TransactionType::Expense
            };

            let (category_guess, confidence) = classify_category(&concept, None);
            let category = (confidence >= confidence_threshold).then(|| {
                apply_ant_expense_rule(category_guess, amount_value, &concept, None, ant_expense_threshold)
            });

            IntentRecord {
                intent: Intent::WriteLog,
                sub_intent: Some(kind),
                steer_kind: None,
                entities: Entities {
                    amount: Amount::try_new(amount_value).ok(),
                    concept: Some(concept),
                    category,
                    date: Some(Utc::now().date_naive()),
                    ..Default::default()
                },
                confidence: 0.85,
            }
        }
        (amount_value, concept) => {
            let missing = match (amount_value.is_some(), concept.as_deref().map(|c| !c.is_empty()).unwrap_or(false)) {
                (false, false) => "concept and amount",
                (false, true) => "amount",
                (true, false) => "concept",
                (true, true) => unreachable!("both present handled above"),
            };
            IntentRecord::clarify(format!("missing {missing}"))
        }
    }
}

fn resolve_financial(
    text: &str,
    confidence_threshold: f32,
    ant_expense_threshold: Decimal,
) -> Vec<IntentRecord> {
    if CONFIRM_UPDATE_RE.is_match(text) {
        return vec![extract_confirm_update(text)];
    }
    if READ_QUERY_RE.is_match(text) {
        return vec![extract_read_query(text, confidence_threshold)];
    }
    if PLAN_RE.is_match(text) {
        return vec![IntentRecord {
            intent: Intent::Plan,
            sub_intent: None,
            steer_kind: None,
            entities: Entities::default(),
            confidence: 0.8,
        }];
    }
    if ADVICE_RE.is_match(text) {
        return vec![IntentRecord {
            intent: Intent::Advice,
            sub_intent: None,
            steer_kind: None,
            entities: Entities::default(),
            confidence: 0.8,
        }];
    }

    split_clauses(text)
        .iter()
        .map(|clause| extract_write_log(clause, confidence_threshold, ant_expense_threshold))
        .collect()
}

/// `FIM.classify(text) -> Vec<IntentRecord>` (spec §4.2). Always returns
/// at least one record.
pub fn classify(text: &str, confidence_threshold: f32, ant_expense_threshold: Decimal) -> Vec<IntentRecord> {
    let trimmed = text.trim();
    if !is_significant(trimmed) {
        return vec![IntentRecord::clarify("unintelligible")];
    }
    if SOCIAL_RE.is_match(trimmed) {
        return vec![IntentRecord::steer(SteerKind::Social)];
    }
    if META_RE.is_match(trimmed) {
        return vec![IntentRecord::steer(SteerKind::Meta)];
    }
    resolve_financial(trimmed, confidence_threshold, ant_expense_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use numa_types::Category;
    use rust_decimal_macros::dec;

    fn classify_default(text: &str) -> Vec<IntentRecord> {
        classify(text, 0.7, dec!(200))
    }

    #[test]
    fn empty_input_is_unintelligible() {
        let records = classify_default("   ");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].intent, Intent::Clarify);
        assert_eq!(records[0].entities.reason.as_deref(), Some("unintelligible"));
    }

    #[test]
    fn single_write_log_with_amount_and_concept() {
        let records = classify_default("Gasté 500 pesos en el súper");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].intent, Intent::WriteLog);
        assert_eq!(records[0].sub_intent, Some(TransactionType::Expense));
        assert_eq!(records[0].entities.amount.unwrap().value(), dec!(500));
        assert!(records[0].entities.concept.as_deref().unwrap().contains("super") || records[0].entities.concept.as_deref().unwrap().contains("súper"));
    }

    #[test]
    fn multi_clause_utterance_produces_two_write_logs() {
        let records = classify_default("Gasté 100 en luz y 200 en agua");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].entities.amount.unwrap().value(), dec!(100));
        assert_eq!(records[0].entities.category, Some(Category::Servicios));
        assert_eq!(records[1].entities.amount.unwrap().value(), dec!(200));
        assert_eq!(records[1].entities.category, Some(Category::Servicios));
    }

    #[test]
    fn bare_type_word_without_concept_or_amount_is_ambiguous() {
        let records = classify_default("gasto");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].intent, Intent::Clarify);
    }

    #[test]
    fn read_query_extracts_today_period() {
        let records = classify_default("¿cuánto gasté hoy?");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].intent, Intent::ReadQuery);
        assert_eq!(records[0].entities.period, Some(Period::Today));
    }

    #[test]
    fn social_greeting_is_steer() {
        let records = classify_default("Hola");
        assert_eq!(records[0].intent, Intent::Steer);
        assert_eq!(records[0].steer_kind, Some(SteerKind::Social));
    }

    #[test]
    fn meta_command_is_steer() {
        let records = classify_default("quiero borrar mis datos");
        assert_eq!(records[0].intent, Intent::Steer);
        assert_eq!(records[0].steer_kind, Some(SteerKind::Meta));
    }

    #[test]
    fn classification_is_pure() {
        let a = classify_default("Gasté 500 pesos en el súper");
        let b = classify_default("Gasté 500 pesos en el súper");
        assert_eq!(a.len(), b.len());
        assert_eq!(a[0].entities.amount, b[0].entities.amount);
        assert_eq!(a[0].entities.concept, b[0].entities.concept);
    }
}
