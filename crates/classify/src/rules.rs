use serde::Serialize;

use banchi_core::category::{
    EXPENSE_TH, INCOME_TH, MEALS_TH, OTHER_TH, RENT_TH, SALES_INCOME_TH, TRAVEL_TH,
};
use banchi_core::ClassificationSource;

/// The slice of a transaction the rule engine looks at.
#[derive(Debug, Clone)]
pub struct ClassifiableTransaction {
    /// Signed amount in satang: positive = inflow, negative = outflow.
    pub amount_cents: i64,
    pub description: String,
    pub counterparty: Option<String>,
}

/// A classification decision. Hints are localized category names, resolved
/// to ids downstream; unresolved hints are a valid state, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub category_hint: &'static str,
    pub subcategory_hint: Option<&'static str>,
    pub confidence: f64,
    pub vendor: Option<String>,
    pub tax_tag: Option<String>,
    pub source: ClassificationSource,
}

const RENT_KEYWORDS: &[&str] = &[RENT_TH, "rent"];
const MEALS_KEYWORDS: &[&str] = &["7-eleven", "7 eleven", "coffee", "อาหาร"];
const TRANSIT_KEYWORDS: &[&str] = &["grab", "bts", "mrt", "taxi"];

/// Fallback vendor for convenience-store purchases with no counterparty.
const DEFAULT_STORE_VENDOR: &str = "7-ELEVEN";

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

/// Deterministic rule pass: first match wins, matched case-insensitively
/// against the lowercased description. No side effects, no I/O.
pub fn heuristic(txn: &ClassifiableTransaction) -> Decision {
    let d = txn.description.to_lowercase();
    let counterparty = txn.counterparty.clone().filter(|c| !c.is_empty());

    if txn.amount_cents > 0 {
        return Decision {
            category_hint: INCOME_TH,
            subcategory_hint: Some(SALES_INCOME_TH),
            confidence: 0.65,
            vendor: counterparty,
            tax_tag: None,
            source: ClassificationSource::Rule,
        };
    }

    if contains_any(&d, RENT_KEYWORDS) {
        return Decision {
            category_hint: EXPENSE_TH,
            subcategory_hint: Some(RENT_TH),
            confidence: 0.75,
            vendor: counterparty,
            tax_tag: None,
            source: ClassificationSource::Rule,
        };
    }

    if contains_any(&d, MEALS_KEYWORDS) {
        return Decision {
            category_hint: EXPENSE_TH,
            subcategory_hint: Some(MEALS_TH),
            confidence: 0.6,
            vendor: counterparty.or_else(|| Some(DEFAULT_STORE_VENDOR.to_string())),
            tax_tag: None,
            source: ClassificationSource::Rule,
        };
    }

    if contains_any(&d, TRANSIT_KEYWORDS) {
        return Decision {
            category_hint: EXPENSE_TH,
            subcategory_hint: Some(TRAVEL_TH),
            confidence: 0.6,
            vendor: counterparty,
            tax_tag: None,
            source: ClassificationSource::Rule,
        };
    }

    Decision {
        category_hint: OTHER_TH,
        subcategory_hint: None,
        confidence: 0.4,
        vendor: counterparty,
        tax_tag: None,
        source: ClassificationSource::Rule,
    }
}

/// Full engine entry point. The AI path is a labeling pass-through over the
/// rule decision, not a separate inference path: the decision is kept,
/// re-tagged `ai`, and its confidence floored at 0.7.
pub fn classify(txn: &ClassifiableTransaction, ai_enabled: bool) -> Decision {
    let decision = heuristic(txn);
    if ai_enabled {
        Decision {
            confidence: decision.confidence.max(0.7),
            source: ClassificationSource::Ai,
            ..decision
        }
    } else {
        decision
    }
}
