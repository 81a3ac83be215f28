use serde::{Deserialize, Serialize};
use std::fmt;

/// Accounting type tag on a top-level category. Categories with no stored
/// type (and unclassified transactions) bucket to `Other` when reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Income,
    Cogs,
    Expense,
    #[serde(other)]
    Other,
}

impl CategoryType {
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryType::Income => "income",
            CategoryType::Cogs => "cogs",
            CategoryType::Expense => "expense",
            CategoryType::Other => "other",
        }
    }

    /// Bucket a stored type label. Unknown or absent labels are `Other`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "income" => CategoryType::Income,
            "cogs" => CategoryType::Cogs,
            "expense" => CategoryType::Expense,
            _ => CategoryType::Other,
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Thai display names. These are the lookup keys used by classification, so
// they must match the seeded tree byte for byte.
pub const INCOME_TH: &str = "รายได้";
pub const SALES_INCOME_TH: &str = "รายได้จากการขาย";
pub const COGS_TH: &str = "ต้นทุนขาย";
pub const EXPENSE_TH: &str = "ค่าใช้จ่าย";
pub const RENT_TH: &str = "ค่าเช่า";
pub const MEALS_TH: &str = "ค่าอาหารและรับรอง";
pub const TRAVEL_TH: &str = "ค่าเดินทาง/ขนส่ง";
pub const OTHER_TH: &str = "อื่นๆ";

/// The seeded two-level category tree: (name, type, subcategory names).
/// A `None` type is stored as NULL and reports as "other".
pub const DEFAULT_CATEGORIES: &[(&str, Option<CategoryType>, &[&str])] = &[
    (INCOME_TH, Some(CategoryType::Income), &[SALES_INCOME_TH]),
    (COGS_TH, Some(CategoryType::Cogs), &[]),
    (
        EXPENSE_TH,
        Some(CategoryType::Expense),
        &[RENT_TH, MEALS_TH, TRAVEL_TH],
    ),
    (OTHER_TH, None, &[]),
];
