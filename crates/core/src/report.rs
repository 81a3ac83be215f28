use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::category::CategoryType;
use super::money::Money;
use super::period::DateRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Summary,
    Pnl,
}

impl ReportType {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportType::Summary => "summary",
            ReportType::Pnl => "pnl",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "summary" => Ok(ReportType::Summary),
            "pnl" => Ok(ReportType::Pnl),
            other => Err(format!("Unknown report type: '{other}'")),
        }
    }
}

/// Period totals summed straight off transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub txn_count: i64,
    pub total_income: Money,
    pub total_expense: Money,
    pub net: Money,
}

impl SummaryReport {
    /// `total_expense` is the absolute sum of outflows; `net` is income minus
    /// expense. Zero rows yield all-zero totals.
    pub fn new(period: DateRange, txn_count: i64, total_income: Money, total_expense: Money) -> Self {
        SummaryReport {
            period_start: period.start,
            period_end: period.end,
            txn_count,
            total_income,
            total_expense,
            net: total_income - total_expense,
        }
    }
}

/// One P&L group: signed sum of all transactions resolving to the same
/// (category type, localized name) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlLine {
    pub category_type: CategoryType,
    pub category_name_th: String,
    pub sum_amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlTotals {
    pub income: Money,
    pub cogs: Money,
    pub expense: Money,
    pub other: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlReport {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub lines: Vec<PnlLine>,
    pub totals: PnlTotals,
    pub gross_profit: Money,
    pub net_profit: Money,
}

impl PnlReport {
    /// Derive totals and profit figures from grouped lines. Amounts keep
    /// their stored sign: cogs and expense groups sum negative, so
    /// `gross_profit = income + cogs` and `net_profit` is the plain sum of
    /// all four buckets.
    pub fn from_lines(period: DateRange, lines: Vec<PnlLine>) -> Self {
        let mut totals = PnlTotals {
            income: Money::zero(),
            cogs: Money::zero(),
            expense: Money::zero(),
            other: Money::zero(),
        };

        for line in &lines {
            match line.category_type {
                CategoryType::Income => totals.income = totals.income + line.sum_amount,
                CategoryType::Cogs => totals.cogs = totals.cogs + line.sum_amount,
                CategoryType::Expense => totals.expense = totals.expense + line.sum_amount,
                CategoryType::Other => totals.other = totals.other + line.sum_amount,
            }
        }

        let gross_profit = totals.income + totals.cogs;
        let net_profit = totals.income + totals.cogs + totals.expense + totals.other;

        PnlReport {
            period_start: period.start,
            period_end: period.end,
            lines,
            totals,
            gross_profit,
            net_profit,
        }
    }
}
