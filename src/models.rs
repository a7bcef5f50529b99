use crate::parse;
use serde::{Deserialize, Serialize};

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Inflow,
    Outflow,
}

impl TxKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TxKind::Inflow => "inflow",
            TxKind::Outflow => "outflow",
        }
    }

    /// Case-insensitive parse. Unknown spellings coerce to `Outflow`,
    /// the defensive default for a damaged cell.
    pub fn parse_or_default(cell: &str) -> Self {
        match cell.trim().to_ascii_lowercase().as_str() {
            "inflow" => TxKind::Inflow,
            _ => TxKind::Outflow,
        }
    }
}

/// A ledger entry. Dates are kept as the ISO-8601 strings the table stores
/// so a fetch returns fields byte-for-byte as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub date: String,
    pub description: String,
    pub kind: TxKind,
    pub amount: f64,
    pub category: String,
    pub paid: bool,
    pub created_at: String,
}

impl Transaction {
    pub(crate) fn from_row(row: &[String]) -> Self {
        Self {
            id: parse::int_or(cell(row, 0), 0),
            date: cell(row, 1).to_string(),
            description: cell(row, 2).to_string(),
            kind: TxKind::parse_or_default(cell(row, 3)),
            amount: parse::float_or(cell(row, 4), 0.0),
            category: non_blank_or(cell(row, 5), "Other"),
            paid: parse::flag_or(cell(row, 6), false),
            created_at: cell(row, 7).to_string(),
        }
    }

    pub(crate) fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.date.clone(),
            self.description.clone(),
            self.kind.as_str().to_string(),
            self.amount.to_string(),
            self.category.clone(),
            parse::flag_cell(self.paid),
            self.created_at.clone(),
        ]
    }
}

/// A simulated outflow applied to the daily cash-flow projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowAdjustment {
    pub id: i64,
    pub date: String,
    pub value: f64,
    pub description: String,
    pub created_at: String,
}

impl CashflowAdjustment {
    pub(crate) fn from_row(row: &[String]) -> Self {
        Self {
            id: parse::int_or(cell(row, 0), 0),
            date: cell(row, 1).to_string(),
            value: parse::float_or(cell(row, 2), 0.0),
            description: cell(row, 3).to_string(),
            created_at: cell(row, 4).to_string(),
        }
    }

    pub(crate) fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.date.clone(),
            self.value.to_string(),
            self.description.clone(),
            self.created_at.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub id: i64,
    pub creditor: String,
    pub description: String,
    pub amount: f64,
    /// ISO date, empty when the debt has no due date.
    pub due_date: String,
    pub priority: i64,
    pub settled: bool,
    pub created_at: String,
}

impl Debt {
    pub(crate) fn from_row(row: &[String]) -> Self {
        Self {
            id: parse::int_or(cell(row, 0), 0),
            creditor: cell(row, 1).to_string(),
            description: cell(row, 2).to_string(),
            amount: parse::float_or(cell(row, 3), 0.0),
            due_date: cell(row, 4).to_string(),
            priority: parse::int_or(cell(row, 5), 1),
            settled: parse::flag_or(cell(row, 6), false),
            created_at: cell(row, 7).to_string(),
        }
    }

    pub(crate) fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.creditor.clone(),
            self.description.clone(),
            self.amount.to_string(),
            self.due_date.clone(),
            self.priority.to_string(),
            parse::flag_cell(self.settled),
            self.created_at.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Note {
    pub(crate) fn from_row(row: &[String]) -> Self {
        Self {
            id: parse::int_or(cell(row, 0), 0),
            title: cell(row, 1).to_string(),
            body: cell(row, 2).to_string(),
            created_at: cell(row, 3).to_string(),
            updated_at: cell(row, 4).to_string(),
        }
    }

    pub(crate) fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.body.clone(),
            self.created_at.clone(),
            self.updated_at.clone(),
        ]
    }
}

/// The savings-goal singleton, with all fields optional so a cleared goal
/// reads back as `None`s rather than zeros.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub target_amount: Option<f64>,
    pub due_date: Option<String>,
    pub deposit_count: Option<i64>,
}

/// One deposit slot of the challenge, with its effective amount
/// (override when present, otherwise the triangular default `n`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsDeposit {
    pub n: i64,
    pub done: bool,
    pub amount: f64,
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

fn non_blank_or(cell: &str, default: &str) -> String {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        cell.to_string()
    }
}
