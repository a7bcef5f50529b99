//! Static registry of logical tables.
//!
//! Each logical table is one worksheet: a header row followed by data rows,
//! column order fixed here. The registry is the single source of truth for
//! worksheet names, headers, and the A1 ranges the reader/writer use.

/// A logical table in the remote spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Transactions,
    Adjustments,
    Debts,
    Notes,
    SavingsGoal,
    SavingsDeposits,
    SavingsOverrides,
    SavingsTxLinks,
}

impl Table {
    pub const ALL: [Table; 8] = [
        Table::Transactions,
        Table::Adjustments,
        Table::Debts,
        Table::Notes,
        Table::SavingsGoal,
        Table::SavingsDeposits,
        Table::SavingsOverrides,
        Table::SavingsTxLinks,
    ];

    /// Worksheet title.
    pub fn name(self) -> &'static str {
        match self {
            Table::Transactions => "transactions",
            Table::Adjustments => "cashflow_adjustments",
            Table::Debts => "debts",
            Table::Notes => "notes",
            Table::SavingsGoal => "savings_goal",
            Table::SavingsDeposits => "savings_deposits",
            Table::SavingsOverrides => "savings_overrides",
            Table::SavingsTxLinks => "savings_tx_links",
        }
    }

    /// Ordered column list; the first row of the worksheet must equal this.
    pub fn header(self) -> &'static [&'static str] {
        match self {
            Table::Transactions => &[
                "id",
                "date",
                "description",
                "kind",
                "amount",
                "category",
                "paid",
                "created_at",
            ],
            Table::Adjustments => &["id", "date", "value", "description", "created_at"],
            Table::Debts => &[
                "id",
                "creditor",
                "description",
                "amount",
                "due_date",
                "priority",
                "settled",
                "created_at",
            ],
            Table::Notes => &["id", "title", "body", "created_at", "updated_at"],
            Table::SavingsGoal => &["id", "target_amount", "due_date", "deposit_count"],
            Table::SavingsDeposits => &["n", "done"],
            Table::SavingsOverrides => &["n", "amount"],
            Table::SavingsTxLinks => &["n", "transaction_id"],
        }
    }

    pub fn width(self) -> usize {
        self.header().len()
    }

    /// A1 range covering the header plus a bounded number of data rows.
    pub fn data_range(self, max_rows: u32) -> String {
        format!("{}!A1:{}{}", self.name(), self.last_column(), max_rows)
    }

    /// A1 range of the header row only.
    pub fn header_range(self) -> String {
        format!("{}!A1:{}1", self.name(), self.last_column())
    }

    pub fn header_row(self) -> Vec<String> {
        self.header().iter().map(|c| (*c).to_string()).collect()
    }

    fn last_column(self) -> char {
        // Widths are all <= 8 columns, so single letters suffice.
        (b'A' + (self.width() as u8 - 1)) as char
    }
}
