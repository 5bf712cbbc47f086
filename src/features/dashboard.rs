use super::account::Account;
use std::fmt;

/// Figures shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub count: usize,

    /// Wider than a single balance so many large accounts cannot overflow it
    pub total_balance: i128,
}

pub fn summarize(accounts: &[Account]) -> Summary {
    Summary {
        count: accounts.len(),
        total_balance: accounts.iter().map(|a| i128::from(a.balance())).sum(),
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total accounts: {}, total balance: {}",
            self.count,
            format_amount(self.total_balance)
        )
    }
}

/// Rupee amount with Indian digit grouping: the last three digits, then pairs.
pub fn format_amount(amount: impl Into<i128>) -> String {
    let amount = amount.into();
    let digits = amount.unsigned_abs().to_string();
    let (head, tail) = digits.split_at(digits.len().saturating_sub(3));

    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (left, right) = rest.split_at(rest.len() - 2);
        groups.push(right);
        rest = left;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();
    groups.push(tail);

    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}₹{}", groups.join(","))
}
