use super::account::AccountNumber;
use super::ledger::{Ledger, LedgerResult};
use super::store::BlobStore;
use serde::{Deserialize, Serialize};
use std::io;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Credits the account, increasing its balance by the amount
    Deposit,

    /// Debits the account. Fails and leaves the balance unchanged if it would
    /// drop below the minimum for the account type
    Withdrawal,
}

/// One row of a batch file: `type, account, amount`
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transaction {
    #[serde(rename = "type")]
    transaction_type: TransactionType,

    account: AccountNumber,

    /// Whole currency units
    amount: i64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub applied: usize,
    pub rejected: usize,
}

impl Transaction {
    pub fn new(transaction_type: TransactionType, account: AccountNumber, amount: i64) -> Self {
        Self {
            transaction_type,
            account,
            amount,
        }
    }

    /// Applies the transaction and returns the new balance.
    pub fn apply<B: BlobStore>(self, ledger: &mut Ledger<B>) -> LedgerResult<i64> {
        use TransactionType::*;

        match self.transaction_type {
            Deposit => ledger.deposit(self.account, self.amount),
            Withdrawal => ledger.withdraw(self.account, self.amount),
        }
    }
}

/// Applies every row of a CSV batch in order. Rows that fail are logged and
/// skipped, the rest still apply.
pub fn apply_batch<R, B>(reader: R, ledger: &mut Ledger<B>) -> anyhow::Result<BatchReport>
where
    R: io::Read,
    B: BlobStore,
{
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut report = BatchReport::default();

    for result in rdr.deserialize() {
        let transaction: Transaction = result?;
        match transaction.apply(ledger) {
            Ok(_) => report.applied += 1,
            Err(e) => {
                warn!("{e}");
                report.rejected += 1;
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{
        account::AccountType,
        store::{LoadPolicy, MemoryBlobs, Store},
    };

    fn ledger() -> Ledger<MemoryBlobs> {
        let mut ledger = Ledger::new(Store::new(MemoryBlobs::new(), LoadPolicy::Lenient));
        ledger
            .create(1.into(), "Asha", AccountType::Savings, 500)
            .unwrap();
        ledger
            .create(2.into(), "Ravi", AccountType::Current, 1000)
            .unwrap();
        ledger
    }

    #[test]
    fn applies_rows_and_skips_failures() {
        let data = "\
type, account, amount
deposit, 1, 1000
withdrawal, 1, 1001
withdrawal, 1, 1000
deposit, 2, 500
withdrawal, 2, 600
deposit, 9, 10
";
        let mut ledger = ledger();
        let report = apply_batch(data.as_bytes(), &mut ledger).unwrap();

        assert_eq!(
            report,
            BatchReport {
                applied: 3,
                rejected: 3
            }
        );
        assert_eq!(ledger.enquire(1.into()).unwrap().balance(), 500);
        assert_eq!(ledger.enquire(2.into()).unwrap().balance(), 1500);
    }

    #[test]
    fn malformed_row_aborts_batch() {
        let data = "\
type, account, amount
deposit, 1, 100
refund, 1, 100
deposit, 1, 100
";
        let mut ledger = ledger();

        assert!(apply_batch(data.as_bytes(), &mut ledger).is_err());
        assert_eq!(ledger.enquire(1.into()).unwrap().balance(), 600);
    }

    #[test]
    fn single_transaction_returns_balance() {
        let mut ledger = ledger();
        let balance = Transaction::new(TransactionType::Deposit, 2.into(), 250)
            .apply(&mut ledger)
            .unwrap();
        assert_eq!(balance, 1250);
    }
}
