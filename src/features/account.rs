use super::ledger::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use std::{fmt, num::ParseIntError, str::FromStr};
use thiserror::Error;

pub const SAVINGS_MINIMUM: i64 = 500;
pub const CURRENT_MINIMUM: i64 = 1000;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct AccountNumber(u32);

impl From<u32> for AccountNumber {
    fn from(number: u32) -> Self {
        Self(number)
    }
}

impl FromStr for AccountNumber {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    #[serde(rename = "S", alias = "s")]
    Savings,

    #[serde(rename = "C", alias = "c")]
    Current,
}

impl AccountType {
    /// The floor a balance may never drop below, at creation or on withdrawal.
    pub fn minimum_balance(self) -> i64 {
        match self {
            AccountType::Savings => SAVINGS_MINIMUM,
            AccountType::Current => CURRENT_MINIMUM,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown account type {0:?}, expected S (Savings) or C (Current)")]
pub struct UnknownAccountType(String);

impl FromStr for AccountType {
    type Err = UnknownAccountType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S" | "SAVINGS" => Ok(AccountType::Savings),
            "C" | "CURRENT" => Ok(AccountType::Current),
            _ => Err(UnknownAccountType(s.to_owned())),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountType::Savings => f.write_str("Savings"),
            AccountType::Current => f.write_str("Current"),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Min. deposit: 500 (Savings) / 1000 (Current). Got {deposit} for a {account_type} account")]
    BelowMinimumDeposit {
        account_type: AccountType,
        deposit: i64,
    },

    #[error("Balance {balance} is below the {minimum} minimum for a {account_type} account")]
    BelowMinimumBalance {
        account_type: AccountType,
        balance: i64,
        minimum: i64,
    },

    #[error("Holder name must not be empty")]
    EmptyHolderName,

    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(i64),

    #[error("Balance would overflow")]
    Overflow,
}

/// How `modify` treats the minimum balance floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyPolicy {
    /// Reject a new balance below the new type's floor.
    EnforceMinimum,

    /// Replace the fields as given. Meant for administrative correction.
    AdministrativeOverride,
}

/// Replacement values for the mutable fields of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountChanges {
    pub holder_name: String,
    pub account_type: AccountType,
    pub balance: i64,
}

/// A bank account as it is persisted in the store blob
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Unique, chosen by whoever opens the account
    #[serde(alias = "acno")]
    account_number: AccountNumber,

    #[serde(alias = "name")]
    holder_name: String,

    #[serde(alias = "type")]
    account_type: AccountType,

    /// Whole currency units
    #[serde(alias = "deposit")]
    balance: i64,
}

fn validated_name(holder_name: &str) -> Result<String, ValidationError> {
    let trimmed = holder_name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyHolderName);
    }
    Ok(trimmed.to_owned())
}

fn positive(amount: i64) -> Result<i64, ValidationError> {
    if amount <= 0 {
        return Err(ValidationError::NonPositiveAmount(amount));
    }
    Ok(amount)
}

impl Account {
    pub(crate) fn open(
        account_number: AccountNumber,
        holder_name: &str,
        account_type: AccountType,
        initial_deposit: i64,
    ) -> Result<Self, ValidationError> {
        let holder_name = validated_name(holder_name)?;
        if initial_deposit < account_type.minimum_balance() {
            return Err(ValidationError::BelowMinimumDeposit {
                account_type,
                deposit: initial_deposit,
            });
        }

        Ok(Self {
            account_number,
            holder_name,
            account_type,
            balance: initial_deposit,
        })
    }

    pub(crate) fn deposit(self, amount: i64) -> LedgerResult<Self> {
        let amount = positive(amount)?;
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(ValidationError::Overflow)?;

        Ok(Self { balance, ..self })
    }

    pub(crate) fn withdraw(self, amount: i64) -> LedgerResult<Self> {
        let amount = positive(amount)?;
        let minimum = self.account_type.minimum_balance();

        match self.balance.checked_sub(amount) {
            Some(balance) if balance >= minimum => Ok(Self { balance, ..self }),
            _ => Err(LedgerError::InsufficientFunds {
                account: self.account_number,
                requested: amount,
                balance: self.balance,
                minimum,
            }),
        }
    }

    pub(crate) fn modify(self, changes: AccountChanges, policy: ModifyPolicy) -> LedgerResult<Self> {
        let holder_name = validated_name(&changes.holder_name)?;
        let minimum = changes.account_type.minimum_balance();

        if policy == ModifyPolicy::EnforceMinimum && changes.balance < minimum {
            return Err(ValidationError::BelowMinimumBalance {
                account_type: changes.account_type,
                balance: changes.balance,
                minimum,
            }
            .into());
        }

        Ok(Self {
            holder_name,
            account_type: changes.account_type,
            balance: changes.balance,
            ..self
        })
    }

    pub fn account_number(&self) -> AccountNumber {
        self.account_number
    }

    pub fn holder_name(&self) -> &str {
        &self.holder_name
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn savings(balance: i64) -> Account {
        Account::open(101.into(), "Asha", AccountType::Savings, balance).unwrap()
    }

    #[test_case("S", AccountType::Savings)]
    #[test_case("c", AccountType::Current)]
    #[test_case(" savings ", AccountType::Savings)]
    #[test_case("CURRENT", AccountType::Current)]
    fn parses_account_type(input: &str, expected: AccountType) {
        assert_eq!(input.parse::<AccountType>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_account_type() {
        assert!("fixed".parse::<AccountType>().is_err());
    }

    #[test_case(AccountType::Savings, 499 => false)]
    #[test_case(AccountType::Savings, 500 => true)]
    #[test_case(AccountType::Current, 999 => false)]
    #[test_case(AccountType::Current, 1000 => true)]
    fn opening_respects_minimum_deposit(account_type: AccountType, deposit: i64) -> bool {
        Account::open(7.into(), "Ravi", account_type, deposit).is_ok()
    }

    #[test]
    fn opening_trims_and_requires_holder_name() {
        let account = Account::open(7.into(), "  Ravi ", AccountType::Savings, 500).unwrap();
        assert_eq!(account.holder_name(), "Ravi");

        assert_eq!(
            Account::open(7.into(), "   ", AccountType::Savings, 500),
            Err(ValidationError::EmptyHolderName)
        );
    }

    #[test_case(1000, 1000 => matches Err(LedgerError::InsufficientFunds { .. }))]
    #[test_case(1000, 501 => matches Err(LedgerError::InsufficientFunds { .. }))]
    #[test_case(1000, 500 => matches Ok(500))]
    #[test_case(1000, 0 => matches Err(LedgerError::Validation(ValidationError::NonPositiveAmount(0))))]
    fn withdraw_keeps_savings_floor(balance: i64, amount: i64) -> LedgerResult<i64> {
        savings(balance).withdraw(amount).map(|account| account.balance())
    }

    #[test]
    fn deposit_rejects_overflow_and_negative_amounts() {
        assert!(matches!(
            savings(i64::MAX).deposit(1),
            Err(LedgerError::Validation(ValidationError::Overflow))
        ));
        assert!(matches!(
            savings(500).deposit(-5),
            Err(LedgerError::Validation(ValidationError::NonPositiveAmount(-5)))
        ));
        assert_eq!(savings(500).deposit(250).unwrap().balance(), 750);
    }

    #[test]
    fn modify_policy_controls_floor_check() {
        let changes = AccountChanges {
            holder_name: "Asha K".into(),
            account_type: AccountType::Current,
            balance: 0,
        };

        assert!(matches!(
            savings(500).modify(changes.clone(), ModifyPolicy::EnforceMinimum),
            Err(LedgerError::Validation(ValidationError::BelowMinimumBalance { minimum: 1000, .. }))
        ));

        let modified = savings(500)
            .modify(changes, ModifyPolicy::AdministrativeOverride)
            .unwrap();
        assert_eq!(modified.account_number(), AccountNumber(101));
        assert_eq!(modified.holder_name(), "Asha K");
        assert_eq!(modified.account_type(), AccountType::Current);
        assert_eq!(modified.balance(), 0);
    }

    #[test]
    fn serializes_with_stored_field_names() {
        let json = serde_json::to_value(savings(500)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "accountNumber": 101,
                "holderName": "Asha",
                "accountType": "S",
                "balance": 500
            })
        );
    }

    #[test]
    fn reads_legacy_field_names() {
        let account: Account =
            serde_json::from_str(r#"{"acno":5,"name":"Meera","type":"C","deposit":2500}"#).unwrap();
        assert_eq!(account.account_number(), AccountNumber(5));
        assert_eq!(account.holder_name(), "Meera");
        assert_eq!(account.account_type(), AccountType::Current);
        assert_eq!(account.balance(), 2500);
    }
}
