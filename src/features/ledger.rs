use super::{
    account::{Account, AccountChanges, AccountNumber, AccountType, ModifyPolicy, ValidationError},
    dashboard::{summarize, Summary},
    store::{BlobStore, Store, StoreError},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Account number {0} already exists.")]
    Duplicate(AccountNumber),

    #[error("Account {0} not found.")]
    NotFound(AccountNumber),

    #[error(
        "Insufficient balance for this withdrawal. Account {account} holds {balance}, withdrawing {requested} would go below the {minimum} minimum"
    )]
    InsufficientFunds {
        account: AccountNumber,
        requested: i64,
        balance: i64,
        minimum: i64,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type LedgerResult<T> = anyhow::Result<T, LedgerError>;

/// Validates and applies account operations against a [`Store`].
///
/// Every operation reads the full collection, checks it, and writes the full
/// collection back. Nothing is written when a check fails.
pub struct Ledger<B> {
    store: Store<B>,
}

impl<B: BlobStore> Ledger<B> {
    pub fn new(store: Store<B>) -> Self {
        Self { store }
    }

    pub fn create(
        &mut self,
        account_number: AccountNumber,
        holder_name: &str,
        account_type: AccountType,
        initial_deposit: i64,
    ) -> LedgerResult<Account> {
        let account = Account::open(account_number, holder_name, account_type, initial_deposit)?;

        let mut accounts = self.store.load()?;
        if accounts.iter().any(|a| a.account_number() == account_number) {
            return Err(LedgerError::Duplicate(account_number));
        }

        accounts.push(account.clone());
        self.store.save(&accounts)?;
        info!("Opened {account_type} account {account_number} with {initial_deposit}");
        Ok(account)
    }

    /// Returns the new balance.
    pub fn deposit(&mut self, account_number: AccountNumber, amount: i64) -> LedgerResult<i64> {
        let balance = self.update(account_number, |account| account.deposit(amount))?.balance();
        info!("Deposited {amount} into {account_number}, balance {balance}");
        Ok(balance)
    }

    /// Returns the new balance.
    pub fn withdraw(&mut self, account_number: AccountNumber, amount: i64) -> LedgerResult<i64> {
        let balance = self.update(account_number, |account| account.withdraw(amount))?.balance();
        info!("Withdrew {amount} from {account_number}, balance {balance}");
        Ok(balance)
    }

    pub fn enquire(&self, account_number: AccountNumber) -> LedgerResult<Account> {
        self.store
            .load()?
            .into_iter()
            .find(|a| a.account_number() == account_number)
            .ok_or(LedgerError::NotFound(account_number))
    }

    pub fn list_all(&self) -> LedgerResult<Vec<Account>> {
        Ok(self.store.load()?)
    }

    pub fn modify(
        &mut self,
        account_number: AccountNumber,
        changes: AccountChanges,
        policy: ModifyPolicy,
    ) -> LedgerResult<Account> {
        let account = self.update(account_number, |account| account.modify(changes, policy))?;
        if policy == ModifyPolicy::AdministrativeOverride {
            warn!("Account {account_number} modified with the minimum balance check overridden");
        }
        info!("Modified account {account_number}");
        Ok(account)
    }

    /// Removes the account and returns it.
    pub fn close(&mut self, account_number: AccountNumber) -> LedgerResult<Account> {
        let mut accounts = self.store.load()?;
        let position = Self::position(&accounts, account_number)?;

        let closed = accounts.remove(position);
        self.store.save(&accounts)?;
        info!("Closed account {account_number}");
        Ok(closed)
    }

    pub fn summary(&self) -> LedgerResult<Summary> {
        Ok(summarize(&self.store.load()?))
    }

    pub fn store(&self) -> &Store<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store<B> {
        &mut self.store
    }

    fn position(accounts: &[Account], account_number: AccountNumber) -> LedgerResult<usize> {
        accounts
            .iter()
            .position(|a| a.account_number() == account_number)
            .ok_or(LedgerError::NotFound(account_number))
    }

    /// Replaces one account with the result of `change` and persists the collection.
    fn update<F>(&mut self, account_number: AccountNumber, change: F) -> LedgerResult<Account>
    where
        F: FnOnce(Account) -> LedgerResult<Account>,
    {
        let mut accounts = self.store.load()?;
        let position = Self::position(&accounts, account_number)?;

        let updated = change(accounts[position].clone())?;
        accounts[position] = updated.clone();
        self.store.save(&accounts)?;
        Ok(updated)
    }
}
