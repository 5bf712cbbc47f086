mod account;
mod dashboard;
mod ledger;
mod notification;
mod store;
mod transaction;

pub use self::{
    account::{
        Account, AccountChanges, AccountNumber, AccountType, ModifyPolicy, UnknownAccountType,
        ValidationError,
    },
    dashboard::{format_amount, summarize, Summary},
    ledger::{Ledger, LedgerError, LedgerResult},
    notification::{Notification, Notifier, Severity, DEFAULT_DISMISS_AFTER},
    store::{BlobStore, DirectoryBlobs, LoadPolicy, MemoryBlobs, Store, StoreError, ACCOUNTS_KEY},
    transaction::{apply_batch, BatchReport, Transaction, TransactionType},
};
