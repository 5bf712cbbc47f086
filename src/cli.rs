use bank_ledger::features::{AccountChanges, AccountNumber, AccountType, LoadPolicy, ModifyPolicy};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(name = "bank-ledger", version, about = "Manage bank accounts kept in a local store")]
pub struct CliOptions {
    #[clap(
        long,
        env = "BANK_LEDGER_DATA_DIR",
        default_value = ".",
        help = "directory holding the account store"
    )]
    pub data_dir: PathBuf,

    #[clap(
        long,
        env = "BANK_LEDGER_STRICT",
        help = "fail on an unreadable store instead of starting empty"
    )]
    pub strict: bool,

    #[clap(subcommand)]
    pub command: Command,
}

impl CliOptions {
    pub fn load_policy(&self) -> LoadPolicy {
        if self.strict {
            LoadPolicy::Strict
        } else {
            LoadPolicy::Lenient
        }
    }
}

/// One line typed into `shell`
#[derive(Debug, Parser)]
#[clap(name = "bank-ledger")]
pub struct ShellLine {
    #[clap(subcommand)]
    pub command: Command,
}

impl ShellLine {
    pub fn parse_line(line: &str) -> Result<Command, clap::Error> {
        let words = std::iter::once("bank-ledger").chain(line.split_whitespace());
        Self::try_parse_from(words).map(|parsed| parsed.command)
    }
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Open a new account
    Create {
        account_number: AccountNumber,

        #[clap(help = "S (Savings) or C (Current)")]
        account_type: AccountType,

        #[clap(allow_hyphen_values = true)]
        initial_deposit: i64,

        #[clap(required = true)]
        holder_name: Vec<String>,
    },

    /// Add funds to an account
    Deposit {
        account_number: AccountNumber,

        #[clap(allow_hyphen_values = true)]
        amount: i64,
    },

    /// Take funds out of an account
    Withdraw {
        account_number: AccountNumber,

        #[clap(allow_hyphen_values = true)]
        amount: i64,
    },

    /// Show one account
    Enquire { account_number: AccountNumber },

    /// Write every account as CSV
    List,

    /// Replace the holder name, type and balance of an account
    Modify {
        account_number: AccountNumber,

        account_type: AccountType,

        #[clap(allow_hyphen_values = true)]
        balance: i64,

        #[clap(required = true)]
        holder_name: Vec<String>,

        #[clap(long, help = "skip the minimum balance check")]
        override_minimum: bool,
    },

    /// Remove an account
    Close { account_number: AccountNumber },

    /// Show the account count and total balance
    Dashboard,

    /// Apply a CSV file of deposits and withdrawals
    Batch { file: PathBuf },

    /// Read commands from stdin, one per line
    Shell,
}

pub fn holder_name(words: &[String]) -> String {
    words.join(" ")
}

pub fn modify_request(
    account_type: AccountType,
    balance: i64,
    words: &[String],
    override_minimum: bool,
) -> (AccountChanges, ModifyPolicy) {
    let policy = if override_minimum {
        ModifyPolicy::AdministrativeOverride
    } else {
        ModifyPolicy::EnforceMinimum
    };
    let changes = AccountChanges {
        holder_name: holder_name(words),
        account_type,
        balance,
    };
    (changes, policy)
}
