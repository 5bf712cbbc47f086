use std::{
    fs::File,
    io::{self, BufRead, Write},
    process,
    time::Instant,
};
#[macro_use]
extern crate log;

use anyhow::Context;
use bank_ledger::features::{
    apply_batch, format_amount, summarize, BlobStore, DirectoryBlobs, Ledger, LedgerResult,
    Notification, Notifier, Store,
};
use clap::Parser;

mod cli;
use cli::{CliOptions, Command, ShellLine};

fn main() {
    env_logger::init();
    let opts = CliOptions::parse();

    match run(opts) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("{e:#}");
            eprintln!("{e:#}");
            process::exit(1);
        }
    }
}

/// Returns whether the command succeeded.
fn run(opts: CliOptions) -> anyhow::Result<bool> {
    let store = Store::new(DirectoryBlobs::new(&opts.data_dir), opts.load_policy());
    let mut ledger = Ledger::new(store);
    ledger
        .store_mut()
        .on_change(|accounts| info!("Dashboard: {}", summarize(accounts)));

    let mut notifier = Notifier::default();

    if opts.command == Command::Shell {
        shell(&mut ledger, &mut notifier)?;
        return Ok(true);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let succeeded = match execute(opts.command, &mut ledger, &mut out)? {
        Some(notification) => {
            let succeeded = !notification.is_error();
            notifier.show(notification, Instant::now());
            render(&notifier, &mut out)?;
            succeeded
        }
        None => true,
    };

    Ok(succeeded)
}

fn shell<B: BlobStore>(ledger: &mut Ledger<B>, notifier: &mut Notifier) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        if let Some(dismissed) = notifier.dismiss_expired(Instant::now()) {
            trace!("Dismissed {dismissed:?}");
        }

        let command = match ShellLine::parse_line(line) {
            Ok(Command::Shell) => {
                eprintln!("Already in a shell");
                continue;
            }
            Ok(command) => command,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        let mut out = stdout.lock();
        match execute(command, ledger, &mut out) {
            Ok(Some(notification)) => {
                notifier.show(notification, Instant::now());
                render(notifier, &mut out)?;
            }
            Ok(None) => {}
            Err(e) => eprintln!("{e:#}"),
        }
    }

    Ok(())
}

fn render<W: Write>(notifier: &Notifier, out: &mut W) -> io::Result<()> {
    match notifier.current(Instant::now()) {
        Some(notification) if notification.is_error() => {
            eprintln!("{notification}");
            Ok(())
        }
        Some(notification) => writeln!(out, "{notification}"),
        None => Ok(()),
    }
}

fn notify<T>(result: LedgerResult<T>, message: impl FnOnce(T) -> String) -> Notification {
    match result {
        Ok(value) => Notification::success(message(value)),
        Err(e) => {
            debug!("Operation rejected: {e:?}");
            Notification::from(&e)
        }
    }
}

/// Runs one command. Output goes to `out`, the outcome comes back as a
/// notification when there is one to show.
fn execute<B, W>(
    command: Command,
    ledger: &mut Ledger<B>,
    out: &mut W,
) -> anyhow::Result<Option<Notification>>
where
    B: BlobStore,
    W: Write,
{
    let notification = match command {
        Command::Create {
            account_number,
            account_type,
            initial_deposit,
            holder_name,
        } => notify(
            ledger.create(
                account_number,
                &cli::holder_name(&holder_name),
                account_type,
                initial_deposit,
            ),
            |_| "Account Created Successfully!".into(),
        ),
        Command::Deposit {
            account_number,
            amount,
        } => notify(ledger.deposit(account_number, amount), |balance| {
            format!("Transaction successful! New Balance: {}", format_amount(balance))
        }),
        Command::Withdraw {
            account_number,
            amount,
        } => notify(ledger.withdraw(account_number, amount), |balance| {
            format!("Transaction successful! New Balance: {}", format_amount(balance))
        }),
        Command::Enquire { account_number } => match ledger.enquire(account_number) {
            Ok(account) => {
                writeln!(out, "Account No: {}", account.account_number())?;
                writeln!(out, "Holder Name: {}", account.holder_name())?;
                writeln!(out, "Account Type: {}", account.account_type())?;
                writeln!(out, "Balance: {}", format_amount(account.balance()))?;
                return Ok(None);
            }
            Err(e) => Notification::from(&e),
        },
        Command::List => match ledger.list_all() {
            Ok(accounts) if accounts.is_empty() => {
                writeln!(out, "No accounts found.")?;
                return Ok(None);
            }
            Ok(accounts) => {
                let mut wtr = csv::Writer::from_writer(&mut *out);
                for account in &accounts {
                    wtr.serialize(account)?;
                }
                wtr.flush()?;
                return Ok(None);
            }
            Err(e) => Notification::from(&e),
        },
        Command::Modify {
            account_number,
            account_type,
            balance,
            holder_name,
            override_minimum,
        } => {
            let (changes, policy) =
                cli::modify_request(account_type, balance, &holder_name, override_minimum);
            notify(ledger.modify(account_number, changes, policy), |_| {
                "Account Updated Successfully!".into()
            })
        }
        Command::Close { account_number } => notify(ledger.close(account_number), |_| {
            "Account Deleted Successfully!".into()
        }),
        Command::Dashboard => match ledger.summary() {
            Ok(summary) => {
                writeln!(out, "Total accounts: {}", summary.count)?;
                writeln!(out, "Total balance: {}", format_amount(summary.total_balance))?;
                return Ok(None);
            }
            Err(e) => Notification::from(&e),
        },
        Command::Batch { file } => {
            let reader = File::open(&file)
                .with_context(|| format!("Unable to open batch file {}", file.display()))?;
            let report = apply_batch(reader, ledger)?;
            Notification::success(format!(
                "Batch applied: {} succeeded, {} rejected",
                report.applied, report.rejected
            ))
        }
        Command::Shell => Notification::error("Already in a shell"),
    };

    Ok(Some(notification))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bank_ledger::features::{LoadPolicy, MemoryBlobs};

    fn ledger() -> Ledger<MemoryBlobs> {
        Ledger::new(Store::new(MemoryBlobs::new(), LoadPolicy::Lenient))
    }

    fn run_line(line: &str, ledger: &mut Ledger<MemoryBlobs>) -> (Option<Notification>, String) {
        let command = ShellLine::parse_line(line).unwrap();
        let mut out = Vec::new();
        let notification = execute(command, ledger, &mut out).unwrap();
        (notification, String::from_utf8(out).unwrap())
    }

    #[test]
    fn session_reports_each_outcome() {
        let mut ledger = ledger();

        let (notification, _) = run_line("create 101 S 500 Asha", &mut ledger);
        assert_eq!(
            notification,
            Some(Notification::success("Account Created Successfully!"))
        );

        let (notification, _) = run_line("deposit 101 100000", &mut ledger);
        assert_eq!(
            notification,
            Some(Notification::success(
                "Transaction successful! New Balance: ₹1,00,500"
            ))
        );

        let (notification, _) = run_line("withdraw 101 100001", &mut ledger);
        assert!(notification.unwrap().is_error());

        let (notification, out) = run_line("enquire 101", &mut ledger);
        assert_eq!(notification, None);
        assert_eq!(
            out,
            "Account No: 101\nHolder Name: Asha\nAccount Type: Savings\nBalance: ₹1,00,500\n"
        );
    }

    #[test]
    fn list_writes_csv() {
        let mut ledger = ledger();
        let (_, out) = run_line("list", &mut ledger);
        assert_eq!(out, "No accounts found.\n");

        run_line("create 1 S 500 Asha Rao", &mut ledger);
        run_line("create 2 C 1000 Ravi", &mut ledger);

        let (notification, out) = run_line("list", &mut ledger);
        assert_eq!(notification, None);
        assert_eq!(
            out,
            "accountNumber,holderName,accountType,balance\n1,Asha Rao,S,500\n2,Ravi,C,1000\n"
        );
    }

    #[test]
    fn close_and_dashboard() {
        let mut ledger = ledger();
        run_line("create 1 S 500 Asha", &mut ledger);
        run_line("create 2 C 1500 Ravi", &mut ledger);

        let (notification, _) = run_line("close 1", &mut ledger);
        assert_eq!(
            notification,
            Some(Notification::success("Account Deleted Successfully!"))
        );

        let (notification, _) = run_line("close 1", &mut ledger);
        assert_eq!(
            notification,
            Some(Notification::error("Account 1 not found."))
        );

        let (_, out) = run_line("dashboard", &mut ledger);
        assert_eq!(out, "Total accounts: 1\nTotal balance: ₹1,500\n");
    }

    #[test]
    fn modify_needs_override_below_minimum() {
        let mut ledger = ledger();
        run_line("create 101 S 500 Asha", &mut ledger);

        let (notification, _) = run_line("modify 101 S 0 Asha", &mut ledger);
        assert!(notification.unwrap().is_error());

        let (notification, _) = run_line("modify 101 S 0 Asha --override-minimum", &mut ledger);
        assert_eq!(
            notification,
            Some(Notification::success("Account Updated Successfully!"))
        );
        assert_eq!(ledger.enquire(101.into()).unwrap().balance(), 0);
    }
}
