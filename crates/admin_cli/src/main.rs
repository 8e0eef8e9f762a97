use std::{
    error::Error,
    io::{BufRead, Write},
};

use clap::{Args, Parser, Subcommand};
use engine::{Engine, EngineError, LedgerEntryCmd, LedgerEntryKind, MoneyCents, YardSettings};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub username: String,
        pub password: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "yardbook_admin")]
#[command(about = "Admin utilities for Yardbook (users, yard settings, sweep, NMVTIS batch)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./yardbook.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Yard(Yard),
    Ledger(Ledger),
    /// Run the automatic post-hold transfer sweep once.
    Sweep,
    Reports(Reports),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct Yard {
    #[command(subcommand)]
    command: YardCommand,
}

#[derive(Subcommand, Debug)]
enum YardCommand {
    /// Create or replace the settings row for a yard.
    Set(YardSetArgs),
}

#[derive(Args, Debug)]
struct YardSetArgs {
    #[arg(long)]
    yard_id: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    dismantler_license: Option<String>,
    #[arg(long)]
    nmvtis_id: String,
    #[arg(long)]
    nmvtis_pin: String,
    #[arg(long)]
    transfer_recipient_name: String,
    #[arg(long)]
    transfer_recipient_address: Option<String>,
    #[arg(long)]
    transfer_recipient_license: Option<String>,
}

#[derive(Args, Debug)]
struct Ledger {
    #[command(subcommand)]
    command: LedgerCommand,
}

#[derive(Subcommand, Debug)]
enum LedgerCommand {
    /// Append a cash drawer entry for a driver.
    Add(LedgerAddArgs),
    /// Print a driver's current drawer balance.
    Balance(LedgerBalanceArgs),
}

fn parse_amount(s: &str) -> Result<MoneyCents, EngineError> {
    s.parse()
}

fn parse_entry_kind(s: &str) -> Result<LedgerEntryKind, EngineError> {
    LedgerEntryKind::try_from(s)
}

#[derive(Args, Debug)]
struct LedgerAddArgs {
    #[arg(long)]
    driver_id: String,
    /// One of: deposit, withdrawal, adjustment, set_balance.
    #[arg(long, value_parser = parse_entry_kind)]
    kind: LedgerEntryKind,
    /// Dollar amount, e.g. "$450.00" or "120" (max 2 decimals).
    #[arg(long, value_parser = parse_amount)]
    amount: MoneyCents,
    #[arg(long)]
    reason: Option<String>,
    #[arg(long, default_value = "admin_cli")]
    actor: String,
}

#[derive(Args, Debug)]
struct LedgerBalanceArgs {
    #[arg(long)]
    driver_id: String,
}

#[derive(Args, Debug)]
struct Reports {
    #[command(subcommand)]
    command: ReportCommand,
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Print the NMVTIS CSV batch for all open report entries to stdout.
    Export(ReportExportArgs),
    /// Mark report entries as submitted after a successful upload.
    Submitted(ReportSubmittedArgs),
}

#[derive(Args, Debug)]
struct ReportExportArgs {
    #[arg(long)]
    yard_id: String,
}

#[derive(Args, Debug)]
struct ReportSubmittedArgs {
    /// Report entry ids, repeatable.
    #[arg(long = "id", required = true)]
    ids: Vec<Uuid>,
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    eprint!("{prompt}");
    std::io::stderr().flush()?;
    let mut buf = String::new();
    std::io::stdin().lock().read_line(&mut buf)?;
    Ok(buf.trim_end_matches(['\r', '\n']).to_string())
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            eprintln!("Password must not be empty.");
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        eprintln!("Passwords do not match. Try again.");
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;

            if users::Entity::find_by_id(args.username.clone())
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("user already exists: {}", args.username);
                std::process::exit(1);
            }

            let user = users::ActiveModel {
                username: Set(args.username.clone()),
                password: Set(password),
            };
            users::Entity::insert(user).exec(&db).await?;

            println!("created user: {}", args.username);
        }
        Command::Yard(Yard {
            command: YardCommand::Set(args),
        }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            let settings = engine
                .upsert_yard_settings(YardSettings {
                    yard_id: args.yard_id,
                    name: args.name,
                    address: args.address,
                    phone: args.phone,
                    dismantler_license: args.dismantler_license,
                    nmvtis_id: args.nmvtis_id,
                    nmvtis_pin: args.nmvtis_pin,
                    transfer_recipient_name: args.transfer_recipient_name,
                    transfer_recipient_address: args.transfer_recipient_address,
                    transfer_recipient_license: args.transfer_recipient_license,
                })
                .await?;
            println!("configured yard: {}", settings.yard_id);
        }
        Command::Ledger(Ledger {
            command: LedgerCommand::Add(args),
        }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            let mut cmd = LedgerEntryCmd::new(
                args.driver_id,
                args.kind,
                args.amount.cents(),
                args.actor,
            );
            if let Some(reason) = args.reason {
                cmd = cmd.reason(reason);
            }
            let entry = engine.append_ledger_entry(cmd).await?;
            println!(
                "recorded {} of {} for driver {}",
                entry.kind.as_str(),
                MoneyCents::new(entry.amount_cents),
                entry.driver_id
            );
        }
        Command::Ledger(Ledger {
            command: LedgerCommand::Balance(args),
        }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            let balance = engine.driver_balance(&args.driver_id).await?;
            println!("{balance}");
        }
        Command::Sweep => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            let transferred = engine.run_auto_transfer_sweep().await?;
            println!("transferred {} hold(s)", transferred.len());
            for hold_id in transferred {
                println!("{hold_id}");
            }
        }
        Command::Reports(Reports {
            command: ReportCommand::Export(args),
        }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            let entries = engine.list_pending_reports().await?;
            let csv = engine.build_nmvtis_batch(&args.yard_id, &entries).await?;
            print!("{csv}");
        }
        Command::Reports(Reports {
            command: ReportCommand::Submitted(args),
        }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            engine.mark_reports_submitted(&args.ids).await?;
            println!("marked {} report(s) as submitted", args.ids.len());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_add_parses_dollar_amounts() {
        let cli = Cli::try_parse_from([
            "yardbook_admin",
            "ledger",
            "add",
            "--driver-id",
            "driver1",
            "--kind",
            "deposit",
            "--amount",
            "$450.00",
        ])
        .unwrap();

        match cli.command {
            Command::Ledger(Ledger {
                command: LedgerCommand::Add(args),
            }) => {
                assert_eq!(args.kind, LedgerEntryKind::Deposit);
                assert_eq!(args.amount.cents(), 45_000);
                assert_eq!(args.actor, "admin_cli");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn ledger_add_rejects_bad_amounts_and_kinds() {
        let result = Cli::try_parse_from([
            "yardbook_admin",
            "ledger",
            "add",
            "--driver-id",
            "driver1",
            "--kind",
            "deposit",
            "--amount",
            "12.345",
        ]);
        assert!(result.is_err());

        let result = Cli::try_parse_from([
            "yardbook_admin",
            "ledger",
            "add",
            "--driver-id",
            "driver1",
            "--kind",
            "refund",
            "--amount",
            "10",
        ]);
        assert!(result.is_err());
    }
}
