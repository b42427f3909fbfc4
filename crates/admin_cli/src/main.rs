use std::{error::Error, io::Write, path::PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{
    AggregateRow, Engine, FilterCriteria, Grouping, Role, SummarySortMode, User,
    export::{AmountStyle, audit_table, expenses_table, summary_table, to_csv, to_pdf, total_table},
    receipt_data_url, sort_rows,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "spesario_admin")]
#[command(about = "Admin utilities for Spesario (bootstrap users, attach receipts, export)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./spesario.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(UserCmd),
    Supplier(SupplierCmd),
    Category(CategoryCmd),
    Receipt(ReceiptCmd),
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct UserCmd {
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
    email: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    admin: bool,
}

#[derive(Args, Debug)]
struct SupplierCmd {
    #[command(subcommand)]
    command: MetaCommand,
}

#[derive(Args, Debug)]
struct CategoryCmd {
    #[command(subcommand)]
    command: MetaCommand,
}

#[derive(Subcommand, Debug)]
enum MetaCommand {
    Create(MetaCreateArgs),
}

#[derive(Args, Debug)]
struct MetaCreateArgs {
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct ReceiptCmd {
    #[command(subcommand)]
    command: ReceiptCommand,
}

#[derive(Subcommand, Debug)]
enum ReceiptCommand {
    Attach(ReceiptAttachArgs),
}

#[derive(Args, Debug)]
struct ReceiptAttachArgs {
    /// Email of the acting user, for the activity trail.
    #[arg(long)]
    email: String,
    #[arg(long)]
    expense: i64,
    #[arg(long)]
    file: PathBuf,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ExportView {
    Expenses,
    ByPayer,
    BySupplier,
    ByCategory,
    Total,
    Audit,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ExportFormat {
    Csv,
    Pdf,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SummarySort {
    /// Ascending, case-insensitive group label.
    Alpha,
    /// Descending USD-equivalent total.
    Spend,
}

impl From<SummarySort> for SummarySortMode {
    fn from(sort: SummarySort) -> Self {
        match sort {
            SummarySort::Alpha => SummarySortMode::Alpha,
            SummarySort::Spend => SummarySortMode::Spend,
        }
    }
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(long, value_enum)]
    view: ExportView,
    #[arg(long, value_enum, default_value = "csv")]
    format: ExportFormat,
    #[arg(long)]
    output: PathBuf,
    /// BWP-per-USD rate used for USD equivalents.
    #[arg(long, default_value_t = engine::FALLBACK_BWP_PER_USD)]
    rate: f64,
    /// Drop removed expenses from the raw list (by default they are
    /// exported with negated amounts).
    #[arg(long)]
    active_only: bool,
    /// Row order for the summary views.
    #[arg(long, value_enum, default_value = "alpha")]
    sort: SummarySort,
    /// Activity-log entries to export at most.
    #[arg(long, default_value_t = 1000)]
    audit_limit: u64,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
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

async fn find_user_by_email(
    engine: &Engine,
    email: &str,
) -> Result<User, Box<dyn Error + Send + Sync>> {
    let needle = email.trim().to_lowercase();
    engine
        .list_users()
        .await?
        .into_iter()
        .find(|u| u.email == needle)
        .ok_or_else(|| format!("user not found: {email}").into())
}

fn mime_for(path: &PathBuf) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

fn sorted_rows(mut rows: Vec<AggregateRow>, sort: SummarySort) -> Vec<AggregateRow> {
    sort_rows(&mut rows, sort.into());
    rows
}

async fn export(engine: &Engine, args: &ExportArgs) -> Result<Vec<u8>, Box<dyn Error + Send + Sync>> {
    let amount_style = match args.format {
        ExportFormat::Csv => AmountStyle::Plain,
        ExportFormat::Pdf => AmountStyle::Symbol,
    };

    let table = match args.view {
        ExportView::Expenses => {
            let filter = FilterCriteria {
                include_removed: !args.active_only,
                ..FilterCriteria::default()
            };
            expenses_table(&engine.list_expenses(&filter).await?)
        }
        ExportView::ByPayer => summary_table(
            Grouping::Payer,
            &sorted_rows(engine.totals_by(Grouping::Payer, args.rate).await?, args.sort),
        ),
        ExportView::BySupplier => summary_table(
            Grouping::Supplier,
            &sorted_rows(engine.totals_by(Grouping::Supplier, args.rate).await?, args.sort),
        ),
        ExportView::ByCategory => summary_table(
            Grouping::Category,
            &sorted_rows(engine.totals_by(Grouping::Category, args.rate).await?, args.sort),
        ),
        ExportView::Total => total_table(&engine.summary_total(args.rate).await?),
        ExportView::Audit => audit_table(&engine.list_audit(args.audit_limit).await?, amount_style),
    };

    Ok(match args.format {
        ExportFormat::Csv => to_csv(&table),
        ExportFormat::Pdf => to_pdf(&table),
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(UserCmd {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;
            let role = if args.admin { Role::Admin } else { Role::User };

            match engine.create_user(&args.email, &args.name, &password, role).await {
                Ok((user, token)) => {
                    println!("created user: {} ({})", user.name, user.email);
                    println!("token: {token}");
                }
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(1);
                }
            }
        }
        Command::Supplier(SupplierCmd {
            command: MetaCommand::Create(args),
        }) => match engine.create_supplier(&args.name).await {
            Ok(item) => println!("created supplier: {} ({})", item.name, item.id),
            Err(err) => {
                eprintln!("{err}");
                std::process::exit(1);
            }
        },
        Command::Category(CategoryCmd {
            command: MetaCommand::Create(args),
        }) => match engine.create_category(&args.name).await {
            Ok(item) => println!("created category: {} ({})", item.name, item.id),
            Err(err) => {
                eprintln!("{err}");
                std::process::exit(1);
            }
        },
        Command::Receipt(ReceiptCmd {
            command: ReceiptCommand::Attach(args),
        }) => {
            let user = find_user_by_email(&engine, &args.email).await?;
            let bytes = std::fs::read(&args.file)?;
            let url = receipt_data_url(mime_for(&args.file), &bytes);

            let mut urls = engine.expense(args.expense).await?.receipt_urls;
            urls.push(url);
            let record = engine
                .update_receipts(&user.session(), args.expense, urls)
                .await?;
            println!(
                "attached receipt to expense {}: {} reference(s)",
                record.id,
                record.receipt_urls.len()
            );
        }
        Command::Export(args) => {
            let bytes = export(&engine, &args).await?;
            std::fs::write(&args.output, &bytes)?;
            println!("wrote {} bytes to {}", bytes.len(), args.output.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::MoneyMinor;

    fn row(label: &str, equiv: f64) -> AggregateRow {
        AggregateRow {
            label: label.to_string(),
            total_usd: MoneyMinor::ZERO,
            total_bwp: MoneyMinor::ZERO,
            total_usd_equiv: equiv,
        }
    }

    #[test]
    fn summary_exports_honor_the_sort_flag() {
        let rows = vec![row("beta", 10_00.0), row("Acme", 5_00.0)];

        let alpha = sorted_rows(rows.clone(), SummarySort::Alpha);
        assert_eq!(
            alpha.iter().map(|r| r.label.as_str()).collect::<Vec<_>>(),
            vec!["Acme", "beta"]
        );

        let spend = sorted_rows(rows, SummarySort::Spend);
        assert_eq!(
            spend.iter().map(|r| r.label.as_str()).collect::<Vec<_>>(),
            vec!["beta", "Acme"]
        );
    }
}
