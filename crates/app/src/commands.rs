use std::{collections::BTreeSet, path::Path};

use chrono::Datelike;
use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::{
    DISPLAY_DATE_FORMAT, DraftField, EngineError, EntitlementProvider, Ledger, LedgerGateway,
    NewRecord, RecordId, TransactionKind, UserId,
};

use crate::{
    config::ConfigArgs,
    error::{AppError, Result},
};

#[derive(Debug, Parser)]
#[command(name = "tally", about = "Monthly income/expense statements", disable_version_flag = true)]
pub struct Cli {
    #[command(flatten)]
    pub config: ConfigArgs,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct PeriodArgs {
    /// Month to show (1-12). Defaults to the current month.
    #[arg(long)]
    month: Option<u32>,
    /// Year to show. Defaults to the current year.
    #[arg(long)]
    year: Option<i32>,
    /// Case-insensitive text to look for in descriptions.
    #[arg(long)]
    search: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Inflow,
    Outflow,
}

impl From<KindArg> for TransactionKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Inflow => TransactionKind::Inflow,
            KindArg::Outflow => TransactionKind::Outflow,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Csv,
    Pdf,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the statement for a month with its balances.
    List(PeriodArgs),
    /// Record a new entry.
    Add {
        #[arg(long, default_value = "")]
        description: String,
        /// Amount; extra decimals round to the cent, non-numeric text is stored as 0.
        #[arg(long)]
        amount: String,
        #[arg(long, value_enum)]
        kind: KindArg,
        /// Date as YYYY-MM-DD.
        #[arg(long)]
        date: String,
    },
    /// Change fields of an existing entry.
    Edit {
        id: i64,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete one or more entries. Several ids are deleted together and must
    /// all show in one statement: the month of the first id, or the one given
    /// with --month/--year.
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
        #[command(flatten)]
        period: PeriodArgs,
    },
    /// Write the visible statement to a CSV or PDF file.
    Export {
        #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
        format: FormatArg,
        #[command(flatten)]
        period: PeriodArgs,
    },
}

pub async fn run<G, E>(
    command: Command,
    ledger: &mut Ledger<G>,
    entitlements: &E,
    user: &UserId,
    output_dir: &Path,
) -> Result<()>
where
    G: LedgerGateway,
    E: EntitlementProvider,
{
    match command {
        Command::List(period) => {
            apply_period(ledger, &period)?;
            ledger.reload().await?;
            print_statement(ledger);
        }
        Command::Add {
            description,
            amount,
            kind,
            date,
        } => {
            ensure_active(entitlements, user).await?;
            let record = NewRecord::from_form(&description, &amount, kind.into(), &date)?;
            ledger.set_period(record.date.month(), record.date.year())?;
            ledger.insert(record).await?;
            print_statement(ledger);
        }
        Command::Edit {
            id,
            description,
            amount,
            kind,
            date,
        } => {
            ensure_active(entitlements, user).await?;
            let id = RecordId(id);
            ledger.reload().await?;
            focus_on(ledger, id)?;
            ledger.start_edit(id)?;
            let fields = [
                description.map(DraftField::Description),
                amount.map(DraftField::Amount),
                kind.map(|kind| DraftField::Kind(kind.into())),
                date.map(DraftField::Date),
            ];
            for field in fields.into_iter().flatten() {
                ledger.mutate_draft(field)?;
            }
            ledger.commit_edit(id).await?;
            if let Some(record) = ledger.store().get(id) {
                let (month, year) = (record.date.month(), record.date.year());
                ledger.set_period(month, year)?;
            }
            print_statement(ledger);
        }
        Command::Delete { ids, period } => {
            ensure_active(entitlements, user).await?;
            ledger.reload().await?;
            let ids: BTreeSet<RecordId> = ids.into_iter().map(RecordId).collect();
            let removed = delete_ids(ledger, &ids, &period).await?;
            let noun = if removed == 1 { "entry" } else { "entries" };
            println!("deleted {removed} {noun}");
        }
        Command::Export { format, period } => {
            apply_period(ledger, &period)?;
            ledger.reload().await?;
            let export = match format {
                FormatArg::Csv => ledger.export_csv()?,
                FormatArg::Pdf => ledger.export_pdf()?,
            };
            std::fs::create_dir_all(output_dir)?;
            let path = output_dir.join(&export.file_name);
            std::fs::write(&path, &export.bytes)?;
            tracing::info!("wrote {} bytes", export.bytes.len());
            println!("{}", path.display());
        }
    }
    Ok(())
}

async fn ensure_active<E: EntitlementProvider>(entitlements: &E, user: &UserId) -> Result<()> {
    if entitlements.is_active(user).await {
        return Ok(());
    }
    Err(AppError::Blocked(
        "adding, editing and deleting entries needs an active plan".to_string(),
    ))
}

async fn delete_ids<G: LedgerGateway>(
    ledger: &mut Ledger<G>,
    ids: &BTreeSet<RecordId>,
    period: &PeriodArgs,
) -> Result<usize> {
    let Some(&first) = ids.first() else {
        return Ok(0);
    };
    if ids.len() == 1 {
        ledger.delete_one(first).await?;
        return Ok(1);
    }

    if period.month.is_some() || period.year.is_some() || period.search.is_some() {
        apply_period(ledger, period)?;
    } else {
        focus_on(ledger, first)?;
    }
    ledger.clear_selection();
    for &id in ids {
        ledger.toggle_selection(id)?;
    }
    Ok(ledger.bulk_delete().await?)
}

/// Moves the statement to the month of `id`, with no search, so the record
/// is visible.
fn focus_on<G: LedgerGateway>(ledger: &mut Ledger<G>, id: RecordId) -> Result<()> {
    let date = ledger
        .store()
        .get(id)
        .map(|record| record.date)
        .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))?;
    ledger.set_search("");
    ledger.set_period(date.month(), date.year())?;
    Ok(())
}

fn apply_period<G: LedgerGateway>(ledger: &mut Ledger<G>, period: &PeriodArgs) -> Result<()> {
    let month = period.month.unwrap_or(ledger.filter().month());
    let year = period.year.unwrap_or(ledger.filter().year());
    ledger.set_period(month, year)?;
    if let Some(search) = &period.search {
        ledger.set_search(search.as_str());
    }
    Ok(())
}

fn print_statement<G: LedgerGateway>(ledger: &Ledger<G>) {
    let currency = ledger.currency();
    let filter = ledger.filter();
    println!("Statement {:02}/{}", filter.month(), filter.year());
    if !filter.search().is_empty() {
        println!("search: {:?}", filter.search());
    }

    let view = ledger.view();
    if view.is_empty() {
        println!("  (no entries)");
    }
    for record in view {
        let sign = match record.kind {
            TransactionKind::Inflow => "+",
            TransactionKind::Outflow => "-",
        };
        println!(
            "{:>8}  {}  {:<7}  {sign}{:>15}  {}",
            record.id,
            record.date.format(DISPLAY_DATE_FORMAT),
            record.kind,
            currency.format(record.amount),
            record.description
        );
    }

    let balances = ledger.balances();
    println!("month balance:   {}", currency.format(balances.scoped));
    println!("overall balance: {}", currency.format(balances.global));
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::NaiveDate;
    use engine::{Filter, Money, RecordPatch, ResultEngine, TransactionRecord};

    use super::*;

    #[derive(Default)]
    struct Backend {
        rows: Mutex<Vec<TransactionRecord>>,
        deleted: Mutex<Vec<Vec<RecordId>>>,
    }

    impl Backend {
        fn remove(&self, ids: &[RecordId]) {
            self.rows.lock().unwrap().retain(|row| !ids.contains(&row.id));
            self.deleted.lock().unwrap().push(ids.to_vec());
        }

        fn deleted(&self) -> Vec<Vec<RecordId>> {
            self.deleted.lock().unwrap().clone()
        }
    }

    impl LedgerGateway for Backend {
        async fn fetch_all(&self) -> ResultEngine<Vec<TransactionRecord>> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn insert(&self, _record: &NewRecord) -> ResultEngine<()> {
            Ok(())
        }

        async fn update(&self, _id: RecordId, _patch: &RecordPatch) -> ResultEngine<()> {
            Ok(())
        }

        async fn delete_one(&self, id: RecordId) -> ResultEngine<()> {
            self.remove(&[id]);
            Ok(())
        }

        async fn delete_many(&self, ids: &[RecordId]) -> ResultEngine<()> {
            self.remove(ids);
            Ok(())
        }
    }

    struct Plan(bool);

    impl EntitlementProvider for Plan {
        async fn is_active(&self, _user: &UserId) -> bool {
            self.0
        }
    }

    fn entry(id: i64, month: u32, day: u32) -> TransactionRecord {
        TransactionRecord {
            id: RecordId(id),
            description: format!("entry {id}"),
            amount: Money::new(1_000),
            kind: TransactionKind::Outflow,
            date: NaiveDate::from_ymd_opt(2025, month, day).unwrap(),
        }
    }

    /// Two January entries and one in February, viewed from March.
    fn ledger() -> Ledger<Backend> {
        let backend = Backend::default();
        *backend.rows.lock().unwrap() = vec![entry(1, 1, 5), entry(2, 1, 10), entry(3, 2, 1)];
        Ledger::new(backend, Filter::new(3, 2025).unwrap())
    }

    async fn run_args(ledger: &mut Ledger<Backend>, plan: Plan, args: &[&str]) -> Result<()> {
        let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
        run(cli.command, ledger, &plan, &UserId::new("u1"), Path::new(".")).await
    }

    #[tokio::test]
    async fn delete_ignores_repeated_ids() {
        let mut ledger = ledger();
        run_args(&mut ledger, Plan(true), &["tally", "delete", "1", "1", "2"])
            .await
            .unwrap();

        assert_eq!(ledger.gateway().deleted(), vec![vec![RecordId(1), RecordId(2)]]);
        assert_eq!(ledger.store().len(), 1);
        assert!(ledger.store().contains(RecordId(3)));
    }

    #[tokio::test]
    async fn repeated_single_id_is_one_delete() {
        let mut ledger = ledger();
        run_args(&mut ledger, Plan(true), &["tally", "delete", "3", "3"])
            .await
            .unwrap();

        assert_eq!(ledger.gateway().deleted(), vec![vec![RecordId(3)]]);
    }

    #[tokio::test]
    async fn bulk_delete_across_months_is_refused() {
        let mut ledger = ledger();
        let err = run_args(&mut ledger, Plan(true), &["tally", "delete", "1", "3"])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Engine(EngineError::NotVisible(_))));
        assert!(ledger.gateway().deleted().is_empty());
        assert_eq!(ledger.store().len(), 3);
    }

    #[tokio::test]
    async fn delete_is_blocked_without_an_active_plan() {
        let mut ledger = ledger();
        let err = run_args(&mut ledger, Plan(false), &["tally", "delete", "1"])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Blocked(_)));
        assert!(ledger.gateway().deleted().is_empty());
    }

    #[test]
    fn parses_export_with_period() {
        let cli = Cli::try_parse_from([
            "tally", "export", "--format", "pdf", "--month", "2", "--year", "2025",
        ])
        .unwrap();
        match cli.command {
            Command::Export { format, period } => {
                assert_eq!(format, FormatArg::Pdf);
                assert_eq!(period.month, Some(2));
                assert_eq!(period.year, Some(2025));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn delete_needs_at_least_one_id() {
        assert!(Cli::try_parse_from(["tally", "delete"]).is_err());
        assert!(Cli::try_parse_from(["tally", "delete", "4", "5", "--month", "2"]).is_ok());
    }

    #[test]
    fn add_kind_maps_to_engine_kind() {
        let cli = Cli::try_parse_from([
            "tally", "add", "--amount", "10", "--kind", "inflow", "--date", "2025-01-01",
        ])
        .unwrap();
        let Command::Add { kind, description, .. } = cli.command else {
            panic!("expected add");
        };
        assert_eq!(TransactionKind::from(kind), TransactionKind::Inflow);
        assert_eq!(description, "");
    }
}
