//! Console runner: executes examples, prints their results, and reports
//! failures without stopping the run.

use crate::config::{Config, DatabaseConfig, ExamplesConfig};
use crate::core::db::Recordset;
use crate::core::{DemoError, Result};
use crate::results_grid::{render_recordset, OutputFormat, ResultsGrid};
use crate::samples::{self, TransactionOutcome, TRANSACTION_NAMES};
use crate::setup::{setup_database, SetupReport};
use tracing::debug;

const BANNER: &str = "========================================";

/// Name inserted when the mutation examples run without an explicit name.
pub const DEFAULT_INSERT_NAME: &str = "Test User";
pub const DEFAULT_UPDATE_NAME: &str = "Updated Test User";

/// The runnable examples, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Example {
    GetAll,
    GetById,
    Insert,
    Update,
    Delete,
    Search,
    Count,
    Transaction,
    Join,
    StoredProcedure,
}

impl Example {
    pub fn number(&self) -> usize {
        match self {
            Example::GetAll => 1,
            Example::GetById => 2,
            Example::Insert => 3,
            Example::Update => 4,
            Example::Delete => 5,
            Example::Search => 6,
            Example::Count => 7,
            Example::Transaction => 8,
            Example::Join => 9,
            Example::StoredProcedure => 10,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Example::GetAll => "Get All Records",
            Example::GetById => "Get Record By ID",
            Example::Insert => "Insert New Record",
            Example::Update => "Update Record",
            Example::Delete => "Delete Record",
            Example::Search => "Search Records",
            Example::Count => "Count Records",
            Example::Transaction => "Transaction Example",
            Example::Join => "Join Query Example",
            Example::StoredProcedure => "Stored Procedure Example",
        }
    }

    /// Prefix for the failure message printed when the example fails.
    fn failure_label(&self) -> &'static str {
        match self {
            Example::GetAll | Example::GetById => "Query failed",
            Example::Insert => "Insert failed",
            Example::Update => "Update failed",
            Example::Delete => "Delete failed",
            Example::Search => "Search failed",
            Example::Count => "Count failed",
            Example::Transaction => "Transaction failed",
            Example::Join => "Join query failed",
            Example::StoredProcedure => "Stored procedure failed",
        }
    }
}

/// Arguments for a single example; unset values fall back to the
/// `[examples]` configuration.
#[derive(Debug, Clone, Default)]
pub struct ExampleArgs {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub term: Option<String>,
}

/// Tally of a multi-example run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, ok: bool) {
        if ok {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Prints example results to stdout and failures to stderr.
pub struct Runner {
    database: DatabaseConfig,
    examples: ExamplesConfig,
    format: OutputFormat,
}

impl Runner {
    pub fn new(config: Config, format: OutputFormat) -> Self {
        Runner {
            database: config.database,
            examples: config.examples,
            format,
        }
    }

    /// Prints the first `limit` rows of `info`.
    pub fn basic_query(&self, limit: u32) -> bool {
        match samples::first_records(&self.database, limit) {
            Ok(recordset) => {
                self.print_recordset(&recordset);
                true
            }
            Err(e) => {
                report_failure("Database connection failed", &e);
                false
            }
        }
    }

    /// Runs the basic examples, then the mutation and advanced groups when
    /// enabled. Each example finishes before the next starts; a failure is
    /// reported and the run continues.
    pub fn run_all(&self) -> RunSummary {
        println!("{}", BANNER);
        println!("SQL Sample Examples");
        println!("{}", BANNER);

        let mut summary = RunSummary::default();
        let defaults = ExampleArgs::default();

        for example in [Example::GetAll, Example::GetById, Example::Count, Example::Search] {
            summary.record(self.run_example(example, &defaults).is_ok());
        }

        if self.examples.mutations {
            self.run_mutations(&mut summary);
        }

        if self.examples.advanced {
            for example in [Example::Transaction, Example::Join, Example::StoredProcedure] {
                summary.record(self.run_example(example, &defaults).is_ok());
            }
        }

        println!("\n{}", BANNER);
        println!("All examples completed!");
        println!("{}\n", BANNER);
        debug!(?summary, "Example run finished");
        summary
    }

    /// Insert, then update and delete the inserted row.
    fn run_mutations(&self, summary: &mut RunSummary) {
        let inserted = self.run_example(Example::Insert, &ExampleArgs::default());
        summary.record(inserted.is_ok());

        match inserted {
            Ok(Some(id)) => {
                let args = ExampleArgs {
                    id: Some(id),
                    ..ExampleArgs::default()
                };
                summary.record(self.run_example(Example::Update, &args).is_ok());
                summary.record(self.run_example(Example::Delete, &args).is_ok());
            }
            _ => {
                eprintln!("Skipping update and delete: no record was inserted");
                summary.failed += 2;
            }
        }
    }

    /// Runs one example, printing its results or its failure.
    ///
    /// Returns the inserted id for `Example::Insert`, `None` otherwise. The
    /// error has already been reported when `Err` is returned.
    pub fn run_example(&self, example: Example, args: &ExampleArgs) -> Result<Option<i64>> {
        println!("\n=== Example {}: {} ===", example.number(), example.title());

        let result = self.execute(example, args);
        if let Err(ref e) = result {
            report_failure(example.failure_label(), e);
        }
        result
    }

    fn execute(&self, example: Example, args: &ExampleArgs) -> Result<Option<i64>> {
        let db = &self.database;
        let id = args.id.unwrap_or(self.examples.lookup_id);

        match example {
            Example::GetAll => {
                let recordset = samples::get_all_records(db)?;
                println!("Total records: {}", recordset.len());
                self.print_recordset(&recordset);
            }
            Example::GetById => match samples::get_record_by_id(db, id)? {
                Some(record) => println!("Found record: {}", serde_json::to_string(&record)?),
                None => println!("No record found with id: {}", id),
            },
            Example::Insert => {
                let name = args.name.as_deref().unwrap_or(DEFAULT_INSERT_NAME);
                let new_id = samples::insert_record(db, name)?;
                println!("Successfully inserted! New record ID: {}", new_id);
                return Ok(Some(new_id));
            }
            Example::Update => {
                let name = args.name.as_deref().unwrap_or(DEFAULT_UPDATE_NAME);
                if samples::update_record(db, id, name)? > 0 {
                    println!("Successfully updated record ID {} to \"{}\"", id, name);
                } else {
                    println!("No record found with id: {}", id);
                }
            }
            Example::Delete => {
                if samples::delete_record(db, id)? > 0 {
                    println!("Successfully deleted record ID: {}", id);
                } else {
                    println!("No record found with id: {}", id);
                }
            }
            Example::Search => {
                let term = args.term.as_deref().unwrap_or(&self.examples.search_term);
                let recordset = samples::search_by_name(db, term)?;
                println!("Found {} record(s) matching \"{}\":", recordset.len(), term);
                self.print_recordset(&recordset);
            }
            Example::Count => {
                println!("Total records in info table: {}", samples::count_records(db)?);
            }
            Example::Transaction => {
                match samples::transaction_example(db, TRANSACTION_NAMES[0], TRANSACTION_NAMES[1])? {
                    TransactionOutcome::Committed => println!("Transaction completed successfully!"),
                    TransactionOutcome::RolledBack(reason) => {
                        eprintln!("Transaction rolled back due to error: {}", reason)
                    }
                }
            }
            Example::Join => {
                let recordset = samples::join_example(db)?;
                println!("Join result:");
                self.print_recordset(&recordset);
            }
            Example::StoredProcedure => {
                let name = args.name.as_deref().unwrap_or(&self.examples.search_term);
                let recordset = samples::stored_procedure_example(db, name)?;
                println!("Stored procedure result:");
                self.print_recordset(&recordset);
            }
        }
        Ok(None)
    }

    /// Runs database setup and prints its report. Returns whether setup
    /// succeeded.
    pub fn setup(&self) -> bool {
        println!("Starting database setup...\n");
        match setup_database(&self.database) {
            Ok(report) => {
                self.print_setup_report(&report);
                true
            }
            Err(e) => {
                debug!(error = ?e, "Database setup failed");
                eprintln!("\n✗ Database setup failed: {}", e);
                eprintln!("\nPlease check:");
                eprintln!("  1. The database file {} is reachable", self.database.path.display());
                eprintln!("  2. Its directory exists and is writable");
                eprintln!("  3. No other process holds a lock on the database");
                eprintln!("  4. Connection settings in the configuration file are correct\n");
                false
            }
        }
    }

    fn print_setup_report(&self, report: &SetupReport) {
        println!("✓ \"info\" table created");
        println!("✓ Inserted {} records into \"info\" table", report.info_count);
        println!("✓ \"users\" table created");
        println!("✓ Inserted {} records into \"users\" table\n", report.users_count);

        println!("✓ \"info\" table has {} records", report.info_count);
        println!("✓ \"users\" table has {} records\n", report.users_count);

        println!("Sample data from \"info\" table:");
        print!("{}", ResultsGrid::from_recordset(&report.info_sample).render());
        println!("\nSample data from \"users\" table:");
        print!("{}", ResultsGrid::from_recordset(&report.users_sample).render());

        println!("\n{}", BANNER);
        println!("✓ Database setup completed successfully!");
        println!("{}", BANNER);
        println!("\nYou can now run:");
        println!("  sqldemo query     - Run basic query");
        println!("  sqldemo examples  - Run all examples\n");
    }

    fn print_recordset(&self, recordset: &Recordset) {
        match render_recordset(recordset, self.format) {
            Ok(rendered) => print!("{}", rendered),
            Err(e) => report_failure("Failed to render results", &e),
        }
    }
}

fn report_failure(label: &str, e: &DemoError) {
    debug!(error = ?e, "{}", label);
    eprintln!("{}: {}", label, e);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TempDatabase;

    fn runner_for(db: &TempDatabase, mutations: bool, advanced: bool) -> Runner {
        let mut config = Config::default();
        config.database = db.config.clone();
        config.examples.mutations = mutations;
        config.examples.advanced = advanced;
        Runner::new(config, OutputFormat::Table)
    }

    #[test]
    fn test_example_numbers_are_sequential() {
        let all = [
            Example::GetAll,
            Example::GetById,
            Example::Insert,
            Example::Update,
            Example::Delete,
            Example::Search,
            Example::Count,
            Example::Transaction,
            Example::Join,
            Example::StoredProcedure,
        ];
        for (i, example) in all.iter().enumerate() {
            assert_eq!(example.number(), i + 1);
        }
    }

    #[test]
    fn test_run_all_basic_only() {
        let db = TempDatabase::seeded();
        let summary = runner_for(&db, false, false).run_all();
        assert_eq!(summary, RunSummary { succeeded: 4, failed: 0 });
        assert_eq!(db.count("info"), 10);
    }

    #[test]
    fn test_run_all_with_every_group() {
        let db = TempDatabase::seeded();
        let summary = runner_for(&db, true, true).run_all();
        assert_eq!(summary, RunSummary { succeeded: 10, failed: 0 });
        // The inserted row is deleted again; the transaction adds two.
        assert_eq!(db.count("info"), 12);
    }

    #[test]
    fn test_run_all_continues_after_failures() {
        let db = TempDatabase::new();
        let summary = runner_for(&db, false, false).run_all();
        assert_eq!(summary, RunSummary { succeeded: 0, failed: 4 });
    }

    #[test]
    fn test_failed_insert_skips_update_and_delete() {
        let db = TempDatabase::new();
        let summary = runner_for(&db, true, false).run_all();
        // Four basic examples, the insert, and the two skipped mutations.
        assert_eq!(summary, RunSummary { succeeded: 0, failed: 7 });

        let mut mutations = RunSummary::default();
        runner_for(&db, true, false).run_mutations(&mut mutations);
        assert_eq!(mutations, RunSummary { succeeded: 0, failed: 3 });
    }

    #[test]
    fn test_insert_returns_new_id() {
        let db = TempDatabase::seeded();
        let runner = runner_for(&db, false, false);
        let args = ExampleArgs {
            name: Some("Runner User".to_string()),
            ..ExampleArgs::default()
        };
        assert_eq!(runner.run_example(Example::Insert, &args).unwrap(), Some(11));
    }
}
