// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use sales_registry::logging::init_logging;
use sales_registry::{Command, Config, Department, PersistenceService, RecordKind, Seller, SqliteStore};
use tracing::info;

fn main() -> Result<()> {
    let config = Config::from_args();
    init_logging(&config.log_file)?;
    info!(version = sales_registry::VERSION, db = %config.db_path.display(), "starting");

    let store = SqliteStore::open(&config.db_path)?;

    match config.command.clone() {
        Command::Ui => run_ui_mode(store, &config)?,
        Command::List { kind, json } => run_list(&store, kind, json)?,
        Command::Seed => run_seed(&store)?,
    }

    Ok(())
}

fn run_seed(store: &SqliteStore) -> Result<()> {
    println!("🌱 Seeding demo data...");
    let inserted = store.seed_demo_data()?;

    if inserted == 0 {
        println!("✓ Database already has records, nothing inserted");
    } else {
        println!("✓ Inserted {} records", inserted);
    }
    info!(inserted, "seed finished");

    Ok(())
}

fn run_list(store: &SqliteStore, kind: RecordKind, json: bool) -> Result<()> {
    match kind {
        RecordKind::Departments => {
            let departments = PersistenceService::<Department>::find_all(store)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&departments)?);
                return Ok(());
            }
            println!("{:<6} {}", "ID", "NAME");
            for dept in &departments {
                println!("{:<6} {}", format_id(dept.id), dept.name);
            }
            println!("\n✓ {} departments", departments.len());
        }
        RecordKind::Sellers => {
            let sellers = PersistenceService::<Seller>::find_all(store)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sellers)?);
                return Ok(());
            }
            println!("{:<6} {:<30} {:<30} {:<12} {:>12}", "ID", "NAME", "EMAIL", "BIRTH", "SALARY");
            for seller in &sellers {
                println!(
                    "{:<6} {:<30} {:<30} {:<12} {:>12}",
                    format_id(seller.id),
                    seller.name,
                    seller.email,
                    seller
                        .birth_date
                        .map(|d| d.format("%d/%m/%Y").to_string())
                        .unwrap_or_default(),
                    seller
                        .base_salary
                        .map(|s| format!("{:.2}", s))
                        .unwrap_or_default(),
                );
            }
            println!("\n✓ {} sellers", sellers.len());
        }
    }

    Ok(())
}

fn format_id(id: Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

#[cfg(feature = "tui")]
fn run_ui_mode(store: SqliteStore, config: &Config) -> Result<()> {
    use std::rc::Rc;

    let mut app = ui::App::new(Rc::new(store), config.parse_policy)
        .context("Failed to load records")?;
    ui::run_ui(&mut app)?;

    info!("UI closed");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_store: SqliteStore, _config: &Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: sales-registry list departments");
    std::process::exit(1);
}
