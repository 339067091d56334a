//! CarLedger CLI - run contract operations against a local ledger
//!
//! The ledger lives in memory for the duration of one command. With
//! `--state` it is loaded from, and written back to, a JSON snapshot file so
//! successive commands see each other's writes.
//!
//! Usage:
//!     carledger --state ledger.json init
//!     carledger --state ledger.json create CAR10 Honda Accord silver Dave --year 2023
//!     carledger --state ledger.json owner CAR10 Erin
//!     carledger --state ledger.json --json history CAR10
//!     carledger --state ledger.json invoke queryCarsByMake Toyota

use std::path::{Path, PathBuf};

use carledger_core::{
    AssetContract, EventLog, InMemoryStore, LedgerError, StoreSnapshot, TransactionContext,
    TxInfo,
};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "carledger")]
#[command(about = "Run car asset contract operations")]
#[command(version)]
struct Args {
    /// Ledger snapshot file (created if missing, rewritten after each write)
    #[arg(short, long)]
    state: Option<PathBuf>,

    /// Print the raw JSON result instead of a rendered view
    #[arg(long)]
    json: bool,

    /// Verbose output (operation logs and emitted events)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seed the ledger with the five sample cars
    Init,
    /// Show one car
    Car { key: String },
    /// List every car
    All,
    /// Create a car
    Create {
        key: String,
        make: String,
        model: String,
        color: String,
        owner: String,
        #[arg(long)]
        year: Option<String>,
        #[arg(long)]
        mileage: Option<String>,
        #[arg(long)]
        price: Option<String>,
    },
    /// Transfer a car to a new owner
    Owner { key: String, new_owner: String },
    /// Update color, mileage, price or status from a JSON object
    Update { key: String, updates: String },
    /// Cars held by an owner
    ByOwner { owner: String },
    /// Cars of a make
    ByMake { make: String },
    /// Every committed version of a car
    History { key: String },
    /// Call an operation by name with raw text arguments
    Invoke { function: String, args: Vec<String> },
}

impl Command {
    /// Operation name and text arguments, as the hosting platform would pass them
    fn to_call(&self) -> (String, Vec<String>) {
        match self {
            Command::Init => call("initLedger", &[]),
            Command::Car { key } => call("queryCar", &[key]),
            Command::All => call("queryAllCars", &[]),
            Command::Create {
                key,
                make,
                model,
                color,
                owner,
                year,
                mileage,
                price,
            } => {
                let (name, mut args) = call("createCar", &[key, make, model, color, owner]);
                // Optional positionals: a later one forces the earlier ones to be present
                let optional = [year, mileage, price];
                if let Some(last) = optional.iter().rposition(|o| o.is_some()) {
                    args.extend(
                        optional[..=last]
                            .iter()
                            .map(|o| o.as_deref().unwrap_or("").to_string()),
                    );
                }
                (name, args)
            }
            Command::Owner { key, new_owner } => call("changeCarOwner", &[key, new_owner]),
            Command::Update { key, updates } => call("updateCarDetails", &[key, updates]),
            Command::ByOwner { owner } => call("queryCarsByOwner", &[owner]),
            Command::ByMake { make } => call("queryCarsByMake", &[make]),
            Command::History { key } => call("getCarHistory", &[key]),
            Command::Invoke { function, args } => (function.clone(), args.clone()),
        }
    }
}

fn call(name: &str, args: &[&String]) -> (String, Vec<String>) {
    (name.to_string(), args.iter().map(|a| a.to_string()).collect())
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "carledger_core=debug"
    } else {
        "carledger_core=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = match load_store(args.state.as_deref(), args.verbose) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading ledger: {}", e);
            std::process::exit(1);
        }
    };

    let verbose = args.verbose;
    let events = EventLog::new().with_callback(move |event| {
        if verbose {
            eprintln!("event {} {}", event.name, event.payload);
        }
    });
    let contract = AssetContract::new();
    let tx = TxInfo::generate();
    if args.verbose {
        eprintln!("Transaction: {}", &tx.tx_id()[..8]);
    }

    let (function, call_args) = args.command.to_call();
    let ctx = TransactionContext::new(&store, &events, tx);
    let output = match contract.invoke(&ctx, &function, &call_args) {
        Ok(output) => output,
        Err(e) => {
            report_error(&e, args.json);
            std::process::exit(1);
        }
    };

    if let Some(path) = &args.state {
        if let Err(e) = save_store(&store, path) {
            eprintln!("Error saving ledger: {}", e);
            std::process::exit(1);
        }
    }

    if args.json {
        println!("{}", output);
    } else {
        output_rendered(&function, &output);
    }
}

fn load_store(path: Option<&Path>, verbose: bool) -> Result<InMemoryStore, LedgerError> {
    let Some(path) = path.filter(|p| p.exists()) else {
        return Ok(InMemoryStore::new());
    };
    if verbose {
        eprintln!("Loading ledger from: {}", path.display());
    }
    let content = std::fs::read_to_string(path)?;
    let snapshot: StoreSnapshot = serde_json::from_str(&content)?;
    Ok(InMemoryStore::from_snapshot(snapshot))
}

fn save_store(store: &InMemoryStore, path: &Path) -> Result<(), LedgerError> {
    let snapshot = store.snapshot()?;
    std::fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
    Ok(())
}

fn report_error(error: &LedgerError, json: bool) {
    if json {
        match serde_json::to_string_pretty(&error.to_error_response()) {
            Ok(body) => println!("{}", body),
            Err(_) => eprintln!("Error [{}]: {}", error.error_code(), error),
        }
    } else {
        eprintln!("Error [{}]: {}", error.error_code(), error);
    }
}

fn output_rendered(function: &str, output: &str) {
    if output.is_empty() {
        println!("{}: ok", function);
        return;
    }

    let value: Value = match serde_json::from_str(output) {
        Ok(v) => v,
        Err(_) => {
            println!("{}", output);
            return;
        }
    };

    match &value {
        Value::Array(items) => {
            for item in items {
                println!("{}", render_item(item));
            }
            println!();
            println!("Total: {}", items.len());
        }
        other => println!("{}", render_car(other)),
    }
}

fn render_item(item: &Value) -> String {
    // Listing entries carry a key and record; history entries a transaction id
    if let Some(key) = item.get("key").and_then(Value::as_str) {
        return format!("  {:<8} {}", key, render_car(&item["record"]));
    }
    if let Some(tx_id) = item.get("transactionId").and_then(Value::as_str) {
        let short = tx_id.get(..8).unwrap_or(tx_id);
        let when = item["timestamp"].as_str().unwrap_or("");
        let value = if item["isDelete"].as_bool().unwrap_or(false) {
            "(deleted)".to_string()
        } else {
            render_car(&item["value"])
        };
        return format!("  {} {} {}", when, short, value);
    }
    format!("  {}", item)
}

fn render_car(record: &Value) -> String {
    let field = |name: &str| match &record[name] {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    };
    if !record.is_object() {
        return record.to_string();
    }
    format!(
        "{} {} {} ({}) owner={} mileage={} price={} status={}",
        field("year"),
        field("make"),
        field("model"),
        field("color"),
        field("owner"),
        field("mileage"),
        field("price"),
        field("status"),
    )
}
