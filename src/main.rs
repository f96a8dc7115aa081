// A Record Creator CLI
// Author A and CNAME records, keep them locally, move them in and out as CSV/JSON

mod cli;
mod codec;
mod config;
mod import;
mod session;
mod storage;
mod types;
mod ui;
mod validation;

#[cfg(test)]
mod tests;

use clap::Parser;
use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Input, Select};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, ExportCmd};
use crate::codec::FileFormat;
use crate::config::FormConfig;
use crate::session::{RecordSession, SessionError, SessionHandle};
use crate::storage::{JsonFileStore, MemoryStore, RecordStore};
use crate::types::Record;
use crate::ui::{
    create_spinner, print_error, print_header, print_info, print_line, print_records,
    print_success, print_warning,
};
use crate::validation::is_valid_subnet_mask;

const VERSION: &str = env!("CARGO_PKG_VERSION");

type Store = Box<dyn RecordStore + Send>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so exports on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;

    let store: Store = if cli.ephemeral {
        info!("Using in-memory store");
        Box::new(MemoryStore::new())
    } else {
        let data_dir = config.resolved_data_dir();
        info!("📦 Record store at {:?} (key {})", data_dir, config.storage_key);
        Box::new(JsonFileStore::new(&data_dir, &config.storage_key))
    };

    let session = RecordSession::open(store, config.validation_rules(), config.import_policy());
    let handle = SessionHandle::new(session);

    match cli.command {
        None | Some(Commands::Interactive) => {
            let term = Term::stdout();
            main_menu(&term, &handle, &config).await?;
        }
        Some(Commands::AddA(cmd)) => {
            let record = handle.submit_address(&cmd.hostname, &cmd.ip_address, &cmd.ttl)?;
            print_success(&describe(&record));
        }
        Some(Commands::AddCname(cmd)) => {
            let record = handle.submit_alias(&cmd.alias, &cmd.canonical, cmd.ttl.as_deref())?;
            print_success(&describe(&record));
        }
        Some(Commands::List) => {
            print_records(&handle.records().await);
        }
        Some(Commands::Export(cmd)) => {
            export_records(&handle, &config, &cmd).await?;
        }
        Some(Commands::Import(cmd)) => {
            let spinner = create_spinner("Importing records...");
            let result = handle.import_file(&cmd.file).await;
            spinner.finish_and_clear();
            let count = result?;
            print_success(&format!("Imported {} records from {}", count, cmd.file.display()));
        }
        Some(Commands::Mask(cmd)) => {
            check_mask(&cmd.value)?;
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<FormConfig> {
    let config = if cli.config.exists() {
        FormConfig::load(&cli.config)?
    } else {
        if cli.config != Path::new("arecord.toml") {
            warn!("Config file {:?} not found, using defaults", cli.config);
        }
        FormConfig::default()
    };

    // Override config with CLI args
    let config = config
        .with_data_dir(cli.data_dir.clone())
        .with_storage_key(cli.storage_key.clone())
        .with_strict_domains(cli.strict);

    config.validate()?;
    Ok(config)
}

fn check_mask(value: &str) -> anyhow::Result<()> {
    if is_valid_subnet_mask(value) {
        print_success(&format!("{} is a valid subnet mask", value));
        Ok(())
    } else {
        anyhow::bail!("{} is not a class A/B/C subnet mask", value)
    }
}

async fn export_records(
    handle: &SessionHandle<Store>,
    config: &FormConfig,
    cmd: &ExportCmd,
) -> anyhow::Result<()> {
    let mut opts = config.clone().with_layout(cmd.layout).export_options();
    opts.reverse_names |= cmd.reverse_names;

    let content = handle.lock().await.export(cmd.format, &opts)?;

    match &cmd.output {
        Some(path) => {
            tokio::fs::write(path, content).await?;
            print_success(&format!("Exported to {}", path.display()));
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn describe(record: &Record) -> String {
    format!(
        "Added {} record {} → {} (TTL {})",
        record.record_type(),
        record.name(),
        record.target(),
        record.ttl()
    )
}

// =============================================================================
// INTERACTIVE FORM
// =============================================================================

fn print_banner() {
    println!();
    println!("{}", style("  ╔═══════════════════════════════════════╗").cyan());
    println!("{}", style("  ║          📇 A RECORD CREATOR          ║").cyan());
    println!(
        "{}",
        style(format!("  ║                v{:<22}║", VERSION)).cyan()
    );
    println!("{}", style("  ╚═══════════════════════════════════════╝").cyan());
    println!();
}

async fn main_menu(
    term: &Term,
    handle: &SessionHandle<Store>,
    config: &FormConfig,
) -> anyhow::Result<()> {
    let theme = ColorfulTheme::default();

    loop {
        let _ = term.clear_screen();
        print_banner();

        let count = handle.records().await.len();
        println!("  {} {}", style("Records:").dim(), count);
        println!();

        let choices = vec![
            "➕ Add A Record",
            "🔗 Add CNAME Record",
            "📋 View Records",
            "📤 Export",
            "📥 Import",
            "🧮 Check Subnet Mask",
            "🚪 Exit",
        ];

        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&choices)
            .default(0)
            .interact()?;

        match selection {
            0 => add_address_record(term, handle, config).await?,
            1 => add_alias_record(term, handle, config).await?,
            2 => view_records(term, handle).await,
            3 => export_menu(term, handle, config).await?,
            4 => import_menu(term, handle, config).await?,
            5 => mask_menu(term)?,
            _ => {
                println!();
                println!("{}", style("  👋 Goodbye!").cyan());
                println!();
                break;
            }
        }
    }

    Ok(())
}

async fn add_address_record(
    term: &Term,
    handle: &SessionHandle<Store>,
    config: &FormConfig,
) -> anyhow::Result<()> {
    let _ = term.clear_screen();
    print_banner();
    print_header("  ➕ New A Record");

    let theme = ColorfulTheme::default();

    let hostname: String = Input::with_theme(&theme)
        .with_prompt("Hostname")
        .allow_empty(true)
        .interact_text()?;

    let ip_address: String = Input::with_theme(&theme)
        .with_prompt("IP address")
        .allow_empty(true)
        .interact_text()?;

    let ttl: String = Input::with_theme(&theme)
        .with_prompt("TTL")
        .default(config.default_ttl.to_string())
        .allow_empty(true)
        .interact_text()?;

    let result = handle.submit_address(&hostname, &ip_address, &ttl);
    report_submit(result, config).await;
    Ok(())
}

async fn add_alias_record(
    term: &Term,
    handle: &SessionHandle<Store>,
    config: &FormConfig,
) -> anyhow::Result<()> {
    let _ = term.clear_screen();
    print_banner();
    print_header("  🔗 New CNAME Record");

    let theme = ColorfulTheme::default();

    let alias: String = Input::with_theme(&theme)
        .with_prompt("Alias")
        .allow_empty(true)
        .interact_text()?;

    let canonical: String = Input::with_theme(&theme)
        .with_prompt("Canonical name")
        .allow_empty(true)
        .interact_text()?;

    let ttl: String = Input::with_theme(&theme)
        .with_prompt("TTL")
        .default(config.default_ttl.to_string())
        .allow_empty(true)
        .interact_text()?;

    let result = handle.submit_alias(&alias, &canonical, Some(&ttl));
    report_submit(result, config).await;
    Ok(())
}

async fn report_submit(result: Result<Record, SessionError>, config: &FormConfig) {
    match result {
        Ok(record) => {
            println!();
            print_success(&describe(&record));
            println!();
            wait_for_enter();
        }
        Err(SessionError::Storage(e)) => {
            println!();
            print_warning("Record added for this session only");
            show_notice(&e.to_string(), config).await;
        }
        Err(e) => show_notice(&e.to_string(), config).await,
    }
}

async fn view_records(term: &Term, handle: &SessionHandle<Store>) {
    let _ = term.clear_screen();
    print_banner();
    print_header("  📋 Records");

    print_records(&handle.records().await);
    wait_for_enter();
}

async fn export_menu(
    term: &Term,
    handle: &SessionHandle<Store>,
    config: &FormConfig,
) -> anyhow::Result<()> {
    let _ = term.clear_screen();
    print_banner();
    print_header("  📤 Export Records");

    let theme = ColorfulTheme::default();
    let formats = [FileFormat::Csv, FileFormat::Json];
    let choices = vec!["CSV", "JSON"];

    let selection = Select::with_theme(&theme)
        .with_prompt("Format")
        .items(&choices)
        .default(0)
        .interact()?;
    let format = formats[selection.min(formats.len() - 1)];

    let output: String = Input::with_theme(&theme)
        .with_prompt("Save to")
        .default(format!("dns-records.{}", format.extension()))
        .interact_text()?;

    let cmd = ExportCmd {
        format,
        output: Some(PathBuf::from(output)),
        layout: None,
        reverse_names: false,
    };

    match export_records(handle, config, &cmd).await {
        Ok(()) => {
            println!();
            wait_for_enter();
        }
        Err(e) => show_notice(&e.to_string(), config).await,
    }
    Ok(())
}

async fn import_menu(
    term: &Term,
    handle: &SessionHandle<Store>,
    config: &FormConfig,
) -> anyhow::Result<()> {
    let _ = term.clear_screen();
    print_banner();
    print_header("  📥 Import Records");
    print_info("CSV (Type,Hostname,Target,TTL) or JSON array of records");
    println!();

    let theme = ColorfulTheme::default();
    let path: String = Input::with_theme(&theme)
        .with_prompt("File to import")
        .interact_text()?;
    let path = PathBuf::from(path.trim());

    let spinner = create_spinner("Importing records...");
    let result = handle.import_file(&path).await;
    spinner.finish_and_clear();

    match result {
        Ok(count) => {
            print_success(&format!("Imported {} records", count));
            println!();
            wait_for_enter();
        }
        Err(e) => show_notice(&e.to_string(), config).await,
    }
    Ok(())
}

fn mask_menu(term: &Term) -> anyhow::Result<()> {
    let _ = term.clear_screen();
    print_banner();
    print_header("  🧮 Subnet Mask Check");

    let theme = ColorfulTheme::default();
    let value: String = Input::with_theme(&theme)
        .with_prompt("Subnet mask")
        .interact_text()?;

    println!();
    if is_valid_subnet_mask(&value) {
        print_success(&format!("{} is a valid subnet mask", value.trim()));
    } else {
        print_error(&format!("{} is not a class A/B/C subnet mask", value.trim()));
    }
    println!();
    wait_for_enter();
    Ok(())
}

/// Show an error long enough to read, then let the menu redraw over it
async fn show_notice(message: &str, config: &FormConfig) {
    println!();
    print_line();
    print_error(message);
    print_line();
    tokio::time::sleep(Duration::from_secs(config.notice_secs)).await;
}

fn wait_for_enter() {
    use std::io::{self, Write};
    print!("{}", style("  Press Enter to continue...").dim());
    let _ = io::stdout().flush();
    let mut input = String::new();
    let _ = io::stdin().read_line(&mut input);
}
