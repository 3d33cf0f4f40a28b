//! Maintenance commands for the club and template tables.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use addicted::bootstrapper::init_tracing;
use addicted::config::CONFIG;
use addicted::db::{self, DbConn};
use addicted::extract::load_template_definitions;
use addicted::services::template_report;
use addicted::services::template_sync::{self, ExistingPolicy, SyncOptions};
use addicted::services::init_clubs;
use addicted::templates::{fallback_catalogue, Layout};

const DEFAULT_SOURCE: &str = "app-addicted-logic.js";

#[derive(Parser)]
#[command(name = "addicted-admin", version, about = "Club and template maintenance")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create or refresh the built-in clubs
    InitClubs,
    /// Import templates defined in the web application's source file
    ImportTemplates {
        #[arg(long, default_value = DEFAULT_SOURCE)]
        source: PathBuf,
        #[arg(long, default_value = "blank")]
        layout: Layout,
    },
    /// Publish the built-in fallback templates, restoring deleted or draft ones
    SyncFallback {
        #[arg(long, default_value = "story")]
        layout: Layout,
    },
    /// Compare the database with the built-in fallback templates
    Compare,
    /// Summarise templates per club and status
    Check,
    /// Compare the source file's templates with the fallback set, without a database
    CheckLocal {
        #[arg(long, default_value = DEFAULT_SOURCE)]
        source: PathBuf,
    },
    /// List templates marked as deleted, optionally removing them
    CleanupDeleted {
        #[arg(long)]
        delete: bool,
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing(&CONFIG.log_level);
    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn connect() -> anyhow::Result<DbConn> {
    Ok(db::connect_with_retry(&CONFIG.database).await?)
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::InitClubs => {
            let db = connect().await?;
            for club in init_clubs(&db).await? {
                println!("Club ready: {club}");
            }
        }
        Command::ImportTemplates { source, layout } => {
            let catalogue = load_template_definitions(&source)?;
            let total: usize = catalogue.iter().map(|c| c.templates.len()).sum();
            if total == 0 {
                anyhow::bail!("no template definitions found in {}", source.display());
            }
            println!("Found {total} template(s) in {}", source.display());

            let db = connect().await?;
            let options = SyncOptions {
                layout,
                existing: ExistingPolicy::Skip,
            };
            print!("{}", template_sync::sync_catalogue(&db, &catalogue, options).await?);
        }
        Command::SyncFallback { layout } => {
            let db = connect().await?;
            let options = SyncOptions {
                layout,
                existing: ExistingPolicy::Republish,
            };
            print!(
                "{}",
                template_sync::sync_catalogue(&db, &fallback_catalogue(), options).await?
            );
        }
        Command::Compare => {
            let db = connect().await?;
            print!("{}", template_report::compare(&db, &fallback_catalogue()).await?);
        }
        Command::Check => {
            let db = connect().await?;
            print!("{}", template_report::check(&db).await?);
        }
        Command::CheckLocal { source } => {
            let catalogue = load_template_definitions(&source)?;
            print!(
                "{}",
                template_report::check_local(&catalogue, &fallback_catalogue())
            );
        }
        Command::CleanupDeleted { delete, yes } => {
            let db = connect().await?;
            cleanup_deleted(&db, delete, yes).await?;
        }
    }
    Ok(())
}

async fn cleanup_deleted(db: &DbConn, delete: bool, yes: bool) -> anyhow::Result<()> {
    let deleted = template_sync::list_deleted(db).await?;
    if deleted.is_empty() {
        println!("No deleted templates found");
        return Ok(());
    }

    println!("Found {} deleted template(s):", deleted.len());
    for template in &deleted {
        println!(
            "  - {} (ID: {}, Club: {}, Updated: {})",
            template.name, template.id, template.club_id, template.updated_at
        );
    }

    if !delete {
        println!("\nTo permanently delete these templates, run:");
        println!("   addicted-admin cleanup-deleted --delete");
        return Ok(());
    }

    if !yes && !confirm("This will permanently delete all templates marked as 'deleted'")? {
        println!("Cancelled");
        return Ok(());
    }

    let removed = template_sync::purge_deleted(db).await?;
    println!("Permanently deleted {removed} template(s)");
    Ok(())
}

fn confirm(warning: &str) -> io::Result<bool> {
    println!("{warning}");
    print!("Are you sure? Type 'yes' to confirm: ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}
