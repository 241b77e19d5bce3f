//! ld-cli entry point.
//!
//! Thin by design: argument parsing and output formatting live here, all
//! behavior lives in the component crates (`Db`, `Fill`, `Waterfall`,
//! `Sweep`, `Tam`, `Ownership` subcommands).

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ld")]
#[command(about = "Lead Disposition Control Plane CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database commands
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> env -> client overrides...)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Run the internal-pool campaign fill engine
    Fill {
        #[arg(long)]
        campaign_id: String,
        #[arg(long)]
        client_id: String,
        #[arg(long, default_value = "email")]
        channel: String,
        #[arg(long)]
        volume: i64,
        #[arg(long)]
        title_keywords: Option<String>,
        #[arg(long)]
        fresh_ratio: Option<f64>,
        #[arg(long)]
        max_per_company: Option<i64>,
    },

    /// Run the full provider-cascade waterfall fill
    Waterfall {
        #[arg(long)]
        campaign_id: String,
        #[arg(long)]
        client_id: String,
        #[arg(long, default_value = "email")]
        channel: String,
        #[arg(long)]
        volume: i64,
        #[arg(long)]
        title_keywords: Option<String>,
        #[arg(long)]
        fresh_ratio: Option<f64>,
        #[arg(long)]
        max_per_company: Option<i64>,
        #[arg(long, default_value_t = true)]
        enable_external: bool,
        #[arg(long, default_value_t = 100.0)]
        max_external_credits: f64,
        #[arg(long)]
        providers_override: Option<String>,
        #[arg(long)]
        industry: Option<String>,
        #[arg(long)]
        company_sizes: Option<String>,
        #[arg(long)]
        locations: Option<String>,
        #[arg(long)]
        search_keywords: Option<String>,
        #[arg(long)]
        company_domains: Option<String>,
    },

    /// Background maintenance sweeps
    Sweep {
        #[command(subcommand)]
        cmd: SweepCmd,
    },

    /// TAM (total addressable market) tracking
    Tam {
        #[command(subcommand)]
        cmd: TamCmd,
    },

    /// Company ownership admin actions
    Ownership {
        #[command(subcommand)]
        cmd: OwnershipCmd,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    Status,
    Migrate,
}

#[derive(Subcommand)]
enum SweepCmd {
    /// Release contacts whose cooldown has expired back to retouch_eligible
    Cooldowns,
    /// Mark contacts with stale enrichment data as stale_data
    Stale,
    /// Release company ownership claims past their expiry
    OwnershipExpiry,
}

#[derive(Subcommand)]
enum TamCmd {
    /// Print the live health snapshot for a client (or the whole platform)
    Health {
        #[arg(long)]
        client_id: Option<String>,
    },
    /// Persist today's snapshot for one client (or the whole platform)
    Snapshot {
        #[arg(long)]
        client_id: Option<String>,
    },
    /// Persist today's snapshot for the whole platform and every client
    SnapshotAll,
    /// Print snapshot history for a client (or the whole platform)
    Trends {
        #[arg(long)]
        client_id: Option<String>,
        #[arg(long, default_value_t = 90)]
        days: i64,
    },
}

#[derive(Subcommand)]
enum OwnershipCmd {
    /// Claim a company for a client, if unowned or already theirs
    Claim {
        #[arg(long)]
        domain: String,
        #[arg(long)]
        client_id: String,
    },
    /// Release a company's current ownership claim
    Release {
        #[arg(long)]
        domain: String,
    },
    /// Transfer a company's ownership to a different client
    Transfer {
        #[arg(long)]
        domain: String,
        #[arg(long)]
        client_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Db { cmd } => {
            let pool = ld_db::connect_from_env().await?;
            match cmd {
                DbCmd::Status => {
                    let s = ld_db::status(&pool).await?;
                    println!("db_ok={} has_contacts_table={}", s.ok, s.has_contacts_table);
                }
                DbCmd::Migrate => {
                    ld_db::migrate(&pool).await?;
                    println!("migrations_applied=true");
                }
            }
        }

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = ld_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Fill {
            campaign_id,
            client_id,
            channel,
            volume,
            title_keywords,
            fresh_ratio,
            max_per_company,
        } => {
            commands::fill::run(
                campaign_id,
                client_id,
                channel,
                volume,
                title_keywords,
                fresh_ratio,
                max_per_company,
            )
            .await?;
        }

        Commands::Waterfall {
            campaign_id,
            client_id,
            channel,
            volume,
            title_keywords,
            fresh_ratio,
            max_per_company,
            enable_external,
            max_external_credits,
            providers_override,
            industry,
            company_sizes,
            locations,
            search_keywords,
            company_domains,
        } => {
            commands::waterfall::run(
                campaign_id,
                client_id,
                channel,
                volume,
                title_keywords,
                fresh_ratio,
                max_per_company,
                enable_external,
                max_external_credits,
                providers_override,
                industry,
                company_sizes,
                locations,
                search_keywords,
                company_domains,
            )
            .await?;
        }

        Commands::Sweep { cmd } => match cmd {
            SweepCmd::Cooldowns => commands::sweep::cooldowns().await?,
            SweepCmd::Stale => commands::sweep::stale().await?,
            SweepCmd::OwnershipExpiry => commands::sweep::ownership_expiry().await?,
        },

        Commands::Tam { cmd } => match cmd {
            TamCmd::Health { client_id } => commands::tam::health(client_id).await?,
            TamCmd::Snapshot { client_id } => commands::tam::snapshot(client_id).await?,
            TamCmd::SnapshotAll => commands::tam::snapshot_all().await?,
            TamCmd::Trends { client_id, days } => commands::tam::trends(client_id, days).await?,
        },

        Commands::Ownership { cmd } => match cmd {
            OwnershipCmd::Claim { domain, client_id } => commands::ownership::claim(domain, client_id).await?,
            OwnershipCmd::Release { domain } => commands::ownership::release(domain).await?,
            OwnershipCmd::Transfer { domain, client_id } => {
                commands::ownership::transfer(domain, client_id).await?
            }
        },
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}
