use clap::{Parser, Subcommand};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bounty_audit::{verify_hash, EntityType, EventLog};
use bounty_config::MarketConfig;
use bounty_engine::{DistributionService, EngineConfig};
use bounty_model::money::{format_with_currency, parse_minor_units};
use bounty_model::ContributionCategory;
use bounty_store::MarketStore;

/// Bounty Marketplace CLI
#[derive(Parser)]
#[command(name = "bounty", version, about = "Bounty marketplace command-line interface")]
struct Cli {
    /// Data directory holding config, store, and event log snapshots
    #[arg(long, global = true, default_value = "/tmp/bounty-data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a data directory with a default configuration
    Init,

    /// Challenge management commands
    Challenge {
        #[command(subcommand)]
        command: ChallengeCommands,
    },

    /// Record a contribution against a challenge
    Contribute {
        /// Challenge id
        #[arg(long)]
        challenge: u64,

        /// Contributor identity
        #[arg(long)]
        contributor: String,

        /// Contribution category (implementation, review, design, testing,
        /// documentation, triage)
        #[arg(long)]
        category: String,
    },

    /// Preview the split a completion would produce (read-only)
    Preview {
        /// Challenge id
        #[arg(long)]
        challenge: u64,
    },

    /// Complete a challenge: distribute the bounty and create payments
    Complete {
        /// Challenge id
        #[arg(long)]
        challenge: u64,

        /// Acting identity (must be the sponsor)
        #[arg(long)]
        actor: String,
    },

    /// Audit a completed distribution for fairness
    Fairness {
        /// Challenge id
        #[arg(long)]
        challenge: u64,

        /// Acting identity recorded on the audit event
        #[arg(long, default_value = "auditor")]
        actor: String,
    },

    /// Show the audit trail for one entity
    Trail {
        /// Entity type (challenge, contribution, payment)
        #[arg(long)]
        entity: String,

        /// Entity id
        #[arg(long)]
        id: u64,
    },

    /// Show recent events by one actor
    Activity {
        /// Actor identity
        #[arg(long)]
        actor: String,

        /// Maximum number of events
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Show system-wide recent events
    Recent {
        /// Maximum number of events
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Verify a snapshot file against a recorded content hash
    Verify {
        /// Path to the snapshot JSON file
        #[arg(long)]
        snapshot: PathBuf,

        /// Expected hex SHA-256 content hash
        #[arg(long)]
        hash: String,
    },

    /// Print version information
    Version,
}

#[derive(Subcommand)]
enum ChallengeCommands {
    /// Post a new challenge
    Create {
        /// Sponsor identity
        #[arg(long)]
        sponsor: String,

        /// Challenge title
        #[arg(long)]
        title: String,

        /// Bounty amount as a decimal, e.g. "1000.00"
        #[arg(long)]
        bounty: String,
    },

    /// Close a challenge without distribution
    Close {
        /// Challenge id
        #[arg(long)]
        id: u64,

        /// Acting identity (must be the sponsor)
        #[arg(long)]
        actor: String,
    },
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => cmd_init(&cli.data_dir),
        Commands::Challenge { command } => match command {
            ChallengeCommands::Create {
                sponsor,
                title,
                bounty,
            } => cmd_challenge_create(&cli.data_dir, &sponsor, &title, &bounty),
            ChallengeCommands::Close { id, actor } => {
                cmd_challenge_close(&cli.data_dir, id, &actor)
            }
        },
        Commands::Contribute {
            challenge,
            contributor,
            category,
        } => cmd_contribute(&cli.data_dir, challenge, &contributor, &category),
        Commands::Preview { challenge } => cmd_preview(&cli.data_dir, challenge),
        Commands::Complete { challenge, actor } => cmd_complete(&cli.data_dir, challenge, &actor),
        Commands::Fairness { challenge, actor } => cmd_fairness(&cli.data_dir, challenge, &actor),
        Commands::Trail { entity, id } => cmd_trail(&cli.data_dir, &entity, id),
        Commands::Activity { actor, limit } => cmd_activity(&cli.data_dir, &actor, limit),
        Commands::Recent { limit } => cmd_recent(&cli.data_dir, limit),
        Commands::Verify { snapshot, hash } => cmd_verify(snapshot, &hash),
        Commands::Version => cmd_version(),
    }
}

fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.json")
}

/// Load the config, store, and event log from the data directory and
/// assemble the engine. Missing snapshots start empty.
fn open_market(data_dir: &Path) -> (MarketConfig, DistributionService) {
    let config = if config_path(data_dir).exists() {
        MarketConfig::from_file(config_path(data_dir)).unwrap_or_else(|e| {
            eprintln!("Error reading config: {e}");
            std::process::exit(1);
        })
    } else {
        MarketConfig {
            data_dir: data_dir.to_string_lossy().into_owned(),
            ..MarketConfig::default()
        }
    };

    let store = if config.store_path().exists() {
        MarketStore::from_file(config.store_path()).unwrap_or_else(|e| {
            eprintln!("Error reading market store: {e}");
            std::process::exit(1);
        })
    } else {
        MarketStore::new()
    };

    let events = if config.events_path().exists() {
        EventLog::from_file(config.events_path()).unwrap_or_else(|e| {
            eprintln!("Error reading event log: {e}");
            std::process::exit(1);
        })
    } else {
        EventLog::new()
    };

    let engine_config = EngineConfig {
        default_method: config.default_payment_method,
        fairness_threshold: config.fairness_threshold,
    };
    let service = DistributionService::new(
        Arc::new(RwLock::new(store)),
        Arc::new(RwLock::new(events)),
        engine_config,
    );
    (config, service)
}

/// Persist the store and event log snapshots after a mutation.
fn persist(config: &MarketConfig, service: &DistributionService) {
    std::fs::create_dir_all(&config.data_dir).unwrap_or_else(|e| {
        eprintln!("Error creating data directory: {e}");
        std::process::exit(1);
    });
    service
        .store()
        .read()
        .to_file(config.store_path())
        .unwrap_or_else(|e| {
            eprintln!("Error writing market store: {e}");
            std::process::exit(1);
        });
    service
        .events()
        .read()
        .to_file(config.events_path())
        .unwrap_or_else(|e| {
            eprintln!("Error writing event log: {e}");
            std::process::exit(1);
        });
}

fn cmd_init(data_dir: &Path) {
    std::fs::create_dir_all(data_dir).unwrap_or_else(|e| {
        eprintln!("Error creating data directory: {e}");
        std::process::exit(1);
    });

    let config = MarketConfig {
        data_dir: data_dir.to_string_lossy().into_owned(),
        ..MarketConfig::default()
    };
    config.to_file(config_path(data_dir)).unwrap_or_else(|e| {
        eprintln!("Error writing config: {e}");
        std::process::exit(1);
    });

    MarketStore::new()
        .to_file(config.store_path())
        .unwrap_or_else(|e| {
            eprintln!("Error writing market store: {e}");
            std::process::exit(1);
        });
    EventLog::new()
        .to_file(config.events_path())
        .unwrap_or_else(|e| {
            eprintln!("Error writing event log: {e}");
            std::process::exit(1);
        });

    println!("Initialized bounty marketplace data directory");
    println!("  Path: {}", data_dir.display());
    println!("  Market: {}", config.market_name);
    println!("  Currency: {}", config.currency);
    println!("  Fairness threshold: {:.2}", config.fairness_threshold);
}

fn cmd_challenge_create(data_dir: &Path, sponsor: &str, title: &str, bounty: &str) {
    let bounty = parse_minor_units(bounty).unwrap_or_else(|e| {
        eprintln!("Invalid bounty amount: {e}");
        std::process::exit(1);
    });

    let (config, service) = open_market(data_dir);
    let challenge = service
        .create_challenge(&sponsor.to_string(), title, bounty)
        .unwrap_or_else(|e| {
            eprintln!("Error creating challenge: {e}");
            std::process::exit(1);
        });
    persist(&config, &service);

    println!("Challenge created");
    println!("  Id: {}", challenge.id);
    println!("  Sponsor: {}", challenge.sponsor);
    println!("  Title: {}", challenge.title);
    println!(
        "  Bounty: {}",
        format_with_currency(challenge.bounty, &config.currency)
    );
    println!("  Status: {}", challenge.status);
}

fn cmd_challenge_close(data_dir: &Path, id: u64, actor: &str) {
    let (config, service) = open_market(data_dir);
    let challenge = service
        .close_challenge(id, &actor.to_string())
        .unwrap_or_else(|e| {
            eprintln!("Error closing challenge: {e}");
            std::process::exit(1);
        });
    persist(&config, &service);

    println!("Challenge {} closed without distribution", challenge.id);
}

fn cmd_contribute(data_dir: &Path, challenge: u64, contributor: &str, category: &str) {
    let category = ContributionCategory::parse(category).unwrap_or_else(|| {
        eprintln!("Unknown category: {category}");
        eprintln!(
            "Valid categories: implementation, review, design, testing, documentation, triage"
        );
        std::process::exit(1);
    });

    let (config, service) = open_market(data_dir);
    let contribution = service
        .record_contribution(challenge, &contributor.to_string(), category)
        .unwrap_or_else(|e| {
            eprintln!("Error recording contribution: {e}");
            std::process::exit(1);
        });
    persist(&config, &service);

    println!("Contribution recorded");
    println!("  Id: {}", contribution.id);
    println!("  Challenge: {}", contribution.challenge_id);
    println!("  Contributor: {}", contribution.contributor);
    println!("  Category: {}", contribution.category);
    println!("  Weight: {}", contribution.weight);
}

fn cmd_preview(data_dir: &Path, challenge: u64) {
    let (config, service) = open_market(data_dir);
    let splits = service.preview_split(challenge).unwrap_or_else(|e| {
        eprintln!("Error computing preview: {e}");
        std::process::exit(1);
    });

    println!("Split preview for challenge {challenge}");
    for split in &splits {
        println!(
            "  {} -> {} ({:.2}%, weight {})",
            split.contributor,
            format_with_currency(split.amount, &config.currency),
            split.percentage,
            split.weight
        );
    }
    let total: u64 = splits.iter().map(|s| s.amount).sum();
    println!("  Total: {}", format_with_currency(total, &config.currency));
}

fn cmd_complete(data_dir: &Path, challenge: u64, actor: &str) {
    let (config, service) = open_market(data_dir);
    let receipt = service
        .complete_challenge(challenge, &actor.to_string())
        .unwrap_or_else(|e| {
            eprintln!("Error completing challenge: {e}");
            std::process::exit(1);
        });
    persist(&config, &service);

    println!("Challenge {} completed", receipt.challenge.id);
    println!(
        "  Total distributed: {}",
        format_with_currency(receipt.summary.total_amount, &config.currency)
    );
    println!("  Recipients: {}", receipt.summary.recipient_count);
    for payment in &receipt.payments {
        println!(
            "  Payment {}: {} -> {} [{}]",
            payment.id,
            format_with_currency(payment.amount, &config.currency),
            payment.contributor,
            payment.status
        );
    }
}

fn cmd_fairness(data_dir: &Path, challenge: u64, actor: &str) {
    let (config, service) = open_market(data_dir);
    let assessment = service
        .fairness_audit(challenge, &actor.to_string())
        .unwrap_or_else(|e| {
            eprintln!("Error auditing distribution: {e}");
            std::process::exit(1);
        });
    persist(&config, &service);

    println!("Fairness assessment for challenge {challenge}");
    println!("  Gini coefficient: {:.4}", assessment.gini);
    println!("  Score: {:.2} ({})", assessment.score, assessment.category);
    println!(
        "  Passes threshold {:.2}: {}",
        config.fairness_threshold,
        service.passes_compliance(&assessment)
    );
    for flag in &assessment.red_flags {
        println!("  RED    {}: {}", flag.code, flag.detail);
    }
    for flag in &assessment.yellow_flags {
        println!("  YELLOW {}: {}", flag.code, flag.detail);
    }
    for flag in &assessment.green_flags {
        println!("  GREEN  {}: {}", flag.code, flag.detail);
    }
}

fn cmd_trail(data_dir: &Path, entity: &str, id: u64) {
    let entity_type = EntityType::parse(entity).unwrap_or_else(|| {
        eprintln!("Unknown entity type: {entity}");
        eprintln!("Valid types: challenge, contribution, payment");
        std::process::exit(1);
    });

    let (_config, service) = open_market(data_dir);
    let trail = service.trail(entity_type, id);

    println!("Audit trail for {entity_type} {id} ({} events)", trail.len());
    for event in &trail {
        print_event(event);
    }
}

fn cmd_activity(data_dir: &Path, actor: &str, limit: usize) {
    let (_config, service) = open_market(data_dir);
    let events = service.actor_activity(actor, limit);

    println!("Recent activity for {actor} ({} events)", events.len());
    for event in &events {
        print_event(event);
    }
}

fn cmd_recent(data_dir: &Path, limit: usize) {
    let (_config, service) = open_market(data_dir);
    let events = service.recent_events(limit);

    println!("Recent events ({})", events.len());
    for event in &events {
        print_event(event);
    }
}

fn print_event(event: &bounty_audit::Event) {
    let hash = event
        .content_hash
        .as_deref()
        .map(|h| format!(" hash={}..", &h[..12.min(h.len())]))
        .unwrap_or_default();
    println!(
        "  [{}] {} {} {}/{} by {}{}",
        event.id,
        event.created_at.format("%Y-%m-%d %H:%M:%S"),
        event.action,
        event.entity_type,
        event.entity_id,
        event.actor,
        hash
    );
}

fn cmd_verify(snapshot_path: PathBuf, hash: &str) {
    let contents = std::fs::read_to_string(&snapshot_path).unwrap_or_else(|e| {
        eprintln!("Error reading snapshot file: {e}");
        std::process::exit(1);
    });
    let snapshot: serde_json::Value = serde_json::from_str(&contents).unwrap_or_else(|e| {
        eprintln!("Snapshot is not valid JSON: {e}");
        std::process::exit(1);
    });

    if verify_hash(&snapshot, hash) {
        println!("OK: snapshot matches recorded hash");
    } else {
        println!("MISMATCH: snapshot does not match recorded hash");
        println!("  Expected: {hash}");
        println!("  Actual:   {}", bounty_audit::content_hash(&snapshot));
        std::process::exit(2);
    }
}

fn cmd_version() {
    println!(
        "bounty {} (bounty marketplace CLI)",
        env!("CARGO_PKG_VERSION")
    );
}
