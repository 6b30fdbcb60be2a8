//! filedb CLI
//!
//! Opens a store file and issues a single get/set, or dumps its index.

use clap::{Parser, Subcommand, ValueEnum};
use filedb::{Config, FieldEncoding, Store};
use tracing_subscriber::{fmt, EnvFilter};

/// filedb CLI
#[derive(Parser, Debug)]
#[command(name = "filedb")]
#[command(about = "Single-file fixed-layout key-value store")]
#[command(version)]
struct Args {
    /// Store file
    #[arg(short, long, default_value = "test")]
    path: String,

    /// Key/value field encoding
    #[arg(short, long, value_enum, default_value_t = Encoding::Prefixed)]
    encoding: Encoding,

    /// Zero-padded layout with the legacy full-store and missing-key behaviour
    #[arg(long, conflicts_with = "encoding")]
    legacy: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Print the allocation bitmap and key table
    Dump,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Encoding {
    /// Zero-padded fields (original layout)
    Padded,
    /// Length-prefixed fields
    Prefixed,
}

impl From<Encoding> for FieldEncoding {
    fn from(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Padded => FieldEncoding::ZeroPadded,
            Encoding::Prefixed => FieldEncoding::LengthPrefixed,
        }
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,filedb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = if args.legacy {
        Config::legacy(&args.path)
    } else {
        Config::builder()
            .path(&args.path)
            .encoding(args.encoding.into())
            .build()
    };

    if let Err(e) = run(config, args.command) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(config: Config, command: Commands) -> filedb::Result<()> {
    let store = Store::open_with_config(config)?;

    match command {
        Commands::Get { key } => match store.get(&key)? {
            Some(value) => println!("{}", String::from_utf8_lossy(&value)),
            None => println!("(nil)"),
        },
        Commands::Set { key, value } => {
            store.set(&key, value.as_bytes())?;
            println!("OK");
        }
        Commands::Dump => {
            let config = store.config();
            println!("path:       {}", store.path().display());
            println!(
                "policies:   {:?}, {:?}, {:?}",
                config.encoding, config.slot_exhaustion, config.missing_key
            );

            let allocation = store.allocation();
            let addresses: Vec<String> = allocation.addresses().map(|a| a.to_string()).collect();
            println!("allocation: {:064b}", allocation.bits());
            println!(
                "allocated:  {} [{}]",
                allocation.allocated_count(),
                addresses.join(" ")
            );
            for (key, address) in store.key_index() {
                println!("{:<16} {}", key, address);
            }
        }
    }

    store.close()
}
