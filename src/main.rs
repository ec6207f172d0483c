//! sitecache - administer the site resolution cache
//!
//! A small command-line front end over the `sitecache` library for inspecting,
//! filling and clearing cache entries and for running the startup routine.

use std::error::Error;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use sitecache::cli::{Cli, Command};
use sitecache::logging::init_tracing;
use sitecache::probe::candidate_hosts;
use sitecache::settings::SettingsStore;
use sitecache::startup::prepare_cache;
use sitecache::FileCache;

/// Runs the parsed command and returns the process exit code
fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let cache = FileCache::new(cli.cache_config());
    let settings = SettingsStore::new(cli.settings_path());
    debug!(dir = %cache.cache_dir().display(), ttl = %cache.ttl(), "using cache");

    match cli.command {
        Command::Get { label } => match cache.get(&label) {
            Some(data) => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(&data)?;
                stdout.flush()?;
            }
            None => {
                eprintln!("not cached: {}", label);
                return Ok(ExitCode::from(1));
            }
        },
        Command::Set { label, value } => {
            let data = match value {
                Some(value) => value.into_bytes(),
                None => {
                    let mut buf = Vec::new();
                    io::stdin().read_to_end(&mut buf)?;
                    buf
                }
            };
            cache.ensure_dir()?;
            cache.set(&label, &data)?;
        }
        Command::Invalidate { label } => {
            if !cache.invalidate(&label)? {
                debug!(label = %label, "nothing to invalidate");
            }
        }
        Command::Clear => {
            let removed = cache.clear_all()?;
            println!("removed {} entries", removed);
        }
        Command::Purge => {
            let removed = cache.purge_expired()?;
            println!("removed {} expired entries", removed);
        }
        Command::Path { label } => {
            println!("{}", cache.path_for(&label).display());
        }
        Command::Status { label } => match cache.entry_info(&label) {
            Some(info) => {
                println!("path:     {}", info.path.display());
                println!("size:     {} bytes", info.size);
                println!("modified: {}", info.modified.to_rfc3339());
                match info.expires_at {
                    Some(at) => println!("expires:  {}", at.to_rfc3339()),
                    None => println!("expires:  never"),
                }
                println!("fresh:    {}", if info.is_fresh { "yes" } else { "no" });
            }
            None => {
                eprintln!("no entry: {}", label);
                return Ok(ExitCode::from(1));
            }
        },
        Command::Probe { domain, subdomains } => {
            let options = match subdomains {
                Some(options) => options,
                None => settings.load()?.subdomain_options,
            };
            for host in candidate_hosts(&domain, &options) {
                println!("{}", host);
            }
        }
        Command::Startup => {
            let report = prepare_cache(&cache, &settings)?;
            match report.cleared {
                Some(removed) => println!("cleared {} entries", removed),
                None => println!("nothing to clear"),
            }
        }
        Command::RequestClear => {
            settings.request_clear()?;
            println!("cache will be cleared on next startup");
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}
