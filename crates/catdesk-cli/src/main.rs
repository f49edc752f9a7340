// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use catdesk_app::CategoryListState;
use catdesk_db::Store;
use config::{Backend, Config};
use runtime::{DbRuntime, RemoteRuntime};
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `catdesk --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let backend = if options.demo {
        Backend::Sqlite
    } else {
        config.backend()
    };

    if options.print_db_path {
        match backend {
            Backend::Sqlite => println!("{}", resolve_db_path(&config, options.demo)?.display()),
            Backend::Remote => println!(
                "{}/rest/v1/{}",
                config.remote_base_url(),
                config.remote_collection()
            ),
        }
        return Ok(());
    }

    logging::init(config.log_level(), &config.log_path()?)?;
    tracing::info!(
        backend = backend.as_str(),
        demo = options.demo,
        config = %options.config_path.display(),
        "starting catdesk"
    );

    let mut state = CategoryListState::default();
    match backend {
        Backend::Sqlite => {
            let db_path = resolve_db_path(&config, options.demo)?;
            let store = Store::open(&db_path).with_context(|| {
                format!(
                    "open database {} -- if this path is wrong, set [storage].db_path or CATDESK_DB_PATH",
                    db_path.display()
                )
            })?;
            store.bootstrap()?;
            if options.demo {
                store.seed_demo_data()?;
            }
            if options.check_only {
                return Ok(());
            }

            let mut runtime = DbRuntime::new(&store);
            catdesk_tui::run_app(&mut state, &mut runtime)
        }
        Backend::Remote => {
            let client = catdesk_remote::Client::new(
                config.remote_base_url(),
                config.remote_api_key(),
                config.remote_timeout()?,
            )
            .with_context(|| {
                format!(
                    "invalid [remote] config in {}; fix base_url/timeout values",
                    options.config_path.display()
                )
            })?;
            if options.check_only {
                return Ok(());
            }

            let mut runtime = RemoteRuntime::new(client, config.remote_collection());
            catdesk_tui::run_app(&mut state, &mut runtime)
        }
    }
}

fn resolve_db_path(config: &Config, demo: bool) -> Result<PathBuf> {
    if demo {
        return Ok(PathBuf::from(":memory:"));
    }
    config.db_path()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("catdesk: category administration console");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path (or remote endpoint)");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch with seeded demo categories (in-memory)");
    println!("  --check                  Validate config and open the store, then exit");
    println!("  --help                   Show this help");
}
