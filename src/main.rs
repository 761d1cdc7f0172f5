use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use wealthflow::args::{
    AccountSubcommand, Args, Command, RateSubcommand, TxSubcommand, UnitSubcommand,
};
use wealthflow::commands::{self, AccountChanges};
use wealthflow::model::NewTransaction;
use wealthflow::{Config, Result};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().wealth_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.base_unit())
            .await?
            .print(),

        Command::Unit(unit_args) => {
            let config = Config::load(home).await?;
            match unit_args.command() {
                UnitSubcommand::List => commands::unit_list(config).await?.print(),
                UnitSubcommand::Add(a) => {
                    commands::unit_add(config, a.code(), a.name(), a.symbol())
                        .await?
                        .print()
                }
                UnitSubcommand::Update(a) => {
                    commands::unit_update(config, a.code(), a.name(), a.symbol())
                        .await?
                        .print()
                }
                UnitSubcommand::Delete(a) => {
                    commands::unit_delete(config, a.code()).await?.print()
                }
            }
        }

        Command::Rate(rate_args) => {
            let config = Config::load(home).await?;
            match rate_args.command() {
                RateSubcommand::List => commands::rate_list(config).await?.print(),
                RateSubcommand::Add(a) => {
                    commands::rate_add(config, a.from(), a.to(), a.value().value())
                        .await?
                        .print()
                }
                RateSubcommand::Update(a) => {
                    commands::rate_update(config, a.id(), a.value().value())
                        .await?
                        .print()
                }
                RateSubcommand::Delete(a) => commands::rate_delete(config, a.id()).await?.print(),
            }
        }

        Command::Account(account_args) => {
            let config = Config::load(home).await?;
            match account_args.command() {
                AccountSubcommand::List => commands::account_list(config).await?.print(),
                AccountSubcommand::Show(a) => {
                    commands::account_show(config, a.id()).await?.print()
                }
                AccountSubcommand::Add(a) => {
                    commands::account_add(config, a.name(), a.currency(), a.icon(), a.color())
                        .await?
                        .print()
                }
                AccountSubcommand::Update(a) => {
                    let changes = AccountChanges {
                        name: a.name().map(str::to_string),
                        currency: a.currency().map(str::to_string),
                        icon: a.icon().map(str::to_string),
                        color: a.color().map(str::to_string),
                    };
                    commands::account_update(config, a.id(), changes)
                        .await?
                        .print()
                }
                AccountSubcommand::Delete(a) => {
                    commands::account_delete(config, a.id()).await?.print()
                }
            }
        }

        Command::Tx(tx_args) => {
            let config = Config::load(home).await?;
            match tx_args.command() {
                TxSubcommand::Add(a) => {
                    let new = NewTransaction {
                        r#type: a.r#type(),
                        amount: a.amount().value(),
                        timestamp: a.at(),
                        description: a.description().map(str::to_string),
                        purchase: commands::purchase(
                            a.purchase_price().map(|p| p.value()),
                            a.purchase_unit(),
                        ),
                        icon: a.icon().map(str::to_string),
                    };
                    commands::tx_add(config, a.account(), new).await?.print()
                }
                TxSubcommand::Delete(a) => commands::tx_delete(config, a.account(), a.id())
                    .await?
                    .print(),
            }
        }

        Command::BaseUnit(base_args) => {
            let config = Config::load(home).await?;
            commands::base_unit(config, base_args.code()).await?.print()
        }

        Command::Convert(convert_args) => {
            let config = Config::load(home).await?;
            commands::convert(
                config,
                convert_args.amount().value(),
                convert_args.from(),
                convert_args.to(),
            )
            .await?
            .print()
        }

        Command::Summary(summary_args) => {
            let config = Config::load(home).await?;
            commands::summary(config, summary_args.format())
                .await?
                .print()
        }

        Command::Activity(activity_args) => {
            let config = Config::load(home).await?;
            commands::activity(config, activity_args.limit(), activity_args.format())
                .await?
                .print()
        }

        Command::Check => commands::check(Config::load(home).await?).await?.print(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
