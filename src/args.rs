//! These structs provide the CLI interface for the wealth CLI.

use crate::commands::OutputFormat;
use crate::model::{Amount, TransactionType};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// wealth: Track accounts held in many currencies and assets, and see your total wealth in one
/// base unit.
///
/// Define the units you hold (currencies, crypto, gold, anything), the exchange rates between
/// them, and accounts that record deposits and withdrawals. Totals are converted to your base unit
/// using direct rates, inverse rates, or a bridge through a single pivot unit.
///
/// All data is kept in a JSON file in the home directory, with rotating backups.
#[derive(Debug, Parser, Clone)]
#[command(version)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory, the config file and a data file seeded with default units and
    /// rates.
    ///
    /// This is the first command you should run. By default, the home directory is
    /// $HOME/wealthflow. Pass --wealth-home or set WEALTH_HOME to put it somewhere else.
    Init(InitArgs),
    /// List, add, update or delete units (currencies and assets).
    Unit(UnitArgs),
    /// List, add, update or delete exchange rates.
    Rate(RateArgs),
    /// List, show, add, update or delete accounts.
    Account(AccountArgs),
    /// Add or delete transactions within an account.
    Tx(TxArgs),
    /// Show the base unit, or set it when a code is given.
    BaseUnit(BaseUnitArgs),
    /// Convert an amount between two units and show the path that was used.
    Convert(ConvertArgs),
    /// Show total wealth, total profit/loss, per-account values and the deposit distribution.
    Summary(SummaryArgs),
    /// Show recent transactions across all accounts, newest first.
    Activity(ActivityArgs),
    /// Report dangling unit references and duplicate rates in the data file.
    Check,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where wealthflow data and configuration is held. Defaults to ~/wealthflow
    #[arg(long, env = "WEALTH_HOME", default_value_t = default_wealth_home())]
    wealth_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, wealth_home: PathBuf) -> Self {
        Self {
            log_level,
            wealth_home: wealth_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn wealth_home(&self) -> &DisplayPath {
        &self.wealth_home
    }
}

/// Args for the `wealth init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The unit totals are shown in. Must be one of the default units: USD, EUR, GBP, BTC.
    #[arg(long)]
    base_unit: Option<String>,
}

impl InitArgs {
    pub fn base_unit(&self) -> Option<&str> {
        self.base_unit.as_deref()
    }
}

// -------------------------------------------------------------------------------------------------
// Units
// -------------------------------------------------------------------------------------------------

/// Args for the `wealth unit` command.
#[derive(Debug, Parser, Clone)]
pub struct UnitArgs {
    #[command(subcommand)]
    command: UnitSubcommand,
}

impl UnitArgs {
    pub fn command(&self) -> &UnitSubcommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum UnitSubcommand {
    /// List all units.
    List,
    /// Add a unit.
    Add(UnitAddArgs),
    /// Change the name or symbol of a unit. The code cannot be changed.
    Update(UnitUpdateArgs),
    /// Delete a unit and every exchange rate that references it.
    Delete(CodeArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct UnitAddArgs {
    /// The unique code, e.g. IRT or GOLD. Stored upper-case.
    code: String,
    /// The display name, e.g. "Iranian Toman".
    name: String,
    /// The display symbol, e.g. "T".
    symbol: String,
}

impl UnitAddArgs {
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

#[derive(Debug, Parser, Clone)]
pub struct UnitUpdateArgs {
    /// The code of the unit to change.
    code: String,
    /// A new display name.
    #[arg(long)]
    name: Option<String>,
    /// A new display symbol.
    #[arg(long)]
    symbol: Option<String>,
}

impl UnitUpdateArgs {
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }
}

#[derive(Debug, Parser, Clone)]
pub struct CodeArgs {
    /// The unit code.
    code: String,
}

impl CodeArgs {
    pub fn code(&self) -> &str {
        &self.code
    }
}

// -------------------------------------------------------------------------------------------------
// Exchange rates
// -------------------------------------------------------------------------------------------------

/// Args for the `wealth rate` command.
#[derive(Debug, Parser, Clone)]
pub struct RateArgs {
    #[command(subcommand)]
    command: RateSubcommand,
}

impl RateArgs {
    pub fn command(&self) -> &RateSubcommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum RateSubcommand {
    /// List all exchange rates.
    List,
    /// Add a rate: one FROM is worth VALUE TO. Only one rate may exist per pair of units, in
    /// either direction.
    Add(RateAddArgs),
    /// Change the value of a rate.
    Update(RateUpdateArgs),
    /// Delete a rate.
    Delete(IdArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct RateAddArgs {
    /// The unit being priced.
    from: String,
    /// The unit the price is expressed in.
    to: String,
    /// How many TO one FROM is worth. Must be positive.
    value: Amount,
}

impl RateAddArgs {
    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn value(&self) -> Amount {
        self.value
    }
}

#[derive(Debug, Parser, Clone)]
pub struct RateUpdateArgs {
    /// The id of the rate, as shown by `wealth rate list`.
    id: u64,
    /// The new value. Must be positive.
    value: Amount,
}

impl RateUpdateArgs {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn value(&self) -> Amount {
        self.value
    }
}

#[derive(Debug, Parser, Clone)]
pub struct IdArgs {
    /// The id, as shown by the corresponding list command.
    id: u64,
}

impl IdArgs {
    pub fn id(&self) -> u64 {
        self.id
    }
}

// -------------------------------------------------------------------------------------------------
// Accounts
// -------------------------------------------------------------------------------------------------

/// Args for the `wealth account` command.
#[derive(Debug, Parser, Clone)]
pub struct AccountArgs {
    #[command(subcommand)]
    command: AccountSubcommand,
}

impl AccountArgs {
    pub fn command(&self) -> &AccountSubcommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum AccountSubcommand {
    /// List all accounts with their balances.
    List,
    /// Show an account, its values in the base unit and its transactions.
    Show(IdArgs),
    /// Add an account.
    Add(AccountAddArgs),
    /// Change the name, currency, icon or color of an account.
    Update(AccountUpdateArgs),
    /// Delete an account along with its transactions.
    Delete(IdArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct AccountAddArgs {
    /// The account name.
    name: String,
    /// The code of the unit the account is held in.
    currency: String,
    /// An icon, defaults to 💼.
    #[arg(long)]
    icon: Option<String>,
    /// A color, defaults to #8b79f7.
    #[arg(long)]
    color: Option<String>,
}

impl AccountAddArgs {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }
}

#[derive(Debug, Parser, Clone)]
pub struct AccountUpdateArgs {
    /// The id of the account.
    id: u64,
    /// A new name.
    #[arg(long)]
    name: Option<String>,
    /// A new currency (unit code).
    #[arg(long)]
    currency: Option<String>,
    /// A new icon.
    #[arg(long)]
    icon: Option<String>,
    /// A new color.
    #[arg(long)]
    color: Option<String>,
}

impl AccountUpdateArgs {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }
}

// -------------------------------------------------------------------------------------------------
// Transactions
// -------------------------------------------------------------------------------------------------

/// Args for the `wealth tx` command.
#[derive(Debug, Parser, Clone)]
pub struct TxArgs {
    #[command(subcommand)]
    command: TxSubcommand,
}

impl TxArgs {
    pub fn command(&self) -> &TxSubcommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum TxSubcommand {
    /// Record a deposit or withdrawal.
    Add(Box<TxAddArgs>),
    /// Delete a transaction.
    Delete(TxDeleteArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct TxAddArgs {
    /// The id of the account.
    account: u64,
    /// Either "deposit" or "withdrawal".
    r#type: TransactionType,
    /// The amount, in the account currency. Must be positive.
    amount: Amount,
    /// When the transaction happened, in RFC 3339 form, e.g. 2025-11-20T10:00:00Z. Defaults to
    /// now.
    #[arg(long)]
    at: Option<DateTime<Utc>>,
    /// A free-form description.
    #[arg(long)]
    description: Option<String>,
    /// Track the profit/loss of this transaction against what it cost.
    #[arg(long, requires = "purchase_unit")]
    purchase_price: Option<Amount>,
    /// The unit the purchase price is expressed in.
    #[arg(long, requires = "purchase_price")]
    purchase_unit: Option<String>,
    /// An icon for the transaction.
    #[arg(long)]
    icon: Option<String>,
}

impl TxAddArgs {
    pub fn account(&self) -> u64 {
        self.account
    }

    pub fn r#type(&self) -> TransactionType {
        self.r#type
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn at(&self) -> Option<DateTime<Utc>> {
        self.at
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn purchase_price(&self) -> Option<Amount> {
        self.purchase_price
    }

    pub fn purchase_unit(&self) -> Option<&str> {
        self.purchase_unit.as_deref()
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }
}

#[derive(Debug, Parser, Clone)]
pub struct TxDeleteArgs {
    /// The id of the account.
    account: u64,
    /// The id of the transaction within the account.
    id: u64,
}

impl TxDeleteArgs {
    pub fn account(&self) -> u64 {
        self.account
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

// -------------------------------------------------------------------------------------------------
// Settings and reports
// -------------------------------------------------------------------------------------------------

/// Args for the `wealth base-unit` command.
#[derive(Debug, Parser, Clone)]
pub struct BaseUnitArgs {
    /// The new base unit. When omitted, the current base unit is shown.
    code: Option<String>,
}

impl BaseUnitArgs {
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

/// Args for the `wealth convert` command.
#[derive(Debug, Parser, Clone)]
pub struct ConvertArgs {
    /// The amount to convert.
    #[arg(allow_negative_numbers = true)]
    amount: Amount,
    /// The unit of the amount.
    from: String,
    /// The unit to convert to.
    to: String,
}

impl ConvertArgs {
    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }
}

/// Args for the `wealth summary` command.
#[derive(Debug, Parser, Clone)]
pub struct SummaryArgs {
    /// How to print the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl SummaryArgs {
    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// Args for the `wealth activity` command.
#[derive(Debug, Parser, Clone)]
pub struct ActivityArgs {
    /// Show at most this many transactions.
    #[arg(long, default_value_t = 10)]
    limit: usize,

    /// Show every transaction, ignoring --limit.
    #[arg(long)]
    all: bool,

    /// How to print the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl ActivityArgs {
    pub fn limit(&self) -> Option<usize> {
        if self.all {
            None
        } else {
            Some(self.limit)
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

fn default_wealth_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("wealthflow"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --wealth-home or WEALTH_HOME instead of relying on the default \
                home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("wealthflow")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
