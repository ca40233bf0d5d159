//! These structs provide the CLI interface for the taxhelper CLI.

use crate::model::{
    BusinessCategory, BusinessSector, ExpenseCategory, LineItem, Period, ProfileUpdate, Vnd,
};
use crate::tax::corporate::CorporateSector;
use crate::tax::ecommerce::RateKind;
use crate::tax::pit::{Dependent, PitRegime};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// taxhelper: A command-line guide to the Vietnamese 2025-2026 tax changes.
///
/// Estimate personal income tax under the 2025 and 2026 rules, work out which household business
/// group you fall in and what you owe, keep a local ledger of revenue and expense invoices, check
/// what an e-commerce platform withheld, and export the 01/CNKD declaration as XML.
///
/// Amounts are in Vietnamese dong and can be written as 50000000, 50.000.000 or 50,000,000.
///
/// The AI assistant (chat and invoice scanning) needs an API key for the Generative Language API
/// in the environment variable named in config.json, GEMINI_API_KEY by default.
#[derive(Debug, Parser, Clone)]
#[command(name = "taxhelper", version)]
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
    /// Create the data directory, the configuration file and the local database.
    ///
    /// This is the first command you should run. The data lives in --home, which defaults to
    /// $HOME/tax-helper. Commands that only calculate work without it; everything that keeps
    /// records (revenue, expenses, profile, the HKD setup) needs it.
    Init,
    /// Personal income tax: estimate, compare 2025 with 2026, check dependents.
    Pit(PitArgs),
    /// Household business (HKD): group setup, dashboard, quotes and the declaration.
    Hkd(HkdArgs),
    /// Record, list and export revenue transactions.
    Revenue(RevenueArgs),
    /// Record, scan and list expense (input) invoices.
    Expense(ExpenseArgs),
    /// Check the tax an e-commerce platform withheld against what you actually owe.
    Ecommerce(EcommerceArgs),
    /// Corporate income tax: estimates and sector incentives.
    Corporate(CorporateArgs),
    /// One-line calculators for common taxes.
    Quick(QuickArgs),
    /// Show or update the taxpayer profile used to fill in the declaration.
    Profile(ProfileArgs),
    /// Ask the AI tax assistant. Without --message an interactive session reads from stdin.
    Chat(ChatArgs),
    /// Show the timeline of the 2025-2026 tax changes and what to do at each step.
    Roadmap,
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

    /// The directory where the tax helper's data and configuration is held. Defaults to
    /// ~/tax-helper
    #[arg(long, env = "TAX_HELPER_HOME", default_value_t = default_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

// ---------------------------------------------------------------------------------------------
// pit
// ---------------------------------------------------------------------------------------------

/// (Not shown): Args for the `taxhelper pit` command.
#[derive(Debug, Parser, Clone)]
pub struct PitArgs {
    #[command(subcommand)]
    command: PitSubcommand,
}

impl PitArgs {
    pub fn command(&self) -> &PitSubcommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum PitSubcommand {
    /// Monthly tax on a salary under one year's rules.
    Calc(PitCalcArgs),
    /// Monthly tax on a salary under both the 2025 and the 2026 rules.
    Compare(PitCompareArgs),
    /// Check whether dependents qualify for the deduction.
    Dependents(DependentsArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct PitCalcArgs {
    /// Gross monthly income, after social insurance.
    #[arg(long)]
    income: Vnd,

    /// Number of registered dependents.
    #[arg(long, default_value_t = 0)]
    dependents: u32,

    /// Which year's deductions and brackets to use.
    #[arg(long, value_enum, default_value_t = PitRegime::Y2026)]
    year: PitRegime,
}

impl PitCalcArgs {
    pub fn new(income: Vnd, dependents: u32, year: PitRegime) -> Self {
        Self {
            income,
            dependents,
            year,
        }
    }

    pub fn income(&self) -> Vnd {
        self.income
    }

    pub fn dependents(&self) -> u32 {
        self.dependents
    }

    pub fn year(&self) -> PitRegime {
        self.year
    }
}

#[derive(Debug, Parser, Clone)]
pub struct PitCompareArgs {
    /// Gross monthly income, after social insurance.
    #[arg(long)]
    income: Vnd,

    /// Number of registered dependents.
    #[arg(long, default_value_t = 0)]
    dependents: u32,
}

impl PitCompareArgs {
    pub fn new(income: Vnd, dependents: u32) -> Self {
        Self { income, dependents }
    }

    pub fn income(&self) -> Vnd {
        self.income
    }

    pub fn dependents(&self) -> u32 {
        self.dependents
    }
}

#[derive(Debug, Parser, Clone)]
pub struct DependentsArgs {
    /// A dependent as Name=MonthlyIncome, e.g. --dependent "Mẹ=4.000.000". Repeat for each one.
    #[arg(long = "dependent", required = true)]
    dependents: Vec<Dependent>,
}

impl DependentsArgs {
    pub fn new(dependents: Vec<Dependent>) -> Self {
        Self { dependents }
    }

    pub fn dependents(&self) -> &[Dependent] {
        &self.dependents
    }
}

// ---------------------------------------------------------------------------------------------
// hkd
// ---------------------------------------------------------------------------------------------

/// (Not shown): Args for the `taxhelper hkd` command.
#[derive(Debug, Parser, Clone)]
pub struct HkdArgs {
    #[command(subcommand)]
    command: HkdSubcommand,
}

impl HkdArgs {
    pub fn command(&self) -> &HkdSubcommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum HkdSubcommand {
    /// Determine your group from the revenue you expect this year and your main business line.
    Setup(HkdSetupArgs),
    /// The dashboard for your group: threshold progress, period summary and warnings.
    Status(PeriodArgs),
    /// VAT and PIT on an amount of revenue in one business category.
    Quote(HkdQuoteArgs),
    /// Forget the group and sector chosen during setup.
    Reset,
    /// Aggregate the period's revenue into the 01/CNKD declaration.
    Declare(DeclareArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct HkdSetupArgs {
    /// The revenue you expect for the whole year.
    #[arg(long)]
    revenue: Vnd,

    /// Your main business line.
    #[arg(long, value_enum)]
    category: Option<BusinessCategory>,
}

impl HkdSetupArgs {
    pub fn new(revenue: Vnd, category: Option<BusinessCategory>) -> Self {
        Self { revenue, category }
    }

    pub fn revenue(&self) -> Vnd {
        self.revenue
    }

    pub fn category(&self) -> Option<BusinessCategory> {
        self.category
    }
}

#[derive(Debug, Parser, Clone)]
pub struct HkdQuoteArgs {
    #[arg(long)]
    revenue: Vnd,

    #[arg(long, value_enum, default_value_t)]
    category: BusinessCategory,
}

impl HkdQuoteArgs {
    pub fn new(revenue: Vnd, category: BusinessCategory) -> Self {
        Self { revenue, category }
    }

    pub fn revenue(&self) -> Vnd {
        self.revenue
    }

    pub fn category(&self) -> BusinessCategory {
        self.category
    }
}

/// Selects a reporting period.
#[derive(Debug, Parser, Clone, Default)]
pub struct PeriodArgs {
    /// YYYY-MM-DD for a day, YYYY-MM for a month or YYYY for a year. Defaults depend on the
    /// command.
    #[arg(long)]
    period: Option<Period>,
}

impl PeriodArgs {
    pub fn new(period: Option<Period>) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Option<Period> {
        self.period
    }
}

#[derive(Debug, Parser, Clone, Default)]
pub struct DeclareArgs {
    /// The declaration period, YYYY-MM or YYYY. Defaults to the current month.
    #[arg(long)]
    period: Option<Period>,

    /// Also write the declaration as 01/CNKD XML.
    #[arg(long)]
    xml: bool,

    /// Where to write the XML. Defaults to the exports directory.
    #[arg(long, requires = "xml")]
    out: Option<PathBuf>,
}

impl DeclareArgs {
    pub fn new(period: Option<Period>, xml: bool, out: Option<PathBuf>) -> Self {
        Self { period, xml, out }
    }

    pub fn period(&self) -> Option<Period> {
        self.period
    }

    pub fn xml(&self) -> bool {
        self.xml
    }

    pub fn out(&self) -> Option<&Path> {
        self.out.as_deref()
    }
}

// ---------------------------------------------------------------------------------------------
// revenue
// ---------------------------------------------------------------------------------------------

/// (Not shown): Args for the `taxhelper revenue` command.
#[derive(Debug, Parser, Clone)]
pub struct RevenueArgs {
    #[command(subcommand)]
    command: RevenueSubcommand,
}

impl RevenueArgs {
    pub fn command(&self) -> &RevenueSubcommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum RevenueSubcommand {
    /// Record a sale.
    Add(RevenueAddArgs),
    /// List recorded sales, newest first.
    List(PeriodArgs),
    /// Write the whole ledger as CSV.
    Export(OutArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct RevenueAddArgs {
    #[arg(long)]
    amount: Vnd,

    #[arg(long, value_enum, default_value_t)]
    category: BusinessCategory,

    /// Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Defaults to "Doanh thu" followed by the category name.
    #[arg(long)]
    description: Option<String>,
}

impl RevenueAddArgs {
    pub fn new(
        amount: Vnd,
        category: BusinessCategory,
        date: Option<NaiveDate>,
        description: Option<String>,
    ) -> Self {
        Self {
            amount,
            category,
            date,
            description,
        }
    }

    pub fn amount(&self) -> Vnd {
        self.amount
    }

    pub fn category(&self) -> BusinessCategory {
        self.category
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// An optional output file.
#[derive(Debug, Parser, Clone, Default)]
pub struct OutArgs {
    /// Where to write the file. Defaults to the exports directory.
    #[arg(long)]
    out: Option<PathBuf>,
}

impl OutArgs {
    pub fn new(out: Option<PathBuf>) -> Self {
        Self { out }
    }

    pub fn out(&self) -> Option<&Path> {
        self.out.as_deref()
    }
}

// ---------------------------------------------------------------------------------------------
// expense
// ---------------------------------------------------------------------------------------------

/// (Not shown): Args for the `taxhelper expense` command.
#[derive(Debug, Parser, Clone)]
pub struct ExpenseArgs {
    #[command(subcommand)]
    command: ExpenseSubcommand,
}

impl ExpenseArgs {
    pub fn command(&self) -> &ExpenseSubcommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ExpenseSubcommand {
    /// Record an expense invoice by hand.
    Add(ExpenseAddArgs),
    /// Read an invoice photo with the AI assistant and record it.
    Scan(ExpenseScanArgs),
    /// List recorded expense invoices, newest first.
    List(PeriodArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct ExpenseAddArgs {
    /// The supplier's name.
    #[arg(long)]
    supplier: String,

    /// The supplier's tax code.
    #[arg(long)]
    tax_code: Option<String>,

    /// The invoice date. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long, value_enum, default_value_t)]
    category: ExpenseCategory,

    #[arg(long)]
    description: Option<String>,

    /// A line item as name:quantity:unit_price, e.g. --item "Gạo:2:150000". Repeat for each line.
    #[arg(long = "item", required = true)]
    items: Vec<LineItem>,
}

impl ExpenseAddArgs {
    pub fn new(supplier: impl Into<String>, items: Vec<LineItem>) -> Self {
        Self {
            supplier: supplier.into(),
            tax_code: None,
            date: None,
            category: ExpenseCategory::default(),
            description: None,
            items,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_category(mut self, category: ExpenseCategory) -> Self {
        self.category = category;
        self
    }

    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    pub fn tax_code(&self) -> Option<&str> {
        self.tax_code.as_deref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn category(&self) -> ExpenseCategory {
        self.category
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }
}

#[derive(Debug, Parser, Clone)]
pub struct ExpenseScanArgs {
    /// A photo of the invoice (jpg, png, webp or heic).
    #[arg(long)]
    image: PathBuf,

    #[arg(long, value_enum, default_value_t)]
    category: ExpenseCategory,
}

impl ExpenseScanArgs {
    pub fn new(image: impl Into<PathBuf>, category: ExpenseCategory) -> Self {
        Self {
            image: image.into(),
            category,
        }
    }

    pub fn image(&self) -> &Path {
        &self.image
    }

    pub fn category(&self) -> ExpenseCategory {
        self.category
    }
}

// ---------------------------------------------------------------------------------------------
// ecommerce
// ---------------------------------------------------------------------------------------------

/// (Not shown): Args for the `taxhelper ecommerce` command.
#[derive(Debug, Parser, Clone)]
pub struct EcommerceArgs {
    #[command(subcommand)]
    command: EcommerceSubcommand,
}

impl EcommerceArgs {
    pub fn command(&self) -> &EcommerceSubcommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum EcommerceSubcommand {
    /// Reconcile a platform sales report with columns OrderID,Revenue,Status.
    Reconcile(ReconcileArgs),
    /// Write a sample sales report to start from.
    Sample(OutArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct ReconcileArgs {
    /// The CSV sales report exported from the platform.
    #[arg(long)]
    file: PathBuf,

    /// Whether you sell goods or services.
    #[arg(long, value_enum, default_value_t)]
    kind: RateKind,
}

impl ReconcileArgs {
    pub fn new(file: impl Into<PathBuf>, kind: RateKind) -> Self {
        Self {
            file: file.into(),
            kind,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn kind(&self) -> RateKind {
        self.kind
    }
}

// ---------------------------------------------------------------------------------------------
// corporate
// ---------------------------------------------------------------------------------------------

/// (Not shown): Args for the `taxhelper corporate` command.
#[derive(Debug, Parser, Clone)]
pub struct CorporateArgs {
    #[command(subcommand)]
    command: CorporateSubcommand,
}

impl CorporateArgs {
    pub fn command(&self) -> &CorporateSubcommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum CorporateSubcommand {
    /// Estimate corporate income tax for a year.
    Estimate(CorporateEstimateArgs),
    /// List the sectors with preferential treatment and their conditions.
    Incentives,
}

#[derive(Debug, Parser, Clone)]
pub struct CorporateEstimateArgs {
    #[arg(long)]
    revenue: Vnd,

    /// Deductible expenses for the year.
    #[arg(long)]
    expenses: Vnd,

    #[arg(long, value_enum, default_value_t)]
    sector: CorporateSector,

    /// Which year of taxable income this is, counting from 1, to apply exemptions and reductions.
    #[arg(long)]
    year_of_income: Option<u32>,
}

impl CorporateEstimateArgs {
    pub fn new(
        revenue: Vnd,
        expenses: Vnd,
        sector: CorporateSector,
        year_of_income: Option<u32>,
    ) -> Self {
        Self {
            revenue,
            expenses,
            sector,
            year_of_income,
        }
    }

    pub fn revenue(&self) -> Vnd {
        self.revenue
    }

    pub fn expenses(&self) -> Vnd {
        self.expenses
    }

    pub fn sector(&self) -> CorporateSector {
        self.sector
    }

    pub fn year_of_income(&self) -> Option<u32> {
        self.year_of_income
    }
}

// ---------------------------------------------------------------------------------------------
// quick
// ---------------------------------------------------------------------------------------------

/// (Not shown): Args for the `taxhelper quick` command.
#[derive(Debug, Parser, Clone)]
pub struct QuickArgs {
    #[command(subcommand)]
    calculator: QuickSubcommand,
}

impl QuickArgs {
    pub fn new(calculator: QuickSubcommand) -> Self {
        Self { calculator }
    }

    pub fn calculator(&self) -> &QuickSubcommand {
        &self.calculator
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum QuickSubcommand {
    /// VAT and PIT for an individual business.
    Business {
        #[arg(long)]
        revenue: Vnd,
        #[arg(long, value_enum, default_value_t)]
        category: BusinessCategory,
    },
    /// VAT and PIT on rental income.
    Rental {
        #[arg(long)]
        income: Vnd,
    },
    /// PIT on dividends.
    Dividends {
        #[arg(long)]
        income: Vnd,
    },
    /// PIT on selling listed securities.
    Securities {
        #[arg(long)]
        sale_price: Vnd,
    },
    /// Proposed tax on selling digital assets.
    Crypto {
        #[arg(long)]
        sale_price: Vnd,
    },
    /// PIT on transferring a capital contribution.
    Capital {
        #[arg(long)]
        sale_price: Vnd,
        #[arg(long)]
        cost_price: Vnd,
    },
    /// Registration fee on real estate.
    RealEstate {
        /// The price on the government land price table.
        #[arg(long)]
        government_price: Vnd,
    },
}

// ---------------------------------------------------------------------------------------------
// profile
// ---------------------------------------------------------------------------------------------

/// (Not shown): Args for the `taxhelper profile` command.
#[derive(Debug, Parser, Clone)]
pub struct ProfileArgs {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

impl ProfileArgs {
    pub fn command(&self) -> &ProfileSubcommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProfileSubcommand {
    Show,
    /// Update the given fields and leave the rest alone.
    Set(ProfileSetArgs),
}

#[derive(Debug, Parser, Clone, Default)]
pub struct ProfileSetArgs {
    /// Mã số thuế.
    #[arg(long)]
    tax_code: Option<String>,

    /// Số định danh cá nhân (CCCD). Pass an empty value to clear it.
    #[arg(long)]
    personal_id: Option<String>,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    address: Option<String>,

    #[arg(long)]
    district: Option<String>,

    #[arg(long)]
    city: Option<String>,

    #[arg(long)]
    phone: Option<String>,

    #[arg(long)]
    email: Option<String>,

    /// The tax department you file with.
    #[arg(long)]
    tax_department: Option<String>,

    #[arg(long, value_enum)]
    hkd_sector: Option<BusinessSector>,
}

impl ProfileSetArgs {
    pub fn update(&self) -> ProfileUpdate {
        ProfileUpdate {
            tax_code: self.tax_code.clone(),
            personal_id: self.personal_id.clone(),
            name: self.name.clone(),
            address: self.address.clone(),
            district: self.district.clone(),
            city: self.city.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            tax_department: self.tax_department.clone(),
            hkd_sector: self.hkd_sector,
        }
    }
}

// ---------------------------------------------------------------------------------------------
// chat
// ---------------------------------------------------------------------------------------------

/// (Not shown): Args for the `taxhelper chat` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ChatArgs {
    /// Ask a single question and exit.
    #[arg(long, short)]
    message: Option<String>,
}

impl ChatArgs {
    pub fn new(message: Option<String>) -> Self {
        Self { message }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("tax-helper"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or TAX_HELPER_HOME instead of relying on the default \
                directory. If you continue using the program right now, you may have problems!",
            );
            PathBuf::from("tax-helper")
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
