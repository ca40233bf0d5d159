use clap::Parser;
use std::process::ExitCode;
use tax_helper::args::{
    Args, ChatArgs, Command, CorporateSubcommand, EcommerceSubcommand, ExpenseSubcommand,
    HkdSubcommand, PitSubcommand, ProfileSubcommand, RevenueSubcommand,
};
use tax_helper::{api, commands, Config, Mode, Result};
use tokio::io::BufReader;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    // When TAX_HELPER_IN_TEST_MODE is set and non-empty the AI assistant answers with canned
    // responses instead of calling the Generative Language API.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Pit(pit_args) => match pit_args.command() {
            PitSubcommand::Calc(a) => commands::pit_calc(a).await?.print(),
            PitSubcommand::Compare(a) => commands::pit_compare(a).await?.print(),
            PitSubcommand::Dependents(a) => commands::pit_dependents(a).await?.print(),
        },

        Command::Hkd(hkd_args) => match hkd_args.command() {
            HkdSubcommand::Quote(a) => commands::hkd_quote(a).await?.print(),
            HkdSubcommand::Setup(a) => {
                let config = Config::load(home).await?;
                commands::hkd_setup(&config, a).await?.print()
            }
            HkdSubcommand::Status(a) => {
                let config = Config::load(home).await?;
                commands::hkd_status(&config, a).await?.print()
            }
            HkdSubcommand::Reset => {
                let config = Config::load(home).await?;
                commands::hkd_reset(&config).await?.print()
            }
            HkdSubcommand::Declare(a) => {
                let config = Config::load(home).await?;
                commands::hkd_declare(&config, a).await?.print()
            }
        },

        Command::Revenue(revenue_args) => {
            let config = Config::load(home).await?;
            match revenue_args.command() {
                RevenueSubcommand::Add(a) => commands::revenue_add(&config, a).await?.print(),
                RevenueSubcommand::List(a) => commands::revenue_list(&config, a).await?.print(),
                RevenueSubcommand::Export(a) => {
                    commands::revenue_export(&config, a).await?.print()
                }
            }
        }

        Command::Expense(expense_args) => {
            let config = Config::load(home).await?;
            match expense_args.command() {
                ExpenseSubcommand::Add(a) => commands::expense_add(&config, a).await?.print(),
                ExpenseSubcommand::Scan(a) => {
                    let assistant = api::assistant(&config, mode);
                    commands::expense_scan(&config, assistant.as_ref(), a)
                        .await?
                        .print()
                }
                ExpenseSubcommand::List(a) => commands::expense_list(&config, a).await?.print(),
            }
        }

        Command::Ecommerce(ecommerce_args) => match ecommerce_args.command() {
            EcommerceSubcommand::Reconcile(a) => commands::ecommerce_reconcile(a).await?.print(),
            EcommerceSubcommand::Sample(a) => {
                let config = Config::load(home).await?;
                commands::ecommerce_sample(&config, a).await?.print()
            }
        },

        Command::Corporate(corporate_args) => match corporate_args.command() {
            CorporateSubcommand::Estimate(a) => commands::corporate_estimate(a).await?.print(),
            CorporateSubcommand::Incentives => commands::corporate_incentives().await?.print(),
        },

        Command::Quick(quick_args) => commands::quick(quick_args).await?.print(),

        Command::Profile(profile_args) => {
            let config = Config::load(home).await?;
            match profile_args.command() {
                ProfileSubcommand::Show => commands::profile_show(&config).await?.print(),
                ProfileSubcommand::Set(a) => commands::profile_set(&config, a).await?.print(),
            }
        }

        Command::Chat(chat_args) => {
            let config = Config::load(home).await?;
            chat(&config, mode, chat_args).await?
        }

        Command::Roadmap => commands::roadmap().await?.print(),
    };
    Ok(())
}

/// Replies stream to stdout while they arrive. The session summary goes to the log like any other
/// command output.
async fn chat(config: &Config, mode: Mode, args: &ChatArgs) -> Result<()> {
    let assistant = api::assistant(config, mode);
    let mut stdout = std::io::stdout();
    let out = match args.message() {
        Some(message) => commands::chat(assistant.as_ref(), message, &mut stdout).await?,
        None => {
            let stdin = BufReader::new(tokio::io::stdin());
            commands::chat_session(assistant.as_ref(), stdin, &mut stdout).await?
        }
    };
    out.print();
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
            // RUST_LOG does not exist; use default log level for the library and binary only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level,
                env!("CARGO_CRATE_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
