use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use forex::cli::convert::ConvertRequest;
use forex::cli::setup::setup;
use forex::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for forex::AppCommand {
    fn from(cmd: Commands) -> forex::AppCommand {
        match cmd {
            Commands::Serve => forex::AppCommand::Serve,
            Commands::Convert {
                from,
                to,
                amount,
                endpoint,
            } => forex::AppCommand::Convert(ConvertRequest {
                from,
                to,
                amount,
                endpoint,
            }),
            Commands::Currencies { base } => forex::AppCommand::Currencies { base },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Serve the home page and the conversion endpoint
    Serve,
    /// Submit the conversion form and print the result
    Convert {
        /// Currency to convert from
        #[arg(long)]
        from: String,
        /// Currency to convert to
        #[arg(long)]
        to: String,
        /// Amount as typed into the form
        #[arg(long, allow_hyphen_values = true)]
        amount: String,
        /// Conversion endpoint, overrides `form.endpoint`
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// List supported currencies with their rates
    Currencies {
        /// Currency the rates are quoted against
        #[arg(long, default_value = "USD")]
        base: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => forex::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
