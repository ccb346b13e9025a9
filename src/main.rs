mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod utils;
mod view;

use clap::{Args, Parser, Subcommand};
use config::DatabaseConfig;
use db::department::DepartmentRepository;
use db::ConnectionProvider;
use dotenv::dotenv;
use errors::AppError;
use handlers::department::DepartmentController;
use log::{error, info, warn};
use std::process::ExitCode;
use utils::validation::DepartmentForm;
use view::session::Session;

/// Create, look up, update and delete department records.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    database: DatabaseConfig,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive department form (default).
    Form,
    /// Show every department.
    List {
        /// Print a JSON array instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Show one department's details.
    Show { code: String },
    /// Insert a department.
    Add(RecordArgs),
    /// Update a department's name, location and manager.
    Update {
        #[command(flatten)]
        record: RecordArgs,
        /// Do not ask for confirmation.
        #[arg(long, short)]
        yes: bool,
    },
    /// Delete a department.
    Delete {
        code: String,
        /// Do not ask for confirmation.
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args)]
struct RecordArgs {
    #[arg(long)]
    code: String,
    #[arg(long)]
    name: String,
    #[arg(long, allow_hyphen_values = true)]
    location: String,
    #[arg(long, allow_hyphen_values = true)]
    manager: String,
}

impl RecordArgs {
    fn to_form(&self) -> DepartmentForm {
        DepartmentForm::new(&self.code, &self.name, &self.location, &self.manager)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{}", err);
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool, AppError> {
    let url = cli.database.connection_url()?;
    info!("Using {} database", cli.database.driver);

    let mut provider = ConnectionProvider::new(url);
    if !cli.database.no_init_schema {
        if let Err(err) = provider.init_schema().await {
            warn!("Could not prepare the departments table: {}", err);
        }
    }

    let controller = DepartmentController::new(DepartmentRepository::new(provider));
    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout();

    let command = cli.command.unwrap_or(Commands::Form);
    let auto_confirm = matches!(
        command,
        Commands::Update { yes: true, .. } | Commands::Delete { yes: true, .. }
    );
    let mut session = Session::new(controller, stdin, stdout).with_auto_confirm(auto_confirm);

    let ok = match command {
        Commands::Form => {
            session.run().await?;
            return Ok(true);
        }
        Commands::List { json: true } => session.export_json().await?,
        Commands::List { json: false } => session.list().await?,
        Commands::Show { code } => session.search(Some(code.as_str())).await?.is_some(),
        Commands::Add(record) => {
            session.set_form(record.to_form());
            session.insert().await?
        }
        Commands::Update { record, .. } => {
            session.set_form(record.to_form());
            session.update().await?
        }
        Commands::Delete { code, .. } => {
            session.set_form(DepartmentForm::new(&code, "", "", ""));
            session.delete().await?
        }
    };

    session.shutdown().await;
    Ok(ok)
}
