//! # Command Line
//!
//! `cosmos-mgmt` runs the provisioning workflow, one stage or the full sequence.
//!
//! ## Usage
//!
//! ```bash
//! # Full run (also the default when stdin is not a terminal)
//! cosmos-mgmt run-full
//!
//! # Single stages
//! cosmos-mgmt create-account
//! cosmos-mgmt update-throughput --delta 500
//! cosmos-mgmt assign-cosmos-rbac
//!
//! # Irreversible: delete the account
//! cosmos-mgmt delete-account --confirm DELETE
//!
//! # Interactive menu (the default on a terminal)
//! cosmos-mgmt menu
//! ```

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use crate::config::{ConfigSources, Configuration, RuntimeOptions};
use crate::constants::DEFAULT_THROUGHPUT_DELTA;
use crate::error::WorkflowError;
use crate::identity::{build_credential, CredentialKind, PrincipalResolver};
use crate::observability::metrics;
use crate::provider::ArmClient;
use crate::workflow::{
    DeletionOutcome, DeletionPrompt, FixedAnswer, LinePrompt, Orchestrator, RunReport, Unattended,
};

pub mod menu;

/// Azure Cosmos DB provisioning workflow
#[derive(Debug, Parser)]
#[command(name = "cosmos-mgmt", version)]
#[command(
    about = "Idempotent Azure Cosmos DB provisioning over Azure Resource Manager",
    long_about = None,
    after_help = "\
Configuration is read from the environment (AZURE_SUBSCRIPTION_ID, AZURE_RESOURCE_GROUP, ...)
and from config.json, config.yaml or config.env in the working directory.

Examples:
  cosmos-mgmt run-full
  cosmos-mgmt update-throughput --delta 500
  cosmos-mgmt delete-account --confirm DELETE
"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (JSON, YAML or dotenv)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print Prometheus metrics to stdout before exiting
    #[arg(long, global = true)]
    pub print_metrics: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Run every stage in order
    RunFull,
    /// Create or update the Cosmos DB account
    CreateAccount,
    /// Grant the current principal "Cosmos DB Operator" on the account
    AssignAzureRbac,
    /// Create or update the SQL database
    CreateDb,
    /// Create or update the container
    CreateContainer,
    /// Add a delta to the container throughput
    UpdateThroughput {
        /// RU/s to add (may be negative)
        #[arg(long, allow_hyphen_values = true, default_value_t = DEFAULT_THROUGHPUT_DELTA)]
        delta: i64,
    },
    /// Grant the current principal the built-in Data Contributor role on the database
    AssignCosmosRbac,
    /// Create or update the custom "data contributor except delete" role and assign it
    /// to the current principal on the account
    CreateCustomRole,
    /// Delete the Cosmos DB account
    DeleteAccount {
        /// Must be exactly DELETE
        #[arg(long, value_name = "DELETE")]
        confirm: Option<String>,
    },
    /// Interactive menu
    Menu,
}

/// One workflow action, shared by subcommands and the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RunFull,
    CreateAccount,
    AssignAzureRbac,
    CreateDatabase,
    CreateContainer,
    UpdateThroughput(i64),
    AssignCosmosRbac,
    CreateCustomRole,
    DeleteAccount,
}

impl Action {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Action::RunFull => "run-full",
            Action::CreateAccount => "create-account",
            Action::AssignAzureRbac => "assign-azure-rbac",
            Action::CreateDatabase => "create-db",
            Action::CreateContainer => "create-container",
            Action::UpdateThroughput(_) => "update-throughput",
            Action::AssignCosmosRbac => "assign-cosmos-rbac",
            Action::CreateCustomRole => "create-custom-role",
            Action::DeleteAccount => "delete-account",
        }
    }
}

/// Run `action` and describe the result for the operator
///
/// Account creation and the Azure RBAC assignment run the pre-flight checks first. An
/// explicitly requested deletion counts as opted in; `prompt` still has to confirm it.
///
/// # Errors
/// The [`WorkflowError`] of the failing stage.
pub async fn perform(
    orchestrator: &Orchestrator,
    action: Action,
    prompt: &mut dyn DeletionPrompt,
) -> Result<String, WorkflowError> {
    let _active = orchestrator.begin_action();
    let summary = match action {
        Action::RunFull => describe_run(&orchestrator.run_full(prompt).await?),
        Action::CreateAccount => {
            orchestrator.preflight().await?;
            let account = orchestrator.upsert_account().await?;
            format!(
                "Account {} ready ({})",
                account.id,
                account.provisioning_state.as_deref().unwrap_or("unknown state")
            )
        }
        Action::AssignAzureRbac => {
            orchestrator.preflight().await?;
            let outcome = orchestrator.assign_control_plane_role().await?;
            match outcome.id() {
                Some(id) => format!("Azure RBAC assignment {}: {}", outcome.as_str(), id),
                None => format!("Azure RBAC assignment {}", outcome.as_str()),
            }
        }
        Action::CreateDatabase => {
            let database = orchestrator.upsert_database().await?;
            format!("Database ready: {}", database.id)
        }
        Action::CreateContainer => {
            let report = orchestrator.upsert_container().await?;
            if report.dropped_settings.is_empty() {
                format!("Container ready: {}", report.resource.id)
            } else {
                format!(
                    "Container ready: {} (without {})",
                    report.resource.id,
                    report.dropped_settings.join(", ")
                )
            }
        }
        Action::UpdateThroughput(delta) => {
            let report = orchestrator.adjust_throughput(delta).await?;
            format!("Throughput: {report}")
        }
        Action::AssignCosmosRbac => {
            let assignment = orchestrator.assign_data_plane_role().await?;
            format!(
                "Cosmos SQL role assignment {} at {}",
                assignment.id, assignment.scope
            )
        }
        Action::CreateCustomRole => {
            let definition = orchestrator.create_custom_role_definition().await?;
            let assignment = orchestrator.assign_custom_role(&definition).await?;
            format!(
                "Custom role {} ({}) with {} data actions, assigned as {} at {}",
                definition.name,
                definition.id,
                definition.data_actions.len(),
                assignment.id,
                assignment.scope
            )
        }
        Action::DeleteAccount => {
            orchestrator.delete_account(true, prompt).await?;
            format!("Account {} deleted", orchestrator.config().account_name)
        }
    };
    Ok(summary)
}

fn describe_run(report: &RunReport) -> String {
    let deletion = match &report.deletion {
        DeletionOutcome::NotRequested => "kept".to_string(),
        DeletionOutcome::Declined(reason) => format!("kept ({reason})"),
        DeletionOutcome::Deleted => "deleted".to_string(),
    };
    format!(
        "Full run complete\n  account:    {}\n  database:   {}\n  container:  {}\n  throughput: {}\n  data role:  {}\n  deletion:   {}",
        report.account.id,
        report.database.id,
        report.container.resource.id,
        report.throughput,
        report.data_plane_role.id,
        deletion
    )
}

fn report_failure(action: Action, error: &WorkflowError) {
    if error.is_user_cancellation() {
        warn!("{} not completed: {}", action.as_str(), error);
    } else {
        error!("{} failed: {}", action.as_str(), error);
    }
    if let Some(guidance) = error.guidance() {
        eprintln!("{guidance}");
    }
}

/// Build the orchestrator for this process
///
/// # Errors
/// [`WorkflowError::Configuration`] is returned inside `Ok(Err(..))` so the caller can
/// map it to its exit code; credential and HTTP client failures are `Err`.
fn build_orchestrator(cli: &Cli) -> Result<Result<Orchestrator, WorkflowError>> {
    let working_dir = std::env::current_dir().context("Failed to read working directory")?;
    let sources = match ConfigSources::discover(cli.config.as_deref(), &working_dir) {
        Ok(sources) => sources,
        Err(e) => return Ok(Err(e.into())),
    };
    let config = match Configuration::resolve(&sources) {
        Ok(config) => config,
        Err(e) => return Ok(Err(e.into())),
    };

    let options = RuntimeOptions::from_lookup(|key| sources.env(key).map(str::to_string));
    let kind = CredentialKind::detect(options.pact_mode, |key| {
        sources.env(key).map(str::to_string)
    });
    let credential = build_credential(kind)?;
    let client = ArmClient::from_options(&options, Arc::clone(&credential))?;
    let principal = PrincipalResolver::new(credential, options.principal_object_id.clone());

    info!(
        "Target: subscription {}, resource group {}, account {}",
        config.subscription_id, config.resource_group_name, config.account_name
    );
    Ok(Ok(Orchestrator::new(
        Arc::new(config),
        Arc::new(client),
        principal,
        options,
    )))
}

/// Run the parsed command line; returns the process exit code
///
/// # Errors
/// Returns an error for failures outside the workflow (credential construction, I/O).
pub async fn execute(cli: Cli) -> Result<i32> {
    metrics::register_metrics()?;

    let orchestrator = match build_orchestrator(&cli)? {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            error!("{}", e);
            return Ok(e.exit_code());
        }
    };

    let cancelled = orchestrator.cancellation_flag();
    let active = orchestrator.activity_flag();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if !active.load(Ordering::SeqCst) || cancelled.swap(true, Ordering::SeqCst) {
                warn!("Interrupt received; exiting");
                std::process::exit(WorkflowError::Cancelled.exit_code());
            }
            warn!("Interrupt received; stopping before the next stage (Ctrl-C again exits now)");
        }
    });

    let command = match cli.command.clone() {
        Some(command) => command,
        None if std::io::stdin().is_terminal() => Commands::Menu,
        None => Commands::RunFull,
    };

    let (action, mut prompt): (Action, Box<dyn DeletionPrompt>) = match command {
        Commands::Menu => {
            let mut menu = menu::Menu::new(
                std::io::BufReader::new(std::io::stdin()),
                std::io::stdout(),
            );
            menu.run(&orchestrator)
                .await
                .context("Interactive menu failed")?;
            print_metrics(cli.print_metrics)?;
            return Ok(0);
        }
        Commands::RunFull => (Action::RunFull, Box::new(Unattended)),
        Commands::CreateAccount => (Action::CreateAccount, Box::new(Unattended)),
        Commands::AssignAzureRbac => (Action::AssignAzureRbac, Box::new(Unattended)),
        Commands::CreateDb => (Action::CreateDatabase, Box::new(Unattended)),
        Commands::CreateContainer => (Action::CreateContainer, Box::new(Unattended)),
        Commands::UpdateThroughput { delta } => (Action::UpdateThroughput(delta), Box::new(Unattended)),
        Commands::AssignCosmosRbac => (Action::AssignCosmosRbac, Box::new(Unattended)),
        Commands::CreateCustomRole => (Action::CreateCustomRole, Box::new(Unattended)),
        Commands::DeleteAccount { confirm: Some(answer) } => {
            (Action::DeleteAccount, Box::new(FixedAnswer(answer)))
        }
        Commands::DeleteAccount { confirm: None } => (
            Action::DeleteAccount,
            Box::new(LinePrompt::new(
                std::io::BufReader::new(std::io::stdin()),
                std::io::stdout(),
            )),
        ),
    };

    let code = match perform(&orchestrator, action, prompt.as_mut()).await {
        Ok(summary) => {
            println!("{summary}");
            0
        }
        Err(e) => {
            report_failure(action, &e);
            e.exit_code()
        }
    };

    print_metrics(cli.print_metrics)?;
    Ok(code)
}

fn print_metrics(enabled: bool) -> Result<()> {
    if enabled {
        print!("{}", metrics::gather_text()?);
    }
    Ok(())
}
