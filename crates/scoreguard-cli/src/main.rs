//! Scoreguard CLI
//!
//! Terminal client for the citizen, bank and admin portals.
//!
//! # Usage
//! ```bash
//! scoreguard login --portal citizen --email citizen@test.com
//! scoreguard citizen sample
//! scoreguard bank score --applicant APP-001 --csv statement.csv
//! scoreguard admin audit --role bank --limit 20
//! ```

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use scoreguard_client::{
    AdminApi, ApiClient, ApiError, AuditQuery, AuthApi, BankApi, BatchApplicant, CitizenApi,
    LoginFlow, StatementData, Transaction,
};
use scoreguard_core::{AppConfig, FileStore, Navigation, Role, RouteGuard, SessionStore};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

mod gauge;
mod output;
mod telemetry;

/// Scoreguard - credit scores for citizens, banks and administrators
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (.toml or .json)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Scoring service base URL, e.g. http://127.0.0.1:5000/api
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Where the session is persisted
    #[arg(long, value_name = "FILE", global = true)]
    session_file: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in through one portal's login form
    Login {
        /// Portal to sign in to
        #[arg(long, default_value = "citizen")]
        portal: Role,

        #[arg(long)]
        email: String,

        #[arg(long, env = "SCOREGUARD_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Drop the current session
    Logout,

    /// Show the current session
    Whoami,

    /// Ask the service whether the stored token is still valid
    Verify,

    /// Show where navigating to a path would lead
    Open { path: String },

    /// Citizen portal
    #[command(subcommand)]
    Citizen(CitizenCommand),

    /// Bank portal
    #[command(subcommand)]
    Bank(BankCommand),

    /// Admin portal
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct StatementArgs {
    /// CSV bank statement, sent verbatim
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// JSON array of transactions
    #[arg(long, value_name = "FILE")]
    transactions: Option<PathBuf>,
}

#[derive(Args)]
struct GaugeArgs {
    /// Print the final gauge frame only
    #[arg(long)]
    no_animate: bool,
}

#[derive(Subcommand)]
enum CitizenCommand {
    /// Score your own bank statement
    Score {
        #[command(flatten)]
        statement: StatementArgs,

        #[command(flatten)]
        gauge: GaugeArgs,
    },

    /// Score the built-in sample statement
    Sample {
        #[command(flatten)]
        gauge: GaugeArgs,
    },
}

#[derive(Subcommand)]
enum BankCommand {
    /// Assess one applicant
    Score {
        #[arg(long)]
        applicant: String,

        #[command(flatten)]
        statement: StatementArgs,
    },

    /// Assess several applicants from a JSON file
    Batch { file: PathBuf },

    /// Show the decision thresholds
    Thresholds,
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Browse the audit log
    Audit {
        #[arg(long)]
        limit: Option<u32>,

        #[arg(long)]
        offset: Option<u32>,

        #[arg(long)]
        user: Option<String>,

        #[arg(long)]
        role: Option<Role>,

        #[arg(long)]
        action: Option<String>,
    },

    /// Usage statistics
    Stats,

    /// Known accounts
    Users,

    /// Service health
    Health,

    /// Dump the full audit log as JSON
    Export,
}

impl Commands {
    fn portal(&self) -> Option<Role> {
        match self {
            Commands::Citizen(_) => Some(Role::Citizen),
            Commands::Bank(_) => Some(Role::Bank),
            Commands::Admin(_) => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Configuration file, then environment, then flags
fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    }
    .merge_env()?;

    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url.clone());
    }
    if let Some(path) = &cli.session_file {
        config = config.with_session_path(path.clone());
    }
    config.validate()?;
    Ok(config)
}

fn read_statement(args: &StatementArgs) -> anyhow::Result<StatementData> {
    match (&args.csv, &args.transactions) {
        (Some(path), _) => Ok(StatementData::Csv(std::fs::read_to_string(path)?)),
        (None, Some(path)) => {
            let transactions: Vec<Transaction> = serde_json::from_str(&std::fs::read_to_string(path)?)?;
            Ok(StatementData::Transactions(transactions))
        }
        (None, None) => anyhow::bail!("either --csv or --transactions is required"),
    }
}

/// Batch files hold either a bare array or `{"applicants": [...]}`
fn read_batch(path: &Path) -> anyhow::Result<Vec<BatchApplicant>> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum BatchFile {
        Bare(Vec<BatchApplicant>),
        Wrapped { applicants: Vec<BatchApplicant> },
    }

    let file: BatchFile = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    Ok(match file {
        BatchFile::Bare(applicants) | BatchFile::Wrapped { applicants } => applicants,
    })
}

/// Print an API failure; an expired session also points at the login page
fn report(err: &ApiError) -> ExitCode {
    eprintln!("{} {}", "error:".red().bold(), err);
    if let Some(path) = err.redirect() {
        eprintln!("  → {}", path);
    }
    ExitCode::FAILURE
}

struct App {
    config: AppConfig,
    session: Arc<SessionStore>,
    client: Arc<ApiClient>,
}

impl App {
    fn new(config: AppConfig) -> anyhow::Result<Self> {
        let store = FileStore::new(&config.session.path);
        let session = Arc::new(SessionStore::restored(Arc::new(store)));
        let client = Arc::new(ApiClient::from_settings(&config.api, session.clone())?);
        Ok(Self {
            config,
            session,
            client,
        })
    }

    /// Route guard for a portal; `Err` carries the exit code of a redirect
    fn enter(&self, portal: Role) -> Result<(), ExitCode> {
        match RouteGuard::navigate_with(&self.session, &portal.home()) {
            Navigation::Render(_) => Ok(()),
            Navigation::Redirect(to) => {
                let reason = match self.session.role() {
                    Some(role) => format!("signed in to the {} portal", role),
                    None => "not signed in".to_string(),
                };
                eprintln!(
                    "{} {} ({})",
                    "redirect:".yellow().bold(),
                    to,
                    reason
                );
                Err(ExitCode::from(2))
            }
        }
    }

    async fn run(&self, command: Commands) -> anyhow::Result<ExitCode> {
        if let Some(portal) = command.portal() {
            if let Err(code) = self.enter(portal) {
                return Ok(code);
            }
        }

        let outcome = match command {
            Commands::Login {
                portal,
                email,
                password,
            } => self.login(portal, &email, &password).await,
            Commands::Logout => {
                let flow = LoginFlow::new(self.client.clone(), self.session.clone());
                let nav = flow.logout();
                println!("Signed out, {}", nav.path());
                Ok(())
            }
            Commands::Whoami => {
                output::session(self.session.current().as_ref());
                Ok(())
            }
            Commands::Verify => self.client.verify().await.map(|v| {
                if v.valid {
                    println!("{}", "Token is valid".green());
                } else {
                    println!("{}", "Token is not valid".yellow());
                }
            }),
            Commands::Open { path } => {
                let current = self.session.current();
                let nav = RouteGuard::navigate(current.as_ref(), &path);
                output::navigation(&nav, &RouteGuard::resolve(current.as_ref(), &path));
                Ok(())
            }
            Commands::Citizen(cmd) => self.citizen(cmd).await?,
            Commands::Bank(cmd) => self.bank(cmd).await?,
            Commands::Admin(cmd) => self.admin(cmd).await,
        };

        Ok(match outcome {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => report(&e),
        })
    }

    async fn login(&self, portal: Role, email: &str, password: &str) -> scoreguard_client::Result<()> {
        let flow = LoginFlow::new(self.client.clone(), self.session.clone());
        if let Navigation::Redirect(home) = flow.open(portal) {
            println!("Already signed in, continuing at {}", home);
            return Ok(());
        }

        let home = flow.submit(portal, email, password).await?;
        output::session(self.session.current().as_ref());
        println!("→ {}", home.path());
        Ok(())
    }

    async fn citizen(&self, cmd: CitizenCommand) -> anyhow::Result<scoreguard_client::Result<()>> {
        let (result, gauge) = match cmd {
            CitizenCommand::Score { statement, gauge } => {
                let data = read_statement(&statement)?;
                (self.client.citizen_score(&data).await, gauge)
            }
            CitizenCommand::Sample { gauge } => {
                (self.client.citizen_sample_analysis().await, gauge)
            }
        };

        let result = match result {
            Ok(result) => result,
            Err(e) => return Ok(Err(e)),
        };

        let outcome = gauge::render(&result, &self.config.animation, !gauge.no_animate).await;
        if outcome == gauge::Outcome::Settled {
            output::score_details(&result);
        }
        Ok(Ok(()))
    }

    async fn bank(&self, cmd: BankCommand) -> anyhow::Result<scoreguard_client::Result<()>> {
        Ok(match cmd {
            BankCommand::Score {
                applicant,
                statement,
            } => {
                let data = read_statement(&statement)?;
                self.client
                    .bank_score(&applicant, &data)
                    .await
                    .map(|a| output::bank_assessment(&a))
            }
            BankCommand::Batch { file } => {
                let applicants = read_batch(&file)?;
                self.client
                    .bank_batch(&applicants)
                    .await
                    .map(|b| output::batch(&b))
            }
            BankCommand::Thresholds => self
                .client
                .bank_thresholds()
                .await
                .map(|t| output::thresholds(&t)),
        })
    }

    async fn admin(&self, cmd: AdminCommand) -> scoreguard_client::Result<()> {
        match cmd {
            AdminCommand::Audit {
                limit,
                offset,
                user,
                role,
                action,
            } => {
                let query = AuditQuery {
                    limit,
                    offset,
                    user,
                    role,
                    action,
                };
                self.client.audit_logs(&query).await.map(|p| output::audit(&p))
            }
            AdminCommand::Stats => self.client.stats().await.map(|s| output::stats(&s)),
            AdminCommand::Users => self.client.users().await.map(|u| output::users(&u)),
            AdminCommand::Health => self.client.health().await.map(|h| output::health(&h)),
            AdminCommand::Export => {
                let page = self.client.export_audit().await?;
                match serde_json::to_string_pretty(&page) {
                    Ok(json) => println!("{}", json),
                    Err(e) => return Err(ApiError::Decode(e.to_string())),
                }
                Ok(())
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    telemetry::init(cli.verbose, &config.log_level)?;

    tracing::debug!("Using API at {}", config.api.base_url);
    let app = App::new(config)?;
    app.run(cli.command).await
}
