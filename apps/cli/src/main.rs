use std::{
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    AuthForm, AuthMode, DocumentService, ExportFormat, ExportTarget, SessionStore,
    SimplifierClient,
};
use shared::domain::{Language, SimplificationLevel};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod controller;
mod ui;

use config::Settings;
use controller::{AppController, Screen, StepOutcome};
use ui::render::Renderer;

const RENDER_WIDTH: usize = 100;

#[derive(Parser, Debug)]
#[command(name = "legal-simplifier", version, about = "Simplify and translate legal documents")]
struct Cli {
    /// Backend base URL.
    #[arg(long, global = true)]
    api_base: Option<String>,
    /// Where the session token is kept.
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,
    /// TOML config file (defaults to ./legal-simplifier.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    no_color: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with email and password.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and sign in.
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    Logout,
    /// Show the stored session.
    Status,
    Whoami,
    /// Check that the backend answers.
    Ping,
    /// Extract, simplify and optionally translate and export one document.
    Process(ProcessArgs),
    /// Interactive session (default).
    Shell,
}

#[derive(Args, Debug)]
struct ProcessArgs {
    file: PathBuf,
    #[arg(long, default_value_t = SimplificationLevel::Simple)]
    level: SimplificationLevel,
    #[arg(long)]
    language: Option<Language>,
    /// Export the latest output into this directory.
    #[arg(long)]
    export_dir: Option<PathBuf>,
    /// Export format; implies export into the configured directory.
    #[arg(long)]
    format: Option<ExportFormat>,
    #[arg(long)]
    compare: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = config::load_settings(cli.config.as_deref())?;
    settings.apply_cli(
        cli.api_base.as_deref(),
        cli.session_file.as_deref(),
        cli.no_color,
    )?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_ansi(settings.color)
        .init();
    info!(api_base = %settings.api_base, "starting");

    let client = SimplifierClient::new(settings.api_base.clone())
        .with_auth_timeout(settings.auth_timeout());
    let store = match &settings.session_file {
        Some(path) => SessionStore::open(path),
        None => {
            warn!("no config directory found; session will not be persisted");
            SessionStore::in_memory()
        }
    };
    let mut controller = AppController::new(client, store);
    let renderer = Renderer::new(settings.color, RENDER_WIDTH);

    match cli.command.unwrap_or(Command::Shell) {
        Command::Login { email, password } => {
            let password = password_or_prompt(password).await?;
            authenticate(&mut controller, AuthMode::Login, AuthForm::login(email, password))
                .await?;
        }
        Command::Signup {
            name,
            email,
            password,
        } => {
            let password = password_or_prompt(password).await?;
            authenticate(
                &mut controller,
                AuthMode::Register,
                AuthForm::register(name, email, password),
            )
            .await?;
        }
        Command::Logout => {
            controller.logout()?;
            println!("Signed out.");
        }
        Command::Status => print_status(&controller, &settings),
        Command::Whoami => {
            let profile = controller.whoami().await?;
            println!("{} <{}> (user {})", profile.name, profile.email, profile.id);
        }
        Command::Ping => {
            let info = controller.ping().await?;
            println!("{} ({})", info.message, settings.api_base);
        }
        Command::Process(args) => process(&mut controller, args, &settings, &renderer).await?,
        Command::Shell => ui::shell::run(&mut controller, &settings).await?,
    }

    Ok(())
}

async fn authenticate<S: DocumentService>(
    controller: &mut AppController<S>,
    mode: AuthMode,
    form: AuthForm,
) -> Result<()> {
    if controller.screen() == Screen::Workflow {
        controller.logout()?;
    }
    controller.set_auth_mode(mode);
    controller.submit_auth(&form).await?;
    if let Some(session) = controller.session() {
        println!("Signed in as user {}.", session.user_id());
    }
    Ok(())
}

async fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    print!("Password: ");
    io::stdout().flush().context("failed to flush stdout")?;
    let line = BufReader::new(tokio::io::stdin())
        .lines()
        .next_line()
        .await
        .context("failed to read password")?;
    Ok(line.unwrap_or_default().trim_end_matches(['\r', '\n']).to_string())
}

fn print_status<S: DocumentService>(controller: &AppController<S>, settings: &Settings) {
    println!("API base: {}", settings.api_base);
    match controller.store().path() {
        Some(path) => println!("Session file: {}", path.display()),
        None => println!("Session file: (not persisted)"),
    }
    match controller.session() {
        Some(session) => {
            println!("Signed in as user {}", session.user_id());
            println!("Since: {}", session.created_at().format("%Y-%m-%d %H:%M UTC"));
            if let Some(expires_at) = session.expires_at() {
                println!("Token expires: {}", expires_at.format("%Y-%m-%d %H:%M UTC"));
            }
        }
        None => println!("Not signed in"),
    }
}

async fn process<S: DocumentService>(
    controller: &mut AppController<S>,
    args: ProcessArgs,
    settings: &Settings,
    renderer: &Renderer,
) -> Result<()> {
    if controller.screen() != Screen::Workflow {
        bail!("not signed in; run `legal-simplifier login` first");
    }
    controller.workflow_mut().set_level(args.level);
    controller.workflow_mut().set_language(args.language);

    completed(controller.upload(&args.file).await)?;
    completed(controller.simplify().await)?;
    if args.language.is_some() {
        completed(controller.translate().await)?;
    }
    if args.compare {
        controller.workflow_mut().toggle_compare_view();
    }

    if let Some(session) = controller.session() {
        println!("{}", renderer.header(session));
    }
    print!("{}", renderer.workflow(controller.workflow()));

    if args.export_dir.is_some() || args.format.is_some() {
        let dir = args
            .export_dir
            .unwrap_or_else(|| settings.export_dir.clone());
        let path = export_latest(controller, args.format.unwrap_or_default(), &dir)?;
        println!("Saved {}", path.display());
    }
    Ok(())
}

/// Exports the translation when there is one, the simplification otherwise.
fn export_latest<S: DocumentService>(
    controller: &AppController<S>,
    format: ExportFormat,
    dir: &Path,
) -> Result<PathBuf> {
    let target = if controller.workflow().translated_text().is_some() {
        ExportTarget::Translated
    } else {
        ExportTarget::Simplified
    };
    Ok(controller.export(target, format, dir)?)
}

fn completed(outcome: StepOutcome) -> Result<()> {
    match outcome {
        StepOutcome::Completed => Ok(()),
        StepOutcome::Skipped(reason) => bail!("{reason}"),
        StepOutcome::SignedOut => {
            bail!("session expired; run `legal-simplifier login` again")
        }
        StepOutcome::Failed(err) => Err(err.into()),
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
