//! Interactive screen loop.

use std::{
    io::{self, Write as _},
    path::PathBuf,
};

use anyhow::Context;
use client_core::{AuthForm, AuthMode, DocumentService, ExportFormat, ExportTarget};
use shared::domain::{Language, SimplificationLevel};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::{
    config::Settings,
    controller::{AppController, Screen, StepOutcome},
    ui::render::Renderer,
};

const HELP: &str = "\
Auth screen:
  login <email> <password>               sign in
  signup <email> <password> <full name>  create an account
  mode                                   switch between login and sign up
Workflow screen:
  upload <file>                          extract text from a document
  level <simple|moderate|advanced>       choose the simplification level
  simplify                               simplify the extracted text
  language <name|none>                   choose the translation language
  translate                              translate the simplified text
  export <simplified|translated> [txt|docx] [dir]
  compare                                toggle the side-by-side view
  show                                   redraw the current screen
  legend                                 list the risk categories
  whoami                                 show the signed-in account
  logout                                 sign out
Anywhere:
  ping                                   check the backend is reachable
  help, quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Login {
        email: String,
        password: String,
    },
    Signup {
        email: String,
        password: String,
        name: String,
    },
    Mode,
    Upload(PathBuf),
    Level(SimplificationLevel),
    Language(Option<Language>),
    Simplify,
    Translate,
    Export {
        target: ExportTarget,
        format: ExportFormat,
        dir: Option<PathBuf>,
    },
    Compare,
    Show,
    Legend,
    Whoami,
    Ping,
    Logout,
    Quit,
}

impl ShellCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Login { .. } => "login",
            Self::Signup { .. } => "signup",
            Self::Mode => "mode",
            Self::Upload(_) => "upload",
            Self::Level(_) => "level",
            Self::Language(_) => "language",
            Self::Simplify => "simplify",
            Self::Translate => "translate",
            Self::Export { .. } => "export",
            Self::Compare => "compare",
            Self::Show => "show",
            Self::Legend => "legend",
            Self::Whoami => "whoami",
            Self::Ping => "ping",
            Self::Logout => "logout",
            Self::Quit => "quit",
        }
    }

    fn screen(&self) -> Option<Screen> {
        match self {
            Self::Login { .. } | Self::Signup { .. } | Self::Mode => Some(Screen::Auth),
            Self::Upload(_)
            | Self::Level(_)
            | Self::Language(_)
            | Self::Simplify
            | Self::Translate
            | Self::Export { .. }
            | Self::Compare
            | Self::Whoami
            | Self::Logout => Some(Screen::Workflow),
            Self::Help | Self::Show | Self::Legend | Self::Ping | Self::Quit => None,
        }
    }
}

pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err("empty command".into());
    };
    let rest: Vec<&str> = words.collect();

    let command = match head.to_ascii_lowercase().as_str() {
        "help" | "?" => ShellCommand::Help,
        "login" => match rest.as_slice() {
            [email, password] => ShellCommand::Login {
                email: email.to_string(),
                password: password.to_string(),
            },
            _ => return Err("usage: login <email> <password>".into()),
        },
        "signup" => match rest.as_slice() {
            [email, password, name @ ..] if !name.is_empty() => ShellCommand::Signup {
                email: email.to_string(),
                password: password.to_string(),
                name: name.join(" "),
            },
            _ => return Err("usage: signup <email> <password> <full name>".into()),
        },
        "mode" => ShellCommand::Mode,
        "upload" => {
            if rest.is_empty() {
                return Err("usage: upload <file>".into());
            }
            ShellCommand::Upload(PathBuf::from(remainder(line, 1)))
        }
        "level" => match rest.as_slice() {
            [level] => ShellCommand::Level(level.parse().map_err(|e| format!("{e}"))?),
            _ => return Err("usage: level <simple|moderate|advanced>".into()),
        },
        "language" | "lang" => match rest.as_slice() {
            [name] if name.eq_ignore_ascii_case("none") => ShellCommand::Language(None),
            [name] => ShellCommand::Language(Some(name.parse().map_err(|e| format!("{e}"))?)),
            _ => return Err("usage: language <name|none>".into()),
        },
        "simplify" => ShellCommand::Simplify,
        "translate" => ShellCommand::Translate,
        "export" => {
            let (target, options) = rest
                .split_first()
                .ok_or("usage: export <simplified|translated> [txt|docx] [dir]")?;
            let target: ExportTarget = target.parse().map_err(|e| format!("{e}"))?;
            let (format, dir) = match options {
                [] => (ExportFormat::default(), None),
                [format] => (format.parse().map_err(|e| format!("{e}"))?, None),
                [format, ..] => (
                    format.parse().map_err(|e| format!("{e}"))?,
                    Some(PathBuf::from(remainder(line, 3))),
                ),
            };
            ShellCommand::Export {
                target,
                format,
                dir,
            }
        }
        "compare" => ShellCommand::Compare,
        "show" => ShellCommand::Show,
        "legend" => ShellCommand::Legend,
        "whoami" => ShellCommand::Whoami,
        "ping" => ShellCommand::Ping,
        "logout" => ShellCommand::Logout,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(command)
}

/// The input after its first `words` words, inner spacing kept.
fn remainder(line: &str, words: usize) -> &str {
    let mut rest = line.trim_start();
    for _ in 0..words {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        rest = rest[end..].trim_start();
    }
    rest.trim_end()
}

pub async fn run<S: DocumentService>(
    controller: &mut AppController<S>,
    settings: &Settings,
) -> anyhow::Result<()> {
    let renderer = Renderer::new(settings.color, terminal_width());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_screen(controller, &renderer);

    loop {
        print!("{}", prompt(controller));
        io::stdout().flush().context("failed to flush stdout")?;
        let Some(line) = lines.next_line().await.context("failed to read input")? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        debug!(command = command.name(), "shell command");
        if command == ShellCommand::Quit {
            break;
        }
        execute(controller, command, settings, &renderer).await;
    }
    Ok(())
}

fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(columns, _)| usize::from(columns))
        .unwrap_or(100)
}

fn prompt<S: DocumentService>(controller: &AppController<S>) -> String {
    match controller.screen() {
        Screen::Auth => format!("{}> ", controller.auth_mode().title().to_lowercase()),
        Screen::Workflow => "upload> ".to_string(),
    }
}

fn print_screen<S: DocumentService>(controller: &AppController<S>, renderer: &Renderer) {
    match controller.screen() {
        Screen::Auth => print!(
            "{}",
            renderer.auth_screen(controller.auth_mode(), controller.auth_error())
        ),
        Screen::Workflow => {
            if let Some(session) = controller.session() {
                println!("{}", renderer.header(session));
            }
            print!("{}", renderer.workflow(controller.workflow()));
        }
    }
}

async fn execute<S: DocumentService>(
    controller: &mut AppController<S>,
    command: ShellCommand,
    settings: &Settings,
    renderer: &Renderer,
) {
    match (command.screen(), controller.screen()) {
        (Some(Screen::Workflow), Screen::Auth) => {
            println!("Please log in first.");
            return;
        }
        (Some(Screen::Auth), Screen::Workflow) => {
            println!("Already signed in; use 'logout' first.");
            return;
        }
        _ => {}
    }

    match command {
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Login { email, password } => {
            controller.set_auth_mode(AuthMode::Login);
            submit(controller, AuthForm::login(email, password), renderer).await;
        }
        ShellCommand::Signup {
            email,
            password,
            name,
        } => {
            controller.set_auth_mode(AuthMode::Register);
            submit(controller, AuthForm::register(name, email, password), renderer).await;
        }
        ShellCommand::Mode => {
            controller.toggle_auth_mode();
            print_screen(controller, renderer);
        }
        ShellCommand::Upload(path) => {
            let outcome = controller.upload(&path).await;
            report(controller, outcome, renderer);
        }
        ShellCommand::Level(level) => {
            controller.workflow_mut().set_level(level);
            println!("Simplification level: {level}");
        }
        ShellCommand::Language(language) => {
            controller.workflow_mut().set_language(language);
            match language {
                Some(language) => println!("Translate to: {language}"),
                None => println!("No translation language selected."),
            }
        }
        ShellCommand::Simplify => {
            let outcome = controller.simplify().await;
            report(controller, outcome, renderer);
        }
        ShellCommand::Translate => {
            let outcome = controller.translate().await;
            report(controller, outcome, renderer);
        }
        ShellCommand::Export {
            target,
            format,
            dir,
        } => {
            let dir = dir.unwrap_or_else(|| settings.export_dir.clone());
            match controller.export(target, format, &dir) {
                Ok(path) => println!("Saved {}", path.display()),
                Err(err) => println!("{err}"),
            }
        }
        ShellCommand::Compare => {
            let on = controller.workflow_mut().toggle_compare_view();
            if on {
                print!("{}", renderer.compare(controller.workflow()));
            } else {
                println!("Compare view off.");
            }
        }
        ShellCommand::Show => print_screen(controller, renderer),
        ShellCommand::Legend => println!("{}", renderer.legend()),
        ShellCommand::Whoami => match controller.whoami().await {
            Ok(profile) => println!("{} <{}> (user {})", profile.name, profile.email, profile.id),
            Err(err) => {
                println!("{err}");
                if err.requires_reauth() {
                    println!("Please log in again.");
                    print_screen(controller, renderer);
                }
            }
        },
        ShellCommand::Ping => match controller.ping().await {
            Ok(info) => println!("{}", info.message),
            Err(err) => println!("{err}"),
        },
        ShellCommand::Logout => {
            if let Err(err) = controller.logout() {
                println!("{err}");
            }
            print_screen(controller, renderer);
        }
        ShellCommand::Quit => {}
    }
}

async fn submit<S: DocumentService>(
    controller: &mut AppController<S>,
    form: AuthForm,
    renderer: &Renderer,
) {
    match controller.submit_auth(&form).await {
        Ok(()) => print_screen(controller, renderer),
        Err(err) => println!("{err}"),
    }
}

fn report<S: DocumentService>(
    controller: &AppController<S>,
    outcome: StepOutcome,
    renderer: &Renderer,
) {
    match outcome {
        StepOutcome::Completed => print_screen(controller, renderer),
        StepOutcome::Skipped(reason) => println!("Nothing to do: {reason}"),
        StepOutcome::SignedOut => {
            println!("Your session has expired. Please log in again.");
            print_screen(controller, renderer);
        }
        StepOutcome::Failed(err) => println!("{err}"),
    }
}
