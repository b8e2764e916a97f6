//! gatepass - command-line front end for the gatepass session library.
//!
//! Each invocation starts like an application would: the stored token is
//! checked against the backend, then the requested command runs against
//! the resulting session.

mod cli;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use gatepass_core::{AuthStatus, Config, Navigator, Redirect, RouteGuard, SessionStore};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{is_public_route, Command, USAGE};

/// Initialize the tracing subscriber for logging
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (writer, guard) = tracing_appender::non_blocking(io::stderr());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();

    guard
}

/// Terminal stand-in for the router: a redirect is reported, not followed.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, redirect: &Redirect) {
        match redirect.return_to {
            Some(ref from) => eprintln!("Redirecting to {} (from {})", redirect.to, from),
            None => eprintln!("Redirecting to {}", redirect.to),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = Config::load()?;
    let session = config.session_store()?;
    info!(base_url = %config.base_url, backend = ?config.token_backend, "gatepass starting");

    match command {
        Command::Status => status(&session).await,
        Command::Login { email } => login(&session, email).await,
        Command::Register { name, email } => register(&session, &name, &email).await,
        Command::Logout => {
            session.logout();
            println!("Logged out");
            Ok(())
        }
        Command::Open { route } => open(&session, &config, &route).await,
        Command::Help => Ok(()),
    }
}

async fn status(session: &SessionStore) -> Result<()> {
    session.check_auth_status().await;
    print_session(session);
    Ok(())
}

async fn login(session: &SessionStore, email: Option<String>) -> Result<()> {
    let email = match email.or_else(|| std::env::var("GATEPASS_EMAIL").ok()) {
        Some(email) => email,
        None => prompt_email()?,
    };
    let password = match std::env::var("GATEPASS_PASSWORD") {
        Ok(password) => password,
        Err(_) => prompt_password()?,
    };

    if email.is_empty() || password.is_empty() {
        return Err(anyhow!("Email and password required"));
    }

    session
        .login(&email, &password)
        .await
        .map_err(|e| anyhow!("Login failed: {}", e.message()))?;

    print_session(session);
    Ok(())
}

async fn register(session: &SessionStore, name: &str, email: &str) -> Result<()> {
    let password = prompt_password()?;
    if password.is_empty() {
        return Err(anyhow!("Password required"));
    }

    session
        .register(name, email, &password)
        .await
        .map_err(|e| anyhow!("Registration failed: {}", e.message()))?;

    println!("Account created for {}. Run `gatepass login {}` to sign in.", email, email);
    Ok(())
}

async fn open(session: &SessionStore, config: &Config, route: &str) -> Result<()> {
    let startup_check = session.start();

    if is_public_route(route, &config.login_route) {
        println!("Entered {}", route);
        return Ok(());
    }

    let guard = RouteGuard::new(session.clone(), Arc::new(TerminalNavigator))
        .with_login_route(config.login_route.clone());

    let allowed = guard.can_activate_when_resolved(route).await;
    startup_check.await.context("Startup token check panicked")?;

    if allowed {
        let name = session.current_user().map(|u| u.name).unwrap_or_default();
        println!("Entered {} as {}", route, name);
        Ok(())
    } else {
        Err(anyhow!("Access to {} denied", route))
    }
}

fn print_session(session: &SessionStore) {
    let snapshot = session.snapshot();
    println!("Status: {}", snapshot.status);
    if let (AuthStatus::Authenticated, Some(user)) = (snapshot.status, snapshot.user) {
        println!("User:   {} <{}>", user.name, user.email);
        if !user.roles.is_empty() {
            println!("Roles:  {}", user.roles.join(", "));
        }
    }
}

fn prompt_email() -> Result<String> {
    print!("Email: ");
    io::stdout().flush()?;

    let mut email = String::new();
    io::stdin().read_line(&mut email)?;
    Ok(email.trim().to_string())
}

fn prompt_password() -> Result<String> {
    let password = rpassword::prompt_password("Password: ")?;
    Ok(password)
}
