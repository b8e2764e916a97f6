//! Command-line parsing for the `gatepass` binary.

use anyhow::{anyhow, Result};

/// Routes that never require a session, besides the configured login route
pub const PUBLIC_ROUTES: &[&str] = &["/auth/login", "/auth/register"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    Login { email: Option<String> },
    Register { name: String, email: String },
    Logout,
    Open { route: String },
    Help,
}

impl Command {
    /// Parse the arguments after the program name
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut args = args.iter().map(String::as_str);
        let command = match args.next() {
            None | Some("help" | "--help" | "-h") => Command::Help,
            Some("status") => Command::Status,
            Some("logout") => Command::Logout,
            Some("login") => Command::Login {
                email: args.next().map(str::to_string),
            },
            Some("register") => match (args.next(), args.next()) {
                (Some(name), Some(email)) => Command::Register {
                    name: name.to_string(),
                    email: email.to_string(),
                },
                _ => return Err(anyhow!("register needs <name> <email>")),
            },
            Some("open") => match args.next() {
                Some(route) => Command::Open {
                    route: normalize_route(route),
                },
                None => return Err(anyhow!("open needs a <route>")),
            },
            Some(other) => return Err(anyhow!("Unknown command: {}", other)),
        };

        if let Some(extra) = args.next() {
            return Err(anyhow!("Unexpected argument: {}", extra));
        }
        Ok(command)
    }
}

fn normalize_route(route: &str) -> String {
    let trimmed = route.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// The login route is always public, even when configured away from the default.
pub fn is_public_route(route: &str, login_route: &str) -> bool {
    route == normalize_route(login_route) || PUBLIC_ROUTES.contains(&route)
}

pub const USAGE: &str = "\
Usage: gatepass <command>

Commands:
  status                   Check the stored token and show the session
  login [email]            Log in (prompts for anything missing)
  register <name> <email>  Create an account (does not log in)
  logout                   Forget the stored token
  open <route>             Navigate to a route through the auth guard
  help                     Show this message

Environment:
  GATEPASS_BASE_URL, GATEPASS_LOGIN_ROUTE, GATEPASS_TIMEOUT_SECS,
  GATEPASS_TOKEN_BACKEND (file|keyring|memory), GATEPASS_EMAIL,
  GATEPASS_PASSWORD, RUST_LOG";

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        Command::parse(&args)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse(&[]).unwrap(), Command::Help);
        assert_eq!(parse(&["status"]).unwrap(), Command::Status);
        assert_eq!(parse(&["logout"]).unwrap(), Command::Logout);
        assert_eq!(parse(&["login"]).unwrap(), Command::Login { email: None });
        assert_eq!(
            parse(&["login", "a@b.com"]).unwrap(),
            Command::Login {
                email: Some("a@b.com".to_string())
            }
        );
        assert_eq!(
            parse(&["register", "Ana", "a@b.com"]).unwrap(),
            Command::Register {
                name: "Ana".to_string(),
                email: "a@b.com".to_string()
            }
        );
    }

    #[test]
    fn test_parse_open_normalizes_route() {
        assert_eq!(
            parse(&["open", "dashboard/"]).unwrap(),
            Command::Open {
                route: "/dashboard".to_string()
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse(&["register", "Ana"]).is_err());
        assert!(parse(&["open"]).is_err());
        assert!(parse(&["frobnicate"]).is_err());
        assert!(parse(&["status", "extra"]).is_err());
    }

    #[test]
    fn test_public_routes() {
        assert!(is_public_route("/auth/login", "/auth/login"));
        assert!(is_public_route("/auth/register", "/auth/login"));
        assert!(!is_public_route("/dashboard", "/auth/login"));
    }

    #[test]
    fn test_configured_login_route_is_public() {
        assert!(is_public_route("/signin", "/signin"));
        assert!(is_public_route("/signin", "signin/"));
        assert!(!is_public_route("/signin", "/auth/login"));
    }
}
