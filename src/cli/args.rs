//! Command-line argument parsing for the vizchat CLI.

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// List sessions
    Sessions,
    /// Create a session
    New { title: Option<String> },
    Rename { session_id: String, title: String },
    Delete { session_id: String },
    /// Print a session's history
    Show { session_id: String },
    /// Send a message and stream the reply
    Ask { session_id: String, text: String },
    /// Arguments that could not be parsed, with the reason
    Invalid(String),
}

/// Global flags plus the command.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    /// `--api-url`, overriding `VIZCHAT_API_URL`
    pub api_url: Option<String>,
    pub command: CliCommand,
}

pub const USAGE: &str = "\
usage: vizchat [--api-url <url>] <command>

commands:
  sessions                 list sessions
  new [title]              create a session
  rename <id> <title>      rename a session
  delete <id>              delete a session
  show <id>                print a session's messages and charts
  ask <id> <text...>       send a message and stream the reply (Ctrl-C cancels)

flags:
  --api-url <url>          backend API root (default http://localhost:8000/api)
  -V, --version            print version
  -h, --help               print this help";

/// Parse command-line arguments (including the program name).
///
/// # Examples
///
/// ```
/// use vizchat::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["vizchat".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()).command, CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliArgs
where
    I: Iterator<Item = String>,
{
    let mut api_url = None;
    let mut positional = Vec::new();
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                return CliArgs {
                    api_url,
                    command: CliCommand::Version,
                }
            }
            "--help" | "-h" => {
                return CliArgs {
                    api_url,
                    command: CliCommand::Help,
                }
            }
            "--api-url" => match args.next() {
                Some(url) => api_url = Some(url),
                None => {
                    return CliArgs {
                        api_url,
                        command: CliCommand::Invalid("--api-url needs a value".to_string()),
                    }
                }
            },
            other if other.starts_with("--api-url=") => {
                api_url = Some(other["--api-url=".len()..].to_string());
            }
            _ => positional.push(arg),
        }
    }

    CliArgs {
        api_url,
        command: parse_command(positional),
    }
}

fn parse_command(positional: Vec<String>) -> CliCommand {
    let mut words = positional.into_iter();
    let Some(name) = words.next() else {
        return CliCommand::Help;
    };
    let rest: Vec<String> = words.collect();

    match name.as_str() {
        "sessions" | "ls" => CliCommand::Sessions,
        "new" => CliCommand::New {
            title: Some(rest.join(" ")).filter(|t| !t.trim().is_empty()),
        },
        "rename" => match split_id(rest) {
            Some((session_id, title)) => CliCommand::Rename { session_id, title },
            None => CliCommand::Invalid("usage: vizchat rename <id> <title>".to_string()),
        },
        "delete" | "rm" => match rest.as_slice() {
            [id] => CliCommand::Delete {
                session_id: id.clone(),
            },
            _ => CliCommand::Invalid("usage: vizchat delete <id>".to_string()),
        },
        "show" => match rest.as_slice() {
            [id] => CliCommand::Show {
                session_id: id.clone(),
            },
            _ => CliCommand::Invalid("usage: vizchat show <id>".to_string()),
        },
        "ask" => match split_id(rest) {
            Some((session_id, text)) => CliCommand::Ask { session_id, text },
            None => CliCommand::Invalid("usage: vizchat ask <id> <text...>".to_string()),
        },
        other => CliCommand::Invalid(format!("unknown command '{}'", other)),
    }
}

/// First word as an id, the remaining words joined as text.
fn split_id(words: Vec<String>) -> Option<(String, String)> {
    let mut words = words.into_iter();
    let id = words.next()?;
    let text = words.collect::<Vec<_>>().join(" ");
    if text.trim().is_empty() {
        None
    } else {
        Some((id, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        let mut full = vec!["vizchat".to_string()];
        full.extend(args.iter().map(|a| a.to_string()));
        parse_args(full.into_iter())
    }

    #[test]
    fn test_parse_version_flags() {
        assert_eq!(parse(&["--version"]).command, CliCommand::Version);
        assert_eq!(parse(&["-V"]).command, CliCommand::Version);
    }

    #[test]
    fn test_parse_no_args_is_help() {
        assert_eq!(parse(&[]).command, CliCommand::Help);
        assert_eq!(parse(&["-h"]).command, CliCommand::Help);
    }

    #[test]
    fn test_parse_api_url() {
        let args = parse(&["--api-url", "http://remote/api", "sessions"]);
        assert_eq!(args.api_url.as_deref(), Some("http://remote/api"));
        assert_eq!(args.command, CliCommand::Sessions);

        let args = parse(&["sessions", "--api-url=http://x/api"]);
        assert_eq!(args.api_url.as_deref(), Some("http://x/api"));

        assert!(matches!(
            parse(&["--api-url"]).command,
            CliCommand::Invalid(_)
        ));
    }

    #[test]
    fn test_parse_new() {
        assert_eq!(parse(&["new"]).command, CliCommand::New { title: None });
        assert_eq!(
            parse(&["new", "销售", "分析"]).command,
            CliCommand::New {
                title: Some("销售 分析".to_string())
            }
        );
    }

    #[test]
    fn test_parse_rename_and_delete() {
        assert_eq!(
            parse(&["rename", "s1", "Q1", "report"]).command,
            CliCommand::Rename {
                session_id: "s1".to_string(),
                title: "Q1 report".to_string()
            }
        );
        assert!(matches!(parse(&["rename", "s1"]).command, CliCommand::Invalid(_)));
        assert_eq!(
            parse(&["delete", "s1"]).command,
            CliCommand::Delete {
                session_id: "s1".to_string()
            }
        );
        assert!(matches!(parse(&["delete"]).command, CliCommand::Invalid(_)));
    }

    #[test]
    fn test_parse_ask_joins_text() {
        assert_eq!(
            parse(&["ask", "s1", "各部门", "销售额"]).command,
            CliCommand::Ask {
                session_id: "s1".to_string(),
                text: "各部门 销售额".to_string()
            }
        );
        assert!(matches!(parse(&["ask", "s1"]).command, CliCommand::Invalid(_)));
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            parse(&["frobnicate"]).command,
            CliCommand::Invalid("unknown command 'frobnicate'".to_string())
        );
    }
}
