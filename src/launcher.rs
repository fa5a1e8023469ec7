//! Process launcher
//!
//! Expands environment placeholders, splits the argument string and spawns
//! the command without waiting for it. URLs are handed to the desktop opener.

use crate::config::Action;
use crate::error::{LauncherError, LauncherResult};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use tracing::{debug, info};

lazy_static! {
    /// `%VAR%`, `${VAR}` or `$VAR`
    static ref ENV_VAR: Regex =
        Regex::new(r"%([A-Za-z_][A-Za-z0-9_]*)%|\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
            .expect("static regex");
    static ref URL_SCHEME: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("static regex");
}

/// Default program used to open URLs
pub const DEFAULT_OPENER: &str = "xdg-open";

/// Everything the launcher needs from an action, before expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub command: String,
    pub arguments: String,
    pub working_directory: String,
    pub visible: bool,
}

impl From<&Action> for LaunchRequest {
    fn from(action: &Action) -> Self {
        Self {
            command: action.command.clone(),
            arguments: action.arguments.clone(),
            working_directory: action.working_directory.clone(),
            visible: action.visible,
        }
    }
}

/// Trait for process launch backends
pub trait ProcessLauncher: Send + Sync {
    /// Start the process; does not wait for it to finish
    fn launch(&self, request: &LaunchRequest) -> LauncherResult<()>;

    fn name(&self) -> &str;
}

/// Launcher that spawns real OS processes
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    opener: String,
}

impl Default for SystemLauncher {
    fn default() -> Self {
        Self::new(DEFAULT_OPENER)
    }
}

impl SystemLauncher {
    pub fn new(opener: &str) -> Self {
        Self {
            opener: opener.to_string(),
        }
    }

    /// Build the command with placeholders expanded
    pub fn build_command(&self, request: &LaunchRequest) -> LauncherResult<Command> {
        let program = expand_env(request.command.trim());
        if program.is_empty() {
            return Err(LauncherError::Launch {
                command: request.command.clone(),
                reason: "no command configured".to_string(),
            });
        }

        let args = split_arguments(&expand_env(&request.arguments));
        let mut command = if is_url(&program) {
            let mut command = Command::new(&self.opener);
            command.arg(&program);
            command
        } else {
            Command::new(&program)
        };
        command.args(&args);

        let dir = expand_env(request.working_directory.trim());
        if !dir.is_empty() {
            if !Path::new(&dir).is_dir() {
                return Err(LauncherError::Launch {
                    command: program,
                    reason: format!("working directory '{}' does not exist", dir),
                });
            }
            command.current_dir(&dir);
        }

        command.stdin(Stdio::null());
        if request.visible {
            command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        Ok(command)
    }
}

impl ProcessLauncher for SystemLauncher {
    fn launch(&self, request: &LaunchRequest) -> LauncherResult<()> {
        let mut command = self.build_command(request)?;
        debug!("Spawning: {:?}", command);

        let mut child = command.spawn().map_err(|e| LauncherError::Launch {
            command: request.command.clone(),
            reason: e.to_string(),
        })?;
        info!("🚀 Launched '{}' (pid {})", request.command, child.id());

        // Reap in the background so finished children do not linger
        thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "system"
    }
}

/// Expand placeholders from the process environment; unknown ones are left as-is
pub fn expand_env(text: &str) -> String {
    expand_with(text, |name| std::env::var(name).ok())
}

/// Expand placeholders using `lookup`
pub fn expand_with<F>(text: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ENV_VAR
        .replace_all(text, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
                .unwrap_or_default();
            lookup(name).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Split an argument string into argv, honouring single and double quotes
pub fn split_arguments(arguments: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quote: Option<char> = None;
    let mut chars = arguments.chars().peekable();

    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') if matches!(next, Some('"') | Some('\\')) => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            (Some(_), c) => current.push(c),
            (None, '"') | (None, '\'') => {
                quote = Some(c);
                in_arg = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_arg = true;
            }
        }
    }

    if in_arg {
        args.push(current);
    }
    args
}

pub fn is_url(command: &str) -> bool {
    URL_SCHEME.is_match(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "HOME" => Some("/home/tux".to_string()),
            "APP" => Some("editor".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_expand_placeholders() {
        assert_eq!(expand_with("%HOME%/bin", lookup), "/home/tux/bin");
        assert_eq!(expand_with("${APP} $HOME", lookup), "editor /home/tux");
        assert_eq!(expand_with("%MISSING% $NOPE", lookup), "%MISSING% $NOPE");
        assert_eq!(expand_with("100% sure", lookup), "100% sure");
    }

    #[test]
    fn test_split_arguments() {
        assert_eq!(split_arguments(""), Vec::<String>::new());
        assert_eq!(split_arguments("  -a   -b "), vec!["-a", "-b"]);
        assert_eq!(
            split_arguments(r#"/C "echo Hello World && pause""#),
            vec!["/C", "echo Hello World && pause"]
        );
        assert_eq!(split_arguments(r#"-c 'it''s' "say \"hi\"""#), vec!["-c", "its", r#"say "hi""#]);
        assert_eq!(split_arguments(r#"empty "" end"#), vec!["empty", "", "end"]);
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://time.is/"));
        assert!(is_url("steam://rungameid/123"));
        assert!(!is_url("/usr/bin/firefox"));
        assert!(!is_url("notepad"));
    }

    #[test]
    fn test_build_plain_command() {
        let launcher = SystemLauncher::default();
        let request = LaunchRequest {
            command: "echo".into(),
            arguments: "Hello \"big world\"".into(),
            working_directory: String::new(),
            visible: true,
        };
        let command = launcher.build_command(&request).expect("Failed to build");
        assert_eq!(command.get_program(), OsStr::new("echo"));
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, vec![OsStr::new("Hello"), OsStr::new("big world")]);
        assert!(command.get_current_dir().is_none());
    }

    #[test]
    fn test_build_url_uses_opener() {
        let launcher = SystemLauncher::new("open-it");
        let request = LaunchRequest::from(&Action::new("Time", &["time"], "https://time.is/"));
        let command = launcher.build_command(&request).expect("Failed to build");
        assert_eq!(command.get_program(), OsStr::new("open-it"));
        assert_eq!(
            command.get_args().collect::<Vec<_>>(),
            vec![OsStr::new("https://time.is/")]
        );
    }

    #[test]
    fn test_build_with_working_directory() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let request = LaunchRequest::from(
            &Action::new("List", &["list"], "ls").working_directory(&dir.path().to_string_lossy()),
        );
        let command = SystemLauncher::default().build_command(&request).unwrap();
        assert_eq!(command.get_current_dir(), Some(dir.path()));
    }

    #[test]
    fn test_build_rejects_missing_directory_and_empty_command() {
        let launcher = SystemLauncher::default();
        let request = LaunchRequest::from(
            &Action::new("List", &["list"], "ls").working_directory("/definitely/not/here"),
        );
        assert!(matches!(
            launcher.build_command(&request),
            Err(LauncherError::Launch { .. })
        ));

        let request = LaunchRequest::from(&Action::new("Nothing", &["nothing"], "  "));
        assert!(launcher.build_command(&request).is_err());
    }

    #[test]
    fn test_launch_missing_program_fails() {
        let request = LaunchRequest::from(&Action::new(
            "Ghost",
            &["ghost"],
            "speechlauncher-no-such-program",
        ));
        assert!(matches!(
            SystemLauncher::default().launch(&request),
            Err(LauncherError::Launch { .. })
        ));
    }
}
