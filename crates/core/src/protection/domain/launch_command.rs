use std::path::Path;

use crate::shared::platform::Platform;

/// A parsed `command` string from the action table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LaunchCommand {
    /// `open -a <App Name>`: hand the bundle name to the macOS launcher.
    OpenApp { app_name: String },
    /// Run an executable directly.
    Executable { program: String, args: Vec<String> },
}

impl LaunchCommand {
    /// Parses a command line. Double quotes group words; returns `None` for
    /// blank input or an `open -a` with no application name.
    pub fn parse(command: &str) -> Option<Self> {
        let tokens = tokenize(command);
        let (program, rest) = tokens.split_first()?;

        if program == "open" && rest.first().map(String::as_str) == Some("-a") {
            let app_name = rest[1..].join(" ");
            if app_name.is_empty() {
                return None;
            }
            return Some(LaunchCommand::OpenApp { app_name });
        }

        Some(LaunchCommand::Executable {
            program: program.clone(),
            args: rest.to_vec(),
        })
    }

    /// Program and arguments to execute.
    pub fn invocation(&self) -> (String, Vec<String>) {
        match self {
            LaunchCommand::OpenApp { app_name } => {
                ("open".to_string(), vec!["-a".to_string(), app_name.clone()])
            }
            LaunchCommand::Executable { program, args } => (program.clone(), args.clone()),
        }
    }
}

/// How a filesystem path is launched directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathLaunch {
    /// Through the OS launcher, waiting for it to confirm (`open <bundle>`).
    ViaLauncher { program: String, args: Vec<String> },
    /// Spawned as a detached process.
    Direct { program: String },
}

impl PathLaunch {
    pub fn for_path(path: &Path, platform: Platform) -> Self {
        let display = path.to_string_lossy().into_owned();
        let is_bundle = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("app"));

        if platform == Platform::Macos && is_bundle {
            PathLaunch::ViaLauncher {
                program: "open".to_string(),
                args: vec![display],
            }
        } else {
            PathLaunch::Direct { program: display }
        }
    }
}

fn tokenize(command: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for ch in command.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        tokens.push(current);
    }
    tokens
}
