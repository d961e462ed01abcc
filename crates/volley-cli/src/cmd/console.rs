use anyhow::Context;
use std::io::{BufRead, Write};
use std::path::Path;
use std::time::Duration;
use volley_core::config::Config;
use volley_core::orchestrator::{FireOutcome, LauncherFireResult, LauncherStatus, Orchestrator};
use volley_core::secure::SecureSession;
use volley_core::transport::NoopTransport;
use volley_core::types::{Direction, LauncherId};

// ---------------------------------------------------------------------------
// Command table
// ---------------------------------------------------------------------------

/// What a console command does. Each kind maps to one typed handler on
/// [`Session`]; the table below is the single place a command name, its
/// usage line and its visibility are declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandKind {
    Help,
    Show,
    Enable,
    Disable,
    Unlock,
    Light,
    Fire,
    Move(Direction),
    Quit,
}

struct CommandSpec {
    name: &'static str,
    usage: &'static str,
    summary: &'static str,
    hidden: bool,
    kind: CommandKind,
}

/// Ordered dispatch table, built once. Order is the `help` listing order.
const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "help",
        usage: "help [COMMAND]",
        summary: "List commands, or show usage for one",
        hidden: false,
        kind: CommandKind::Help,
    },
    CommandSpec {
        name: "show",
        usage: "show",
        summary: "Display user, fleet, module and launch information",
        hidden: false,
        kind: CommandKind::Show,
    },
    CommandSpec {
        name: "enable",
        usage: "enable ID [ID ...]",
        summary: "Enable launchers for use",
        hidden: false,
        kind: CommandKind::Enable,
    },
    CommandSpec {
        name: "disable",
        usage: "disable ID [ID ...]",
        summary: "Disable launchers",
        hidden: false,
        kind: CommandKind::Disable,
    },
    CommandSpec {
        name: "unlock",
        usage: "unlock MODULE KEY",
        summary: "Unlock a secure module for this session",
        hidden: false,
        kind: CommandKind::Unlock,
    },
    CommandSpec {
        name: "light",
        usage: "light on|off",
        summary: "Light up the cavern",
        hidden: false,
        kind: CommandKind::Light,
    },
    CommandSpec {
        name: "fire",
        usage: "fire",
        summary: "Fire all enabled launchers",
        hidden: false,
        kind: CommandKind::Fire,
    },
    CommandSpec {
        name: "ml",
        usage: "ml [DURATION_MS]",
        summary: "Move enabled launchers left",
        hidden: true,
        kind: CommandKind::Move(Direction::Left),
    },
    CommandSpec {
        name: "mr",
        usage: "mr [DURATION_MS]",
        summary: "Move enabled launchers right",
        hidden: true,
        kind: CommandKind::Move(Direction::Right),
    },
    CommandSpec {
        name: "mu",
        usage: "mu [DURATION_MS]",
        summary: "Move enabled launchers up",
        hidden: true,
        kind: CommandKind::Move(Direction::Up),
    },
    CommandSpec {
        name: "md",
        usage: "md [DURATION_MS]",
        summary: "Move enabled launchers down",
        hidden: true,
        kind: CommandKind::Move(Direction::Down),
    },
    CommandSpec {
        name: "quit",
        usage: "quit",
        summary: "Leave the console",
        hidden: false,
        kind: CommandKind::Quit,
    },
];

fn find_command(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|c| c.name == name)
}

enum Reply {
    Text(String),
    Quit,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One interactive console session: the orchestrator plus the
/// session-scoped copy of the secure modules. Dropping the session drops
/// the fleet and joins its control threads.
pub struct Session {
    orch: Orchestrator<NoopTransport>,
    secure: SecureSession,
    config: Config,
    source: String,
}

impl Session {
    pub fn new(root: &Path) -> anyhow::Result<Self> {
        let config = Config::load(root).context("failed to load config")?;
        let transport = NoopTransport::new(config.expected_launchers);
        let orch = Orchestrator::bootstrap(root, &config, transport)
            .context("failed to open the shared store")?;
        let secure = SecureSession::from_store(&orch.store);
        Ok(Self {
            orch,
            secure,
            config,
            source: source_identity(),
        })
    }

    pub fn login_banner(&self) -> Option<String> {
        self.orch
            .store
            .data
            .login_flag
            .as_ref()
            .map(|flag| format!("Great job, you've reached a powerful interface. Flag: {flag}"))
    }

    /// Parse and execute one console line.
    fn dispatch(&mut self, line: &str) -> anyhow::Result<Reply> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Reply::Text(String::new()));
        }
        let (name, args) = match line.split_once(' ') {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };
        let Some(spec) = find_command(name) else {
            return Ok(Reply::Text(format!(
                "Unknown command '{name}'. Type help for the list."
            )));
        };
        let reply = match spec.kind {
            CommandKind::Help => self.help(args),
            CommandKind::Show => self.show(),
            CommandKind::Enable => self.set_enabled(args, true),
            CommandKind::Disable => self.set_enabled(args, false),
            CommandKind::Unlock => self.unlock(args),
            CommandKind::Light => self.light(args)?,
            CommandKind::Fire => self.fire()?,
            CommandKind::Move(direction) => self.move_launchers(direction, args)?,
            CommandKind::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Text(reply))
    }

    // ---------------------------------------------------------------------------
    // Handlers
    // ---------------------------------------------------------------------------

    fn help(&self, args: &str) -> String {
        if args.is_empty() {
            let mut out = String::from("Available commands:\n");
            for spec in COMMANDS.iter().filter(|c| !c.hidden) {
                out.push_str(&format!("    {:8} {}\n", spec.name, spec.summary));
            }
            out.push_str("Type help COMMAND to get more info about that specific command.");
            return out;
        }
        match find_command(args) {
            Some(spec) => format!("Usage: {}\n{}", spec.usage, spec.summary),
            None => "That command is not defined.".to_string(),
        }
    }

    fn show(&self) -> String {
        let store = &self.orch.store;
        let mut out = String::new();

        out.push_str("* User information *\n");
        out.push_str(&format!("    Source: {}\n\n", self.source));

        out.push_str("* General information *\n");
        out.push_str(&format!("    Missiles left: {}\n", store.total_remaining()));
        out.push_str(&format!(
            "    Number of launches: {}\n",
            store.data.launches.len()
        ));
        out.push_str(&format!("    Current datetime: {}\n", chrono::Utc::now()));
        out.push_str(&format!(
            "    Time left before ready: {}s\n",
            self.orch.time_left()
        ));
        out.push_str(&format!("    Light is on?: {}\n\n", store.data.light_status));

        out.push_str("* Launchers *\n");
        for info in self.orch.status().launchers {
            out.push_str(&format!(
                "    id: {}  alive: {}  enabled: {}  missiles: {}\n",
                info.id,
                info.alive,
                info.enabled,
                store.remaining(info.id)
            ));
        }
        out.push('\n');

        out.push_str("* Secure modules *\n");
        for (name, module) in self.secure.modules() {
            out.push_str(&format!(
                "    name: {name}  locked: {}  ({})\n",
                module.locked, module.description
            ));
        }
        out.push('\n');

        out.push_str("* Launch log *\n");
        for record in self.orch.launch_history() {
            out.push_str(&format!(
                "    launcher {}  source {}  at {}  crashed {:?}\n",
                record.launcher,
                record.source,
                record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                record.crashed,
            ));
        }
        out
    }

    fn set_enabled(&mut self, args: &str, enable: bool) -> String {
        if args.is_empty() {
            return "Please provide some launcher ids.".to_string();
        }
        let mut out = String::new();
        for raw in args.split_whitespace() {
            let id: LauncherId = match raw.parse() {
                Ok(id) => id,
                Err(_) => return format!("Invalid launcher id '{raw}'."),
            };
            if enable {
                match self.orch.enable(id) {
                    Ok(()) => out.push_str(&format!("Launcher {id} has been enabled\n")),
                    Err(e) => out.push_str(&format!("{e}\n")),
                }
            } else {
                self.orch.disable(id);
                out.push_str(&format!("Launcher {id} has been disabled\n"));
            }
        }
        out.trim_end().to_string()
    }

    fn unlock(&mut self, args: &str) -> String {
        let parts: Vec<&str> = args.split_whitespace().collect();
        let &[name, key] = parts.as_slice() else {
            return "Usage: unlock MODULE KEY".to_string();
        };
        if self.secure.unlock(name, key) {
            "Module unlocked successfully".to_string()
        } else {
            "Invalid module/key pair".to_string()
        }
    }

    fn light(&mut self, args: &str) -> anyhow::Result<String> {
        let on = match args {
            "on" => true,
            "off" => false,
            _ => return Ok("Usage: light on|off".to_string()),
        };
        self.orch.store.set_light(on);
        // Flush immediately: the light daemon observes the store at its own
        // poll cadence and only sees flushed writes.
        self.orch.store.flush().context("failed to flush store")?;
        Ok(format!("Light is turned {}", if on { "on" } else { "off" }))
    }

    fn fire(&mut self) -> anyhow::Result<String> {
        if self.secure.is_locked("fire") {
            return Ok("Module is locked. Unlock it first with \"unlock fire KEY\"".to_string());
        }
        let source = self.source.clone();
        let outcome = self.orch.fire(&source).context("fire request failed")?;
        Ok(format_outcome(&outcome))
    }

    fn move_launchers(&mut self, direction: Direction, args: &str) -> anyhow::Result<String> {
        let ms = if args.is_empty() {
            self.config.default_move_ms
        } else {
            match args.parse::<u64>() {
                Ok(ms) if ms > 0 && ms <= self.config.max_move_ms => ms,
                _ => {
                    return Ok(format!(
                        "Duration must be between 1 and {} ms.",
                        self.config.max_move_ms
                    ))
                }
            }
        };
        self.orch
            .move_enabled(direction, Duration::from_millis(ms))
            .context("move failed")?;
        Ok(format!("Moved {direction} for {ms}ms"))
    }
}

fn format_result(result: &LauncherFireResult) -> String {
    match &result.status {
        LauncherStatus::Fired { matched, flags } => {
            let mut out = format!(
                "Fired {} — {} missile(s) left",
                result.id, result.remaining
            );
            if matched.is_empty() {
                out.push_str("\n    No crash was detected");
            }
            for target in matched {
                out.push_str(&format!("\n    Crash detected on building {target}"));
            }
            for flag in flags {
                out.push_str(&format!(
                    "\n    Congratulations, you crashed a building. Flag: {flag}"
                ));
            }
            out
        }
        LauncherStatus::Skipped => format!("Launcher {} skipped: no missiles left", result.id),
        LauncherStatus::Faulted { message } => {
            format!("Launcher {} fault: {message}", result.id)
        }
    }
}

fn format_outcome(outcome: &FireOutcome) -> String {
    match outcome {
        FireOutcome::Refused { time_left_seconds } => format!(
            "Launchers not ready. Time left before next launch: {time_left_seconds}s"
        ),
        FireOutcome::Fired { results } if results.is_empty() => {
            "No missile was launched. Enable launchers and check remaining missiles.".to_string()
        }
        FireOutcome::Fired { results } => results
            .iter()
            .map(format_result)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Who is driving this session. An SSH login carries its client address;
/// anything else is local.
fn source_identity() -> String {
    for var in ["SSH_CLIENT", "SSH_CONNECTION"] {
        if let Ok(value) = std::env::var(var) {
            if let Some(addr) = value.split_whitespace().next() {
                return addr.to_string();
            }
        }
    }
    "local".to_string()
}

// ---------------------------------------------------------------------------
// REPL
// ---------------------------------------------------------------------------

pub fn run(root: &Path) -> anyhow::Result<()> {
    let mut session = Session::new(root)?;

    println!("Volley control console. Type help for the command list.");
    if let Some(banner) = session.login_banner() {
        println!("{banner}");
    }

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        match session.dispatch(&line)? {
            Reply::Text(text) if text.is_empty() => {}
            Reply::Text(text) => println!("{text}"),
            Reply::Quit => break,
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use volley_core::store::Store;

    fn session() -> (TempDir, Session) {
        let dir = TempDir::new().unwrap();
        // Zero settle so fire tests don't sleep.
        let config = Config {
            settle_seconds: 0,
            tick_ms: 1,
            ..Config::default()
        };
        config.save(dir.path()).unwrap();
        crate::cmd::init::run(dir.path()).unwrap();
        let session = Session::new(dir.path()).unwrap();
        (dir, session)
    }

    fn text(session: &mut Session, line: &str) -> String {
        match session.dispatch(line).unwrap() {
            Reply::Text(t) => t,
            Reply::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn help_lists_visible_commands_only() {
        let (_dir, mut session) = session();
        let out = text(&mut session, "help");
        assert!(out.contains("fire"));
        assert!(out.contains("enable"));
        // Move commands are hidden from the listing but still documented.
        assert!(!out.contains("Move enabled launchers left"));
        let usage = text(&mut session, "help ml");
        assert!(usage.contains("ml [DURATION_MS]"));
    }

    #[test]
    fn unknown_command_is_reported() {
        let (_dir, mut session) = session();
        let out = text(&mut session, "frobnicate");
        assert!(out.contains("Unknown command"));
    }

    #[test]
    fn fire_is_gated_by_secure_module() {
        let (_dir, mut session) = session();
        session.dispatch("enable 0 1").unwrap();

        let out = text(&mut session, "fire");
        assert!(out.contains("locked"));
        // Nothing fired while locked.
        assert!(session.orch.launch_history().is_empty());

        assert!(text(&mut session, "unlock fire WRONG").contains("Invalid"));
        assert!(text(&mut session, "unlock fire CHANGEME").contains("unlocked"));
        let out = text(&mut session, "fire");
        assert!(out.contains("Fired #0"));
        assert_eq!(session.orch.launch_history().len(), 2);
    }

    #[test]
    fn enable_validates_ids() {
        let (_dir, mut session) = session();
        assert!(text(&mut session, "enable").contains("Please provide"));
        assert!(text(&mut session, "enable x").contains("Invalid launcher id"));
        assert!(text(&mut session, "enable 7").contains("not registered"));
        assert!(text(&mut session, "enable 0").contains("enabled"));
        assert!(text(&mut session, "disable 0").contains("disabled"));
    }

    #[test]
    fn light_writes_through_to_the_store_file() {
        let (dir, mut session) = session();
        assert!(text(&mut session, "light on").contains("turned on"));

        // A second, independently-opened handle sees the flushed value.
        let config = Config::load(dir.path()).unwrap();
        let reader = Store::open(&config.store_path(dir.path())).unwrap();
        assert!(reader.data.light_status);

        assert!(text(&mut session, "light sideways").contains("Usage"));
    }

    #[test]
    fn moves_respect_duration_bounds() {
        let (_dir, mut session) = session();
        session.dispatch("enable 0").unwrap();
        assert!(text(&mut session, "ml").contains("Moved left"));
        assert!(text(&mut session, "mr 100").contains("Moved right for 100ms"));
        assert!(text(&mut session, "mu 999999").contains("Duration must be"));
        assert!(text(&mut session, "md 0").contains("Duration must be"));
    }

    #[test]
    fn quit_ends_the_session() {
        let (_dir, mut session) = session();
        assert!(matches!(session.dispatch("quit").unwrap(), Reply::Quit));
    }

    #[test]
    fn login_banner_carries_the_seeded_flag() {
        let (_dir, session) = session();
        assert!(session.login_banner().unwrap().contains("FLAG-CONSOLE"));
    }
}
