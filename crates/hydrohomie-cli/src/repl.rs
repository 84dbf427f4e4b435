//! Subcommand: `hydrohomie run`, the interactive tracker.
//!
//! [`App`] owns the account registry, the hydration tracker and the
//! encouragement cache, all sharing one profile. Each input line parses
//! into a [`Command`] and is handled against the app; output goes to any
//! `Write` so the handlers can be tested without a terminal.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use hydrohomie_account::AccountRegistry;
use hydrohomie_encourage::{EncouragementCache, EncouragementSource, HttpEncouragementSource};
use hydrohomie_store::SharedStore;
use hydrohomie_tracker::{Field, HydrationTracker, SavePolicy, TrackerError, format_ml};

use crate::config::AppConfig;
use crate::helpers::progress_bar;

const BAR_WIDTH: usize = 20;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register(String),
    Login { username: String, login_string: String },
    Logout,
    Drink,
    Goal(String),
    Amount(String),
    Reset,
    Status,
    Encourage,
    Refresh,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. The verb is case-insensitive; arguments are
    /// handed on as typed, minus surrounding whitespace.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match verb.to_ascii_lowercase().as_str() {
            "register" => Self::Register(rest.to_string()),
            "login" => {
                let (username, login_string) =
                    rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                Self::Login {
                    username: username.to_string(),
                    login_string: login_string.trim().to_string(),
                }
            }
            "logout" => Self::Logout,
            "drink" | "sip" => Self::Drink,
            "goal" => Self::Goal(rest.to_string()),
            "amount" => Self::Amount(rest.to_string()),
            "reset" => Self::Reset,
            "status" => Self::Status,
            "encourage" => Self::Encourage,
            "refresh" => Self::Refresh,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("Unknown command `{other}`. Type `help` for a list.")),
        };
        Ok(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    registry: AccountRegistry,
    tracker: HydrationTracker,
    encouragement: EncouragementCache,
}

impl App {
    pub fn new(
        store: SharedStore,
        config: &AppConfig,
        source: Arc<dyn EncouragementSource>,
    ) -> Result<Self> {
        let registry = AccountRegistry::load(store.clone(), config.registry_config())
            .context("failed to load accounts")?;
        let tracker = HydrationTracker::new(
            store.clone(),
            registry.session(),
            config.tracker_config(),
        )
        .context("failed to load hydration data")?;
        let encouragement = EncouragementCache::new(store, source).with_ttl(config.cache_ttl());

        Ok(Self {
            registry,
            tracker,
            encouragement,
        })
    }

    pub async fn handle(&mut self, command: Command, out: &mut impl Write) -> Result<Flow> {
        match command {
            Command::Register(username) => {
                let outcome = self.registry.register(&username).await?;
                writeln!(out, "  {}", outcome.message)?;
                if let Some(token) = outcome.login_string {
                    writeln!(out, "  Your login string: {token}")?;
                    writeln!(out, "  Keep it safe. It is the only way back into this account.")?;
                }
            }
            Command::Login {
                username,
                login_string,
            } => {
                let switching = self
                    .registry
                    .current_user()
                    .is_some_and(|user| user.username != username.trim());
                if switching {
                    self.save_progress(out)?;
                }
                let outcome = self.registry.login(&username, &login_string).await?;
                writeln!(out, "  {}", outcome.message)?;
                if outcome.success {
                    self.tracker.sync_identity()?;
                    self.render_status(out)?;
                }
            }
            Command::Logout => self.logout(out)?,
            Command::Drink => match self.tracker.drink() {
                Ok(()) => self.render_progress(out)?,
                Err(TrackerError::DrinkBlocked(reason)) => {
                    writeln!(out, "  Can't drink right now: {reason}.")?;
                }
                Err(err) => return Err(err.into()),
            },
            Command::Goal(text) => self.edit(Field::Goal, &text, out)?,
            Command::Amount(text) => self.edit(Field::DrinkAmount, &text, out)?,
            Command::Reset => {
                self.tracker.reset_progress()?;
                writeln!(out, "  Progress reset.")?;
                self.render_progress(out)?;
            }
            Command::Status => self.render_status(out)?,
            Command::Encourage => {
                let result = self.encouragement.fetch().await;
                Self::render_encouragement(result, out)?;
            }
            Command::Refresh => {
                let result = self.encouragement.refetch().await;
                Self::render_encouragement(result, out)?;
            }
            Command::Help => print_help(out)?,
            Command::Quit => {
                if self.registry.is_authenticated()
                    && self.tracker.config().save_policy == SavePolicy::OnRequest
                {
                    writeln!(out, "  Progress is saved on logout; unsaved changes are discarded.")?;
                }
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    /// Save the signed-in user's progress, then end the session.
    fn logout(&mut self, out: &mut impl Write) -> Result<()> {
        if !self.registry.is_authenticated() {
            writeln!(out, "  Not signed in.")?;
            return Ok(());
        }

        self.save_progress(out)?;
        self.registry.logout()?;
        self.tracker.sync_identity()?;
        writeln!(out, "  Logged out.")?;
        Ok(())
    }

    /// Save the signed-in user's progress ahead of a session change. A
    /// failed save is reported but does not stop the change.
    fn save_progress(&mut self, out: &mut impl Write) -> Result<()> {
        if let Err(err) = self.tracker.save() {
            warn!(%err, "progress not saved before session change");
            writeln!(out, "  Could not save progress: {err}")?;
        }
        Ok(())
    }

    fn edit(&mut self, field: Field, text: &str, out: &mut impl Write) -> Result<()> {
        if self.tracker.inputs_locked() {
            writeln!(
                out,
                "  Goal and drink amount are locked once water is logged. Use `reset` first."
            )?;
            return Ok(());
        }

        match field {
            Field::Goal => {
                self.tracker.edit_goal(text)?;
                self.tracker.blur_goal()?;
            }
            Field::DrinkAmount => {
                self.tracker.edit_drink_amount(text)?;
                self.tracker.blur_drink_amount()?;
            }
        }

        let record = self.tracker.record();
        writeln!(
            out,
            "  Daily goal {} ml, drink amount {} ml.",
            format_ml(record.daily_goal_ml),
            format_ml(record.drink_amount_ml)
        )?;
        self.render_errors(out)
    }

    // -- rendering ----------------------------------------------------------

    fn render_status(&self, out: &mut impl Write) -> Result<()> {
        let view = self.tracker.view();
        match self.registry.current_user() {
            Some(user) => writeln!(out, "  Signed in as {}.", user.username)?,
            None => writeln!(out, "  Not signed in (guest). Progress will not be saved.")?,
        }
        writeln!(
            out,
            "  Goal: {} ml   Drink amount: {} ml",
            view.goal_input, view.drink_amount_input
        )?;
        self.render_progress(out)?;
        self.render_errors(out)?;
        if let Some(reason) = self.tracker.drink_blocker() {
            writeln!(out, "  Drinking disabled: {reason}.")?;
        }
        Ok(())
    }

    fn render_progress(&self, out: &mut impl Write) -> Result<()> {
        let record = self.tracker.record();
        let fill = self.tracker.fill_percentage();
        writeln!(
            out,
            "  {} {} / {} ml ({:.0}%), {} sips",
            progress_bar(fill, BAR_WIDTH),
            format_ml(record.current_water_ml),
            format_ml(record.daily_goal_ml),
            fill,
            record.sips_taken
        )?;
        if fill >= 100.0 {
            writeln!(out, "  Daily goal reached!")?;
        }
        Ok(())
    }

    fn render_errors(&self, out: &mut impl Write) -> Result<()> {
        for error in self.tracker.active_errors() {
            writeln!(out, "  ! {error}")?;
        }
        Ok(())
    }

    fn render_encouragement(
        result: hydrohomie_encourage::EncouragementResult<String>,
        out: &mut impl Write,
    ) -> Result<()> {
        match result {
            Ok(text) => writeln!(out, "  {text}")?,
            Err(err) => writeln!(out, "  Could not fetch encouragement: {err}")?,
        }
        Ok(())
    }
}

fn print_help(out: &mut impl Write) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "  Commands:")?;
    writeln!(out, "    register <name>        - Create an account and get a login string")?;
    writeln!(out, "    login <name> <string>  - Sign in")?;
    writeln!(out, "    logout                 - Save progress and sign out")?;
    writeln!(out, "    drink                  - Log one drink")?;
    writeln!(out, "    goal <ml>              - Set the daily goal")?;
    writeln!(out, "    amount <ml>            - Set the drink amount")?;
    writeln!(out, "    reset                  - Start today's progress over")?;
    writeln!(out, "    status                 - Show progress and settings")?;
    writeln!(out, "    encourage              - Show an encouraging message")?;
    writeln!(out, "    refresh                - Fetch a new encouraging message")?;
    writeln!(out, "    help                   - Show this help")?;
    writeln!(out, "    quit                   - Exit")?;
    writeln!(out)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: run
// ---------------------------------------------------------------------------

/// Run the interactive REPL.
pub async fn cmd_run(store: SharedStore, config: &AppConfig) -> Result<()> {
    let source = HttpEncouragementSource::new(&config.source_config())
        .context("failed to create encouragement client")?;
    info!(endpoint = %source.endpoint(), "encouragement source ready");

    let mut app = App::new(store, config, Arc::new(source))?;
    let mut stdout = io::stdout();

    println!();
    println!("  HydroHomie v{}", env!("CARGO_PKG_VERSION"));
    println!("  Type `help` for commands, `quit` to exit.");
    println!();
    app.handle(Command::Status, &mut stdout).await?;

    let stdin = io::stdin();
    let mut line_buf = String::new();

    loop {
        print!("> ");
        stdout.flush().ok();

        line_buf.clear();
        match stdin.read_line(&mut line_buf) {
            Ok(0) => {
                println!();
                info!("EOF received, exiting");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("  Error reading input: {e}");
                continue;
            }
        }

        if line_buf.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line_buf) {
            Ok(command) => command,
            Err(message) => {
                println!("  {message}");
                continue;
            }
        };

        if app.handle(command, &mut stdout).await? == Flow::Quit {
            info!("user requested exit");
            break;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use hydrohomie_encourage::EncouragementResult;
    use hydrohomie_store::MemoryStore;

    use super::*;

    struct FixedSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EncouragementSource for FixedSource {
        async fn fetch_text(&self) -> EncouragementResult<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("You've got this ({n})"))
        }
    }

    fn app() -> App {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut config = AppConfig::default();
        config.account.latency_ms = 0;
        let source = Arc::new(FixedSource {
            calls: AtomicUsize::new(0),
        });
        App::new(store, &config, source).unwrap()
    }

    async fn run(app: &mut App, line: &str) -> String {
        let mut out = Vec::new();
        let command = Command::parse(line).unwrap();
        app.handle(command, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    fn login_string(output: &str) -> String {
        output
            .lines()
            .find_map(|l| l.trim().strip_prefix("Your login string: "))
            .unwrap()
            .to_string()
    }

    #[test]
    fn parse_commands() {
        assert_eq!(Command::parse("drink"), Ok(Command::Drink));
        assert_eq!(Command::parse("  QUIT "), Ok(Command::Quit));
        assert_eq!(
            Command::parse("goal 1500"),
            Ok(Command::Goal("1500".into()))
        );
        assert_eq!(Command::parse("amount"), Ok(Command::Amount(String::new())));
        assert_eq!(
            Command::parse("login bob abc123"),
            Ok(Command::Login {
                username: "bob".into(),
                login_string: "abc123".into(),
            })
        );
        assert_eq!(
            Command::parse("login bob"),
            Ok(Command::Login {
                username: "bob".into(),
                login_string: String::new(),
            })
        );
        assert!(Command::parse("fly").is_err());
    }

    #[tokio::test]
    async fn guest_can_drink_but_not_logout() {
        let mut app = app();
        let out = run(&mut app, "drink").await;
        assert!(out.contains("250 / 2000 ml"), "{out}");
        assert!(out.contains("1 sips"), "{out}");

        let out = run(&mut app, "logout").await;
        assert!(out.contains("Not signed in."));
    }

    #[tokio::test]
    async fn register_login_drink_logout_login_restores_progress() {
        let mut app = app();
        let out = run(&mut app, "register alice").await;
        assert!(out.contains("Registration successful!"));
        let token = login_string(&out);

        let out = run(&mut app, &format!("login alice {token}")).await;
        assert!(out.contains("Login successful!"));
        assert!(out.contains("Signed in as alice."));

        run(&mut app, "goal 1000").await;
        run(&mut app, "drink").await;
        run(&mut app, "drink").await;

        let out = run(&mut app, "logout").await;
        assert!(out.contains("Logged out."));
        let out = run(&mut app, "status").await;
        assert!(out.contains("0 / 2000 ml"), "{out}");

        let out = run(&mut app, &format!("login alice {token}")).await;
        assert!(out.contains("500 / 1000 ml (50%), 2 sips"), "{out}");
    }

    #[tokio::test]
    async fn switching_users_saves_the_previous_user_first() {
        let mut app = app();
        let alice = login_string(&run(&mut app, "register alice").await);
        let bob = login_string(&run(&mut app, "register bob").await);

        run(&mut app, &format!("login alice {alice}")).await;
        run(&mut app, "drink").await;
        run(&mut app, "drink").await;

        let out = run(&mut app, &format!("login bob {bob}")).await;
        assert!(out.contains("Signed in as bob."), "{out}");
        assert!(out.contains("0 / 2000 ml"), "{out}");

        run(&mut app, "logout").await;
        let out = run(&mut app, &format!("login alice {alice}")).await;
        assert!(out.contains("500 / 2000 ml (25%), 2 sips"), "{out}");
    }

    #[tokio::test]
    async fn failed_switch_keeps_current_user_and_progress() {
        let mut app = app();
        let alice = login_string(&run(&mut app, "register alice").await);
        run(&mut app, "register bob").await;

        run(&mut app, &format!("login alice {alice}")).await;
        run(&mut app, "drink").await;

        let out = run(&mut app, "login bob nope").await;
        assert!(out.contains("Invalid username or login string."));
        let out = run(&mut app, "status").await;
        assert!(out.contains("Signed in as alice."), "{out}");
        assert!(out.contains("250 / 2000 ml"), "{out}");
    }

    #[tokio::test]
    async fn bad_login_is_reported() {
        let mut app = app();
        run(&mut app, "register bob").await;
        let out = run(&mut app, "login bob wrong").await;
        assert!(out.contains("Invalid username or login string."));
        let out = run(&mut app, "login bob").await;
        assert!(out.contains("Please enter your login string."));
    }

    #[tokio::test]
    async fn invalid_input_shows_message_and_blocks_drink() {
        let mut app = app();
        let out = run(&mut app, "amount abc").await;
        assert!(out.contains("Please enter a positive amount"), "{out}");

        let out = run(&mut app, "drink").await;
        assert!(out.contains("Can't drink right now"), "{out}");

        let out = run(&mut app, "goal 100").await;
        assert!(!out.contains("Daily Goal cannot be less than Drink Amount."));
        let out = run(&mut app, "amount 250").await;
        assert!(out.contains("Daily Goal cannot be less than Drink Amount."));
    }

    #[tokio::test]
    async fn edits_are_refused_once_water_is_logged() {
        let mut app = app();
        run(&mut app, "drink").await;
        let out = run(&mut app, "goal 3000").await;
        assert!(out.contains("locked"));
        assert!(run(&mut app, "status").await.contains("Goal: 2000 ml"));

        run(&mut app, "reset").await;
        let out = run(&mut app, "goal 3000").await;
        assert!(out.contains("Daily goal 3000 ml"));
    }

    #[tokio::test]
    async fn encourage_is_cached_until_refresh() {
        let mut app = app();
        let first = run(&mut app, "encourage").await;
        let second = run(&mut app, "encourage").await;
        assert_eq!(first, second);
        assert!(first.contains("(1)"));

        let refreshed = run(&mut app, "refresh").await;
        assert!(refreshed.contains("(2)"));
    }

    #[tokio::test]
    async fn quit_warns_about_unsaved_progress() {
        let mut app = app();
        let token = login_string(&run(&mut app, "register cai").await);
        run(&mut app, &format!("login cai {token}")).await;

        let mut out = Vec::new();
        let flow = app.handle(Command::Quit, &mut out).await.unwrap();
        assert_eq!(flow, Flow::Quit);
        assert!(String::from_utf8(out).unwrap().contains("saved on logout"));
    }
}
