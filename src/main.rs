use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use connect_four_arena::accounts::{Accounts, JsonAccountStore};
use connect_four_arena::ai::BotRoster;
use connect_four_arena::config::AppConfig;
use connect_four_arena::session::PlaySession;
use connect_four_arena::tier::Tier;
use connect_four_arena::ui::App;

/// Play Connect Four against bots of three difficulty tiers.
#[derive(Parser)]
#[command(name = "connect-four", about = "Play Connect Four against computer opponents")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Play in the terminal UI (the default)
    Play {
        /// Log in as this user; without it you play as a guest
        #[arg(long, requires = "password")]
        user: Option<String>,

        #[arg(long)]
        password: Option<String>,

        /// Initially selected difficulty: easy, medium or hard
        #[arg(long, default_value = "easy")]
        tier: Tier,
    },
    /// Create an account
    Register {
        #[arg(long)]
        user: String,
        #[arg(long)]
        password: String,
        /// Security question used for password recovery
        #[arg(long, default_value = "")]
        question: String,
        #[arg(long, default_value = "")]
        answer: String,
    },
    /// Reset a forgotten password. Without --answer, prints the security question.
    ResetPassword {
        #[arg(long)]
        user: String,
        #[arg(long, requires = "new_password")]
        answer: Option<String>,
        #[arg(long)]
        new_password: Option<String>,
    },
    /// Show a user's statistics per tier
    Stats {
        #[arg(long)]
        user: String,
    },
    /// Print a config file with every default value
    DefaultConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    init_logging(&config)?;

    match cli.command.unwrap_or(Command::Play {
        user: None,
        password: None,
        tier: Tier::Easy,
    }) {
        Command::Play {
            user,
            password,
            tier,
        } => play(&config, user, password, tier),
        Command::Register {
            user,
            password,
            question,
            answer,
        } => {
            let mut accounts = open_accounts(&config)?;
            accounts.register(&user, &password, &question, &answer)?;
            println!("Registration successful. You can now log in as '{}'.", user.trim());
            Ok(())
        }
        Command::ResetPassword {
            user,
            answer,
            new_password,
        } => {
            let mut accounts = open_accounts(&config)?;
            let (Some(answer), Some(new_password)) = (answer, new_password) else {
                println!("{}", accounts.security_question(&user)?);
                return Ok(());
            };
            if !accounts.check_security_answer(&user, &answer)? {
                bail!("incorrect answer");
            }
            accounts.reset_password(&user, &new_password)?;
            println!("Password has been reset. Please log in with your new password.");
            Ok(())
        }
        Command::Stats { user } => {
            let accounts = open_accounts(&config)?;
            let stats = accounts.stats(&user)?;
            for (tier, tier_stats) in stats.iter() {
                println!("{}\n{}\n", tier.label(), tier_stats.summary());
            }
            Ok(())
        }
        Command::DefaultConfig => {
            print!("{}", AppConfig::default_toml()?);
            Ok(())
        }
    }
}

/// Logs go to a file; the terminal belongs to the game view.
fn init_logging(config: &AppConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.logging.file)
        .with_context(|| format!("opening log file {}", config.logging.file.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn open_accounts(config: &AppConfig) -> Result<Accounts<JsonAccountStore>> {
    let path = &config.accounts.store_path;
    let store = JsonAccountStore::open(path)
        .with_context(|| format!("opening account store {}", path.display()))?;
    Ok(Accounts::new(store, config.accounts.clone()))
}

fn play(
    config: &AppConfig,
    user: Option<String>,
    password: Option<String>,
    tier: Tier,
) -> Result<()> {
    let factory = Box::new(BotRoster::new(config.bots.clone()));

    let (session, player_name) = match user {
        Some(user) => {
            let accounts = open_accounts(config)?;
            let account = accounts.login(&user, password.as_deref().unwrap_or(""))?;
            let recorder = accounts.recorder(&account.username);
            (PlaySession::new(factory, Box::new(recorder)), account.username)
        }
        None => (PlaySession::guest(factory), "Guest".to_string()),
    };

    run_tui(App::new(session, player_name, tier)).context("terminal UI failed")
}

fn run_tui(mut app: App) -> io::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal, even on error
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    res
}
