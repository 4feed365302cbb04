use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{backend::Backend, Terminal};

use crate::error::SessionError;
use crate::game::{GameOutcome, MoveError, COLS};
use crate::session::{BotTurn, PlaySession, TurnReport};
use crate::tier::Tier;

pub struct App {
    session: PlaySession,
    player_name: String,
    selected_tier: Tier,
    selected_column: usize,
    should_quit: bool,
    show_help: bool,
    message: Option<String>,
}

impl App {
    pub fn new(session: PlaySession, player_name: impl Into<String>, tier: Tier) -> Self {
        App {
            session,
            player_name: player_name.into(),
            selected_tier: tier,
            selected_column: COLS / 2, // Start in middle
            should_quit: false,
            show_help: false,
            message: Some("Press 'n' to start a new game.".to_string()),
        }
    }

    /// Main application loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            self.handle_events()?;
        }
        Ok(())
    }

    /// Handle keyboard events
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    /// Handle key press
    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left => {
                self.selected_column = self.selected_column.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.selected_column + 1 < COLS {
                    self.selected_column += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.play_column(self.selected_column);
            }
            KeyCode::Char(c @ '1'..='7') => {
                let column = c as usize - '1' as usize;
                self.selected_column = column;
                self.play_column(column);
            }
            KeyCode::Char('t') => {
                self.selected_tier = self.selected_tier.next();
                self.message = Some(format!(
                    "Difficulty: {} (applies to the next game)",
                    self.selected_tier.label()
                ));
            }
            KeyCode::Char('h') => self.show_help = !self.show_help,
            KeyCode::Char('n') => self.new_game(),
            KeyCode::Char('e') => self.end_game(),
            _ => {}
        }
    }

    fn new_game(&mut self) {
        self.message = Some(match self.session.new_game(self.selected_tier) {
            Ok(()) => {
                self.selected_column = COLS / 2;
                format!("Game started against {}. Your turn!", self.selected_tier.label())
            }
            Err(err) => format!("Cannot start game: {err}"),
        });
    }

    fn end_game(&mut self) {
        let retrying = self.session.has_unrecorded_outcome();
        self.message = Some(match self.session.end_game() {
            Ok(GameOutcome::NoResult) if !retrying => {
                "Game ended with no result. Press 'n' to start again.".to_string()
            }
            Ok(_) => "Result saved. Press 'n' to start again.".to_string(),
            Err(SessionError::Move(_)) => "No active game to end.".to_string(),
            Err(err) => err.to_string(),
        });
    }

    /// Drop a piece in `column` and let the bot answer
    fn play_column(&mut self, column: usize) {
        self.message = Some(match self.session.submit_column(column) {
            Ok(report) => describe_turn(&report),
            Err(SessionError::Move(MoveError::NotStarted)) => {
                "Press 'n' to start a new game first.".to_string()
            }
            Err(SessionError::Move(MoveError::GameOver)) => {
                "Game over. Press 'n' to start again.".to_string()
            }
            Err(SessionError::Move(MoveError::ColumnFull)) => "That column is full.".to_string(),
            Err(err) => err.to_string(),
        });
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        super::game_view::render(
            frame,
            &super::game_view::ViewState {
                session: &self.session,
                player_name: &self.player_name,
                selected_tier: self.selected_tier,
                selected_column: self.selected_column,
                message: self.message.as_deref(),
                show_help: self.show_help,
            },
        );
    }
}

fn describe_turn(report: &TurnReport) -> String {
    let text = describe_moves(report);
    match &report.record_error {
        Some(err) => format!("{text} Result not saved ({err}); press 'e' to retry."),
        None => text,
    }
}

fn describe_moves(report: &TurnReport) -> String {
    let human_col = report.human.column + 1;
    match (report.outcome, &report.bot) {
        (Some(GameOutcome::Win), _) => "You win! Press 'n' to play again.".to_string(),
        (Some(GameOutcome::Loss), Some(BotTurn::Played(bot))) => format!(
            "Bot wins (played {}). Press 'n' to try again.",
            bot.column + 1
        ),
        (Some(GameOutcome::Draw), _) => "Draw! Press 'n' to play again.".to_string(),
        (Some(GameOutcome::NoResult), Some(BotTurn::Faulted(fault))) => {
            format!("{fault}. Game ended with no result.")
        }
        (_, Some(BotTurn::Played(bot))) => format!(
            "You played {human_col}. Bot played {}. Your turn!",
            bot.column + 1
        ),
        _ => format!("You played {human_col}."),
    }
}
