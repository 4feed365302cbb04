use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::game::{Board, Cell, GamePhase, WinningLine, COLS, ROWS};
use crate::session::PlaySession;
use crate::stats::StatsBook;
use crate::tier::Tier;

/// Everything the game screen shows.
pub struct ViewState<'a> {
    pub session: &'a PlaySession,
    pub player_name: &'a str,
    pub selected_tier: Tier,
    pub selected_column: usize,
    pub message: Option<&'a str>,
    pub show_help: bool,
}

/// How to play, shown by the help overlay.
pub const RULES: &[&str] = &[
    "You play yellow and always move first; the bot plays red.",
    "Drop a piece into a column; it falls to the lowest empty cell.",
    "Four of your pieces in a row, across, down or diagonally, wins.",
    "A full board without four in a row is a draw.",
    "If the bot fails to answer with a playable column, or you end the",
    "game early, it ends with no result.",
    "",
    "Easy picks random columns. Medium and Hard ask trained models.",
    "The difficulty is fixed when a game starts; changing it applies to",
    "the next game.",
    "",
    "Statistics are kept per difficulty. As a guest they last until you",
    "quit; when logged in they are saved to your account.",
];

pub fn render(frame: &mut Frame, view: &ViewState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(11),   // Board + stats
            Constraint::Length(3), // Message
            Constraint::Length(4), // Controls
        ])
        .split(frame.area());

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    let game = view.session.game();
    render_header(frame, view, chunks[0]);
    render_board(
        frame,
        game.board(),
        game.winning_line(),
        view.selected_column,
        middle[0],
    );
    render_stats(frame, &view.session.stats(), view.session.tier(), middle[1]);
    render_message(frame, view.message, chunks[2]);
    render_controls(frame, view.selected_tier, chunks[3]);

    if view.show_help {
        render_help(frame, chunks[1]);
    }
}

fn render_help(frame: &mut Frame, area: Rect) {
    let lines: Vec<Line> = RULES.iter().map(|&line| Line::from(line)).collect();
    let help = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("How to play (H to close)"),
        );

    frame.render_widget(Clear, area);
    frame.render_widget(help, area);
}

fn render_header(frame: &mut Frame, view: &ViewState, area: Rect) {
    let game = view.session.game();
    let opponent = match (view.session.tier(), view.session.bot_name()) {
        (Some(tier), Some(bot)) => format!("{} [{}]", tier.label(), bot),
        _ => "no opponent".to_string(),
    };

    let (status, color) = match game.phase() {
        GamePhase::NotStarted => ("Waiting for a new game".to_string(), Color::Gray),
        GamePhase::InProgress => ("Your turn".to_string(), Color::Yellow),
        GamePhase::Terminal => {
            let label = game.outcome().map(|o| o.label()).unwrap_or("over");
            (format!("Game over: {label}"), Color::Cyan)
        }
    };

    let header = Paragraph::new(format!(
        "{}  |  {}  |  vs {}",
        view.player_name, status, opponent
    ))
    .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title("Connect Four"));

    frame.render_widget(header, area);
}

fn render_board(
    frame: &mut Frame,
    board: &Board,
    winning_line: Option<WinningLine>,
    selected_column: usize,
    area: Rect,
) {
    let mut lines = Vec::new();

    // Column numbers with selection indicator
    let mut col_line = vec![Span::raw("   ")]; // Padding (3 chars to match "  ║")
    for col in 0..COLS {
        if col == selected_column {
            col_line.push(Span::styled(
                format!(" {} ", col + 1),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ));
        } else {
            col_line.push(Span::raw(format!(" {} ", col + 1)));
        }
    }
    col_line.push(Span::raw("  ")); // Suffix padding to match " ║"
    lines.push(Line::from(col_line));

    lines.push(Line::from("  ╔═════════════════════╗"));

    for row in 0..ROWS {
        let mut row_spans = vec![Span::raw("  ║")];

        for col in 0..COLS {
            let (symbol, color) = match board.get(row, col) {
                Cell::Empty => (" . ", Color::DarkGray),
                // Player pieces are yellow, the bot's are red
                Cell::PlayerOne => (" ● ", Color::Yellow),
                Cell::PlayerTwo => (" ● ", Color::Red),
            };
            let mut style = Style::default().fg(color);
            if winning_line.is_some_and(|line| line.contains(&(row, col))) {
                style = style.bg(Color::Green).add_modifier(Modifier::BOLD);
            }
            row_spans.push(Span::styled(symbol, style));
        }

        row_spans.push(Span::raw(" ║"));
        lines.push(Line::from(row_spans));
    }

    lines.push(Line::from("  ╚═════════════════════╝"));

    let board_widget = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(board_widget, area);
}

fn render_stats(frame: &mut Frame, stats: &StatsBook, current: Option<Tier>, area: Rect) {
    let mut lines = Vec::new();
    for (tier, s) in stats.iter() {
        let mut title = Style::default().add_modifier(Modifier::BOLD);
        if Some(tier) == current {
            title = title.fg(Color::Cyan);
        }
        lines.push(Line::from(Span::styled(tier.id().to_uppercase(), title)));
        lines.push(Line::from(format!(
            "  P {}  W {}  L {}  D {}  NR {}",
            s.played, s.won, s.lost, s.drawn, s.no_result
        )));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Statistics"),
    );
    frame.render_widget(widget, area);
}

fn render_message(frame: &mut Frame, message: Option<&str>, area: Rect) {
    let msg_widget = Paragraph::new(message.unwrap_or(""))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(msg_widget, area);
}

fn render_controls(frame: &mut Frame, selected_tier: Tier, area: Rect) {
    let line1 = Line::from(
        "←/→: Move  |  Enter or 1-7: Drop  |  N: New game  |  E: End game  |  H: Help  |  Q: Quit",
    );
    let line2 = Line::from(vec![
        Span::raw("T: Difficulty  "),
        Span::styled(
            selected_tier.label(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  ({})", selected_tier.description())),
    ]);

    let controls = Paragraph::new(vec![line1, line2])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Controls"));

    frame.render_widget(controls, area);
}
