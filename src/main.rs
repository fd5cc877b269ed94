use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{
    io::{self, stdout},
    time::{Duration, Instant},
};

use gridfall::board::{Board, BoardEvent, Command, GRID_COLS, GRID_ROWS};
use gridfall::grid::{BlockColor, Location};

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";

// Gravity interval (in milliseconds)
const TICK_MS: u64 = 1000;

// ============================================================================
// Color Mapping
// ============================================================================

fn block_color(color: BlockColor) -> Color {
    match color {
        BlockColor::Red => Color::Red,
        BlockColor::Gray => Color::Gray,
        BlockColor::Cyan => Color::Cyan,
        BlockColor::Yellow => Color::Yellow,
        BlockColor::Magenta => Color::Magenta,
        BlockColor::Blue => Color::Blue,
        BlockColor::Green => Color::Green,
    }
}

// ============================================================================
// App State
// ============================================================================

struct App {
    board: Board,
    paused: bool,
    games_played: u32,
}

impl App {
    fn new() -> Self {
        Self {
            board: Board::new(GRID_ROWS, GRID_COLS),
            paused: false,
            games_played: 0,
        }
    }

    /// Drains board events; the display only needs to count restarts, the
    /// grid itself is re-read every frame.
    fn consume_events(&mut self) {
        for event in self.board.take_events() {
            if event == BoardEvent::GameOver {
                self.games_played += 1;
            }
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, app: &App) {
    let area = frame.size();

    let grid_display_width = (GRID_COLS as u16 * CELL_WIDTH) + 2;
    let grid_display_height = GRID_ROWS as u16 + 2;
    let info_width = 14;
    let total_width = grid_display_width + info_width + 2;
    let total_height = grid_display_height + 3;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(info_width),
    ])
    .split(game_row);

    render_grid(frame, app, horizontal[0]);
    render_info(frame, app, horizontal[1]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "←→: Move | ↑: Rotate | ↓: Drop | Space: Hard Drop | P: Pause | Q/ESC: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }

    if app.paused {
        render_paused(frame, area);
    }
}

fn render_grid(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Gridfall ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // The falling tetrad's blocks already live in the grid, so one pass over
    // the cells covers both the stack and the piece.
    let grid = app.board.grid();
    let mut lines: Vec<Line> = Vec::new();

    for row in 0..grid.num_rows() {
        let mut spans: Vec<Span> = Vec::new();

        for col in 0..grid.num_cols() {
            let span = match grid.get(Location::new(row, col)) {
                None => Span::raw(EMPTY_CHAR),
                Some(id) => Span::styled(
                    BLOCK_CHAR,
                    Style::default().fg(block_color(grid.color(id))),
                ),
            };
            spans.push(span);
        }

        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

fn render_info(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", app.board.score())),
        Line::from(""),
        Line::from(Span::styled("Rows", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", app.board.rows_cleared())),
        Line::from(""),
        Line::from(Span::styled("Restarts", Style::default().fg(Color::Red))),
        Line::from(format!("{}", app.games_played)),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_paused(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("PAUSED", Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled(
            "Press P to continue",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Press ESC to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Paused ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(24, 10, area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Main Loop
// ============================================================================

fn main() -> io::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();
    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS);

    // The single repeating tick source: poll for input until the next
    // gravity deadline, then tick. Commands and ticks are serialized on this
    // thread, so the board never sees interleaved mutation.
    loop {
        terminal.draw(|frame| render(frame, &app))?;

        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        // Always allow quit
                        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => break,
                        // Always allow pause/unpause toggle
                        KeyCode::Char('p') | KeyCode::Char('P') => {
                            app.paused = !app.paused;
                        }
                        // Only process game controls while running
                        _ if !app.paused => match key.code {
                            KeyCode::Left => {
                                app.board.apply(Command::MoveLeft);
                            }
                            KeyCode::Right => {
                                app.board.apply(Command::MoveRight);
                            }
                            KeyCode::Down => {
                                app.board.apply(Command::SoftDrop);
                            }
                            KeyCode::Up => {
                                app.board.apply(Command::Rotate);
                            }
                            KeyCode::Char(' ') => {
                                app.board.apply(Command::HardDrop);
                            }
                            _ => {}
                        },
                        _ => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_duration {
            if !app.paused {
                app.board.tick();
            }
            last_tick = Instant::now();
        }

        app.consume_events();
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}
