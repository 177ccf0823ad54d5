use lifegame_client::{
    BoardView, CellCoord, ClientConfig, GameEvent, Gameboard, LifeGame, MarkupBoard, SessionEnd,
    counts_counter_class,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Board view printing to the terminal on top of the markup model
struct TerminalBoard {
    inner: MarkupBoard,
}

impl TerminalBoard {
    fn draw(&self) {
        for row in self.inner.rows() {
            let line: String = row
                .iter()
                .map(|cell| {
                    if cell.is_dead() {
                        '.'
                    } else if cell.has_class("cell-p1") {
                        '#'
                    } else if cell.has_class("cell-p2") {
                        'o'
                    } else {
                        '?'
                    }
                })
                .collect();
            println!("  {}", line);
        }
    }
}

impl BoardView for TerminalBoard {
    fn read_board(&self) -> Gameboard {
        self.inner.read_board()
    }

    fn render_board(&mut self, fragment: &str) {
        self.inner.render_board(fragment);
        self.draw();
    }

    fn set_cell_state(&mut self, coord: CellCoord, state_class: &str) {
        self.inner.set_cell_state(coord, state_class);
        self.draw();
    }

    fn update_counters(&mut self, p1_cells: Option<u32>, p2_cells: Option<u32>) {
        self.inner.update_counters(p1_cells, p2_cells);
    }

    fn increment_counter(&mut self, counts_class: &str) {
        self.inner.increment_counter(counts_class);
    }

    fn show_status(&mut self, text: &str) {
        self.inner.show_status(text);
    }

    fn notify(&mut self, message: &str) {
        println!("*** {} ***", message);
        self.inner.notify(message);
    }

    fn exit_add_cell_mode(&mut self) {
        self.inner.exit_add_cell_mode();
    }

    fn accepts_placement(&self, coord: CellCoord) -> bool {
        self.inner.accepts_placement(coord)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // LIFEGAME_URL points at the game page, e.g. http://localhost:5000/game/1
    let config = ClientConfig::from_env()?;
    println!("Playing {}", config.game_url);

    let view = TerminalBoard {
        inner: MarkupBoard::new()
            .with_counter(&counts_counter_class(1), "0")
            .with_counter(&counts_counter_class(2), "0"),
    };
    let game = LifeGame::new(config, view);

    // Print game events as they happen
    let mut event_receiver = game.subscribe_to_events().await;
    let event_handler = tokio::spawn(async move {
        while let Some(event) = event_receiver.recv().await {
            match event {
                GameEvent::PlayerJoined { name } => {
                    println!("Opponent joined: {}", name.as_deref().unwrap_or("unknown"));
                }
                GameEvent::StatusUpdated { status } => println!("Status: {}", status),
                GameEvent::TurnStarted => println!("Enter cells as `x y`"),
                GameEvent::CellPlaced { coord } => println!("Placed ({}, {})", coord.x, coord.y),
                GameEvent::PlacementRejected { message } => println!("Rejected: {}", message),
                GameEvent::BoardReplaced => {}
                GameEvent::GameOver | GameEvent::ConnectionLost => break,
            }
        }
    });

    // Every `x y` line on stdin is a click on that cell
    let (clicks, click_receiver) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut parts = line.split_whitespace().map(str::parse::<usize>);
            match (parts.next(), parts.next()) {
                (Some(Ok(x)), Some(Ok(y))) => {
                    if clicks.send(CellCoord { x, y }).is_err() {
                        break;
                    }
                }
                _ => println!("Expected `x y`, got {:?}", line),
            }
        }
    });

    let end = game.run(click_receiver).await;
    event_handler.abort();

    let view = game.view().await;
    println!(
        "Session ended ({:?}). Live cells: {} vs {}",
        end,
        view.inner.counter("_p1_cells").unwrap_or("?"),
        view.inner.counter("_p2_cells").unwrap_or("?"),
    );

    if end == SessionEnd::Halted {
        return Err("lost contact with the game server".into());
    }
    Ok(())
}
