//! Game of Life Client Library
//!
//! This library provides a Rust client for the two-player Game of Life server.
//! The server owns every rule; the client polls the game page for the current
//! phase, keeps a view of the board up to date and forwards cell placements.
//!
//! ## Usage
//!
//! ### High-Level Interface (Recommended)
//!
//! `LifeGame` runs a whole session: it waits for the second player, polls the
//! game status, and places cells from a stream of clicks when it is this
//! player's turn.
//!
//! ```rust,no_run
//! use lifegame_client::{CellCoord, ClientConfig, LifeGame, MarkupBoard, SessionEnd};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = ClientConfig::new("http://localhost:5000/game/1")?;
//!     let game = LifeGame::new(config, MarkupBoard::new());
//!
//!     let (clicks, receiver) = mpsc::unbounded_channel();
//!     clicks.send(CellCoord { x: 3, y: 4 })?;
//!
//!     match game.run(receiver).await {
//!         SessionEnd::GameOver => println!("Final status: {}", game.view().await.status()),
//!         other => println!("Session ended early: {:?}", other),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Low-Level Interface
//!
//! Each step of the session is available on its own:
//!
//! ```rust,no_run
//! use lifegame_client::{ClientConfig, LifeGame, MarkupBoard, StatusOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let game = LifeGame::new(ClientConfig::from_env()?, MarkupBoard::new());
//!
//!     if game.wait_for_second_player().await
//!         && game.poll_status().await == StatusOutcome::AddCell
//!     {
//!         println!("Board: {:?}", game.view().await.rows());
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod game;
mod markup;
mod view;

pub use client::{HttpTransport, JSON_CONTENT_TYPE, Transport};
pub use config::{ClientConfig, DEFAULT_REQUEST_INTERVAL};
pub use game::{
    FATAL_EXCHANGE_MESSAGE, GAME_OVER_MESSAGE, GameEvent, LifeGame, Placement, SessionEnd,
    StatusOutcome, TURN_MESSAGE,
};
pub use markup::{CellElement, MarkupBoard};
pub use view::BoardView;

// Re-export common types for convenience
pub use lifegame_common::{models::*, protocol::*};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
