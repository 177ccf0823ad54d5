use std::sync::Arc;

use lifegame_common::{
    models::CellCoord,
    protocol::{ActionRequest, ActionResponse, NextAction},
};
use serde_json::Value;
use tokio::sync::{RwLock, RwLockReadGuard, mpsc};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::{BoardView, ClientConfig, HttpTransport, Result, Transport};

/// Shown when a reply cannot be decoded; the affected chain stops for good
pub const FATAL_EXCHANGE_MESSAGE: &str = "Something went wrong! Try reloading the page";
pub const TURN_MESSAGE: &str = "Your turn to add cells! Good luck!";
pub const GAME_OVER_MESSAGE: &str = "Game over! Thanks for playing!";

/// Events emitted by a game session, after the view has been updated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// The second player is in the game
    PlayerJoined { name: Option<String> },
    /// The status text changed
    StatusUpdated { status: String },
    /// The board was re-rendered from server markup
    BoardReplaced,
    /// This player may place cells now
    TurnStarted,
    CellPlaced { coord: CellCoord },
    PlacementRejected { message: String },
    GameOver,
    /// A reply could not be decoded
    ConnectionLost,
}

/// How a status poll ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutcome {
    /// Control passed to the placement handler
    AddCell,
    GameOver,
    /// The server named an action this client does not handle
    Stalled,
    Halted,
}

/// Result of a pointer activation on a cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Not a placement; nothing was sent
    Ignored,
    /// The server refused the cell; board and mode are unchanged
    Rejected { message: String },
    /// The cell was placed and the status poll should resume
    Resume,
    /// The cell was placed and the board stays in add-cell mode
    Continue,
    Halted,
}

/// How a whole session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    GameOver,
    /// Status poll stopped on an action this client does not handle
    Stalled,
    /// A reply could not be decoded
    Halted,
    /// The click channel closed while placements were expected
    Detached,
}

/// One player's view of a running game, driven by polling the game page
pub struct LifeGame<T: Transport, V: BoardView> {
    transport: Arc<T>,
    view: Arc<RwLock<V>>,
    config: ClientConfig,
    event_sender: RwLock<Option<mpsc::UnboundedSender<GameEvent>>>,
    last_status: RwLock<Option<String>>,
}

impl<V: BoardView> LifeGame<HttpTransport, V> {
    /// Create a session posting to the configured game page over HTTP
    pub fn new(config: ClientConfig, view: V) -> Self {
        let transport = HttpTransport::new(config.game_url.clone());
        Self::with_transport(transport, view, config)
    }
}

impl<T: Transport, V: BoardView> LifeGame<T, V> {
    pub fn with_transport(transport: T, view: V, config: ClientConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            view: Arc::new(RwLock::new(view)),
            config,
            event_sender: RwLock::new(None),
            last_status: RwLock::new(None),
        }
    }

    /// Subscribe to game events. Returns a receiver for game events.
    pub async fn subscribe_to_events(&self) -> mpsc::UnboundedReceiver<GameEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        *self.event_sender.write().await = Some(sender);
        receiver
    }

    pub async fn view(&self) -> RwLockReadGuard<'_, V> {
        self.view.read().await
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn emit(&self, event: GameEvent) {
        if let Some(ref sender) = *self.event_sender.read().await {
            let _ = sender.send(event);
        }
    }

    /// Post `request` and decode the reply.
    ///
    /// Any failure shows the fatal notification once and yields `None`; the caller
    /// must stop its chain.
    pub async fn exchange(&self, request: &ActionRequest) -> Option<ActionResponse> {
        match self.try_exchange(request).await {
            Ok(response) => Some(response),
            Err(e) => {
                warn!("{} request failed: {}", request.name(), e);
                self.view.write().await.notify(FATAL_EXCHANGE_MESSAGE);
                self.emit(GameEvent::ConnectionLost).await;
                None
            }
        }
    }

    async fn try_exchange(&self, request: &ActionRequest) -> Result<ActionResponse> {
        let body = serde_json::to_string(request)?;
        debug!("Sending {}", body);

        let reply = self.transport.post(body).await?;
        // Only a body that is not JSON at all is fatal
        let value: Value = serde_json::from_str(&reply)?;
        let response = ActionResponse::from_json(&value);
        debug!("Received {} reply: {:?}", request.name(), response);

        Ok(response)
    }

    /// Repeat `check_p2` until the second player is in the game.
    /// Returns `false` if the chain was halted.
    pub async fn wait_for_second_player(&self) -> bool {
        info!("Waiting for the second player");

        loop {
            let Some(response) = self.exchange(&ActionRequest::CheckP2).await else {
                return false;
            };

            if response.p2_ingame {
                info!(
                    "Second player joined: {}",
                    response.p2_name.as_deref().unwrap_or("unknown")
                );
                self.emit(GameEvent::PlayerJoined {
                    name: response.p2_name,
                })
                .await;
                return true;
            }

            sleep(self.config.request_interval).await;
        }
    }

    /// Poll `get_status` with the displayed board until the phase changes
    pub async fn poll_status(&self) -> StatusOutcome {
        loop {
            let gameboard = self.view.read().await.read_board();
            let request = ActionRequest::GetStatus { gameboard };
            let Some(response) = self.exchange(&request).await else {
                return StatusOutcome::Halted;
            };

            self.apply_status(&response).await;

            match response.next_action {
                Some(NextAction::Wait) => sleep(self.config.request_interval).await,
                Some(NextAction::AddCell) => {
                    info!("Turn started");
                    self.view.write().await.notify(TURN_MESSAGE);
                    self.emit(GameEvent::TurnStarted).await;
                    return StatusOutcome::AddCell;
                }
                Some(NextAction::GameOver) => {
                    info!("Game over");
                    self.view.write().await.notify(GAME_OVER_MESSAGE);
                    self.emit(GameEvent::GameOver).await;
                    return StatusOutcome::GameOver;
                }
                other => {
                    debug!("Status poll stopped on next action {:?}", other);
                    return StatusOutcome::Stalled;
                }
            }
        }
    }

    async fn apply_status(&self, response: &ActionResponse) {
        let replaced = {
            let mut view = self.view.write().await;
            if let Some(ref status) = response.status {
                view.show_status(status);
            }
            view.update_counters(response.p1_cells, response.p2_cells);

            match response.board_fragment() {
                Some(fragment) => {
                    view.render_board(fragment);
                    true
                }
                None => false,
            }
        };

        if let Some(ref status) = response.status {
            self.status_changed(status).await;
        }
        if replaced {
            debug!("Board replaced from server markup");
            self.emit(GameEvent::BoardReplaced).await;
        }
    }

    async fn status_changed(&self, status: &str) {
        {
            let mut last_status = self.last_status.write().await;
            if last_status.as_deref() == Some(status) {
                return;
            }
            *last_status = Some(status.to_string());
        }
        self.emit(GameEvent::StatusUpdated {
            status: status.to_string(),
        })
        .await;
    }

    /// Handle a pointer activation on the cell at `coord`
    pub async fn place_cell(&self, coord: CellCoord) -> Placement {
        if !self.view.read().await.accepts_placement(coord) {
            debug!("Ignoring click on ({}, {})", coord.x, coord.y);
            return Placement::Ignored;
        }

        let request = ActionRequest::AddCell {
            cell_x: coord.x,
            cell_y: coord.y,
        };
        let Some(response) = self.exchange(&request).await else {
            return Placement::Halted;
        };

        if response.error {
            let message = response.message.unwrap_or_default();
            info!("Cell ({}, {}) rejected: {}", coord.x, coord.y, message);
            self.view.write().await.notify(&message);
            self.emit(GameEvent::PlacementRejected {
                message: message.clone(),
            })
            .await;
            return Placement::Rejected { message };
        }

        {
            let mut view = self.view.write().await;
            if let Some(ref counts_class) = response.counts_class {
                view.increment_counter(counts_class);
            }
            view.set_cell_state(coord, response.cell_class.as_deref().unwrap_or_default());
            if let Some(ref status) = response.status {
                view.show_status(status);
            }
        }
        debug!("Placed cell ({}, {})", coord.x, coord.y);
        self.emit(GameEvent::CellPlaced { coord }).await;
        if let Some(ref status) = response.status {
            self.status_changed(status).await;
        }

        match response.next_action {
            Some(NextAction::Wait) => {
                self.view.write().await.exit_add_cell_mode();
                if response.send_gen_move {
                    self.request_gen_move();
                }
                Placement::Resume
            }
            // Only `wait` ends the placement round
            _ => Placement::Continue,
        }
    }

    /// Ask the server to run the generations step. The request is sent and
    /// discarded: its reply, or failure, is never observed.
    pub fn request_gen_move(&self) {
        let transport = Arc::clone(&self.transport);
        let Ok(body) = serde_json::to_string(&ActionRequest::GenMove) else {
            return;
        };

        debug!("Sending {}", body);
        tokio::spawn(async move {
            let _ = transport.post(body).await;
        });
    }

    /// Run the session: wait for the second player, then alternate status
    /// polling with placement rounds fed from `clicks` until the game ends.
    pub async fn run(&self, mut clicks: mpsc::UnboundedReceiver<CellCoord>) -> SessionEnd {
        if !self.wait_for_second_player().await {
            return SessionEnd::Halted;
        }

        loop {
            match self.poll_status().await {
                StatusOutcome::AddCell => {}
                StatusOutcome::GameOver => return SessionEnd::GameOver,
                StatusOutcome::Stalled => return SessionEnd::Stalled,
                StatusOutcome::Halted => return SessionEnd::Halted,
            }

            // Clicks made while polling hit a board that took no placements
            while let Ok(stale) = clicks.try_recv() {
                debug!("Discarding click on ({}, {}) made while polling", stale.x, stale.y);
            }

            loop {
                let Some(coord) = clicks.recv().await else {
                    info!("Click source closed, leaving the game");
                    return SessionEnd::Detached;
                };

                match self.place_cell(coord).await {
                    Placement::Resume => break,
                    Placement::Halted => return SessionEnd::Halted,
                    Placement::Ignored | Placement::Rejected { .. } | Placement::Continue => {}
                }
            }

            sleep(self.config.request_interval).await;
        }
    }
}
