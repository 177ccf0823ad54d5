use serde::{Deserialize, Serialize};

/// Marker class carried by the board element while dead cells are clickable
pub const ADD_CELL_MODE_CLASS: &str = "_mod-addcell";

/// Presentation class of a cell nobody owns
pub const DEAD_CELL_CLASS: &str = "cell-dead";

/// Numeric state stored on every rendered cell: `0` is dead, `n` is owned by player `n`
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CellState(pub u32);

impl CellState {
    pub const DEAD: CellState = CellState(0);

    pub fn is_dead(self) -> bool {
        self.0 == 0
    }

    /// Player owning the cell, if any
    pub fn owner(self) -> Option<u32> {
        (self.0 != 0).then_some(self.0)
    }

    /// Class the board markup uses for this state
    pub fn class_name(self) -> String {
        match self.owner() {
            None => DEAD_CELL_CLASS.to_string(),
            Some(player) => format!("cell-p{}", player),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: usize,
    pub y: usize,
}

/// Board as read from the page, indexed `board[y][x]`
pub type Gameboard = Vec<Vec<CellState>>;

/// Class of the element showing a player's live cell count
pub fn cells_counter_class(player: u32) -> String {
    format!("_p{}_cells", player)
}

/// Class of the element counting cells a player placed this round
pub fn counts_counter_class(player: u32) -> String {
    format!("_p{}_counts", player)
}
