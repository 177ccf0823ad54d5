use lifegame_common::models::{CellCoord, Gameboard};

/// Presentation side of a game session.
///
/// The session driver never touches markup directly; everything it reads from or
/// writes to the page goes through this interface.
pub trait BoardView: Send + Sync + 'static {
    /// Cell states of the displayed board, row by row in display order.
    /// An empty board yields an empty matrix.
    fn read_board(&self) -> Gameboard;

    /// Replace the displayed board wholesale with server-rendered markup
    fn render_board(&mut self, fragment: &str);

    /// Mark the cell at `coord` with the presentation class the server chose
    fn set_cell_state(&mut self, coord: CellCoord, state_class: &str);

    /// Set both players' live cell counts; `None` leaves a count as displayed
    fn update_counters(&mut self, p1_cells: Option<u32>, p2_cells: Option<u32>);

    /// Bump the counter element with class `counts_class` by one, only when
    /// exactly one such element exists
    fn increment_counter(&mut self, counts_class: &str);

    fn show_status(&mut self, text: &str);

    /// Blocking notification to the player
    fn notify(&mut self, message: &str);

    /// Drop the add-cell marker from the board
    fn exit_add_cell_mode(&mut self);

    /// Whether a pointer activation on `coord` is a placement: the board is in
    /// add-cell mode and the cell is dead
    fn accepts_placement(&self, coord: CellCoord) -> bool;
}
