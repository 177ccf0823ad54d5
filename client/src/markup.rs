use lifegame_common::models::{
    ADD_CELL_MODE_CLASS, CellCoord, CellState, DEAD_CELL_CLASS, Gameboard, cells_counter_class,
};

use crate::view::BoardView;

/// One rendered cell of the board markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellElement {
    /// From `data-x`/`data-y`; cells without both cannot be targeted
    pub coord: Option<CellCoord>,
    /// From `data-cell`
    pub state: CellState,
    pub classes: Vec<String>,
}

impl CellElement {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn is_dead(&self) -> bool {
        self.has_class(DEAD_CELL_CLASS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Counter {
    class: String,
    text: String,
}

/// In-memory model of the game page's dynamic regions: the board wrapper, the
/// status line, the counter elements and the notifications shown to the player.
///
/// Board markup is kept verbatim as the server sent it, and its structural
/// classes (`gameboard`, `row`, `cell`) and `data-*` attributes are read into a
/// cell model that later placements update in place.
#[derive(Debug, Clone, Default)]
pub struct MarkupBoard {
    fragment: String,
    add_cell_mode: bool,
    rows: Vec<Vec<CellElement>>,
    status: String,
    counters: Vec<Counter>,
    notifications: Vec<String>,
}

impl MarkupBoard {
    /// Empty board with both players' live-cell counters at zero
    pub fn new() -> Self {
        Self::default()
            .with_counter(&cells_counter_class(1), "0")
            .with_counter(&cells_counter_class(2), "0")
    }

    /// Start from a board fragment, as found in the initially served page
    pub fn with_board(mut self, fragment: &str) -> Self {
        self.render_board(fragment);
        self
    }

    /// Add a counter element carrying `class`
    pub fn with_counter(mut self, class: &str, text: &str) -> Self {
        self.counters.push(Counter {
            class: class.to_string(),
            text: text.to_string(),
        });
        self
    }

    /// Board markup exactly as last rendered
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn rows(&self) -> &[Vec<CellElement>] {
        &self.rows
    }

    pub fn cell(&self, coord: CellCoord) -> Option<&CellElement> {
        self.rows
            .iter()
            .flatten()
            .find(|cell| cell.coord == Some(coord))
    }

    pub fn is_add_cell_mode(&self) -> bool {
        self.add_cell_mode
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Text of the first counter element carrying `class`
    pub fn counter(&self, class: &str) -> Option<&str> {
        self.counters
            .iter()
            .find(|counter| counter.class == class)
            .map(|counter| counter.text.as_str())
    }

    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }

    pub fn take_notifications(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notifications)
    }

    fn set_counters(&mut self, class: &str, text: &str) {
        for counter in self.counters.iter_mut().filter(|c| c.class == class) {
            counter.text = text.to_string();
        }
    }
}

impl BoardView for MarkupBoard {
    fn read_board(&self) -> Gameboard {
        self.rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.state).collect())
            .collect()
    }

    fn render_board(&mut self, fragment: &str) {
        self.fragment = fragment.to_string();
        self.add_cell_mode = false;
        self.rows.clear();

        // Element name of the open board and how many elements of that name are open
        let mut board: Option<(String, usize)> = None;
        for tag in tags(fragment) {
            match tag {
                Tag::End(name) => {
                    if let Some((board_name, open)) = board.as_mut()
                        && *board_name == name
                    {
                        *open -= 1;
                        if *open == 0 {
                            board = None;
                        }
                    }
                }
                Tag::Start(tag) => match board.as_mut() {
                    None => {
                        if tag.has_class("gameboard") && !tag.self_closing {
                            self.add_cell_mode |= tag.has_class(ADD_CELL_MODE_CLASS);
                            board = Some((tag.name.clone(), 1));
                        }
                    }
                    Some((board_name, open)) => {
                        if tag.name == *board_name && !tag.self_closing {
                            *open += 1;
                        }
                        if tag.has_class("row") {
                            self.rows.push(Vec::new());
                        } else if tag.has_class("cell")
                            && let Some(row) = self.rows.last_mut()
                        {
                            row.push(tag.into_cell());
                        }
                    }
                },
            }
        }
    }

    fn set_cell_state(&mut self, coord: CellCoord, state_class: &str) {
        let Some(cell) = self
            .rows
            .iter_mut()
            .flatten()
            .find(|cell| cell.coord == Some(coord))
        else {
            return;
        };

        cell.classes.retain(|class| class != DEAD_CELL_CLASS);
        for class in state_class.split_whitespace() {
            if !cell.has_class(class) {
                cell.classes.push(class.to_string());
            }
        }
    }

    fn update_counters(&mut self, p1_cells: Option<u32>, p2_cells: Option<u32>) {
        if let Some(count) = p1_cells {
            self.set_counters(&cells_counter_class(1), &count.to_string());
        }
        if let Some(count) = p2_cells {
            self.set_counters(&cells_counter_class(2), &count.to_string());
        }
    }

    /// A counter whose text is not an integer is left as displayed rather
    /// than turned into `NaN`
    fn increment_counter(&mut self, counts_class: &str) {
        let mut matching = self.counters.iter_mut().filter(|c| c.class == counts_class);
        let (Some(counter), None) = (matching.next(), matching.next()) else {
            return;
        };

        if let Ok(value) = counter.text.trim().parse::<i64>() {
            counter.text = (value + 1).to_string();
        }
    }

    fn show_status(&mut self, text: &str) {
        self.status = text.to_string();
    }

    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_string());
    }

    fn exit_add_cell_mode(&mut self) {
        self.add_cell_mode = false;
    }

    fn accepts_placement(&self, coord: CellCoord) -> bool {
        self.add_cell_mode && self.cell(coord).is_some_and(CellElement::is_dead)
    }
}

/// Attributes of one start tag
struct StartTag {
    name: String,
    self_closing: bool,
    attributes: Vec<(String, String)>,
}

enum Tag {
    Start(StartTag),
    /// Lowercased element name
    End(String),
}

impl StartTag {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    fn into_cell(self) -> CellElement {
        let parse = |name| self.attr(name).and_then(|v| v.trim().parse().ok());
        let coord = match (parse("data-x"), parse("data-y")) {
            (Some(x), Some(y)) => Some(CellCoord { x, y }),
            _ => None,
        };
        let state = self
            .attr("data-cell")
            .and_then(|v| v.trim().parse().ok())
            .map(CellState)
            .unwrap_or(CellState::DEAD);
        let classes = self
            .attr("class")
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        CellElement {
            coord,
            state,
            classes,
        }
    }
}

/// Start and end tags of `markup` in document order; comments and
/// declarations are skipped
fn tags(markup: &str) -> Vec<Tag> {
    let mut tags = Vec::new();
    let mut rest = markup;

    while let Some(open) = rest.find('<') {
        rest = &rest[open + 1..];

        if let Some(comment) = rest.strip_prefix("!--") {
            rest = comment.find("-->").map_or("", |end| &comment[end + 3..]);
            continue;
        }

        let end = tag_end(rest).unwrap_or(rest.len());
        let inner = &rest[..end];
        rest = rest.get(end + 1..).unwrap_or("");

        if let Some(closing) = inner.strip_prefix('/') {
            tags.push(Tag::End(tag_name(closing)));
        } else if !inner.starts_with(['!', '?']) {
            tags.push(Tag::Start(StartTag {
                name: tag_name(inner),
                self_closing: inner.trim_end().ends_with('/'),
                attributes: parse_attributes(inner),
            }));
        }
    }

    tags
}

fn tag_name(tag: &str) -> String {
    let tag = tag.trim_start();
    let end = tag
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(tag.len());
    tag[..end].to_ascii_lowercase()
}

fn tag_end(tag: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in tag.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, '>') => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_attributes(tag: &str) -> Vec<(String, String)> {
    let name_end = tag
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(tag.len());
    let mut rest = &tag[name_end..];
    let mut attributes = Vec::new();

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
        if rest.is_empty() {
            break;
        }

        let name_end = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '/')
            .unwrap_or(rest.len());
        let name = rest[..name_end].to_ascii_lowercase();
        rest = rest[name_end..].trim_start();

        let mut value = String::new();
        if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            match after_eq.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let body = &after_eq[1..];
                    let close = body.find(quote).unwrap_or(body.len());
                    value = body[..close].to_string();
                    rest = body.get(close + 1..).unwrap_or("");
                }
                _ => {
                    let end = after_eq
                        .find(char::is_whitespace)
                        .unwrap_or(after_eq.len());
                    value = after_eq[..end].to_string();
                    rest = &after_eq[end..];
                }
            }
        }

        if !name.is_empty() {
            attributes.push((name, value));
        }
    }

    attributes
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD: &str = r#"<table class="gameboard _mod-addcell">
  <tr class="row">
    <td class="cell cell-dead" data-cell="0" data-x="0" data-y="0"></td>
    <td class="cell cell-p1" data-cell="1" data-x="1" data-y="0"></td>
  </tr>
  <!-- <tr class="row"><td class="cell" data-cell="9"></td></tr> -->
  <tr class="row">
    <td class="cell cell-p2" data-cell="2" data-x="0" data-y="1"></td>
    <td class='cell cell-dead' data-cell=0 data-x=1 data-y=1></td>
  </tr>
</table>"#;

    fn coord(x: usize, y: usize) -> CellCoord {
        CellCoord { x, y }
    }

    #[test]
    fn reads_cells_row_by_row() {
        let board = MarkupBoard::new().with_board(BOARD);
        assert_eq!(
            board.read_board(),
            vec![
                vec![CellState(0), CellState(1)],
                vec![CellState(2), CellState(0)],
            ]
        );
        assert!(board.is_add_cell_mode());
        assert_eq!(board.fragment(), BOARD);
    }

    #[test]
    fn empty_board_reads_as_empty_matrix() {
        assert!(MarkupBoard::new().read_board().is_empty());

        let board = MarkupBoard::new().with_board(r#"<table class="gameboard"></table>"#);
        assert!(board.read_board().is_empty());
        assert!(!board.is_add_cell_mode());
    }

    #[test]
    fn rows_outside_the_board_are_ignored() {
        let board = MarkupBoard::new()
            .with_board(r#"<div class="row"><span class="cell" data-cell="1"></span></div>"#);
        assert!(board.read_board().is_empty());
    }

    #[test]
    fn rows_after_the_board_closes_are_ignored() {
        let board = MarkupBoard::new().with_board(
            r#"<table class="gameboard"><tr class="row"><td class="cell" data-cell="1"></td></tr></table><div class="row"><span class="cell" data-cell="2"></span></div>"#,
        );
        assert_eq!(board.read_board(), vec![vec![CellState(1)]]);
    }

    #[test]
    fn nested_elements_of_the_board_kind_keep_it_open() {
        let board = MarkupBoard::new().with_board(
            r#"<div class="gameboard"><div class="row"><div class="cell" data-cell="1"></div><div class="cell" data-cell="2"></div></div><div class="row"><div class="cell" data-cell="0"></div></div></div><div class="row"></div>"#,
        );
        assert_eq!(
            board.read_board(),
            vec![vec![CellState(1), CellState(2)], vec![CellState(0)]]
        );
    }

    #[test]
    fn non_numeric_state_reads_as_dead() {
        let board = MarkupBoard::new().with_board(
            r#"<div class="gameboard"><div class="row"><div class="cell" data-cell="x"></div></div></div>"#,
        );
        assert_eq!(board.read_board(), vec![vec![CellState::DEAD]]);
        assert_eq!(board.rows()[0][0].coord, None);
    }

    #[test]
    fn rendering_replaces_previous_board() {
        let mut board = MarkupBoard::new().with_board(BOARD);
        let replacement = r#"<table class="gameboard"><tr class="row"><td class="cell cell-p1" data-cell="1" data-x="0" data-y="0"></td></tr></table>"#;

        board.render_board(replacement);

        assert_eq!(board.fragment(), replacement);
        assert_eq!(board.read_board(), vec![vec![CellState(1)]]);
        assert!(!board.is_add_cell_mode());
    }

    #[test]
    fn only_dead_cells_accept_placement_in_add_cell_mode() {
        let mut board = MarkupBoard::new().with_board(BOARD);
        assert!(board.accepts_placement(coord(0, 0)));
        assert!(board.accepts_placement(coord(1, 1)));
        assert!(!board.accepts_placement(coord(1, 0)));
        assert!(!board.accepts_placement(coord(5, 5)));

        board.exit_add_cell_mode();
        assert!(!board.accepts_placement(coord(0, 0)));
    }

    #[test]
    fn set_cell_state_swaps_dead_class() {
        let mut board = MarkupBoard::new().with_board(BOARD);
        board.set_cell_state(coord(0, 0), "cell-p1");

        let cell = board.cell(coord(0, 0)).unwrap();
        assert!(!cell.is_dead());
        assert!(cell.has_class("cell-p1"));
        // Only the class changes; the stored state is refreshed by the next render
        assert_eq!(cell.state, CellState::DEAD);
        assert!(!board.accepts_placement(coord(0, 0)));
    }

    #[test]
    fn counters_update_all_matching_elements() {
        let mut board = MarkupBoard::new();
        board.update_counters(Some(12), None);
        assert_eq!(board.counter("_p1_cells"), Some("12"));
        assert_eq!(board.counter("_p2_cells"), Some("0"));
    }

    #[test]
    fn increment_needs_exactly_one_counter() {
        let mut board = MarkupBoard::new()
            .with_counter("_p1_counts", "4")
            .with_counter("_p2_counts", "1")
            .with_counter("_p2_counts", "1");

        board.increment_counter("_p1_counts");
        board.increment_counter("_p2_counts");
        board.increment_counter("_p3_counts");

        assert_eq!(board.counter("_p1_counts"), Some("5"));
        assert_eq!(board.counter("_p2_counts"), Some("1"));
        assert_eq!(board.counter("_p3_counts"), None);
    }

    #[test]
    fn non_numeric_counter_is_left_as_displayed() {
        let mut board = MarkupBoard::new().with_counter("_p1_counts", "n/a");
        board.increment_counter("_p1_counts");
        assert_eq!(board.counter("_p1_counts"), Some("n/a"));
    }

    #[test]
    fn notifications_are_collected_until_taken() {
        let mut board = MarkupBoard::new();
        board.notify("first");
        board.notify("second");
        assert_eq!(board.take_notifications(), vec!["first", "second"]);
        assert!(board.notifications().is_empty());
    }

    #[test]
    fn attributes_parse_in_all_quoting_styles() {
        let tags = tags(r#"<td data-a="1" data-b='two words' data-c=3 disabled/>"#);
        let Tag::Start(tag) = &tags[0] else {
            panic!("expected a start tag");
        };
        assert_eq!(tag.name, "td");
        assert!(tag.self_closing);
        assert_eq!(tag.attr("data-a"), Some("1"));
        assert_eq!(tag.attr("data-b"), Some("two words"));
        assert_eq!(tag.attr("data-c"), Some("3"));
        assert_eq!(tag.attr("disabled"), Some(""));
    }
}
