use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GameError;

/// Number of cells on the 3x3 grid
pub const CELL_COUNT: usize = 9;

/// The eight lines that win the game: rows, columns, diagonals
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// One of the two markers a player places on the board
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Piece {
    X,
    O,
}

impl Piece {
    /// The piece that moves first on a fresh board
    pub const OPENING: Piece = Piece::X;

    pub fn opponent(self) -> Piece {
        match self {
            Piece::X => Piece::O,
            Piece::O => Piece::X,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Piece::X => write!(f, "X"),
            Piece::O => write!(f, "O"),
        }
    }
}

/// A cell is either empty (`None`) or holds a piece. Serializes as `null`, `"X"` or `"O"`.
pub type Cell = Option<Piece>;

/// Where the game on a board stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardPhase {
    Active,
    Won(Piece),
    Draw,
}

/// Tic-tac-toe board: nine cells, whose turn it is, and whether the game is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameBoard {
    cells: [Cell; CELL_COUNT],
    turn: Piece,
    phase: BoardPhase,
}

impl Default for GameBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl GameBoard {
    pub fn new() -> Self {
        Self {
            cells: [None; CELL_COUNT],
            turn: Piece::OPENING,
            phase: BoardPhase::Active,
        }
    }

    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    pub fn turn(&self) -> Piece {
        self.turn
    }

    pub fn phase(&self) -> BoardPhase {
        self.phase
    }

    /// Places `piece` at `index`.
    ///
    /// Rejected without touching the board when the index is off the grid, the
    /// cell is taken, it is not `piece`'s turn, or the game is already over.
    /// On success the phase is updated to `Won`/`Draw` if this move ended the game;
    /// the turn is left alone, see [`GameBoard::switch_turn`].
    pub fn make_move(&mut self, index: usize, piece: Piece) -> Result<(), GameError> {
        if self.phase != BoardPhase::Active {
            return Err(GameError::IllegalMove("game is already over".to_string()));
        }
        if index >= CELL_COUNT {
            return Err(GameError::IllegalMove(format!("cell {} is off the board", index)));
        }
        if self.cells[index].is_some() {
            return Err(GameError::IllegalMove(format!("cell {} is occupied", index)));
        }
        if piece != self.turn {
            return Err(GameError::IllegalMove(format!("it is not {}'s turn", piece)));
        }

        self.cells[index] = Some(piece);

        if self.check_winner(piece) {
            self.phase = BoardPhase::Won(piece);
        } else if self.check_draw() {
            self.phase = BoardPhase::Draw;
        }
        Ok(())
    }

    /// True iff some winning line is entirely `piece`.
    pub fn check_winner(&self, piece: Piece) -> bool {
        WINNING_LINES
            .iter()
            .any(|line| line.iter().all(|&i| self.cells[i] == Some(piece)))
    }

    /// True iff the board is full and nobody has a line.
    pub fn check_draw(&self) -> bool {
        self.cells.iter().all(Option::is_some)
            && !self.check_winner(Piece::X)
            && !self.check_winner(Piece::O)
    }

    /// Hands the move to the other piece. Only legal while the game is running.
    pub fn switch_turn(&mut self) -> Result<(), GameError> {
        if self.phase != BoardPhase::Active {
            return Err(GameError::IllegalState(
                "cannot switch turn on a finished game".to_string(),
            ));
        }
        self.turn = self.turn.opponent();
        Ok(())
    }

    /// Clears the grid for a rematch. Piece ownership is the session's business.
    pub fn reset(&mut self) {
        self.cells = [None; CELL_COUNT];
        self.turn = Piece::OPENING;
        self.phase = BoardPhase::Active;
    }
}
