use crate::game::board::Piece;

/// Splits the two pieces between the players of a room.
///
/// The first player gets `X` or `O` depending on the seed; the second always
/// gets the other one. Reassigning after every game means the loser is not
/// stuck moving second forever.
pub fn assign_pieces(seed: u64) -> (Piece, Piece) {
    let first = if seed & 1 == 0 { Piece::X } else { Piece::O };
    (first, first.opponent())
}
