//! Template constants.

/// Separator between the two corners of a span (`"F6:AJ11"`).
pub const C_RANGE_SEPARATOR: char = ':';
/// Cell label grammar: column letters then row digits, optional `$` markers.
pub const C_CELL_LABEL_PATTERN: &str = r"^\$?([A-Za-z]{1,3})\$?([0-9]+)$";
/// Alphabet size used by column letters.
pub const N_COL_LETTERS_RADIX: u32 = 26;

/// Anchor `(row, col)` used by positional fills when no cell is given (`A1`).
pub const TUP_DEFAULT_ANCHOR: (u32, u32) = (1, 1);
