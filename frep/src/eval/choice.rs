/// Which operands of a `min`, `max`, or `mul` clause decide its result over
/// the current box
///
/// Only `Both` evaluates the clause; `Left` and `Right` copy one operand and
/// let the other operand's subtree be skipped.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Choice {
    /// The left operand always decides the result
    Left,
    /// The right operand always decides the result
    Right,
    /// Either operand may decide the result
    #[default]
    Both,
}

impl Choice {
    /// Checks whether the left operand still contributes
    pub fn uses_left(self) -> bool {
        self != Choice::Right
    }

    /// Checks whether the right operand still contributes
    pub fn uses_right(self) -> bool {
        self != Choice::Left
    }
}
