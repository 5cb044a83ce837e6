/// Clause currently being rendered; the top of the translator's clause stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Select,
    From,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Offset,
    Fetch,
    Insert,
    Values,
    Update,
    Set,
    Delete,
    Merge,
}

impl Clause {
    /// Whether a tuple here renders as a parenthesized row value.
    pub fn wraps_tuples(&self) -> bool {
        !matches!(self, Clause::Select | Clause::GroupBy | Clause::OrderBy)
    }
}
