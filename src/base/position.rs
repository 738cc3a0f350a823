/// Position tracking for syntax nodes
///
/// Rows and columns are 0-indexed. Columns count bytes from the start of the
/// row, which keeps them stable under any text encoding a host chooses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

impl Point {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// The point reached after appending `text` at this point.
    pub fn advance(self, text: &str) -> Point {
        match text.rfind('\n') {
            Some(last) => Point {
                row: self.row + text.matches('\n').count(),
                column: text.len() - last - 1,
            },
            None => Point {
                row: self.row,
                column: self.column + text.len(),
            },
        }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.row + 1, self.column + 1)
    }
}
