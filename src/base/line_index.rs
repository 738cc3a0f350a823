//! Byte offset ↔ row/column conversion.

use text_size::TextSize;

use super::Point;

/// Start offsets of every line in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        line_starts.extend(
            text.match_indices('\n')
                .map(|(offset, _)| TextSize::new(offset as u32 + 1)),
        );
        Self {
            line_starts,
            len: TextSize::of(text),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn len(&self) -> TextSize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == TextSize::new(0)
    }

    /// Point of a byte offset. Offsets past the end clamp to the end.
    pub fn point(&self, offset: TextSize) -> Point {
        let offset = offset.min(self.len);
        let row = match self.line_starts.binary_search(&offset) {
            Ok(row) => row,
            Err(next) => next - 1,
        };
        Point::new(row, u32::from(offset - self.line_starts[row]) as usize)
    }

    /// Byte offset of a point, if the point lies inside the text.
    pub fn offset(&self, point: Point) -> Option<TextSize> {
        let start = *self.line_starts.get(point.row)?;
        let end = self
            .line_starts
            .get(point.row + 1)
            .map(|next| *next - TextSize::new(1))
            .unwrap_or(self.len);
        let offset = start + TextSize::new(point.column as u32);
        (offset <= end).then_some(offset)
    }
}
