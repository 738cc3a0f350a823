//! Edit descriptors

use std::ops::Range;

use crate::base::{LineIndex, Point, TextSize};

/// One text replacement, in bytes and points.
///
/// `start..old_end` in the text before the edit became `start..new_end` in
/// the text after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InputEdit {
    pub start_byte: usize,
    pub old_end_byte: usize,
    pub new_end_byte: usize,
    pub start_position: Point,
    pub old_end_position: Point,
    pub new_end_position: Point,
}

impl InputEdit {
    /// Describe replacing `range` of `old_text` with `replacement`
    pub fn replace(old_text: &str, range: Range<usize>, replacement: &str) -> InputEdit {
        let index = LineIndex::new(old_text);
        let point = |offset: usize| index.point(TextSize::new(offset as u32));
        let start_position = point(range.start);
        InputEdit {
            start_byte: range.start,
            old_end_byte: range.end,
            new_end_byte: range.start + replacement.len(),
            start_position,
            old_end_position: point(range.end),
            new_end_position: start_position.advance(replacement),
        }
    }

    /// Describe inserting `text` at `offset` of `old_text`
    pub fn insert(old_text: &str, offset: usize, text: &str) -> InputEdit {
        Self::replace(old_text, offset..offset, text)
    }

    /// Describe deleting `range` of `old_text`
    pub fn delete(old_text: &str, range: Range<usize>) -> InputEdit {
        Self::replace(old_text, range, "")
    }

    /// Change in text length
    pub fn delta(&self) -> i64 {
        self.new_end_byte as i64 - self.old_end_byte as i64
    }

    /// Where `point`, at or after the old end, lands once the edit applies
    pub(crate) fn shift_point(&self, point: Point) -> Option<Point> {
        let (old_end, new_end) = (self.old_end_position, self.new_end_position);
        if point.row == old_end.row {
            Some(Point {
                row: new_end.row,
                column: new_end.column + point.column.checked_sub(old_end.column)?,
            })
        } else {
            Some(Point {
                row: new_end.row + point.row.checked_sub(old_end.row)?,
                column: point.column,
            })
        }
    }
}
