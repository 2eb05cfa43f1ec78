/*!
Fixed-size subsets of a slice, in lexicographic order of positions.
*/

/// Iterator over every `size`-element subset of `pool`.
///
/// Subsets keep the relative order of `pool`, so subsets of a sorted slice are
/// sorted as well.
pub struct Combinations<'a, T> {
    pool: &'a [T],
    indices: Vec<usize>,
    exhausted: bool,
}

pub fn combinations<T: Copy>(pool: &[T], size: usize) -> Combinations<'_, T> {
    Combinations {
        pool,
        indices: (0..size).collect(),
        exhausted: size > pool.len(),
    }
}

impl<'a, T> Combinations<'a, T> {
    /// Advances `indices` to the next subset, returning false after the last.
    fn advance(&mut self) -> bool {
        let size = self.indices.len();
        let n = self.pool.len();

        // rightmost position that has not reached its final value
        let position = match (0..size).rev().find(|&i| self.indices[i] != i + n - size) {
            Some(position) => position,
            None => return false,
        };

        self.indices[position] += 1;
        for i in position + 1..size {
            self.indices[i] = self.indices[i - 1] + 1;
        }
        true
    }
}

impl<'a, T: Copy> Iterator for Combinations<'a, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let subset = self.indices.iter().map(|&i| self.pool[i]).collect();
        self.exhausted = !self.advance();
        Some(subset)
    }
}
