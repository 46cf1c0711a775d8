//! Cursor + viewport tracking for the list screens.

/// Number of rows visible at once in every list screen.
pub const WINDOW: usize = 10;

/// A selection cursor over a list too long for the screen.
///
/// `offset` is the index of the first visible row; the visible window is
/// `offset..offset + WINDOW`. The selection never wraps and the window
/// follows it so the selected row stays in view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListCursor {
    pub selected: usize,
    pub offset: usize,
}

impl ListCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
        self.follow();
    }

    pub fn down(&mut self, len: usize) {
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
        self.follow();
    }

    /// Reset after the backing list is reloaded.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Clamp the selection after items were removed from the list.
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.reset();
            return;
        }
        if self.selected >= len {
            self.selected = len - 1;
        }
        self.follow();
    }

    fn follow(&mut self) {
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + WINDOW {
            self.offset = self.selected - WINDOW + 1;
        }
    }

    /// Range of indices currently in view.
    pub fn window(&self, len: usize) -> std::ops::Range<usize> {
        let end = (self.offset + WINDOW).min(len);
        self.offset.min(end)..end
    }

    /// Rows hidden above the window.
    pub fn hidden_above(&self) -> usize {
        self.offset
    }

    /// Rows hidden below the window.
    pub fn hidden_below(&self, len: usize) -> usize {
        len.saturating_sub(self.offset + WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn up_at_top_is_a_no_op() {
        let mut cursor = ListCursor::new();
        cursor.up();
        assert_eq!(cursor, ListCursor { selected: 0, offset: 0 });
    }

    #[test]
    fn down_at_bottom_is_a_no_op() {
        let mut cursor = ListCursor::new();
        for _ in 0..5 {
            cursor.down(3);
        }
        assert_eq!(cursor.selected, 2);
    }

    #[test]
    fn down_on_empty_list_stays_put() {
        let mut cursor = ListCursor::new();
        cursor.down(0);
        assert_eq!(cursor, ListCursor::default());
    }

    #[test]
    fn window_follows_selection_downward() {
        let mut cursor = ListCursor::new();
        for _ in 0..15 {
            cursor.down(25);
        }
        assert_eq!(cursor.selected, 15);
        assert_eq!(cursor.offset, 6);
        assert!(cursor.window(25).contains(&15));
    }

    #[test]
    fn window_follows_selection_back_up() {
        let mut cursor = ListCursor::new();
        for _ in 0..15 {
            cursor.down(25);
        }
        for _ in 0..15 {
            cursor.up();
        }
        assert_eq!(cursor.selected, 0);
        assert_eq!(cursor.offset, 0);
    }

    #[test]
    fn clamp_after_shrink() {
        let mut cursor = ListCursor::new();
        for _ in 0..15 {
            cursor.down(25);
        }
        cursor.clamp(10);
        assert_eq!(cursor.selected, 9);
        assert!(cursor.window(10).contains(&9));
    }

    #[test]
    fn clamp_to_empty_resets() {
        let mut cursor = ListCursor { selected: 7, offset: 3 };
        cursor.clamp(0);
        assert_eq!(cursor, ListCursor::default());
    }

    #[test]
    fn hidden_counts() {
        let mut cursor = ListCursor::new();
        for _ in 0..15 {
            cursor.down(25);
        }
        assert_eq!(cursor.hidden_above(), 6);
        assert_eq!(cursor.hidden_below(25), 9);
    }
}
