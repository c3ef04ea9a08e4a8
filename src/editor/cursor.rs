use super::buffer::TextBuffer;

/// Cursor math and motions.
///
/// The cursor is nothing but a char offset into the buffer; line and column
/// are derived from it every time they are needed. Every motion is total
/// over `0..=len` and clamps instead of failing.
pub struct CursorOps;

impl CursorOps {
    /// Number of newlines before `offset`.
    pub fn current_line(buf: &TextBuffer, offset: usize) -> usize {
        buf.line_of(offset)
    }

    /// Distance from the start of the cursor's line.
    pub fn current_column(buf: &TextBuffer, offset: usize) -> usize {
        let offset = buf.clamp_offset(offset);
        offset - buf.line_start(buf.line_of(offset))
    }

    /// Offset for `(line, column)`, with the column clamped to the line.
    pub fn offset_at(buf: &TextBuffer, line: usize, column: usize) -> usize {
        let line = line.min(buf.line_count() - 1);
        buf.line_start(line) + column.min(buf.line_len(line))
    }

    pub fn move_right(buf: &TextBuffer, offset: usize) -> usize {
        (offset + 1).min(buf.len_chars())
    }

    pub fn move_left(buf: &TextBuffer, offset: usize) -> usize {
        buf.clamp_offset(offset).saturating_sub(1)
    }

    pub fn move_down(buf: &TextBuffer, offset: usize) -> usize {
        let offset = buf.clamp_offset(offset);
        let line = buf.line_of(offset);
        if line + 1 >= buf.line_count() {
            return offset;
        }
        Self::offset_at(buf, line + 1, Self::current_column(buf, offset))
    }

    pub fn move_up(buf: &TextBuffer, offset: usize) -> usize {
        let offset = buf.clamp_offset(offset);
        let line = buf.line_of(offset);
        if line == 0 {
            return offset;
        }
        Self::offset_at(buf, line - 1, Self::current_column(buf, offset))
    }

    /// Word chars are alphanumerics and `_`; anything else separates words.
    pub fn is_word_char(c: char) -> bool {
        c.is_alphanumeric() || c == '_'
    }

    /// Jump to the start of the next word, or to the end of the buffer when
    /// there is none.
    pub fn jump_word_forward(buf: &TextBuffer, offset: usize) -> usize {
        let len = buf.len_chars();
        let mut pos = buf.clamp_offset(offset);
        if pos >= len {
            return len;
        }

        let mut chars = buf.text().chars_at(pos).peekable();
        while chars.next_if(|&c| Self::is_word_char(c)).is_some() {
            pos += 1;
        }
        while chars.next_if(|&c| !Self::is_word_char(c)).is_some() {
            pos += 1;
        }
        pos
    }

    /// Jump to the start of the word before the cursor (or the one the
    /// cursor is inside).
    pub fn jump_word_back(buf: &TextBuffer, offset: usize) -> usize {
        let mut pos = buf.clamp_offset(offset);
        if pos == 0 {
            return 0;
        }

        let mut chars = buf.text().chars_at(pos).reversed().peekable();
        while chars.next_if(|&c| !Self::is_word_char(c)).is_some() {
            pos -= 1;
        }
        while chars.next_if(|&c| Self::is_word_char(c)).is_some() {
            pos -= 1;
        }
        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(s: &str) -> TextBuffer {
        TextBuffer::from(s)
    }

    #[test]
    fn test_line_and_column() {
        let b = buf("let a = 1;\nlet bc = 2;\n\nx");
        assert_eq!(CursorOps::current_line(&b, 0), 0);
        assert_eq!(CursorOps::current_column(&b, 0), 0);
        assert_eq!(CursorOps::current_line(&b, 10), 0);
        assert_eq!(CursorOps::current_column(&b, 10), 10);
        assert_eq!(CursorOps::current_line(&b, 15), 1);
        assert_eq!(CursorOps::current_column(&b, 15), 4);
        assert_eq!(CursorOps::current_line(&b, 23), 2);
        assert_eq!(CursorOps::current_column(&b, 23), 0);
        assert_eq!(CursorOps::current_line(&b, 24), 3);
        assert_eq!(CursorOps::current_column(&b, 25), 1);
    }

    #[test]
    fn test_line_column_round_trip_for_every_offset() {
        let b = buf("fn\n\nconst value = 42;\n  return value\n");
        for offset in 0..=b.len_chars() {
            let line = CursorOps::current_line(&b, offset);
            let column = CursorOps::current_column(&b, offset);
            let back = CursorOps::offset_at(&b, line, column);
            assert_eq!(back, offset, "offset {offset} -> ({line}, {column})");
            assert_eq!(CursorOps::current_line(&b, back), line);
        }
    }

    #[test]
    fn test_right_left_are_inverse_inside_buffer() {
        let b = buf("ab\ncd");
        for offset in 0..b.len_chars() {
            let right = CursorOps::move_right(&b, offset);
            assert_eq!(CursorOps::move_left(&b, right), offset);
        }
        for offset in 1..=b.len_chars() {
            let left = CursorOps::move_left(&b, offset);
            assert_eq!(CursorOps::move_right(&b, left), offset);
        }
    }

    #[test]
    fn test_right_left_idempotent_at_boundaries() {
        let b = buf("abc");
        assert_eq!(CursorOps::move_right(&b, 3), 3);
        assert_eq!(CursorOps::move_right(&b, CursorOps::move_right(&b, 3)), 3);
        assert_eq!(CursorOps::move_left(&b, 0), 0);
        assert_eq!(CursorOps::move_left(&b, CursorOps::move_left(&b, 0)), 0);
    }

    #[test]
    fn test_move_down_keeps_column() {
        let b = buf("abcdef\nghijkl");
        assert_eq!(CursorOps::move_down(&b, 3), 10);
    }

    #[test]
    fn test_move_down_clamps_to_shorter_line() {
        let b = buf("abcdef\ngh\nijklmn");
        assert_eq!(CursorOps::move_down(&b, 5), 9);
        assert_eq!(CursorOps::move_down(&b, 9), 12);
    }

    #[test]
    fn test_move_down_on_last_line_stays() {
        let b = buf("abc\ndef");
        assert_eq!(CursorOps::move_down(&b, 5), 5);
        assert_eq!(CursorOps::move_down(&b, 7), 7);
    }

    #[test]
    fn test_move_up_keeps_and_clamps_column() {
        let b = buf("ab\ncdefg");
        assert_eq!(CursorOps::move_up(&b, 4), 1);
        assert_eq!(CursorOps::move_up(&b, 7), 2);
    }

    #[test]
    fn test_move_up_on_first_line_stays() {
        let b = buf("abc\ndef");
        assert_eq!(CursorOps::move_up(&b, 2), 2);
        assert_eq!(CursorOps::move_up(&b, 0), 0);
    }

    #[test]
    fn test_move_down_into_empty_line() {
        let b = buf("abc\n\ndef");
        assert_eq!(CursorOps::move_down(&b, 2), 4);
        assert_eq!(CursorOps::move_down(&b, 4), 5);
    }

    #[test]
    fn test_word_forward_skips_separator_runs() {
        let b = buf("foo   bar");
        assert_eq!(CursorOps::jump_word_forward(&b, 0), 6);
        assert_eq!(CursorOps::jump_word_forward(&b, 4), 6);

        let b = buf("call(a, b);\nnext");
        assert_eq!(CursorOps::jump_word_forward(&b, 0), 5);
        assert_eq!(CursorOps::jump_word_forward(&b, 5), 8);
        assert_eq!(CursorOps::jump_word_forward(&b, 8), 12);
    }

    #[test]
    fn test_word_forward_at_end_is_noop() {
        let b = buf("foo bar");
        assert_eq!(CursorOps::jump_word_forward(&b, 7), 7);
        assert_eq!(CursorOps::jump_word_forward(&b, 5), 7);
    }

    #[test]
    fn test_word_back_lands_on_word_start() {
        let b = buf("foo   bar_baz");
        assert_eq!(CursorOps::jump_word_back(&b, 13), 6);
        assert_eq!(CursorOps::jump_word_back(&b, 6), 0);
        assert_eq!(CursorOps::jump_word_back(&b, 2), 0);
    }

    #[test]
    fn test_word_back_at_start_is_noop() {
        let b = buf("  foo");
        assert_eq!(CursorOps::jump_word_back(&b, 0), 0);
        assert_eq!(CursorOps::jump_word_back(&b, 2), 0);
    }

    #[test]
    fn test_word_forward_then_back_never_passes_start() {
        let b = buf("const total = items.map((x) => x * 2);");
        for offset in 0..=b.len_chars() {
            let forward = CursorOps::jump_word_forward(&b, offset);
            let back = CursorOps::jump_word_back(&b, forward);
            assert!(
                back <= offset || forward == offset,
                "offset {offset}: forward {forward}, back {back}"
            );
        }
    }

    #[test]
    fn test_word_motions_handle_unicode_words() {
        let b = buf("größe = 1");
        assert_eq!(CursorOps::jump_word_forward(&b, 0), 8);
        assert_eq!(CursorOps::jump_word_back(&b, 8), 0);
    }
}
