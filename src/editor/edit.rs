use super::buffer::TextBuffer;
use super::cursor::CursorOps;

/// Result of an edit: the replacement buffer and where the cursor goes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub buffer: TextBuffer,
    pub offset: usize,
}

impl Edit {
    fn unchanged(buf: &TextBuffer, offset: usize) -> Self {
        Self {
            buffer: buf.clone(),
            offset: buf.clamp_offset(offset),
        }
    }
}

/// Editing operations (insert, delete, open line, ...).
///
/// None of these touch the input buffer. Out-of-range offsets are clamped,
/// and operations that have nothing to do return the buffer unchanged.
pub struct EditOps;

impl EditOps {
    /// Splice `content` in at the cursor and move past it.
    pub fn insert(buf: &TextBuffer, offset: usize, content: &str) -> Edit {
        let offset = buf.clamp_offset(offset);
        Edit {
            buffer: buf.with_inserted(offset, content),
            offset: offset + content.chars().count(),
        }
    }

    /// Delete the char under the cursor.
    pub fn remove_char(buf: &TextBuffer, offset: usize) -> Edit {
        if offset >= buf.len_chars() {
            return Edit::unchanged(buf, offset);
        }
        Edit {
            buffer: buf.with_removed(offset..offset + 1),
            offset,
        }
    }

    /// Delete the char before the cursor.
    pub fn backspace(buf: &TextBuffer, offset: usize) -> Edit {
        let offset = buf.clamp_offset(offset);
        if offset == 0 {
            return Edit::unchanged(buf, offset);
        }
        Edit {
            buffer: buf.with_removed(offset - 1..offset),
            offset: offset - 1,
        }
    }

    /// Open an empty line above the cursor's line and put the cursor on it.
    pub fn insert_line_before(buf: &TextBuffer, offset: usize) -> Edit {
        let start = buf.line_start(CursorOps::current_line(buf, offset));
        Edit {
            buffer: buf.with_inserted(start, "\n"),
            offset: start,
        }
    }

    /// Open an empty line below the cursor's line and put the cursor on it.
    ///
    /// On the last line there is no newline to split at, so the new one is
    /// appended at the end of the buffer.
    pub fn insert_line_after(buf: &TextBuffer, offset: usize) -> Edit {
        let at = buf
            .next_newline(buf.clamp_offset(offset))
            .unwrap_or_else(|| buf.len_chars());
        Edit {
            buffer: buf.with_inserted(at, "\n"),
            offset: at + 1,
        }
    }

    /// Remove the cursor's line together with its newline.
    ///
    /// The last line owns no newline; there the one before it goes instead,
    /// so no empty line is left behind. In that case the cursor does not stay
    /// at the former line start (clamped to the end of the buffer) but moves
    /// to the start of the line that is now last.
    pub fn delete_line(buf: &TextBuffer, offset: usize) -> Edit {
        let line = CursorOps::current_line(buf, offset);
        let start = buf.line_start(line);

        match buf.next_newline(start) {
            Some(newline) => {
                let buffer = buf.with_removed(start..newline + 1);
                let offset = buffer.clamp_offset(start);
                Edit { buffer, offset }
            }
            None if line > 0 => {
                let buffer = buf.with_removed(start - 1..buf.len_chars());
                let offset = buffer.line_start(line - 1);
                Edit { buffer, offset }
            }
            None => Edit {
                buffer: TextBuffer::new(),
                offset: 0,
            },
        }
    }
}
