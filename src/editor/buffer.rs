use ropey::Rope;
use std::fmt;
use std::ops::Range;

/// The whole document.
///
/// A buffer is a value: edits never touch it in place, they build a new
/// buffer that replaces the old one in the session. Cloning a rope shares
/// its chunks, so this stays cheap for editor-sized documents.
///
/// All positions are char offsets. Lines are separated by `'\n'` only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBuffer {
    text: Rope,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &Rope {
        &self.text
    }

    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    /// Pull an offset back into `[0, len]`.
    pub fn clamp_offset(&self, offset: usize) -> usize {
        offset.min(self.len_chars())
    }

    /// Number of lines; always at least one, and a trailing `'\n'` opens an
    /// empty last line.
    pub fn line_count(&self) -> usize {
        self.text.len_lines()
    }

    /// Number of `'\n'` strictly before `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        self.text.char_to_line(self.clamp_offset(offset))
    }

    /// Offset of the first char of `line`. Lines past the end map to the
    /// start of the last line.
    pub fn line_start(&self, line: usize) -> usize {
        let line = line.min(self.line_count() - 1);
        self.text.line_to_char(line)
    }

    /// Length of `line` in chars, not counting its newline.
    pub fn line_len(&self, line: usize) -> usize {
        if line >= self.line_count() {
            return 0;
        }
        let slice = self.text.line(line);
        let len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    /// Contents of `line` without its newline.
    pub fn line_text(&self, line: usize) -> String {
        if line >= self.line_count() {
            return String::new();
        }
        let start = self.line_start(line);
        self.text
            .slice(start..start + self.line_len(line))
            .to_string()
    }

    /// Offset of the first `'\n'` at or after `offset`, if any.
    pub fn next_newline(&self, offset: usize) -> Option<usize> {
        let line = self.line_of(offset);
        if line + 1 < self.line_count() {
            Some(self.line_start(line + 1) - 1)
        } else {
            None
        }
    }

    /// A copy of this buffer with `content` spliced in at `offset`.
    pub fn with_inserted(&self, offset: usize, content: &str) -> Self {
        let mut text = self.text.clone();
        text.insert(self.clamp_offset(offset), content);
        Self { text }
    }

    /// A copy of this buffer with the chars in `range` removed.
    pub fn with_removed(&self, range: Range<usize>) -> Self {
        let end = self.clamp_offset(range.end);
        let start = range.start.min(end);
        let mut text = self.text.clone();
        text.remove(start..end);
        Self { text }
    }
}

impl From<&str> for TextBuffer {
    fn from(source: &str) -> Self {
        Self {
            text: Rope::from_str(source),
        }
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.text.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}
