/// Everything a key can ask the session to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    WordForward,
    WordBack,
    EnterInsert,
    /// Leave Insert mode, then format once.
    ExitInsert,
    InsertText(String),
    DeleteChar,
    Backspace,
    OpenLineAbove,
    OpenLineBelow,
    DeleteLine,
    Format,
    Run,
}
