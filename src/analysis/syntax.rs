//! TypeScript parsing with tree-sitter and token extraction for the
//! highlighter.
//!
//! Tokens come from the leaves of the parse tree. Text between leaves
//! (whitespace, or anything error recovery skipped) is filled in, so the
//! tokens of a source always concatenate back to it.

use anyhow::{Context, Result};
use tree_sitter::{Node, Parser, Tree};

use super::{Token, TokenKind};

/// Nodes emitted as one token instead of being split into their children.
const ATOMIC_NODES: &[&str] = &[
    "comment",
    "html_comment",
    "hash_bang_line",
    "string",
    "regex",
    "number",
    "predefined_type",
];

/// Named leaves that read as keywords.
const KEYWORD_LEAVES: &[&str] = &[
    "this",
    "super",
    "true",
    "false",
    "null",
    "undefined",
    "import",
];

pub struct TypeScriptParser {
    parser: Parser,
}

impl TypeScriptParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .context("Failed to load the TypeScript grammar")?;
        Ok(Self { parser })
    }

    pub fn parse(&mut self, source: &str) -> Option<Tree> {
        let tree = self.parser.parse(source, None);
        if tree.is_none() {
            tracing::warn!("tree-sitter returned no tree");
        }
        tree
    }
}

/// Tokens for `source`. Without a tree the text is only split into
/// whitespace, newlines and `Unknown` runs.
pub fn tokens(tree: Option<&Tree>, source: &str) -> Vec<Token> {
    let mut builder = TokenBuilder {
        source,
        root: tree.map(|t| t.root_node()),
        pos: 0,
        tokens: Vec::new(),
    };

    if let Some(tree) = tree {
        let root = tree.root_node();
        let mut cursor = tree.walk();
        'walk: loop {
            let node = cursor.node();
            let atomic = ATOMIC_NODES.contains(&node.kind());
            if !atomic && node.child_count() > 0 && cursor.goto_first_child() {
                continue;
            }
            if node.id() != root.id() {
                builder.leaf(node);
            }
            while !cursor.goto_next_sibling() {
                if !cursor.goto_parent() {
                    break 'walk;
                }
            }
        }
    }

    builder.finish()
}

struct TokenBuilder<'a, 't> {
    source: &'a str,
    root: Option<Node<'t>>,
    pos: usize,
    tokens: Vec<Token>,
}

impl TokenBuilder<'_, '_> {
    fn leaf(&mut self, node: Node) {
        let start = node.start_byte().max(self.pos);
        let end = node.end_byte();
        if end <= start || !self.is_boundary(start) || !self.is_boundary(end) {
            return;
        }

        self.fill_gap(start);
        let kind = classify(node);
        self.push(start, end, kind);
        self.pos = end;
    }

    fn finish(mut self) -> Vec<Token> {
        self.fill_gap(self.source.len());
        self.tokens
    }

    fn is_boundary(&self, byte: usize) -> bool {
        self.source.is_char_boundary(byte)
    }

    /// Emit `source[pos..end]`, which no leaf covers.
    fn fill_gap(&mut self, end: usize) {
        let source = self.source;
        let mut start = self.pos;
        while start < end {
            let rest = &source[start..end];
            let Some(first) = rest.chars().next() else {
                break;
            };
            let len = if first == '\n' {
                1
            } else {
                let same_class = |c: char| c != '\n' && c.is_whitespace() == first.is_whitespace();
                rest.find(|c: char| !same_class(c)).unwrap_or(rest.len())
            };

            let kind = if first == '\n' {
                TokenKind::NewLine
            } else if first.is_whitespace() {
                TokenKind::Whitespace
            } else {
                self.enclosing_kind(start, start + len)
            };
            self.tokens.push(Token::new(&source[start..start + len], kind));
            start += len;
        }
        self.pos = end.max(self.pos);
    }

    /// Split on newlines so every `\n` is its own token.
    fn push(&mut self, start: usize, end: usize, kind: TokenKind) {
        let source = self.source;
        let mut first = true;
        for piece in source[start..end].split('\n') {
            if !first {
                self.tokens.push(Token::new("\n", TokenKind::NewLine));
            }
            first = false;
            if !piece.is_empty() {
                self.tokens.push(Token::new(piece, kind));
            }
        }
    }

    fn enclosing_kind(&self, start: usize, end: usize) -> TokenKind {
        let mut node = self
            .root
            .and_then(|root| root.descendant_for_byte_range(start, end));
        while let Some(current) = node {
            match current.kind() {
                "template_string" => return TokenKind::Template,
                "string" => return TokenKind::String,
                "comment" => return TokenKind::Comment,
                _ => node = current.parent(),
            }
        }
        TokenKind::Unknown
    }
}

fn classify(node: Node) -> TokenKind {
    let kind = node.kind();
    match kind {
        "comment" | "html_comment" | "hash_bang_line" => return TokenKind::Comment,
        "string" => return TokenKind::String,
        "regex" => return TokenKind::Regex,
        "number" => return TokenKind::Number,
        "predefined_type" => return TokenKind::TypeKeyword,
        "ERROR" => return TokenKind::Unknown,
        _ => {}
    }

    let in_template = node
        .parent()
        .is_some_and(|parent| parent.kind() == "template_string");
    if in_template || matches!(kind, "`" | "${") {
        return TokenKind::Template;
    }
    if kind == "}" && node.parent().is_some_and(|p| p.kind() == "template_substitution") {
        return TokenKind::Template;
    }

    if node.is_named() {
        if kind.ends_with("identifier") {
            TokenKind::Identifier
        } else if KEYWORD_LEAVES.contains(&kind) {
            TokenKind::Keyword
        } else {
            TokenKind::Unknown
        }
    } else if kind.chars().any(|c| c.is_ascii_alphabetic()) {
        TokenKind::Keyword
    } else {
        TokenKind::Punctuation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(source: &str) -> Vec<Token> {
        let mut parser = TypeScriptParser::new().unwrap();
        let tree = parser.parse(source);
        tokens(tree.as_ref(), source)
    }

    fn kind_of(tokens: &[Token], text: &str) -> Option<TokenKind> {
        tokens.iter().find(|t| t.text == text).map(|t| t.kind)
    }

    #[test]
    fn test_tokens_concatenate_to_source() {
        let sources = [
            "",
            "const x: number = 1;\n",
            "function f(a, b) {\n\treturn a / b; // ratio\n}\n",
            "let s = 'héllo 日本';\n/* multi\n   line */\n",
            "let a = (1;\nconst = ;\n\"unterminated\n",
            "const s = `a${\"{\"}b`;\nconst n = 1;\n",
            "   \n\n  ",
        ];
        for source in sources {
            let rebuilt: String = tokenize(source).iter().map(|t| t.text.as_str()).collect();
            assert_eq!(rebuilt, source);
        }
    }

    #[test]
    fn test_every_newline_is_its_own_token() {
        let tokens = tokenize("/* a\nb */\nlet x = `1\n2`;\n");
        for token in &tokens {
            if token.kind == TokenKind::NewLine {
                assert_eq!(token.text, "\n");
            } else {
                assert!(!token.text.contains('\n'), "{token:?}");
            }
        }
        let newlines = tokens.iter().filter(|t| t.kind == TokenKind::NewLine).count();
        assert_eq!(newlines, 4);
    }

    #[test]
    fn test_keywords_identifiers_and_numbers() {
        let tokens = tokenize("const total = 42;");
        assert_eq!(kind_of(&tokens, "const"), Some(TokenKind::Keyword));
        assert_eq!(kind_of(&tokens, "total"), Some(TokenKind::Identifier));
        assert_eq!(kind_of(&tokens, "42"), Some(TokenKind::Number));
        assert_eq!(kind_of(&tokens, "="), Some(TokenKind::Punctuation));
        assert_eq!(kind_of(&tokens, ";"), Some(TokenKind::Punctuation));
        assert_eq!(kind_of(&tokens, " "), Some(TokenKind::Whitespace));
    }

    #[test]
    fn test_builtin_types() {
        let tokens = tokenize("let n: number = 2;");
        assert_eq!(kind_of(&tokens, "number"), Some(TokenKind::TypeKeyword));
    }

    #[test]
    fn test_strings_and_regex_are_single_tokens() {
        let tokens = tokenize("const s = \"a (b) c\";\nconst r = /ab+c/g;\n");
        assert_eq!(kind_of(&tokens, "\"a (b) c\""), Some(TokenKind::String));
        assert_eq!(kind_of(&tokens, "/ab+c/g"), Some(TokenKind::Regex));
    }

    #[test]
    fn test_braces_inside_template_substitutions() {
        let tokens = tokenize("const s = `a${\"{\"}b`;\nconst n = 1;\n");
        assert_eq!(kind_of(&tokens, "`"), Some(TokenKind::Template));
        assert_eq!(kind_of(&tokens, "\"{\""), Some(TokenKind::String));

        let second_line: Vec<_> = tokens
            .split(|t| t.kind == TokenKind::NewLine)
            .nth(1)
            .unwrap()
            .iter()
            .filter(|t| t.kind != TokenKind::Whitespace)
            .map(|t| (t.text.as_str(), t.kind))
            .collect();
        assert_eq!(
            second_line,
            [
                ("const", TokenKind::Keyword),
                ("n", TokenKind::Identifier),
                ("=", TokenKind::Punctuation),
                ("1", TokenKind::Number),
                (";", TokenKind::Punctuation),
            ]
        );
    }

    #[test]
    fn test_comments_split_per_line() {
        let tokens = tokenize("// hi\n/* a\nb */");
        assert_eq!(kind_of(&tokens, "// hi"), Some(TokenKind::Comment));
        assert_eq!(kind_of(&tokens, "/* a"), Some(TokenKind::Comment));
        assert_eq!(kind_of(&tokens, "b */"), Some(TokenKind::Comment));
    }

    #[test]
    fn test_without_tree_lines_stay_intact() {
        let tokens = tokens(None, "a b\nc");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["a", " ", "b", "\n", "c"]);
        assert_eq!(tokens[0].kind, TokenKind::Unknown);
    }
}
