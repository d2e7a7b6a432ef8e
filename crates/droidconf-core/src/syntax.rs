//! Block/statement scanner for Gradle Kotlin DSL text.
//!
//! Produces a tree of named blocks (`android { ... }`) and flat statements
//! (`minSdk = 23`). Only structure is recovered here; the meaning of each
//! statement is decided by [`crate::parser`].

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Block(Block),
    Statement(Statement),
}

/// `header { children }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: String,
    /// Line of the opening brace's header.
    pub line: usize,
    pub children: Vec<Node>,
}

/// One logical statement with comments removed and continuation lines joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub text: String,
    pub line: usize,
}

impl Block {
    fn new(header: String, line: usize) -> Self {
        Self {
            header,
            line,
            children: Vec::new(),
        }
    }

    /// Direct child blocks whose header equals `name`.
    pub fn blocks_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Block> + 'a {
        self.children.iter().filter_map(move |node| match node {
            Node::Block(b) if b.header == name => Some(b),
            _ => None,
        })
    }

    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.children.iter().filter_map(|node| match node {
            Node::Statement(s) => Some(s),
            Node::Block(_) => None,
        })
    }

    fn push_statement(&mut self, text: &str, line: usize) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        // `.foo()` on its own line continues the previous statement
        if text.starts_with('.')
            && let Some(Node::Statement(prev)) = self.children.last_mut()
        {
            prev.text.push_str(text);
            return;
        }
        self.children.push(Node::Statement(Statement {
            text: text.to_string(),
            line,
        }));
    }
}

/// Scans `content` into a root block with an empty header.
///
/// # Errors
///
/// Returns [`ParseError`] for unbalanced braces or parentheses, unterminated
/// strings or comments, and blocks without a header.
pub fn parse_tree(content: &str) -> Result<Block, ParseError> {
    Scanner::new(content).run()
}

struct Scanner<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    stack: Vec<Block>,
    buf: String,
    buf_line: usize,
    paren_depth: usize,
    paren_line: usize,
}

impl<'a> Scanner<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            chars: content.chars().peekable(),
            line: 1,
            stack: vec![Block::new(String::new(), 0)],
            buf: String::new(),
            buf_line: 1,
            paren_depth: 0,
            paren_line: 0,
        }
    }

    fn run(mut self) -> Result<Block, ParseError> {
        while let Some(ch) = self.chars.next() {
            match ch {
                '/' if self.chars.peek() == Some(&'/') => self.skip_line_comment(),
                '/' if self.chars.peek() == Some(&'*') => {
                    self.chars.next();
                    self.skip_block_comment()?;
                }
                '"' => self.read_string()?,
                '(' => {
                    if self.paren_depth == 0 {
                        self.paren_line = self.line;
                    }
                    self.paren_depth += 1;
                    self.push_char(ch);
                }
                ')' => {
                    if self.paren_depth == 0 {
                        return Err(ParseError::UnbalancedParens { line: self.line });
                    }
                    self.paren_depth -= 1;
                    self.push_char(ch);
                }
                '{' => self.open_block()?,
                '}' => self.close_block()?,
                '\n' => {
                    if self.paren_depth > 0 {
                        self.buf.push(' ');
                    } else {
                        self.flush();
                    }
                    self.line += 1;
                }
                ';' if self.paren_depth == 0 => self.flush(),
                _ => self.push_char(ch),
            }
        }

        if self.paren_depth > 0 {
            return Err(ParseError::UnbalancedParens {
                line: self.paren_line,
            });
        }
        self.flush();

        let mut root = self.stack.remove(0);
        if let Some(open) = self.stack.into_iter().next() {
            return Err(ParseError::UnterminatedBlock {
                name: open.header,
                line: open.line,
            });
        }
        root.line = 1;
        Ok(root)
    }

    fn push_char(&mut self, ch: char) {
        if self.buf.trim().is_empty() && !ch.is_whitespace() {
            self.buf_line = self.line;
        }
        self.buf.push(ch);
    }

    fn current(&mut self) -> &mut Block {
        // The root block is never popped, so the stack is never empty.
        let idx = self.stack.len() - 1;
        &mut self.stack[idx]
    }

    fn flush(&mut self) {
        let text = std::mem::take(&mut self.buf);
        let line = self.buf_line;
        self.current().push_statement(&text, line);
    }

    fn skip_line_comment(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                break;
            }
            self.chars.next();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), ParseError> {
        let start = self.line;
        while let Some(c) = self.chars.next() {
            match c {
                '*' if self.chars.peek() == Some(&'/') => {
                    self.chars.next();
                    return Ok(());
                }
                '\n' => self.line += 1,
                _ => {}
            }
        }
        Err(ParseError::UnterminatedComment { line: start })
    }

    fn read_string(&mut self) -> Result<(), ParseError> {
        let start = self.line;
        self.push_char('"');
        while let Some(c) = self.chars.next() {
            match c {
                '\\' => {
                    self.buf.push(c);
                    match self.chars.next() {
                        Some('\n') | None => {
                            return Err(ParseError::UnterminatedString { line: start });
                        }
                        Some(escaped) => self.buf.push(escaped),
                    }
                }
                '"' => {
                    self.buf.push(c);
                    return Ok(());
                }
                '\n' => return Err(ParseError::UnterminatedString { line: start }),
                _ => self.buf.push(c),
            }
        }
        Err(ParseError::UnterminatedString { line: start })
    }

    fn open_block(&mut self) -> Result<(), ParseError> {
        if self.paren_depth > 0 {
            return Err(ParseError::BraceInArguments { line: self.line });
        }
        let mut header = std::mem::take(&mut self.buf).trim().to_string();
        let mut line = self.buf_line;

        if header.is_empty() {
            // A lambda opened on the line after its call: `foo("x")\n{`
            let at = self.line;
            let parent = self.current();
            if !matches!(parent.children.last(), Some(Node::Statement(_))) {
                return Err(ParseError::AnonymousBlock { line: at });
            }
            if let Some(Node::Statement(prev)) = parent.children.pop() {
                header = prev.text;
                line = prev.line;
            }
        }

        self.stack.push(Block::new(header, line));
        Ok(())
    }

    fn close_block(&mut self) -> Result<(), ParseError> {
        if self.paren_depth > 0 {
            return Err(ParseError::BraceInArguments { line: self.line });
        }
        self.flush();
        if self.stack.len() == 1 {
            return Err(ParseError::UnexpectedClose { line: self.line });
        }
        if let Some(block) = self.stack.pop() {
            self.current().children.push(Node::Block(block));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(node: &Node) -> &Block {
        match node {
            Node::Block(b) => b,
            Node::Statement(s) => panic!("expected block, got statement {:?}", s.text),
        }
    }

    fn statement(node: &Node) -> &Statement {
        match node {
            Node::Statement(s) => s,
            Node::Block(b) => panic!("expected statement, got block {:?}", b.header),
        }
    }

    #[test]
    fn test_nested_blocks() {
        let content = "android {\n    compileSdk = 35\n    defaultConfig {\n        minSdk = 23\n    }\n}\n";
        let root = parse_tree(content).unwrap();
        assert_eq!(root.children.len(), 1);

        let android = block(&root.children[0]);
        assert_eq!(android.header, "android");
        assert_eq!(android.line, 1);
        assert_eq!(statement(&android.children[0]).text, "compileSdk = 35");
        assert_eq!(statement(&android.children[0]).line, 2);

        let default_config = block(&android.children[1]);
        assert_eq!(default_config.header, "defaultConfig");
        assert_eq!(statement(&default_config.children[0]).text, "minSdk = 23");
        assert_eq!(statement(&default_config.children[0]).line, 4);
    }

    #[test]
    fn test_comments_are_dropped() {
        let content = "android {\n    minSdk = 23 // updated\n    /* block\n comment */ targetSdk = 35\n}\n";
        let root = parse_tree(content).unwrap();
        let android = block(&root.children[0]);
        let texts: Vec<_> = android.statements().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["minSdk = 23", "targetSdk = 35"]);
    }

    #[test]
    fn test_comment_markers_inside_strings_are_kept() {
        let content = "x = \"https://example.com/*not a comment*/\"\n";
        let root = parse_tree(content).unwrap();
        assert_eq!(
            statement(&root.children[0]).text,
            "x = \"https://example.com/*not a comment*/\""
        );
    }

    #[test]
    fn test_braces_inside_strings_are_kept() {
        let content = "flutter {\n    source = \"{weird}\"\n}\n";
        let root = parse_tree(content).unwrap();
        let flutter = block(&root.children[0]);
        assert_eq!(statement(&flutter.children[0]).text, "source = \"{weird}\"");
    }

    #[test]
    fn test_multiline_arguments_are_joined() {
        let content = "dependencies {\n    implementation(\n        \"a:b:1.0\"\n    )\n}\n";
        let root = parse_tree(content).unwrap();
        let deps = block(&root.children[0]);
        let stmt = statement(&deps.children[0]);
        assert_eq!(stmt.line, 2);
        assert!(stmt.text.starts_with("implementation("));
        assert!(stmt.text.contains("\"a:b:1.0\""));
    }

    #[test]
    fn test_semicolons_split_statements() {
        let root = parse_tree("a = 1; b = 2\n").unwrap();
        assert_eq!(root.children.len(), 2);
    }

    #[test]
    fn test_single_line_block() {
        let root = parse_tree("release { isMinifyEnabled = true }\n").unwrap();
        let release = block(&root.children[0]);
        assert_eq!(release.header, "release");
        assert_eq!(statement(&release.children[0]).text, "isMinifyEnabled = true");
    }

    #[test]
    fn test_block_header_with_call() {
        let root = parse_tree("getByName(\"release\") {\n}\n").unwrap();
        assert_eq!(block(&root.children[0]).header, "getByName(\"release\")");
    }

    #[test]
    fn test_lambda_on_next_line() {
        let root = parse_tree("tasks.register(\"x\")\n{\n}\n").unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(block(&root.children[0]).header, "tasks.register(\"x\")");
    }

    #[test]
    fn test_leading_dot_continuation() {
        let root = parse_tree("val x = foo()\n    .bar()\n").unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(statement(&root.children[0]).text, "val x = foo().bar()");
    }

    #[test]
    fn test_unterminated_block() {
        let err = parse_tree("android {\n    defaultConfig {\n    }\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnterminatedBlock {
                name: "android".into(),
                line: 1
            }
        );
    }

    #[test]
    fn test_unexpected_close() {
        let err = parse_tree("android {\n}\n}\n").unwrap_err();
        assert_eq!(err, ParseError::UnexpectedClose { line: 3 });
    }

    #[test]
    fn test_unterminated_string() {
        let err = parse_tree("android {\n    namespace = \"com.example\n}\n").unwrap_err();
        assert_eq!(err, ParseError::UnterminatedString { line: 2 });
    }

    #[test]
    fn test_unterminated_comment() {
        let err = parse_tree("/* never\nclosed\n").unwrap_err();
        assert_eq!(err, ParseError::UnterminatedComment { line: 1 });
    }

    #[test]
    fn test_unbalanced_parens() {
        assert_eq!(
            parse_tree("foo(\"a\"\n").unwrap_err(),
            ParseError::UnbalancedParens { line: 1 }
        );
        assert_eq!(
            parse_tree("foo)\n").unwrap_err(),
            ParseError::UnbalancedParens { line: 1 }
        );
    }

    #[test]
    fn test_brace_inside_arguments() {
        let err = parse_tree("foo(bar {\n").unwrap_err();
        assert_eq!(err, ParseError::BraceInArguments { line: 1 });
    }

    #[test]
    fn test_anonymous_block() {
        let err = parse_tree("{\n}\n").unwrap_err();
        assert_eq!(err, ParseError::AnonymousBlock { line: 1 });
    }

    #[test]
    fn test_escaped_quote_in_string() {
        let root = parse_tree("versionName = \"1.0 \\\"beta\\\"\"\n").unwrap();
        assert_eq!(
            statement(&root.children[0]).text,
            "versionName = \"1.0 \\\"beta\\\"\""
        );
    }

    #[test]
    fn test_blocks_named() {
        let root = parse_tree("android {\n}\nflutter {\n}\nandroid {\n}\n").unwrap();
        assert_eq!(root.blocks_named("android").count(), 2);
        assert_eq!(root.blocks_named("flutter").count(), 1);
    }
}
