// Keystring Lexer
// Splits escape text like "\COMMAND+\SHIFT+s" into a token tree

use std::fmt;
use std::sync::OnceLock;

/// Escape character that introduces a named key
pub const ESCAPE_CHAR: char = '\\';
/// Separator between a named key and the tokens it holds down
pub const HOTKEY_SEPARATOR: char = '+';
/// Ends the literal run wrapped by a hotkey; consumed with the hotkey
pub const HOTKEY_DELIMITER: char = ' ';

/// What a named key wraps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// `\NAME` with no separator: tap the key on its own
    Absent,
    /// `\NAME+` at the end of the input: the separator wraps nothing
    Empty,
    /// `\NAME+...`: hold the key while the wrapped tokens are typed
    Tokens(Vec<Token>),
}

impl Body {
    /// Wrapped tokens; empty for `Absent` and `Empty`
    pub fn tokens(&self) -> &[Token] {
        match self {
            Body::Tokens(tokens) => tokens,
            Body::Absent | Body::Empty => &[],
        }
    }
}

// A `\A+\B+...` chain nests one body per name; drop it with a work list.
impl Drop for Body {
    fn drop(&mut self) {
        let mut pending = match self {
            Body::Tokens(tokens) => std::mem::take(tokens),
            Body::Absent | Body::Empty => return,
        };
        while let Some(token) = pending.pop() {
            if let Token::Modifier { mut body, .. } = token {
                if let Body::Tokens(tokens) = &mut body {
                    pending.append(tokens);
                }
            }
        }
    }
}

/// A lexed unit of escape text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A single character, typed as-is
    Literal(char),
    /// A named key (`\COMMAND`, `\SHIFT`, or a custom uppercase name)
    Modifier { name: String, body: Body },
}

impl Token {
    pub fn literal(c: char) -> Self {
        Token::Literal(c)
    }

    /// A bare `\NAME`
    pub fn bare(name: impl Into<String>) -> Self {
        Token::Modifier {
            name: name.into(),
            body: Body::Absent,
        }
    }

    /// A `\NAME+` with nothing after it
    pub fn empty(name: impl Into<String>) -> Self {
        Token::Modifier {
            name: name.into(),
            body: Body::Empty,
        }
    }

    /// A `\NAME+` holding `tokens`; an empty list gives a bare token
    pub fn wrap(name: impl Into<String>, tokens: Vec<Token>) -> Self {
        let body = if tokens.is_empty() {
            Body::Absent
        } else {
            Body::Tokens(tokens)
        };
        Token::Modifier {
            name: name.into(),
            body,
        }
    }

    /// Nesting depth: 0 for literals, 1 + deepest child for named keys
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 0)];
        while let Some((token, level)) = pending.pop() {
            if let Token::Modifier { body, .. } = token {
                deepest = deepest.max(level + 1);
                pending.extend(body.tokens().iter().map(|inner| (inner, level + 1)));
            }
        }
        deepest
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bodies still being written, innermost last
        let mut open: Vec<std::slice::Iter<'_, Token>> = Vec::new();
        let mut next = Some(self);
        loop {
            if let Some(token) = next.take() {
                match token {
                    Token::Literal(c) => write!(f, "{:?}", c)?,
                    Token::Modifier { name, body } => match body {
                        Body::Absent => write!(f, "{}", name)?,
                        Body::Empty => write!(f, "{}[]", name)?,
                        Body::Tokens(tokens) => {
                            write!(f, "{}[", name)?;
                            let mut inner = tokens.iter();
                            next = inner.next();
                            open.push(inner);
                            continue;
                        }
                    },
                }
            }

            let Some(siblings) = open.last_mut() else {
                return Ok(());
            };
            match siblings.next() {
                Some(token) => {
                    write!(f, " ")?;
                    next = Some(token);
                }
                None => {
                    write!(f, "]")?;
                    open.pop();
                }
            }
        }
    }
}

/// Lexes escape text once and keeps the result.
///
/// Calling [`Lexer::lex`] again returns the same tokens; nothing is
/// re-appended.
#[derive(Debug)]
pub struct Lexer {
    chars: Vec<char>,
    tokens: OnceLock<Vec<Token>>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            tokens: OnceLock::new(),
        }
    }

    /// Tokens for the input, computed on first call
    pub fn lex(&self) -> &[Token] {
        self.tokens
            .get_or_init(|| Cursor::new(&self.chars).lex_all())
    }

    /// Take ownership of the tokens
    pub fn into_tokens(self) -> Vec<Token> {
        let _ = self.lex();
        self.tokens.into_inner().unwrap_or_default()
    }
}

/// Lex `input` into a token sequence. Never fails.
pub fn lex(input: &str) -> Vec<Token> {
    Lexer::new(input).into_tokens()
}

struct Cursor<'a> {
    chars: &'a [char],
    index: usize,
}

impl<'a> Cursor<'a> {
    fn new(chars: &'a [char]) -> Self {
        Self { chars, index: 0 }
    }

    fn lex_all(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while self.peek(0).is_some() {
            if self.at_escape() {
                tokens.push(self.lex_escape());
            } else {
                self.push_literal(&mut tokens);
            }
        }
        tokens
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).copied()
    }

    /// Backslash followed by an uppercase letter
    fn at_escape(&self) -> bool {
        self.peek(0) == Some(ESCAPE_CHAR) && self.peek(1).is_some_and(|c| c.is_ascii_uppercase())
    }

    /// Types the character under the cursor. A backslash that does not start
    /// a named key is typed together with the character after it, whatever
    /// it is.
    fn push_literal(&mut self, out: &mut Vec<Token>) {
        let Some(c) = self.peek(0) else {
            return;
        };
        out.push(Token::Literal(c));
        self.index += 1;
        if c == ESCAPE_CHAR {
            if let Some(next) = self.peek(0) {
                out.push(Token::Literal(next));
                self.index += 1;
            }
        }
    }

    /// Skips the escape character and reads the uppercase name after it
    fn lex_name(&mut self) -> String {
        self.index += 1;
        let start = self.index;
        while self.peek(0).is_some_and(|c| c.is_ascii_uppercase()) {
            self.index += 1;
        }
        self.chars[start..self.index].iter().collect()
    }

    /// A named key and everything chained onto it with `+`. A chain of any
    /// length is read in one pass and nested from the right.
    fn lex_escape(&mut self) -> Token {
        let mut held = Vec::new();
        let mut name = self.lex_name();
        let body = loop {
            if self.peek(0) != Some(HOTKEY_SEPARATOR) {
                break Body::Absent;
            }
            self.index += 1;
            if self.peek(0).is_none() {
                break Body::Empty;
            }
            if !self.at_escape() {
                break Body::Tokens(self.lex_hotkey_run());
            }
            held.push(std::mem::replace(&mut name, self.lex_name()));
        };

        held.into_iter()
            .rev()
            .fold(Token::Modifier { name, body }, |inner, outer| Token::Modifier {
                name: outer,
                body: Body::Tokens(vec![inner]),
            })
    }

    /// Literal run held by a hotkey. The first character is always part of
    /// it; the run then stops at a delimiter (consumed), at the next named
    /// key, or at the end of input.
    fn lex_hotkey_run(&mut self) -> Vec<Token> {
        let mut run = Vec::new();
        self.push_literal(&mut run);
        while let Some(c) = self.peek(0) {
            if c == HOTKEY_DELIMITER {
                self.index += 1;
                break;
            }
            if self.at_escape() {
                break;
            }
            self.push_literal(&mut run);
        }
        run
    }
}
