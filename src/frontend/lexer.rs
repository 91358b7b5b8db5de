use crate::frontend::span::Span;
use crate::frontend::token::{Keyword, Symbol, Token, TokenKind};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::Chars;

#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    src: &'src str,
    chars: Chars<'src>,
    index: usize,
    start: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Lexer<'src> {
        let chars = src.chars();
        Lexer {
            src,
            chars,
            index: 0,
            start: 0,
        }
    }

    pub fn to_tokens(mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        tracing::trace!(count = tokens.len(), "lexed source");
        Ok(tokens)
    }

    /// Returns the next token, or `None` once the input is exhausted.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexerError> {
        self.skip_trivia();
        self.start = self.index;
        let Some(ch) = self.advance() else {
            return Ok(None);
        };

        let token = match ch {
            '(' => self.create_token_from_symbol(Symbol::OpenParen),
            ')' => self.create_token_from_symbol(Symbol::CloseParen),
            '{' => self.create_token_from_symbol(Symbol::OpenBrace),
            '}' => self.create_token_from_symbol(Symbol::CloseBrace),
            ',' => self.create_token_from_symbol(Symbol::Comma),
            ';' => self.create_token_from_symbol(Symbol::Semicolon),
            '+' => self.create_token_from_symbol(Symbol::Plus),
            '-' => self.create_token_from_symbol(Symbol::Minus),
            '*' => self.create_token_from_symbol(Symbol::Star),
            '/' => self.create_token_from_symbol(Symbol::Slash),
            '%' => self.create_token_from_symbol(Symbol::Percent),
            '&' => self.create_token_from_symbol(Symbol::Ampersand),
            '|' => self.create_token_from_symbol(Symbol::Pipe),
            '^' => self.create_token_from_symbol(Symbol::Caret),
            '!' => self.create_token_from_symbol(Symbol::Bang),
            '<' | '>' => {
                if !self.match_char(ch) {
                    return Err(LexerError::UnexpectedChar(ch, self.create_span()));
                }
                let sym = if ch == '<' {
                    Symbol::LessLess
                } else {
                    Symbol::GreaterGreater
                };
                self.create_token_from_symbol(sym)
            }
            ch if ch.is_ascii_digit() => self.parse_number(ch)?,
            ch if ch.is_alphabetic() || ch == '_' => self.parse_identifier_or_keyword(),
            _ => return Err(LexerError::UnexpectedChar(ch, self.create_span())),
        };

        Ok(Some(token))
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else if c == '/' && self.peek2() == Some('/') {
                self.advance();
                self.advance();
                while let Some(c) = self.advance() {
                    if c == '\n' {
                        break;
                    }
                }
            } else if c == '/' && self.peek2() == Some('*') {
                self.advance();
                self.advance();
                while let Some(c) = self.advance() {
                    if c == '*' && self.peek() == Some('/') {
                        self.advance();
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn peek2(&self) -> Option<char> {
        let mut c = self.chars.clone();
        c.next();
        c.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.index += c.len_utf8();
        Some(c)
    }

    fn match_char(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn current_lexeme(&self) -> &'src str {
        &self.src[self.start..self.index]
    }

    fn create_span(&self) -> Span {
        Span::new(self.start, self.index)
    }

    fn create_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.create_span())
    }

    fn create_token_from_symbol(&self, symbol: Symbol) -> Token {
        self.create_token(TokenKind::Symbol(symbol))
    }

    /// Scans an integer literal, keeping its text untouched. Accepts decimal, `0x`, `0o` and `0b`
    /// forms with `_` separators between digits. A leading `0` followed by more digits is legacy
    /// octal, so `017` is valid and `09` is not.
    fn parse_number(&mut self, first: char) -> Result<Token, LexerError> {
        let (radix, prefixed) = match (first, self.peek()) {
            ('0', Some('x' | 'X')) => (16, true),
            ('0', Some('o' | 'O')) => (8, true),
            ('0', Some('b' | 'B')) => (2, true),
            ('0', Some('0'..='9' | '_')) => (8, false),
            _ => (10, false),
        };
        let mut digits = if prefixed { 0 } else { 1 };
        if prefixed {
            self.advance();
        }

        let mut last_was_separator = false;
        while let Some(c) = self.peek() {
            if c == '_' {
                if last_was_separator {
                    self.advance();
                    return Err(LexerError::MalformedNumber(self.create_span()));
                }
                last_was_separator = true;
            } else if c.is_digit(radix) {
                digits += 1;
                last_was_separator = false;
            } else {
                break;
            }
            self.advance();
        }

        // Trailing junk such as `12ab`, `0b102` or `018` belongs to the same malformed literal.
        if self.peek().is_some_and(|c| c.is_alphanumeric()) {
            self.advance_while(|c| c.is_alphanumeric() || c == '_');
            return Err(LexerError::MalformedNumber(self.create_span()));
        }
        if digits == 0 || last_was_separator {
            return Err(LexerError::MalformedNumber(self.create_span()));
        }

        Ok(self.create_token(TokenKind::IntNumber(self.current_lexeme().to_string())))
    }

    fn parse_identifier_or_keyword(&mut self) -> Token {
        // We already know the first character is alphabetic
        self.advance_while(|c| c.is_alphanumeric() || c == '_');

        if let Ok(keyword) = Keyword::try_from(self.current_lexeme()) {
            return self.create_token(TokenKind::Keyword(keyword));
        }

        self.create_token(TokenKind::Identifier(self.current_lexeme().into()))
    }

    fn advance_while(&mut self, mut predicate: impl FnMut(char) -> bool) {
        while self.peek().is_some_and(&mut predicate) {
            self.advance();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexerError {
    UnexpectedChar(char, Span),
    MalformedNumber(Span),
}

impl LexerError {
    pub fn span(&self) -> Span {
        match self {
            LexerError::UnexpectedChar(_, span) | LexerError::MalformedNumber(span) => *span,
        }
    }
}

impl Display for LexerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LexerError::UnexpectedChar(ch, _) => write!(f, "unexpected character `{ch}`"),
            LexerError::MalformedNumber(_) => write!(f, "malformed integer literal"),
        }
    }
}

impl Error for LexerError {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .to_tokens()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn int(text: &str) -> TokenKind {
        TokenKind::IntNumber(text.to_string())
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Identifier(name.to_string())
    }

    #[test]
    fn lexes_function_header() {
        assert_eq!(
            kinds("func f(x, y byte) byte { return 5 }"),
            vec![
                TokenKind::Keyword(Keyword::Func),
                ident("f"),
                TokenKind::Symbol(Symbol::OpenParen),
                ident("x"),
                TokenKind::Symbol(Symbol::Comma),
                ident("y"),
                ident("byte"),
                TokenKind::Symbol(Symbol::CloseParen),
                ident("byte"),
                TokenKind::Symbol(Symbol::OpenBrace),
                TokenKind::Keyword(Keyword::Return),
                int("5"),
                TokenKind::Symbol(Symbol::CloseBrace),
            ]
        );
    }

    #[test]
    fn keeps_literal_text_verbatim() {
        assert_eq!(
            kinds("0x1A 0b1010 0o17 017 0_17 1_000 0XfF"),
            vec![
                int("0x1A"),
                int("0b1010"),
                int("0o17"),
                int("017"),
                int("0_17"),
                int("1_000"),
                int("0XfF")
            ]
        );
    }

    #[test]
    fn rejects_malformed_numbers() {
        for src in ["0x", "12ab", "0b102", "1__0", "7_", "09", "018"] {
            let err = Lexer::new(src).to_tokens().unwrap_err();
            assert!(
                matches!(err, LexerError::MalformedNumber(_)),
                "{src}: {err:?}"
            );
        }
    }

    #[test]
    fn skips_comments_and_tracks_byte_spans() {
        let tokens = Lexer::new("/* é */ x // tail\n<<").to_tokens().unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].span, Span::new(9, 10));
        assert_eq!(tokens[1].kind, TokenKind::Symbol(Symbol::LessLess));
    }

    #[test]
    fn reports_unexpected_character() {
        let err = Lexer::new("x @ y").to_tokens().unwrap_err();
        assert_eq!(err, LexerError::UnexpectedChar('@', Span::new(2, 3)));
    }
}
