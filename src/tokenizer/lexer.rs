use crate::error::{ErrorType, Reporter, YamlResult};
use crate::options::Options;

use super::reader::{Input, Reader, EOF_CHAR};

/// Kind of a lexed token.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TokenKind {
    /// No token has been produced yet.
    #[default]
    None,
    /// Skipped content outside document markers.
    BetweenDocs,
    /// Line break; the token indent is the following line's indent.
    NewLine,
    Directive,
    Scalar,
    KeyIndicator,
    ValueIndicator,
    SequenceIndicator,
    Tag,
    BeginDoc,
    EndDoc,
    Eof,
}

/// A token, the indent of the line it started on, and the payload carried by
/// [`TokenKind::Scalar`], [`TokenKind::Tag`] and [`TokenKind::Directive`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub indent: i32,
    pub value: Option<String>,
}

impl Token {
    fn new(kind: TokenKind, indent: i32) -> Token {
        Token {
            kind,
            indent,
            value: None,
        }
    }

    fn with_value(kind: TokenKind, indent: i32, value: String) -> Token {
        Token {
            kind,
            indent,
            value: Some(value),
        }
    }
}

#[derive(Copy, Clone, PartialEq)]
enum LexerMode {
    BetweenDocs,
    InDoc,
}

#[derive(Copy, Clone, PartialEq)]
enum Chomp {
    Clip,
    Strip,
    Keep,
}

/// Produces the next token on demand.
pub struct Lexer<I> {
    pub(crate) reader: Reader<I>,
    token: Token,
    mode: LexerMode,
    saw_doc_end: bool,
    /// Indent of the most recent key or sequence indicator. A multi-line
    /// plain scalar must stop once a line dedents to it.
    key_indent: i32,
    options: Options,
    pub(crate) reporter: Reporter,
}

impl<I: Input> Lexer<I> {
    pub fn new(input: I, options: Options) -> Lexer<I> {
        Lexer {
            reader: Reader::new(input),
            token: Token::default(),
            mode: LexerMode::BetweenDocs,
            saw_doc_end: false,
            key_indent: 0,
            options,
            reporter: Reporter::new(options.throw_on_error),
        }
    }

    #[inline]
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Take the current token out, leaving [`TokenKind::None`] behind.
    #[inline]
    pub fn take_token(&mut self) -> Token {
        std::mem::take(&mut self.token)
    }

    pub(crate) fn report(&mut self, error: ErrorType) -> YamlResult<()> {
        let line = self.reader.line();
        let col = self.reader.col();
        self.reporter.report(line, col, error)
    }

    #[inline]
    pub(crate) fn close_input(&mut self) {
        self.reader.close();
    }

    #[inline]
    pub(crate) fn into_input(self) -> Option<I> {
        self.reader.into_input()
    }

    /// Advance to the next token. Always consumes at least one character,
    /// even after reporting an error.
    pub fn fetch_next_token(&mut self) -> YamlResult<()> {
        loop {
            self.skip_inline_spaces()?;
            let c = self.reader.peek()?;
            if c == EOF_CHAR {
                self.token = Token::new(TokenKind::Eof, self.reader.indent() as i32);
                return Ok(());
            }
            if self.mode == LexerMode::BetweenDocs {
                if self.fetch_between_docs(c)? {
                    return Ok(());
                }
                continue;
            }
            match c {
                // skip_inline_spaces eats separation tabs past the indent,
                // so a tab here sits at the indent position
                '\t' => {
                    self.report(ErrorType::TabsNotAllowedAsIndentation)?;
                    self.reader.read()?;
                }
                '\n' => {
                    self.reader.read()?;
                    while self.reader.peek()? == ' ' {
                        self.reader.read()?;
                    }
                    self.token = Token::new(TokenKind::NewLine, self.reader.indent() as i32);
                    return Ok(());
                }
                '.' if self.reader.col() == 0 => {
                    if !self.try_read_doc_end()? {
                        self.read_plain()?;
                    }
                    return Ok(());
                }
                '-' if self.reader.col() == 0 => {
                    if !self.try_read_doc_start()? {
                        self.read_dash()?;
                    }
                    return Ok(());
                }
                '#' => self.skip_to_line_end()?,
                '\'' => {
                    self.read_single_quote()?;
                    return Ok(());
                }
                '"' => {
                    self.read_double_quote()?;
                    return Ok(());
                }
                '|' => {
                    self.read_block_scalar(false)?;
                    return Ok(());
                }
                '>' => {
                    self.read_block_scalar(true)?;
                    return Ok(());
                }
                '?' => {
                    self.read_question()?;
                    return Ok(());
                }
                ':' => {
                    if !self.try_read_value_indicator()? {
                        self.read_plain()?;
                    }
                    return Ok(());
                }
                '-' => {
                    self.read_dash()?;
                    return Ok(());
                }
                '!' => {
                    self.read_tag()?;
                    return Ok(());
                }
                _ => {
                    self.read_plain()?;
                    return Ok(());
                }
            }
        }
    }

    /// Inline separation: spaces anywhere, tabs once the line is past its
    /// indentation or an indicator rebased it.
    fn skip_inline_spaces(&mut self) -> YamlResult<()> {
        loop {
            match self.reader.peek()? {
                ' ' => {
                    self.reader.read()?;
                }
                '\t' if self.reader.col() > self.reader.indent()
                    || self.reader.indent_rebased() =>
                {
                    self.reader.read()?;
                }
                _ => return Ok(()),
            }
        }
    }

    /// Returns true when a token was produced.
    fn fetch_between_docs(&mut self, c: char) -> YamlResult<bool> {
        match c {
            '\n' => {
                self.reader.read()?;
                Ok(false)
            }
            '#' => {
                self.skip_to_line_end()?;
                Ok(false)
            }
            '%' => {
                self.read_directive()?;
                Ok(true)
            }
            '-' if self.reader.col() == 0 => {
                if self.try_read_doc_start()? {
                    return Ok(true);
                }
                self.leave_or_skip()
            }
            '.' if self.reader.col() == 0 => {
                if self.try_read_doc_end()? {
                    return Ok(true);
                }
                self.leave_or_skip()
            }
            _ => self.leave_or_skip(),
        }
    }

    fn leave_or_skip(&mut self) -> YamlResult<bool> {
        if self.options.ignore_text_outside_document_markers {
            self.skip_line()?;
            self.token = Token::new(TokenKind::BetweenDocs, 0);
            return Ok(true);
        }
        if self.saw_doc_end {
            self.report(ErrorType::ExpectedDocumentStart)?;
            self.skip_line()?;
            self.token = Token::new(TokenKind::BetweenDocs, 0);
            return Ok(true);
        }
        // content before any marker opens the document implicitly
        self.mode = LexerMode::InDoc;
        Ok(false)
    }

    fn try_read_marker(&mut self, marker: char) -> YamlResult<bool> {
        for consumed in 0..3 {
            if self.reader.peek()? == marker {
                self.reader.read()?;
            } else {
                self.reader.unread_many(marker, consumed);
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn try_read_doc_start(&mut self) -> YamlResult<bool> {
        if !self.try_read_marker('-')? {
            return Ok(false);
        }
        match self.reader.peek()? {
            '\n' | EOF_CHAR => {}
            ' ' | '\t' if self.options.accept_content_on_start_document_line => {
                while matches!(self.reader.peek()?, ' ' | '\t') {
                    self.reader.read()?;
                }
                self.reader.rebase_line();
            }
            _ => {
                self.reader.unread_many('-', 3);
                return Ok(false);
            }
        }
        self.mode = LexerMode::InDoc;
        self.saw_doc_end = false;
        self.key_indent = 0;
        self.token = Token::new(TokenKind::BeginDoc, 0);
        Ok(true)
    }

    fn try_read_doc_end(&mut self) -> YamlResult<bool> {
        if !self.try_read_marker('.')? {
            return Ok(false);
        }
        match self.reader.peek()? {
            '\n' | EOF_CHAR => {
                self.mode = LexerMode::BetweenDocs;
                self.saw_doc_end = true;
                self.token = Token::new(TokenKind::EndDoc, 0);
                Ok(true)
            }
            _ => {
                self.reader.unread_many('.', 3);
                Ok(false)
            }
        }
    }

    fn read_directive(&mut self) -> YamlResult<()> {
        let mut value = String::new();
        loop {
            match self.reader.peek()? {
                '\n' | '#' | EOF_CHAR => break,
                _ => value.push(self.reader.read()?),
            }
        }
        trim_trailing_space(&mut value);
        self.token = Token::with_value(TokenKind::Directive, 0, value);
        Ok(())
    }

    fn read_tag(&mut self) -> YamlResult<()> {
        let indent = self.reader.indent() as i32;
        let mut value = String::new();
        loop {
            match self.reader.peek()? {
                ' ' | '\t' | '\n' | EOF_CHAR => break,
                _ => value.push(self.reader.read()?),
            }
        }
        self.token = Token::with_value(TokenKind::Tag, indent, value);
        Ok(())
    }

    fn read_question(&mut self) -> YamlResult<()> {
        let indent = self.reader.indent() as i32;
        self.reader.read()?;
        match self.reader.peek()? {
            ' ' | '\t' | '\n' | EOF_CHAR => {
                while matches!(self.reader.peek()?, ' ' | '\t') {
                    self.reader.read()?;
                }
                self.token = Token::new(TokenKind::KeyIndicator, indent);
                Ok(())
            }
            _ => {
                self.reader.unread('?');
                self.read_plain()
            }
        }
    }

    fn try_read_value_indicator(&mut self) -> YamlResult<bool> {
        let indent = self.reader.indent() as i32;
        self.reader.read()?;
        match self.reader.peek()? {
            ' ' | '\t' | '\n' | EOF_CHAR => {
                self.key_indent = indent;
                let col = self.reader.col();
                self.reader.set_indent(col);
                self.token = Token::new(TokenKind::ValueIndicator, indent);
                Ok(true)
            }
            _ => {
                self.reader.unread(':');
                Ok(false)
            }
        }
    }

    fn read_dash(&mut self) -> YamlResult<()> {
        let indent = self.reader.indent() as i32;
        self.reader.read()?;
        if self.reader.peek()? == ' ' {
            self.key_indent = indent;
            let col = self.reader.col();
            self.reader.set_indent(col);
            self.token = Token::new(TokenKind::SequenceIndicator, indent);
            Ok(())
        } else {
            self.reader.unread('-');
            self.read_plain()
        }
    }

    fn read_plain(&mut self) -> YamlResult<()> {
        let indent = self.reader.indent() as i32;
        let mut value = String::new();
        'outer: loop {
            let c = self.reader.peek()?;
            match c {
                EOF_CHAR => break,
                '\n' => {
                    self.reader.read()?;
                    let mut breaks = 1u32;
                    loop {
                        while self.reader.peek()? == ' ' {
                            self.reader.read()?;
                        }
                        if self.reader.peek()? == '\n' {
                            self.reader.read()?;
                            breaks += 1;
                        } else {
                            break;
                        }
                    }
                    let next = self.reader.peek()?;
                    let cont_indent = self.reader.indent();
                    if next == EOF_CHAR {
                        break 'outer;
                    }
                    if cont_indent as i32 <= self.key_indent || next == '#' {
                        self.reader.unread_many(' ', cont_indent);
                        self.reader.unread('\n');
                        break 'outer;
                    }
                    trim_trailing_space(&mut value);
                    if breaks == 1 {
                        value.push(' ');
                    } else {
                        for _ in 1..breaks {
                            value.push('\n');
                        }
                    }
                }
                ':' => {
                    self.reader.read()?;
                    match self.reader.peek()? {
                        ' ' | '\t' | '\n' | EOF_CHAR => {
                            self.reader.unread(':');
                            break;
                        }
                        _ => value.push(':'),
                    }
                }
                ' ' | '\t' => {
                    self.reader.read()?;
                    if self.reader.peek()? == '#' {
                        break;
                    }
                    value.push(c);
                }
                _ => {
                    self.reader.read()?;
                    value.push(c);
                }
            }
        }
        trim_trailing_space(&mut value);
        self.token = Token::with_value(TokenKind::Scalar, indent, value);
        Ok(())
    }

    fn read_single_quote(&mut self) -> YamlResult<()> {
        let indent = self.reader.indent() as i32;
        self.reader.read()?;
        let mut value = String::new();
        loop {
            let c = self.reader.read()?;
            match c {
                EOF_CHAR => {
                    self.report(ErrorType::UnexpectedEndOfScalar)?;
                    break;
                }
                '\'' => {
                    if self.reader.peek()? == '\'' {
                        self.reader.read()?;
                        value.push('\'');
                    } else {
                        break;
                    }
                }
                '\n' => self.fold_flow_break(&mut value)?,
                _ => value.push(c),
            }
        }
        self.token = Token::with_value(TokenKind::Scalar, indent, value);
        Ok(())
    }

    fn read_double_quote(&mut self) -> YamlResult<()> {
        let indent = self.reader.indent() as i32;
        self.reader.read()?;
        let mut value = String::new();
        loop {
            let c = self.reader.read()?;
            match c {
                EOF_CHAR => {
                    self.report(ErrorType::UnexpectedEndOfScalar)?;
                    break;
                }
                '"' => break,
                '\n' => self.fold_flow_break(&mut value)?,
                '\\' => self.read_escape(&mut value)?,
                _ => value.push(c),
            }
        }
        self.token = Token::with_value(TokenKind::Scalar, indent, value);
        Ok(())
    }

    fn read_escape(&mut self, value: &mut String) -> YamlResult<()> {
        let c = self.reader.read()?;
        match c {
            '0' => value.push('\0'),
            'n' => value.push('\n'),
            't' => value.push('\t'),
            'r' => value.push('\r'),
            'e' => value.push('\u{1b}'),
            'N' => value.push('\u{85}'),
            '_' => value.push('\u{a0}'),
            'L' => value.push('\u{2028}'),
            'P' => value.push('\u{2029}'),
            '\\' => value.push('\\'),
            '"' => value.push('"'),
            ' ' => value.push(' '),
            '\t' => value.push('\t'),
            'x' => self.read_hex_escape(2, value)?,
            'u' => self.read_hex_escape(4, value)?,
            // escaped break joins the lines without a fold space
            '\n' => {
                while matches!(self.reader.peek()?, ' ' | '\t') {
                    self.reader.read()?;
                }
            }
            // the unterminated-scalar report is left to the caller
            EOF_CHAR => {}
            _ => {
                self.report(ErrorType::InvalidEscapeCharacter { found: c })?;
                value.push(c);
            }
        }
        Ok(())
    }

    fn read_hex_escape(&mut self, digits: u32, value: &mut String) -> YamlResult<()> {
        let mut code = 0u32;
        for _ in 0..digits {
            let c = self.reader.peek()?;
            match c.to_digit(16) {
                Some(digit) => {
                    self.reader.read()?;
                    code = code * 16 + digit;
                }
                None => {
                    self.report(ErrorType::InvalidHexEscape)?;
                    value.push('\u{FFFD}');
                    return Ok(());
                }
            }
        }
        match char::from_u32(code) {
            Some(c) => value.push(c),
            None => {
                self.report(ErrorType::InvalidHexEscape)?;
                value.push('\u{FFFD}');
            }
        }
        Ok(())
    }

    /// Fold a bare line break inside a quoted scalar: trailing spaces are
    /// stripped, one break becomes a space, N breaks become N-1 newlines, and
    /// the resumption line loses its leading whitespace.
    fn fold_flow_break(&mut self, value: &mut String) -> YamlResult<()> {
        trim_trailing_space(value);
        let mut breaks = 1u32;
        loop {
            while matches!(self.reader.peek()?, ' ' | '\t') {
                self.reader.read()?;
            }
            if self.reader.peek()? == '\n' {
                self.reader.read()?;
                breaks += 1;
            } else {
                break;
            }
        }
        if breaks == 1 {
            value.push(' ');
        } else {
            for _ in 1..breaks {
                value.push('\n');
            }
        }
        Ok(())
    }

    fn read_block_scalar(&mut self, folded: bool) -> YamlResult<()> {
        let indent = self.reader.indent() as i32;
        self.reader.read()?; // '|' or '>'

        let mut explicit: Option<u32> = None;
        let mut chomp = Chomp::Clip;
        loop {
            match self.reader.peek()? {
                '+' => {
                    self.reader.read()?;
                    chomp = Chomp::Keep;
                }
                '-' => {
                    self.reader.read()?;
                    chomp = Chomp::Strip;
                }
                c @ '1'..='9' if explicit.is_none() => {
                    self.reader.read()?;
                    explicit = Some(c as u32 - '0' as u32);
                }
                '0' => {
                    self.reader.read()?;
                    self.report(ErrorType::ExpectedChompBetween1and9)?;
                }
                _ => break,
            }
        }
        while matches!(self.reader.peek()?, ' ' | '\t') {
            self.reader.read()?;
        }
        if self.reader.peek()? == '#' {
            self.skip_to_line_end()?;
        }
        match self.reader.peek()? {
            '\n' => {
                self.reader.read()?;
            }
            EOF_CHAR => {
                self.token = Token::with_value(TokenKind::Scalar, indent, String::new());
                return Ok(());
            }
            c => {
                self.report(ErrorType::ExpectedNewlineInBlockHeader { found: c })?;
                self.skip_to_line_end()?;
                if self.reader.peek()? == '\n' {
                    self.reader.read()?;
                }
            }
        }

        let floor = self.key_indent.max(0) as u32;
        let mut base = explicit.map(|digit| floor + digit);
        let mut value = String::new();
        // line breaks consumed since the last content character
        let mut breaks = 0u32;
        let mut blank_indent = 0u32;
        let mut prev_more_indented = false;
        let mut saw_content = false;

        loop {
            while self.reader.peek()? == ' ' {
                self.reader.read()?;
            }
            let line_indent = self.reader.indent();
            let c = self.reader.peek()?;
            if c == '\n' {
                self.reader.read()?;
                breaks += 1;
                if base.is_none() && line_indent > blank_indent {
                    blank_indent = line_indent;
                }
                continue;
            }
            if c == EOF_CHAR {
                break;
            }
            let b = match base {
                Some(b) => b,
                None => {
                    if line_indent <= floor {
                        // dedent to the owner before any body line
                        self.reader.unread_many(' ', line_indent);
                        self.reader.unread('\n');
                        break;
                    }
                    if line_indent < blank_indent {
                        self.report(ErrorType::SpacesFoundAfterIndent)?;
                    }
                    base = Some(line_indent);
                    line_indent
                }
            };
            if line_indent < b {
                self.reader.unread_many(' ', line_indent);
                self.reader.unread('\n');
                break;
            }
            let more_indented = line_indent > b;
            if !saw_content {
                // leading blank lines contribute their breaks verbatim
                for _ in 0..breaks {
                    value.push('\n');
                }
            } else if folded && breaks == 1 && !more_indented && !prev_more_indented {
                value.push(' ');
            } else {
                let keep = if !folded || breaks == 1 || more_indented || prev_more_indented {
                    breaks
                } else {
                    breaks - 1
                };
                for _ in 0..keep {
                    value.push('\n');
                }
            }
            breaks = 0;
            saw_content = true;
            prev_more_indented = more_indented;
            for _ in b..line_indent {
                value.push(' ');
            }
            loop {
                match self.reader.peek()? {
                    '\n' => {
                        self.reader.read()?;
                        breaks = 1;
                        break;
                    }
                    EOF_CHAR => break,
                    _ => {
                        let c = self.reader.read()?;
                        value.push(c);
                    }
                }
            }
        }

        match chomp {
            Chomp::Strip => {}
            Chomp::Clip => {
                if saw_content && breaks > 0 {
                    value.push('\n');
                }
            }
            Chomp::Keep => {
                for _ in 0..breaks {
                    value.push('\n');
                }
            }
        }
        self.token = Token::with_value(TokenKind::Scalar, indent, value);
        Ok(())
    }

    /// Consume up to, but not including, the next line break.
    fn skip_to_line_end(&mut self) -> YamlResult<()> {
        loop {
            match self.reader.peek()? {
                '\n' | EOF_CHAR => return Ok(()),
                _ => {
                    self.reader.read()?;
                }
            }
        }
    }

    /// Consume through the next line break.
    fn skip_line(&mut self) -> YamlResult<()> {
        loop {
            match self.reader.read()? {
                '\n' | EOF_CHAR => return Ok(()),
                _ => {}
            }
        }
    }
}

fn trim_trailing_space(value: &mut String) {
    while value.ends_with([' ', '\t']) {
        value.pop();
    }
}
