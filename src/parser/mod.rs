mod event;

pub use event::Event;

use std::collections::VecDeque;

use crate::error::{Diagnostic, ErrorType, YamlResult};
use crate::options::Options;
use crate::tokenizer::{Input, Lexer, StrInput, TokenKind};

#[derive(Copy, Clone, PartialEq)]
enum FrameKind {
    Mapping,
    Sequence,
}

/// An open container and the indent of the owner that introduced it.
#[derive(Copy, Clone)]
struct Frame {
    kind: FrameKind,
    enclosing_indent: i32,
}

/// Kind of the most recently enqueued event, for the `expecting_key`
/// predicate.
#[derive(Copy, Clone, PartialEq)]
enum Emitted {
    None,
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    PropertyName,
    String,
    End,
}

/// Pull parser turning lexer tokens into JSON-shaped [`Event`]s.
///
/// Block structure is inferred from indentation with one token of lookahead;
/// a small FIFO queue serializes the multi-event decisions (closing several
/// containers, synthesizing empty keys or values).
pub struct EventIterator<I> {
    lexer: Lexer<I>,
    options: Options,
    stack: Vec<Frame>,
    current_indent: i32,
    queue: VecDeque<Event>,
    last: Emitted,
    emitted_any: bool,
    done: bool,
    finished: bool,
}

impl<'a> From<&'a str> for EventIterator<StrInput<'a>> {
    fn from(value: &'a str) -> EventIterator<StrInput<'a>> {
        EventIterator::with_options(StrInput::from(value), Options::default())
    }
}

impl<I: Input> EventIterator<I> {
    pub fn new(input: I) -> EventIterator<I> {
        EventIterator::with_options(input, Options::default())
    }

    pub fn with_options(input: I, options: Options) -> EventIterator<I> {
        EventIterator {
            lexer: Lexer::new(input, options),
            options,
            stack: Vec::new(),
            current_indent: -1,
            queue: VecDeque::new(),
            last: Emitted::None,
            emitted_any: false,
            done: false,
            finished: false,
        }
    }

    /// Diagnostics gathered so far; all of them when
    /// [`Options::throw_on_error`] is off.
    #[inline]
    pub fn errors(&self) -> &[Diagnostic] {
        self.lexer.reporter.diagnostics()
    }

    #[inline]
    pub fn error_occurred(&self) -> bool {
        self.lexer.reporter.error_occurred()
    }

    /// Recover the underlying input; `None` once
    /// [`Options::close_input`] dropped it.
    pub fn into_input(self) -> Option<I> {
        self.lexer.into_input()
    }

    /// Produce the next event. After the terminal [`Event::End`] every
    /// further call returns [`Event::End`] again.
    pub fn next_event(&mut self) -> YamlResult<Event> {
        loop {
            if let Some(event) = self.queue.pop_front() {
                return Ok(event);
            }
            if self.done {
                return Ok(Event::End);
            }
            let kind = self.lexer.token().kind;
            match kind {
                TokenKind::None
                | TokenKind::BetweenDocs
                | TokenKind::Tag
                | TokenKind::Directive => self.lexer.fetch_next_token()?,
                TokenKind::BeginDoc => {
                    let had_content = self.emitted_any;
                    self.lexer.fetch_next_token()?;
                    if had_content && !self.options.merge_documents {
                        self.finish()?;
                    }
                }
                TokenKind::NewLine => {
                    let indent = self.lexer.token().indent;
                    self.lexer.fetch_next_token()?;
                    let next = self.lexer.token().kind;
                    match next {
                        // the line was blank
                        TokenKind::NewLine | TokenKind::EndDoc | TokenKind::Eof => {}
                        _ => {
                            if indent < self.current_indent {
                                self.close_to_indent(indent)?;
                            }
                            // a sequence member line must start with `-`; its
                            // absence at the owner indent ends the sequence
                            let ends_sequence = matches!(
                                self.stack.last(),
                                Some(frame) if frame.kind == FrameKind::Sequence
                                    && frame.enclosing_indent == indent
                            ) && next != TokenKind::SequenceIndicator;
                            if ends_sequence {
                                if let Some(frame) = self.stack.pop() {
                                    self.push_event(Event::EndArray);
                                    self.current_indent = frame.enclosing_indent;
                                }
                            }
                        }
                    }
                }
                TokenKind::ValueIndicator => {
                    let indent = self.lexer.token().indent;
                    if self.expecting_key() || indent > self.current_indent {
                        self.enqueue_key(indent, String::new())?;
                    }
                    self.lexer.fetch_next_token()?;
                }
                TokenKind::KeyIndicator => {
                    let indent = self.lexer.token().indent;
                    if indent > self.current_indent {
                        self.stack.push(Frame {
                            kind: FrameKind::Mapping,
                            enclosing_indent: self.current_indent,
                        });
                        self.push_event(Event::StartObject);
                        self.current_indent = indent;
                        continue;
                    }
                    if matches!(self.stack.last(), Some(frame) if frame.kind == FrameKind::Sequence)
                    {
                        self.lexer.report(ErrorType::UnexpectedKeyIndicator)?;
                        self.lexer.fetch_next_token()?;
                        continue;
                    }
                    if !self.expecting_key() {
                        self.push_event(Event::String(String::new()));
                        continue;
                    }
                    self.lexer.fetch_next_token()?;
                    if self.lexer.token().kind == TokenKind::Scalar {
                        let token = self.lexer.take_token();
                        self.push_event(Event::PropertyName(token.value.unwrap_or_default()));
                        self.lexer.fetch_next_token()?;
                    } else {
                        self.lexer.report(ErrorType::ExpectedScalarAfterKeyIndicator)?;
                    }
                }
                TokenKind::Scalar => {
                    let token = self.lexer.take_token();
                    let indent = token.indent;
                    let value = token.value.unwrap_or_default();
                    self.lexer.fetch_next_token()?;
                    if self.lexer.token().kind == TokenKind::ValueIndicator {
                        self.enqueue_key(indent, value)?;
                        self.lexer.fetch_next_token()?;
                    } else {
                        if self.expecting_key() {
                            self.lexer.report(ErrorType::ExpectedColonAfterKey)?;
                            self.enqueue_key(indent, String::new())?;
                        }
                        self.push_event(Event::String(value));
                    }
                }
                TokenKind::SequenceIndicator => {
                    let indent = self.lexer.token().indent;
                    let in_sequence = matches!(
                        self.stack.last(),
                        Some(frame) if frame.kind == FrameKind::Sequence
                    );
                    if in_sequence && indent == self.current_indent {
                        // next item of the open sequence
                    } else if indent >= self.current_indent {
                        self.stack.push(Frame {
                            kind: FrameKind::Sequence,
                            enclosing_indent: self.current_indent,
                        });
                        self.push_event(Event::StartArray);
                        self.current_indent = indent;
                    } else {
                        self.lexer.report(ErrorType::UnexpectedSequenceItem {
                            actual: indent,
                            expected: self.current_indent,
                        })?;
                    }
                    self.lexer.fetch_next_token()?;
                }
                TokenKind::EndDoc => {
                    if self.options.merge_documents {
                        self.lexer.fetch_next_token()?;
                    } else {
                        self.finish()?;
                    }
                }
                TokenKind::Eof => self.finish()?,
            }
        }
    }

    fn finish(&mut self) -> YamlResult<()> {
        self.close_to_indent(-1)?;
        self.push_event(Event::End);
        self.done = true;
        if self.options.close_input {
            self.lexer.close_input();
        }
        Ok(())
    }

    /// True when the innermost frame is a mapping and the next event there
    /// must be a key.
    fn expecting_key(&self) -> bool {
        matches!(self.stack.last(), Some(frame) if frame.kind == FrameKind::Mapping)
            && matches!(
                self.last,
                Emitted::StartObject | Emitted::EndObject | Emitted::EndArray | Emitted::String
            )
    }

    fn enqueue_key(&mut self, indent: i32, name: String) -> YamlResult<()> {
        if indent > self.current_indent {
            if self.expecting_key() {
                // a completed pair cannot own a deeper key, keep it here
                self.lexer.report(ErrorType::InvalidKeyIndent {
                    actual: indent,
                    expected: self.current_indent,
                })?;
                self.push_event(Event::PropertyName(name));
                return Ok(());
            }
            self.stack.push(Frame {
                kind: FrameKind::Mapping,
                enclosing_indent: self.current_indent,
            });
            self.push_event(Event::StartObject);
            self.push_event(Event::PropertyName(name));
            self.current_indent = indent;
        } else if indent == self.current_indent {
            if !self.expecting_key() {
                self.push_event(Event::String(String::new()));
            }
            self.push_event(Event::PropertyName(name));
        } else {
            // callers pre-close via close_to_indent, getting here is a bug
            self.lexer.report(ErrorType::UnexpectedDedent {
                actual: indent,
                expected: self.current_indent,
            })?;
            self.push_event(Event::PropertyName(name));
        }
        Ok(())
    }

    fn close_to_indent(&mut self, target: i32) -> YamlResult<()> {
        while let Some(&frame) = self.stack.last() {
            if frame.enclosing_indent < target {
                break;
            }
            if frame.kind == FrameKind::Mapping && !self.expecting_key() {
                // a key was emitted but its value never arrived
                self.push_event(Event::String(String::new()));
            }
            self.stack.pop();
            self.push_event(match frame.kind {
                FrameKind::Mapping => Event::EndObject,
                FrameKind::Sequence => Event::EndArray,
            });
            self.current_indent = frame.enclosing_indent;
        }
        if self.current_indent != target {
            self.lexer.report(ErrorType::ExpectedIndent {
                actual: target,
                expected: self.current_indent,
            })?;
            self.current_indent = target;
        }
        Ok(())
    }

    fn push_event(&mut self, event: Event) {
        self.last = match event {
            Event::StartObject => Emitted::StartObject,
            Event::EndObject => Emitted::EndObject,
            Event::StartArray => Emitted::StartArray,
            Event::EndArray => Emitted::EndArray,
            Event::PropertyName(_) => Emitted::PropertyName,
            Event::String(_) => Emitted::String,
            Event::End => Emitted::End,
        };
        self.emitted_any = true;
        self.queue.push_back(event);
    }
}

impl<I: Input> Iterator for EventIterator<I> {
    type Item = YamlResult<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_event() {
            Ok(Event::End) => {
                self.finished = true;
                Some(Ok(Event::End))
            }
            Ok(event) => Some(Ok(event)),
            Err(error) => {
                self.finished = true;
                Some(Err(error))
            }
        }
    }
}

/// Assert that for the given input the parser generates the expected events.
///
/// Events render one per line, indented by nesting depth. Diagnostics do not
/// abort the stream here; error expectations go through
/// [`EventIterator::errors`].
///
/// # Panics
///
/// Panics when the rendered events differ from `expected_events`.
pub fn assert_eq_event(input: &str, expected_events: &str) {
    use std::fmt::Write;

    let options = Options {
        throw_on_error: false,
        ..Options::default()
    };
    let mut iterator = EventIterator::with_options(StrInput::from(input), options);
    let mut actual = String::with_capacity(expected_events.len());
    let mut depth = 1usize;
    loop {
        let event = match iterator.next_event() {
            Ok(event) => event,
            Err(_) => break,
        };
        let at = match event {
            Event::StartObject | Event::StartArray => {
                depth += 1;
                depth - 1
            }
            Event::EndObject | Event::EndArray => {
                depth -= 1;
                depth
            }
            _ => depth,
        };
        write!(actual, "\n{}{}", " ".repeat(at), event).unwrap();
        if event == Event::End {
            break;
        }
    }
    assert_eq!(actual, expected_events, "Error in {input}");
}
