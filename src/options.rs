/// Reader configuration.
///
/// A flat immutable record consumed at construction time; every flag
/// defaults to off except [`Options::throw_on_error`].
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Drop the underlying input once the terminal event is reached instead
    /// of handing it back through [`crate::EventIterator::into_input`].
    pub close_input: bool,
    /// Skip characters until a `---` document start, and between documents
    /// skip until the next `---`.
    pub ignore_text_outside_document_markers: bool,
    /// Permit content on the same line as `---`; it is treated as column-0
    /// content of the new document.
    pub accept_content_on_start_document_line: bool,
    /// Treat multiple `---` separated documents as one continuous document.
    /// Document markers, `...` included, are consumed and parsing continues
    /// to end of input.
    pub merge_documents: bool,
    /// Raise on the first diagnostic instead of accumulating diagnostics and
    /// producing a best-effort event stream.
    pub throw_on_error: bool,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            close_input: false,
            ignore_text_outside_document_markers: false,
            accept_content_on_start_document_line: false,
            merge_documents: false,
            throw_on_error: true,
        }
    }
}
