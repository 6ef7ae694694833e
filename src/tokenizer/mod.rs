mod buf_reader;
mod lexer;
mod reader;

pub use buf_reader::BufInput;
pub use lexer::{Lexer, Token, TokenKind};
pub use reader::{Input, Reader, StrInput, EOF_CHAR};
