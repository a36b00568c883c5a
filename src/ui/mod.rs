//! Terminal front end: the drawing surface, input handling and error screen.

pub mod error;
pub mod input;
pub mod terminal;

pub use error::{show_error, ErrorScreen};
pub use input::{GraphCommand, InputHandler};
pub use terminal::{StatusLine, TerminalSurface};
