pub mod reporter;
pub mod writer_txt;

pub use reporter::{ConsoleReporter, EventSink, Level, NullSink};
pub use writer_txt::write_subdomains;
