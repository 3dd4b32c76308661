//! Mirror support for symmetric rigs.
//!
//! See [`MirrorTable`] for the table format and token matching rules.

mod table;

pub use table::{MirrorMode, MirrorOption, MirrorTable, Side};
