mod cleaner;

pub use cleaner::{start_sweeper, sweep};
