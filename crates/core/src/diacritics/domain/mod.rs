pub mod confusion_tally;
pub mod confusion_tracker;
