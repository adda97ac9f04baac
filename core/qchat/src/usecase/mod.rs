pub mod catalog;
pub mod controller;
pub mod history;

pub use catalog::IdentifierCatalog;
pub use controller::{ConversationController, Services, SubmitOutcome};
pub use history::HistoryReader;
