//! qchat 固有のドメイン型（セッション状態と不変条件）

pub mod command;
pub mod session;
pub mod transcript;

pub use command::QchatCommand;
pub use session::{ControllerState, Session};
pub use transcript::SessionTranscript;
