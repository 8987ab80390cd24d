pub mod batch;
pub mod builder;
pub mod controller;
pub mod error;
pub mod initializer;
pub mod tracker;
pub mod types;

pub use batch::BatchController;
pub use builder::build_decision;
pub use controller::{ControllerStatus, InterruptController};
pub use error::{InboxError, Notice, NoticeLevel, StreamOperation};
pub use initializer::{create_default_response, InitialResponse};
pub use tracker::{EditInput, ReviewState};
pub use types::*;
