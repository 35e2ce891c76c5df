mod chat;
mod dispatcher;
mod store;

pub use chat::*;
pub use dispatcher::*;
pub use store::*;
