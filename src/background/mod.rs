pub mod dispatcher;

pub use dispatcher::{BackgroundEvent, LookupDispatcher};
