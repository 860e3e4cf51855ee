//! Notification events and their dispatch into delivery tasks.

mod dispatcher;
mod event;
mod worker;

pub use dispatcher::{Dispatcher, TaskSink};
pub use event::{
    CATEGORY_MESSAGE, CHAT_APPLICATIONS, FeedEvent, MISSED_CALL_ICON, Notification, Trigger,
};
pub use worker::Worker;
