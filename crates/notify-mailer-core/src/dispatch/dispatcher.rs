//! Turns notification events into delivery tasks.
//!
//! The dispatcher decides and hands off; it never waits for a delivery.

use super::event::{FeedEvent, Notification, Trigger};
use crate::config::{ConfigSnapshot, ConfigSource, validate};
use crate::delivery::DeliveryTask;
use crate::window;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Receives delivery tasks from the dispatcher.
pub trait TaskSink: Send + Sync {
    /// Accepts a task. Must not block on its delivery.
    fn submit(&self, task: DeliveryTask);
}

impl<T: TaskSink + ?Sized> TaskSink for Arc<T> {
    fn submit(&self, task: DeliveryTask) {
        (**self).submit(task);
    }
}

type Feedback = Box<dyn Fn(&str) + Send + Sync>;

/// Routes notification events to a task sink.
pub struct Dispatcher<C, S> {
    config: C,
    sink: S,
    feedback: Option<Feedback>,
}

impl<C, S> Dispatcher<C, S>
where
    C: ConfigSource,
    S: TaskSink,
{
    /// Creates a dispatcher reading preferences from `config`.
    pub fn new(config: C, sink: S) -> Self {
        Self {
            config,
            sink,
            feedback: None,
        }
    }

    /// Reports incomplete configuration to the user through `feedback`.
    #[must_use]
    pub fn with_feedback(mut self, feedback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.feedback = Some(Box::new(feedback));
        self
    }

    /// The task sink.
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Routes one feed event.
    pub fn handle(&self, event: &FeedEvent) {
        match event {
            FeedEvent::Connected { active } => self.listener_connected(active),
            FeedEvent::Posted(notification) => self.notification_posted(notification),
            FeedEvent::Removed(notification) => self.notification_removed(notification),
        }
    }

    /// The listener connected; notifications already showing are processed
    /// as if just posted.
    pub fn listener_connected(&self, active: &[Notification]) {
        info!(active = active.len(), "Listener connected");
        for notification in active {
            self.process(notification);
        }
    }

    /// A notification was posted.
    pub fn notification_posted(&self, notification: &Notification) {
        debug!(
            id = notification.id,
            app = %notification.source_application,
            icon = notification.icon,
            category = ?notification.category,
            "Notification posted"
        );
        self.process(notification);
    }

    /// A notification was removed.
    pub fn notification_removed(&self, notification: &Notification) {
        debug!(
            id = notification.id,
            app = %notification.source_application,
            "Notification removed"
        );
    }

    fn process(&self, notification: &Notification) {
        let prefs = self.config.preferences();
        if !prefs.enabled {
            debug!("Forwarding disabled");
            return;
        }

        let Some(trigger) = Trigger::classify(notification) else {
            return;
        };
        debug!(?trigger, id = notification.id, "Notification matched");

        let snapshot = ConfigSnapshot::capture(&prefs);
        if let Err(errors) = validate(&snapshot) {
            for error in &errors {
                warn!(field = error.field(), "{}", error.message());
            }
            if let (Some(feedback), Some(first)) = (&self.feedback, errors.first()) {
                feedback(first.message());
            }
            return;
        }

        if !window::is_active(&snapshot, notification.post_time) {
            debug!(?trigger, "Outside activity window");
            return;
        }

        let task = DeliveryTask::new(trigger.subject(), notification.post_time, Arc::new(snapshot));
        info!(subject = task.subject(), "Submitting delivery");
        self.sink.submit(task);
    }
}

impl<C, S> fmt::Debug for Dispatcher<C, S>
where
    C: fmt::Debug,
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("sink", &self.sink)
            .field("feedback", &self.feedback.is_some())
            .finish()
    }
}
