// SPDX-License-Identifier: MIT OR Apache-2.0
//! Highlight dispatch: the "current country" channel shared by the flow
//! engine, pointer hover, and the globe.

use debtflow_graph::CountryId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The one event kind: the highlighted country changed (`None` = no highlight)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryChanged(pub Option<CountryId>);

/// Handle returned by [`HighlightDispatcher::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(CountryChanged)>;

/// Synchronous publish/subscribe channel for [`CountryChanged`].
///
/// Subscribers run in subscription order on every publish. The subscriber
/// list is changed during setup and teardown only, never from inside a
/// callback.
pub struct HighlightDispatcher {
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
    current: Option<CountryId>,
}

impl HighlightDispatcher {
    /// Create a dispatcher with no subscribers
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
            current: None,
        }
    }

    /// Register a subscriber
    pub fn subscribe(&mut self, subscriber: impl FnMut(CountryChanged) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a subscriber; returns false if it was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Remove every subscriber
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Publish a change to every subscriber
    pub fn publish(&mut self, event: CountryChanged) {
        self.current = event.0;
        tracing::trace!("Country changed: {:?}", event.0);
        for (_, subscriber) in &mut self.subscribers {
            subscriber(event);
        }
    }

    /// Highlight a country (pointer entered its bar)
    pub fn set_highlight(&mut self, id: CountryId) {
        self.publish(CountryChanged(Some(id)));
    }

    /// Drop the highlight (pointer left the bar)
    pub fn clear_highlight(&mut self) {
        self.publish(CountryChanged(None));
    }

    /// The currently highlighted country
    pub fn current(&self) -> Option<CountryId> {
        self.current
    }
}

impl Default for HighlightDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HighlightDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HighlightDispatcher")
            .field("subscribers", &self.subscribers.len())
            .field("current", &self.current)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_subscribers_run_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = HighlightDispatcher::new();

        let first = Rc::clone(&log);
        dispatcher.subscribe(move |e| first.borrow_mut().push(("first", e.0)));
        let second = Rc::clone(&log);
        dispatcher.subscribe(move |e| second.borrow_mut().push(("second", e.0)));

        dispatcher.set_highlight(CountryId(250));
        dispatcher.clear_highlight();

        assert_eq!(
            *log.borrow(),
            vec![
                ("first", Some(CountryId(250))),
                ("second", Some(CountryId(250))),
                ("first", None),
                ("second", None),
            ]
        );
        assert_eq!(dispatcher.current(), None);
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut dispatcher = HighlightDispatcher::new();
        let counter = Rc::clone(&count);
        let id = dispatcher.subscribe(move |_| *counter.borrow_mut() += 1);

        dispatcher.set_highlight(CountryId(1));
        assert!(dispatcher.unsubscribe(id));
        assert!(!dispatcher.unsubscribe(id));
        dispatcher.set_highlight(CountryId(2));

        assert_eq!(*count.borrow(), 1);
        assert_eq!(dispatcher.current(), Some(CountryId(2)));
        assert_eq!(dispatcher.subscriber_count(), 0);
    }
}
