use crate::session::{LifecycleEvent, SessionPayload};

type Handler = Box<dyn Fn(Option<&SessionPayload>) -> bool>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct HandlerId(u64);

/// Lifecycle event source. Handlers run synchronously, in registration order.
#[derive(Default)]
pub(crate) struct EventBus {
    next_id: u64,
    handlers: Vec<(HandlerId, LifecycleEvent, Handler)>,
}

impl EventBus {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register<F>(&mut self, event: LifecycleEvent, handler: F) -> HandlerId
    where
        F: Fn(Option<&SessionPayload>) -> bool + 'static,
    {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, event, Box::new(handler)));
        id
    }

    /// Returns false when `id` was not registered.
    pub(crate) fn disconnect(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _, _)| *handler_id != id);
        self.handlers.len() != before
    }

    /// One result per handler subscribed to `event`.
    pub(crate) fn dispatch(
        &self,
        event: LifecycleEvent,
        payload: Option<&SessionPayload>,
    ) -> Vec<bool> {
        self.handlers
            .iter()
            .filter(|(_, registered, _)| *registered == event)
            .map(|(_, _, handler)| handler(payload))
            .collect()
    }
}
