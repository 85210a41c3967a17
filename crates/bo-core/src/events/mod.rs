use std::sync::Arc;
use parking_lot::Mutex;
use ahash::AHashMap;

/// Dashboard-wide event bus; carries the notifications a UI turns into toasts
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<std::any::TypeId, Vec<Box<dyn EventHandler>>>>>,
}

/// Event trait that all events must implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Common dashboard events
pub mod events {
    use super::Event;

    /// A debounced fetch went out to the backend
    #[derive(Debug, Clone)]
    pub struct FetchStarted {
        pub profile_id: String,
        pub start_date: String,
        pub end_date: String,
    }

    /// A fetch completed and replaced the displayed report
    #[derive(Debug, Clone)]
    pub struct ReportLoaded {
        pub profile_id: String,
        pub campaign_count: usize,
    }

    /// A fetch failed for a reason other than being superseded
    #[derive(Debug, Clone)]
    pub struct FetchFailed {
        pub profile_id: String,
        pub message: String,
    }

    /// The active filter list changed
    #[derive(Debug, Clone)]
    pub struct FiltersApplied {
        pub active: usize,
    }

    /// The column customization dialog was saved
    #[derive(Debug, Clone)]
    pub struct ColumnsSaved {
        pub visible: usize,
        pub frozen: usize,
    }

    /// A bid or budget change was staged for review
    #[derive(Debug, Clone)]
    pub struct ChangeStaged {
        pub campaign_id: String,
        pub pending: usize,
    }

    // Implement Event trait for all event types
    macro_rules! impl_event {
        ($($t:ty),*) => {
            $(
                impl Event for $t {
                    fn as_any(&self) -> &dyn std::any::Any {
                        self
                    }
                }
            )*
        }
    }

    impl_event!(
        FetchStarted,
        ReportLoaded,
        FetchFailed,
        FiltersApplied,
        ColumnsSaved,
        ChangeStaged
    );
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Subscribe to events of a specific type
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();
        handlers.entry(type_id).or_insert_with(Vec::new).push(handler);
    }

    /// Publish an event
    pub fn publish<E: Event>(&self, event: E) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();

        if let Some(event_handlers) = handlers.get_mut(&type_id) {
            for handler in event_handlers.iter_mut() {
                handler.handle(&event);
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper struct for creating event handlers from closures
pub struct ClosureEventHandler<F> {
    handler: F,
}

impl<F> EventHandler for ClosureEventHandler<F>
where
    F: FnMut(&dyn Event) + Send + Sync,
{
    fn handle(&mut self, event: &dyn Event) {
        (self.handler)(event);
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    Box::new(ClosureEventHandler { handler: f })
}
