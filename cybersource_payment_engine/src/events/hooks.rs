use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, Handler, PostProcessingRequestedEvent, TransactionStateChangedEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub state_changed_producer: Vec<EventProducer<TransactionStateChangedEvent>>,
    pub post_processing_producer: Vec<EventProducer<PostProcessingRequestedEvent>>,
}

pub struct EventHandlers {
    pub on_state_changed: Option<EventHandler<TransactionStateChangedEvent>>,
    pub on_post_processing: Option<EventHandler<PostProcessingRequestedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_state_changed = hooks.on_state_changed.map(|f| EventHandler::new(buffer_size, f));
        let on_post_processing = hooks.on_post_processing.map(|f| EventHandler::new(buffer_size, f));
        Self { on_state_changed, on_post_processing }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_state_changed {
            result.state_changed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_post_processing {
            result.post_processing_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_state_changed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_post_processing {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_state_changed: Option<Handler<TransactionStateChangedEvent>>,
    pub on_post_processing: Option<Handler<PostProcessingRequestedEvent>>,
}

impl EventHooks {
    pub fn on_state_changed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(TransactionStateChangedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_state_changed = Some(Arc::new(f));
        self
    }

    pub fn on_post_processing<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(PostProcessingRequestedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_post_processing = Some(Arc::new(f));
        self
    }
}
