use std::sync::Arc;

use crate::intent::IntentGateway;

#[derive(Debug)]
pub struct AppState<C> {
    pub gateway: Arc<IntentGateway<C>>,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
        }
    }
}

impl<C> AppState<C> {
    pub fn new(gateway: IntentGateway<C>) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }
}
