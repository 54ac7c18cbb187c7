//! Shared Application State

use crate::responder::Responder;
use std::sync::Arc;

/// State shared by every connection handler.
#[derive(Clone)]
pub struct AppState {
    pub responder: Arc<dyn Responder>,
}
