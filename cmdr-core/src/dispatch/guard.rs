use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::command::{CommandContext, CommandHandler, HandlerError, HandlerResult};

/// Runs a handler so that every failure, including a panic, comes back as a `HandlerError`.
pub(super) fn run_guarded(handler: &CommandHandler, context: &CommandContext<'_>) -> HandlerResult {
    match panic::catch_unwind(AssertUnwindSafe(|| handler(context))) {
        Ok(result) => result,
        Err(payload) => Err(HandlerError::Unexpected(panic_detail(payload.as_ref()))),
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("handler panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("handler panicked: {message}")
    } else {
        "handler panicked".to_owned()
    }
}
