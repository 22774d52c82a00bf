//! Render-fault boundary.
//!
//! Wraps a render pass so a panic anywhere beneath it is logged and turned
//! into a [`RenderFault`] instead of unwinding through the caller.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use log::error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFault {
    pub scope: &'static str,
    pub message: String,
}

/// Run `render`, catching any panic it raises.
pub fn guard<R>(
    scope: &'static str,
    render: impl FnOnce() -> R,
) -> Result<R, RenderFault> {
    catch_unwind(AssertUnwindSafe(render)).map_err(|payload| {
        let message = panic_message(payload.as_ref());
        error!("[Boundary] Render of {} failed: {}", scope, message);
        RenderFault { scope, message }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown render fault".to_string()
    }
}
