//! Invocation dispatcher
//!
//! Turns a trigger into exactly one outbound invocation and classifies the
//! reply for diagnostics. Nothing here retries or keeps state between calls.

use std::sync::Arc;

use super::invocation::{Disposition, InvocationService, InvokeRequest};

/// Builds invocation requests and submits them to an [`InvocationService`]
#[derive(Clone)]
pub struct InvocationDispatcher {
    service: Arc<dyn InvocationService>,
    target: String,
    action: String,
}

impl InvocationDispatcher {
    /// Create a dispatcher whose default request is `{target, action}`
    pub fn new(
        service: Arc<dyn InvocationService>,
        target: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            service,
            target: target.into(),
            action: action.into(),
        }
    }

    /// Default target identifier
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Default action identifier
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Invoke `target` with `action` and classify the reply
    pub fn dispatch(&self, target: &str, action: &str) -> Disposition {
        match InvokeRequest::new(target, action) {
            Ok(request) => self.dispatch_request(&request),
            Err(err) => {
                tracing::warn!(target_id = target, action, "not invoking: {}", err);
                Disposition::BadRequest
            }
        }
    }

    /// Invoke the configured default target and action
    pub fn dispatch_default(&self) -> Disposition {
        self.dispatch(&self.target, &self.action)
    }

    /// Submit an already-built request
    pub fn dispatch_request(&self, request: &InvokeRequest) -> Disposition {
        let reply = self.service.invoke(request);
        let disposition = Disposition::from_reply(reply.as_ref());
        log_disposition(request, disposition);
        disposition
    }
}

fn log_disposition(request: &InvokeRequest, disposition: Disposition) {
    let id = request.id();
    match disposition {
        Disposition::Delivered => {
            tracing::info!(%id, %request, "invocation delivered");
        }
        Disposition::NoReply => {
            tracing::warn!(%id, %request, "invoke failed, reply is empty");
        }
        failed => {
            tracing::warn!(%id, %request, "invocation failed: {}", failed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::invocation::{InvokeReplyError, InvokeTargetReply};
    use parking_lot::Mutex;

    struct Scripted {
        reply: Option<InvokeTargetReply>,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl Scripted {
        fn new(reply: Option<InvokeTargetReply>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl InvocationService for Scripted {
        fn invoke(&self, request: &InvokeRequest) -> Option<InvokeTargetReply> {
            self.seen
                .lock()
                .push((request.target().to_string(), request.action().to_string()));
            self.reply.clone()
        }
    }

    fn dispatcher(service: Arc<Scripted>) -> InvocationDispatcher {
        InvocationDispatcher::new(service, "bb.clock.launcher", "bb.action.OPEN")
    }

    #[test]
    fn test_dispatch_submits_once() {
        let service = Scripted::new(Some(InvokeTargetReply::success()));
        let disposition = dispatcher(service.clone()).dispatch_default();

        assert_eq!(disposition, Disposition::Delivered);
        assert_eq!(
            *service.seen.lock(),
            vec![(
                "bb.clock.launcher".to_string(),
                "bb.action.OPEN".to_string()
            )]
        );
    }

    #[test]
    fn test_dispatch_maps_reply_errors() {
        let cases = [
            (InvokeReplyError::NoTarget, Disposition::TargetNotFound),
            (InvokeReplyError::BadRequest, Disposition::BadRequest),
            (InvokeReplyError::Internal, Disposition::InternalError),
            (InvokeReplyError::Other(42), Disposition::Delivered),
        ];

        for (error, expected) in cases {
            let service = Scripted::new(Some(InvokeTargetReply::new(error)));
            assert_eq!(dispatcher(service).dispatch_default(), expected);
        }
    }

    #[test]
    fn test_dispatch_without_reply() {
        let service = Scripted::new(None);
        assert_eq!(
            dispatcher(service.clone()).dispatch_default(),
            Disposition::NoReply
        );
        assert_eq!(service.seen.lock().len(), 1);
    }

    #[test]
    fn test_empty_target_never_reaches_service() {
        let service = Scripted::new(Some(InvokeTargetReply::success()));
        let disposition = dispatcher(service.clone()).dispatch("", "bb.action.OPEN");

        assert_eq!(disposition, Disposition::BadRequest);
        assert!(service.seen.lock().is_empty());
    }
}
