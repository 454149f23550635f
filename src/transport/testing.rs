//! Scripted transport for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::common::errors::{ChatError, ChatResult};
use crate::conversation::exchange::HttpReply;
use crate::conversation::request::ChatKitRequest;

use super::{Transport, TransportFuture};

/// Transport replaying scripted replies and recording the requests it saw.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<ChatResult<HttpReply>>>,
    sent: Mutex<Vec<ChatKitRequest>>,
}

impl ScriptedTransport {
    pub fn with_replies(replies: Vec<ChatResult<HttpReply>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<ChatKitRequest> {
        self.sent.lock().expect("sent lock").clone()
    }
}

impl Transport for ScriptedTransport {
    fn send<'a>(&'a self, request: &'a ChatKitRequest) -> TransportFuture<'a, ChatResult<HttpReply>> {
        self.sent.lock().expect("sent lock").push(request.clone());
        let reply = self
            .replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::Io(std::io::Error::other("no scripted reply"))));
        Box::pin(async move { reply })
    }
}

/// Transport whose requests never complete.
pub struct HangingTransport;

impl Transport for HangingTransport {
    fn send<'a>(&'a self, _request: &'a ChatKitRequest) -> TransportFuture<'a, ChatResult<HttpReply>> {
        Box::pin(std::future::pending())
    }
}
