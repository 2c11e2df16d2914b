//! Message transport between the two sides.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// Outbound half of a transport. Sending never blocks and never waits for
/// the other side.
pub trait MessageSink<M> {
    fn send(&mut self, message: &M) -> Result<()>;
}

/// In-process transport. Every message is serialized to JSON on send and
/// decoded on receive, so the two sides share no memory.
///
/// Clones share the same queue; hand one clone to each side.
pub struct LocalChannel<M> {
    queue: Rc<RefCell<VecDeque<String>>>,
    _message: PhantomData<fn(M) -> M>,
}

impl<M> Clone for LocalChannel<M> {
    fn clone(&self) -> Self {
        Self {
            queue: Rc::clone(&self.queue),
            _message: PhantomData,
        }
    }
}

impl<M> Default for LocalChannel<M> {
    fn default() -> Self {
        Self {
            queue: Rc::default(),
            _message: PhantomData,
        }
    }
}

impl<M> std::fmt::Debug for LocalChannel<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalChannel")
            .field("queued", &self.queue.borrow().len())
            .finish()
    }
}

impl<M> LocalChannel<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Queue raw text as if it came off the wire.
    pub fn push_raw(&self, text: impl Into<String>) {
        self.queue.borrow_mut().push_back(text.into());
    }

    /// Remove and return the queued wire text, oldest first.
    pub fn take_raw(&self) -> Vec<String> {
        self.queue.borrow_mut().drain(..).collect()
    }
}

impl<M: DeserializeOwned> LocalChannel<M> {
    /// Decode the oldest queued message. `None` when the queue is empty.
    pub fn recv(&self) -> Option<Result<M>> {
        let text = self.queue.borrow_mut().pop_front()?;
        Some(serde_json::from_str(&text).map_err(Into::into))
    }

    /// Decode everything queued, in order. Undecodable messages are dropped.
    pub fn drain(&self) -> Vec<M> {
        let mut messages = Vec::new();
        while let Some(result) = self.recv() {
            match result {
                Ok(message) => messages.push(message),
                Err(err) => tracing::debug!(error = %err, "dropping undecodable message"),
            }
        }
        messages
    }
}

impl<M: Serialize> MessageSink<M> for LocalChannel<M> {
    fn send(&mut self, message: &M) -> Result<()> {
        let text = serde_json::to_string(message)?;
        self.queue.borrow_mut().push_back(text);
        Ok(())
    }
}
