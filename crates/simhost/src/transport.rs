//! In-process publish/subscribe transport.
//!
//! A [`Transport`] is the shared bus. Plugins talk to it through a [`Node`],
//! which hands out typed [`Publisher`]s and [`Subscriber`]s. Delivery is
//! fire-and-forget: `publish` encodes the message once, pushes it onto every
//! live subscriber queue and returns without waiting for anyone.
//!
//! # Channel lifetime
//!
//! A publisher holds its advertisement until it is dropped or explicitly
//! [`unadvertise`](Publisher::unadvertise)d. Shutting the bus down
//! invalidates every publisher at once; [`Publisher::valid`] reports this
//! and `publish` fails with [`TransportError::Closed`].
//!
//! # Example
//!
//! ```
//! use simhost::msgs::StringMsg;
//! use simhost::transport::{Node, Transport};
//!
//! let transport = Transport::new();
//! let node = Node::new(&transport);
//!
//! let subscriber = node.subscribe::<StringMsg>("chatter").unwrap();
//! let publisher = node.advertise::<StringMsg>("chatter").unwrap();
//! assert!(publisher.valid());
//!
//! publisher.publish(&StringMsg { data: "hi".into(), ..StringMsg::default() }).unwrap();
//! assert_eq!(subscriber.try_recv().unwrap().unwrap().data, "hi");
//! assert_eq!(transport.published("chatter"), 1);
//! ```

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use thiserror::Error;
use tracing::debug;

use crate::msgs::Message;

/// Errors raised by the transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The topic name is not acceptable.
    #[error("invalid topic name [{0}]")]
    InvalidTopic(String),
    /// The topic already carries a different message type.
    #[error("topic [{topic}] carries [{advertised}], cannot use it for [{requested}]")]
    TypeMismatch {
        /// Topic name.
        topic: String,
        /// Type already bound to the topic.
        advertised: &'static str,
        /// Type that was requested.
        requested: &'static str,
    },
    /// The bus has been shut down.
    #[error("transport is shut down")]
    Closed,
    /// The publisher no longer holds an advertisement.
    #[error("topic [{topic}] is not advertised by this publisher")]
    NotAdvertised {
        /// Topic name.
        topic: String,
    },
    /// Encoding or decoding failed.
    #[error("failed to encode or decode a message on [{topic}]")]
    Codec {
        /// Topic name.
        topic: String,
        /// Underlying serializer error.
        #[source]
        source: serde_json::Error,
    },
}

/// Returns `true` if `topic` is an acceptable topic name.
///
/// Names must be non-empty, must not be just `/`, and must not contain
/// whitespace, `@`, `~`, `:=` or an empty path segment (`//`).
#[must_use]
pub fn is_valid_topic(topic: &str) -> bool {
    !topic.is_empty()
        && topic != "/"
        && !topic.chars().any(|c| c.is_whitespace() || c == '@' || c == '~')
        && !topic.contains(":=")
        && !topic.contains("//")
}

type Payload = Arc<[u8]>;

#[derive(Debug, Default)]
struct TopicState {
    type_name: &'static str,
    advertisers: usize,
    subscribers: Vec<flume::Sender<Payload>>,
    published: u64,
}

impl TopicState {
    /// Binds the topic to `requested`, unless it is in use with another type.
    fn bind(&mut self, topic: &str, requested: &'static str) -> Result<(), TransportError> {
        if self.type_name == requested {
            return Ok(());
        }
        if self.advertisers == 0 && self.subscribers.is_empty() {
            self.type_name = requested;
            return Ok(());
        }
        Err(TransportError::TypeMismatch {
            topic: topic.to_owned(),
            advertised: self.type_name,
            requested,
        })
    }
}

#[derive(Debug, Default)]
struct Bus {
    topics: RwLock<HashMap<String, TopicState>>,
    closed: AtomicBool,
}

impl Bus {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

// =============================================================================
// Transport
// =============================================================================

/// Shared in-process bus. Cloning yields another handle to the same bus.
#[derive(Debug, Clone, Default)]
pub struct Transport {
    bus: Arc<Bus>,
}

impl Transport {
    /// Creates a new, empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a node attached to this bus.
    #[must_use]
    pub fn node(&self) -> Node {
        Node::new(self)
    }

    /// Shuts the bus down. Every publisher becomes invalid.
    pub fn shutdown(&self) {
        self.bus.closed.store(true, Ordering::Release);
        self.bus.topics.write().values_mut().for_each(|state| state.subscribers.clear());
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has been called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.bus.is_closed()
    }

    /// Number of messages published on `topic` since the bus was created.
    #[must_use]
    pub fn published(&self, topic: &str) -> u64 {
        self.bus.topics.read().get(topic).map_or(0, |state| state.published)
    }

    /// Number of live advertisements on `topic`.
    #[must_use]
    pub fn advertisers(&self, topic: &str) -> usize {
        self.bus.topics.read().get(topic).map_or(0, |state| state.advertisers)
    }

    /// Topics with at least one live advertisement, sorted.
    #[must_use]
    pub fn advertised_topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self
            .bus
            .topics
            .read()
            .iter()
            .filter(|(_, state)| state.advertisers > 0)
            .map(|(topic, _)| topic.clone())
            .collect();
        topics.sort();
        topics
    }
}

// =============================================================================
// Node
// =============================================================================

/// A participant on the bus.
#[derive(Debug, Clone)]
pub struct Node {
    bus: Arc<Bus>,
}

impl Node {
    /// Creates a node attached to `transport`.
    #[must_use]
    pub fn new(transport: &Transport) -> Self {
        Self {
            bus: Arc::clone(&transport.bus),
        }
    }

    /// Advertises `topic` for messages of type `M`.
    ///
    /// # Errors
    ///
    /// Fails if the topic name is invalid, the topic carries another type,
    /// or the bus is shut down.
    pub fn advertise<M: Message>(&self, topic: &str) -> Result<Publisher<M>, TransportError> {
        if !is_valid_topic(topic) {
            return Err(TransportError::InvalidTopic(topic.to_owned()));
        }
        if self.bus.is_closed() {
            return Err(TransportError::Closed);
        }

        let mut topics = self.bus.topics.write();
        let state = topics.entry(topic.to_owned()).or_default();
        state.bind(topic, M::TYPE_NAME)?;
        state.advertisers += 1;
        debug!(topic, msg_type = M::TYPE_NAME, "advertised");

        Ok(Publisher {
            topic: topic.to_owned(),
            bus: Arc::downgrade(&self.bus),
            advertised: true,
            _marker: PhantomData,
        })
    }

    /// Subscribes to `topic` for messages of type `M`.
    ///
    /// Only messages published after the subscription are delivered.
    ///
    /// # Errors
    ///
    /// Fails if the topic name is invalid, the topic carries another type,
    /// or the bus is shut down.
    pub fn subscribe<M: Message>(&self, topic: &str) -> Result<Subscriber<M>, TransportError> {
        if !is_valid_topic(topic) {
            return Err(TransportError::InvalidTopic(topic.to_owned()));
        }
        if self.bus.is_closed() {
            return Err(TransportError::Closed);
        }

        let (tx, rx) = flume::unbounded();
        let mut topics = self.bus.topics.write();
        let state = topics.entry(topic.to_owned()).or_default();
        state.bind(topic, M::TYPE_NAME)?;
        state.subscribers.push(tx);

        Ok(Subscriber {
            topic: topic.to_owned(),
            rx,
            _marker: PhantomData,
        })
    }
}

// =============================================================================
// Publisher
// =============================================================================

/// Typed handle for publishing on one topic.
pub struct Publisher<M: Message> {
    topic: String,
    bus: Weak<Bus>,
    advertised: bool,
    _marker: PhantomData<fn(M)>,
}

impl<M: Message> Publisher<M> {
    /// Topic this publisher was advertised on.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Returns `true` while the advertisement is held and the bus is up.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.advertised && self.bus.upgrade().is_some_and(|bus| !bus.is_closed())
    }

    /// Publishes one message to every current subscriber.
    ///
    /// # Errors
    ///
    /// Fails if the advertisement was released, the bus is shut down, or the
    /// message cannot be encoded. Nothing is delivered on failure.
    pub fn publish(&self, msg: &M) -> Result<(), TransportError> {
        if !self.advertised {
            return Err(TransportError::NotAdvertised {
                topic: self.topic.clone(),
            });
        }
        let bus = self.bus.upgrade().ok_or(TransportError::Closed)?;
        if bus.is_closed() {
            return Err(TransportError::Closed);
        }

        let payload: Payload = serde_json::to_vec(msg)
            .map_err(|source| TransportError::Codec {
                topic: self.topic.clone(),
                source,
            })?
            .into();

        let mut topics = bus.topics.write();
        let state = topics
            .get_mut(&self.topic)
            .ok_or_else(|| TransportError::NotAdvertised {
                topic: self.topic.clone(),
            })?;
        state.published += 1;
        // Subscribers that went away are pruned on the way.
        state
            .subscribers
            .retain(|tx| tx.send(Arc::clone(&payload)).is_ok());
        Ok(())
    }

    /// Releases the advertisement. Further publishes fail.
    pub fn unadvertise(&mut self) {
        if !std::mem::replace(&mut self.advertised, false) {
            return;
        }
        if let Some(bus) = self.bus.upgrade() {
            if let Some(state) = bus.topics.write().get_mut(&self.topic) {
                state.advertisers = state.advertisers.saturating_sub(1);
            }
            debug!(topic = %self.topic, "unadvertised");
        }
    }
}

impl<M: Message> Drop for Publisher<M> {
    fn drop(&mut self) {
        self.unadvertise();
    }
}

impl<M: Message> fmt::Debug for Publisher<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("topic", &self.topic)
            .field("msg_type", &M::TYPE_NAME)
            .field("valid", &self.valid())
            .finish()
    }
}

// =============================================================================
// Subscriber
// =============================================================================

/// Typed handle receiving messages from one topic.
pub struct Subscriber<M: Message> {
    topic: String,
    rx: flume::Receiver<Payload>,
    _marker: PhantomData<fn() -> M>,
}

impl<M: Message> Subscriber<M> {
    /// Topic this subscriber listens on.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Number of messages waiting to be received.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Receives the next queued message, if any.
    ///
    /// # Errors
    ///
    /// Fails if the queued payload cannot be decoded as `M`.
    pub fn try_recv(&self) -> Result<Option<M>, TransportError> {
        match self.rx.try_recv() {
            Ok(payload) => self.decode(&payload).map(Some),
            Err(_) => Ok(None),
        }
    }

    /// Receives every queued message.
    ///
    /// # Errors
    ///
    /// Fails on the first payload that cannot be decoded as `M`.
    pub fn drain(&self) -> Result<Vec<M>, TransportError> {
        self.rx
            .try_iter()
            .map(|payload| self.decode(&payload))
            .collect()
    }

    fn decode(&self, payload: &[u8]) -> Result<M, TransportError> {
        serde_json::from_slice(payload).map_err(|source| TransportError::Codec {
            topic: self.topic.clone(),
            source,
        })
    }
}

impl<M: Message> fmt::Debug for Subscriber<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("topic", &self.topic)
            .field("msg_type", &M::TYPE_NAME)
            .field("pending", &self.pending())
            .finish()
    }
}
