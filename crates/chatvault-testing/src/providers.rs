//! Provider fakes for exercising the sync path without a network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chatvault_providers::{ConversationProvider, FetchError, FetchedConversation};
use tokio::sync::Notify;

/// Provider fake driven by a queue of canned fetch results.
///
/// With a gate installed, each fetch first signals that it started and
/// then parks until released, which lets a test hold a sync inside its
/// fetch suspension point deterministically.
pub struct ScriptedProvider {
    id: &'static str,
    script: Mutex<VecDeque<Result<FetchedConversation, FetchError>>>,
    gate: Option<FetchGate>,
}

impl ScriptedProvider {
    pub fn new(id: &'static str) -> Self {
        Self {
            id,
            script: Mutex::new(VecDeque::new()),
            gate: None,
        }
    }

    /// A provider whose fetches park until the returned gate releases them.
    pub fn gated(id: &'static str) -> (Self, FetchGate) {
        let gate = FetchGate::default();
        let provider = Self {
            id,
            script: Mutex::new(VecDeque::new()),
            gate: Some(gate.clone()),
        };
        (provider, gate)
    }

    pub fn push_ok(&self, conversation: FetchedConversation) {
        self.lock().push_back(Ok(conversation));
    }

    pub fn push_err(&self, error: FetchError) {
        self.lock().push_back(Err(error));
    }

    pub fn remaining(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<FetchedConversation, FetchError>>> {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ConversationProvider for ScriptedProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    async fn fetch_conversation(
        &self,
        conversation_id: &str,
    ) -> chatvault_providers::Result<FetchedConversation> {
        if let Some(gate) = &self.gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }
        self.lock().pop_front().unwrap_or_else(|| {
            Err(FetchError::Provider(format!(
                "no scripted response for {}",
                conversation_id
            )))
        })
    }
}

/// Two-way handshake with a parked fetch.
#[derive(Clone, Default)]
pub struct FetchGate {
    started: Arc<Notify>,
    release: Arc<Notify>,
}

impl FetchGate {
    /// Wait until a fetch has entered its suspension point.
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    /// Let the parked fetch proceed.
    pub fn release(&self) {
        self.release.notify_one();
    }
}
