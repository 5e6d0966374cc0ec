use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chatvault_engine::{MalformedTree, build_tree};
use chatvault_providers::{
    ConversationProvider, FetchError, FetchedConversation, ProviderRegistry,
};
use chatvault_types::{Attachment, Conversation, MessageNode, SyncKey, SyncState, ids};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{Error, Result, StoreError};
use crate::flight::FlightTable;
use crate::store::ConversationStore;

/// Outcome of one sync run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub conversation: Conversation,
    /// Node rows inserted or updated. Zero when the remote was unchanged.
    pub upserted: usize,
}

/// Orchestrates fetch, validation, diff, and the atomic upsert for one
/// conversation at a time per (provider, conversation) key.
pub struct SyncCoordinator {
    store: Arc<dyn ConversationStore>,
    providers: Arc<ProviderRegistry>,
    flights: FlightTable,
}

impl SyncCoordinator {
    pub fn new(store: Arc<dyn ConversationStore>, providers: Arc<ProviderRegistry>) -> Self {
        Self {
            store,
            providers,
            flights: FlightTable::new(),
        }
    }

    /// Run one sync for (provider, conversation).
    ///
    /// Strictly serialized per key: a call made while another sync for
    /// the same key is in flight fails fast with
    /// [`Error::AlreadySyncing`] instead of queueing. Fetch and
    /// validation failures leave the store untouched, so whatever was
    /// synced before keeps being served.
    pub async fn sync(&self, provider_id: &str, conversation_id: &str) -> Result<SyncReport> {
        let key = SyncKey::new(provider_id, conversation_id);
        let _flight = self
            .flights
            .try_begin(key.clone())
            .ok_or_else(|| Error::AlreadySyncing {
                provider_id: provider_id.to_string(),
                conversation_id: conversation_id.to_string(),
            })?;

        let provider = self.providers.get(provider_id).ok_or_else(|| {
            Error::Fetch(FetchError::Provider(format!(
                "no adapter registered for {}",
                provider_id
            )))
        })?;

        debug!(%key, "sync started");
        let previous_last = self
            .store
            .get_sync_state(provider_id, conversation_id)
            .await?
            .and_then(|state| state.last_sync_at);

        // Advisory mirror for observers; the flight table is the guard.
        self.store
            .set_sync_state(&SyncState {
                provider_id: provider_id.to_string(),
                conversation_id: conversation_id.to_string(),
                last_sync_at: previous_last,
                is_syncing: true,
            })
            .await?;

        let outcome = self
            .run(provider.as_ref(), provider_id, conversation_id)
            .await;

        let last_sync_at = match &outcome {
            Ok(_) => Some(Utc::now()),
            Err(_) => previous_last,
        };
        self.store
            .set_sync_state(&SyncState {
                provider_id: provider_id.to_string(),
                conversation_id: conversation_id.to_string(),
                last_sync_at,
                is_syncing: false,
            })
            .await?;

        match &outcome {
            Ok(report) => debug!(%key, upserted = report.upserted, "sync committed"),
            Err(err) => warn!(%key, error = %err, "sync failed"),
        }
        outcome
    }

    async fn run(
        &self,
        provider: &dyn ConversationProvider,
        provider_id: &str,
        conversation_id: &str,
    ) -> Result<SyncReport> {
        let fetched = provider.fetch_conversation(conversation_id).await?;

        let existing_nodes = self.store.get_nodes(conversation_id).await?;
        let existing_attachments = self.store.get_attachments(conversation_id).await?;
        let existing_conversation = self.store.get_conversation(conversation_id).await?;

        let plan = plan_sync(
            provider_id,
            conversation_id,
            &fetched,
            &existing_nodes,
            &existing_attachments,
            existing_conversation.as_ref(),
            Utc::now(),
        )?;

        let mut upserted = 0;
        if !plan.nodes.is_empty() || !plan.attachments.is_empty() {
            upserted = self
                .store
                .upsert_nodes(conversation_id, &plan.nodes, &plan.attachments)
                .await?;
        }
        if let Some(conversation) = &plan.conversation {
            self.store.upsert_conversation(conversation).await?;
        }

        let conversation = self
            .store
            .get_conversation(conversation_id)
            .await?
            .ok_or_else(|| {
                Error::Store(StoreError::Corrupt(format!(
                    "conversation {} missing after sync",
                    conversation_id
                )))
            })?;

        Ok(SyncReport {
            conversation,
            upserted,
        })
    }
}

/// Everything one sync run intends to write.
pub(crate) struct SyncPlan {
    /// Nodes to insert or update; unchanged nodes are not re-written.
    pub(crate) nodes: Vec<MessageNode>,
    pub(crate) attachments: Vec<Attachment>,
    /// Conversation row to write, `None` when nothing changed.
    pub(crate) conversation: Option<Conversation>,
}

/// Pure half of a sync run: normalize fetched nodes, validate the tree
/// shape, and diff against the stored rows.
///
/// Local facts survive the diff untouched: `order_index` and `created_at`
/// of known nodes stay as stored (indexes are appended for new nodes,
/// never renumbered), attachments are planned without a `local_path`, and
/// stored nodes missing from the fetch are left alone (provider history
/// is append/update only here; nothing is deleted).
pub(crate) fn plan_sync(
    provider_id: &str,
    conversation_id: &str,
    fetched: &FetchedConversation,
    existing_nodes: &[MessageNode],
    existing_attachments: &[Attachment],
    existing_conversation: Option<&Conversation>,
    now: DateTime<Utc>,
) -> std::result::Result<SyncPlan, MalformedTree> {
    let candidates = normalize(conversation_id, fetched);
    build_tree(&candidates)?;

    let by_provider: HashMap<&str, &MessageNode> = existing_nodes
        .iter()
        .map(|node| (node.provider_node_id.as_str(), node))
        .collect();
    let mut next_order = existing_nodes
        .iter()
        .map(|node| node.order_index)
        .max()
        .map(|max| max + 1)
        .unwrap_or(0);

    let mut node_upserts = Vec::new();
    let mut message_count = existing_nodes.len();
    for mut candidate in candidates {
        match by_provider.get(candidate.provider_node_id.as_str()) {
            Some(existing) => {
                if !existing.content_eq(&candidate) {
                    candidate.order_index = existing.order_index;
                    candidate.created_at = existing.created_at;
                    node_upserts.push(candidate);
                }
            }
            None => {
                candidate.order_index = next_order;
                next_order += 1;
                message_count += 1;
                node_upserts.push(candidate);
            }
        }
    }

    let attachment_upserts = plan_attachments(conversation_id, fetched, existing_attachments);

    let rows_changed = !node_upserts.is_empty() || !attachment_upserts.is_empty();
    let metadata_changed = existing_conversation
        .map(|c| c.title != fetched.title || c.message_count != message_count)
        .unwrap_or(true);

    let conversation = (rows_changed || metadata_changed).then(|| Conversation {
        id: conversation_id.to_string(),
        provider_id: provider_id.to_string(),
        title: fetched.title.clone(),
        current_node_id: existing_conversation.and_then(|c| c.current_node_id.clone()),
        updated_at: now,
        message_count,
    });

    Ok(SyncPlan {
        nodes: node_upserts,
        attachments: attachment_upserts,
        conversation,
    })
}

/// Map a fetched node list onto local node records.
///
/// Ids are derived deterministically from provider ids, so the same
/// remote node lands on the same local row on every sync. Order indexes
/// here are provisional (creation order) and only feed tree validation;
/// the diff assigns the real ones.
fn normalize(conversation_id: &str, fetched: &FetchedConversation) -> Vec<MessageNode> {
    let mut raw: Vec<_> = fetched.nodes.iter().collect();
    raw.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.provider_node_id.cmp(&b.provider_node_id))
    });

    raw.iter()
        .enumerate()
        .map(|(idx, node)| MessageNode {
            id: ids::node_id(conversation_id, &node.provider_node_id),
            conversation_id: conversation_id.to_string(),
            parent_id: node
                .parent_provider_node_id
                .as_deref()
                .map(|parent| ids::node_id(conversation_id, parent)),
            role: node.role,
            content_parts: node.content_parts.clone(),
            order_index: idx as i64,
            provider_node_id: node.provider_node_id.clone(),
            created_at: node.created_at,
        })
        .collect()
}

fn plan_attachments(
    conversation_id: &str,
    fetched: &FetchedConversation,
    existing: &[Attachment],
) -> Vec<Attachment> {
    let existing_by_id: HashMap<&str, &Attachment> =
        existing.iter().map(|a| (a.id.as_str(), a)).collect();
    let mut seen = HashSet::new();

    let mut upserts = Vec::new();
    for node in &fetched.nodes {
        let message_id = ids::node_id(conversation_id, &node.provider_node_id);
        for attachment in &node.attachments {
            let id = ids::attachment_id(&message_id, &attachment.file_id);
            if !seen.insert(id.clone()) {
                continue;
            }
            let changed = match existing_by_id.get(id.as_str()) {
                Some(stored) => stored.kind != attachment.kind,
                None => true,
            };
            if changed {
                upserts.push(Attachment {
                    id,
                    message_id: message_id.clone(),
                    file_id: attachment.file_id.clone(),
                    kind: attachment.kind.clone(),
                    local_path: None,
                });
            }
        }
    }
    upserts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatvault_providers::{FetchedAttachment, FetchedNode};
    use chatvault_types::{ContentPart, Role};
    use chrono::{Duration, TimeZone};

    fn ts(offset: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap() + Duration::seconds(offset)
    }

    fn fetched_node(id: &str, parent: Option<&str>, offset: i64) -> FetchedNode {
        FetchedNode {
            provider_node_id: id.to_string(),
            parent_provider_node_id: parent.map(str::to_string),
            role: Role::Assistant,
            content_parts: vec![ContentPart::text(id)],
            created_at: ts(offset),
            attachments: vec![],
        }
    }

    fn fetched(nodes: Vec<FetchedNode>) -> FetchedConversation {
        FetchedConversation {
            title: "t".to_string(),
            nodes,
        }
    }

    #[test]
    fn first_sync_plans_every_node_in_creation_order() {
        let remote = fetched(vec![
            fetched_node("b", Some("root"), 5),
            fetched_node("root", None, 0),
            fetched_node("a", Some("root"), 2),
        ]);
        let plan = plan_sync("prov", "c1", &remote, &[], &[], None, ts(100)).unwrap();

        assert_eq!(plan.nodes.len(), 3);
        let order: Vec<(&str, i64)> = plan
            .nodes
            .iter()
            .map(|n| (n.provider_node_id.as_str(), n.order_index))
            .collect();
        assert_eq!(order, [("root", 0), ("a", 1), ("b", 2)]);

        let conversation = plan.conversation.unwrap();
        assert_eq!(conversation.message_count, 3);
        assert_eq!(conversation.title, "t");
    }

    #[test]
    fn unchanged_remote_plans_nothing() {
        let remote = fetched(vec![
            fetched_node("root", None, 0),
            fetched_node("a", Some("root"), 1),
        ]);
        let first = plan_sync("prov", "c1", &remote, &[], &[], None, ts(100)).unwrap();
        let stored = first.nodes;
        let conversation = first.conversation.unwrap();

        let second = plan_sync(
            "prov",
            "c1",
            &remote,
            &stored,
            &[],
            Some(&conversation),
            ts(200),
        )
        .unwrap();
        assert!(second.nodes.is_empty());
        assert!(second.attachments.is_empty());
        assert!(second.conversation.is_none());
    }

    #[test]
    fn edited_node_keeps_order_index() {
        let remote = fetched(vec![
            fetched_node("root", None, 0),
            fetched_node("a", Some("root"), 1),
        ]);
        let first = plan_sync("prov", "c1", &remote, &[], &[], None, ts(100)).unwrap();
        let stored = first.nodes;
        let conversation = first.conversation.unwrap();

        let mut edited = fetched(vec![
            fetched_node("root", None, 0),
            fetched_node("a", Some("root"), 1),
        ]);
        edited.nodes[1].content_parts = vec![ContentPart::text("rewritten")];

        let plan = plan_sync(
            "prov",
            "c1",
            &edited,
            &stored,
            &[],
            Some(&conversation),
            ts(200),
        )
        .unwrap();

        assert_eq!(plan.nodes.len(), 1);
        let updated = &plan.nodes[0];
        assert_eq!(updated.provider_node_id, "a");
        assert_eq!(updated.content_parts, vec![ContentPart::text("rewritten")]);
        let original = stored.iter().find(|n| n.provider_node_id == "a").unwrap();
        assert_eq!(updated.order_index, original.order_index);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.id, original.id);
    }

    #[test]
    fn new_siblings_append_after_existing_indexes() {
        let remote = fetched(vec![
            fetched_node("root", None, 0),
            fetched_node("a", Some("root"), 1),
        ]);
        let first = plan_sync("prov", "c1", &remote, &[], &[], None, ts(100)).unwrap();
        let stored = first.nodes;
        let conversation = first.conversation.unwrap();

        let grown = fetched(vec![
            fetched_node("root", None, 0),
            fetched_node("a", Some("root"), 1),
            fetched_node("regen", Some("root"), 2),
        ]);
        let plan = plan_sync(
            "prov",
            "c1",
            &grown,
            &stored,
            &[],
            Some(&conversation),
            ts(200),
        )
        .unwrap();

        assert_eq!(plan.nodes.len(), 1);
        assert_eq!(plan.nodes[0].provider_node_id, "regen");
        let max_stored = stored.iter().map(|n| n.order_index).max().unwrap();
        assert_eq!(plan.nodes[0].order_index, max_stored + 1);
        assert_eq!(plan.conversation.unwrap().message_count, 3);
    }

    #[test]
    fn shrunken_fetch_deletes_nothing() {
        let remote = fetched(vec![
            fetched_node("root", None, 0),
            fetched_node("a", Some("root"), 1),
        ]);
        let first = plan_sync("prov", "c1", &remote, &[], &[], None, ts(100)).unwrap();
        let stored = first.nodes;
        let conversation = first.conversation.unwrap();

        let shrunk = fetched(vec![fetched_node("root", None, 0)]);
        let plan = plan_sync(
            "prov",
            "c1",
            &shrunk,
            &stored,
            &[],
            Some(&conversation),
            ts(200),
        )
        .unwrap();

        assert!(plan.nodes.is_empty(), "absent nodes are not deletions");
        // message_count keeps counting the locally retained node
        assert!(plan.conversation.is_none());
    }

    #[test]
    fn malformed_fetch_fails_before_any_write_is_planned() {
        let two_roots = fetched(vec![
            fetched_node("r1", None, 0),
            fetched_node("r2", None, 1),
        ]);
        let err = plan_sync("prov", "c1", &two_roots, &[], &[], None, ts(100));
        assert!(matches!(err, Err(MalformedTree::MultipleRoots { .. })));

        let dangling = fetched(vec![
            fetched_node("root", None, 0),
            fetched_node("a", Some("ghost"), 1),
        ]);
        let err = plan_sync("prov", "c1", &dangling, &[], &[], None, ts(100));
        assert!(matches!(err, Err(MalformedTree::DanglingParent { .. })));
    }

    #[test]
    fn attachments_plan_without_local_path_and_dedupe() {
        let mut node = fetched_node("root", None, 0);
        node.attachments = vec![
            FetchedAttachment {
                file_id: "f1".to_string(),
                kind: "image".to_string(),
            },
            FetchedAttachment {
                file_id: "f1".to_string(),
                kind: "image".to_string(),
            },
        ];
        let remote = fetched(vec![node]);

        let plan = plan_sync("prov", "c1", &remote, &[], &[], None, ts(100)).unwrap();
        assert_eq!(plan.attachments.len(), 1);
        assert_eq!(plan.attachments[0].local_path, None);

        // Second sync: the attachment already exists, nothing to write.
        let stored_attachment = Attachment {
            local_path: Some("/vault/f1".to_string()),
            ..plan.attachments[0].clone()
        };
        let second = plan_sync(
            "prov",
            "c1",
            &remote,
            &plan.nodes,
            std::slice::from_ref(&stored_attachment),
            plan.conversation.as_ref(),
            ts(200),
        )
        .unwrap();
        assert!(second.attachments.is_empty());
    }

    #[test]
    fn title_change_updates_conversation_only() {
        let remote = fetched(vec![fetched_node("root", None, 0)]);
        let first = plan_sync("prov", "c1", &remote, &[], &[], None, ts(100)).unwrap();
        let stored = first.nodes;
        let conversation = first.conversation.unwrap();

        let mut renamed = fetched(vec![fetched_node("root", None, 0)]);
        renamed.title = "new title".to_string();
        let plan = plan_sync(
            "prov",
            "c1",
            &renamed,
            &stored,
            &[],
            Some(&conversation),
            ts(200),
        )
        .unwrap();

        assert!(plan.nodes.is_empty());
        assert_eq!(plan.conversation.unwrap().title, "new title");
    }

    #[test]
    fn pinned_leaf_rides_through_conversation_update() {
        let remote = fetched(vec![fetched_node("root", None, 0)]);
        let first = plan_sync("prov", "c1", &remote, &[], &[], None, ts(100)).unwrap();
        let mut conversation = first.conversation.unwrap();
        conversation.current_node_id = Some("pinned".to_string());

        let mut renamed = fetched(vec![fetched_node("root", None, 0)]);
        renamed.title = "renamed".to_string();
        let plan = plan_sync(
            "prov",
            "c1",
            &renamed,
            &first.nodes,
            &[],
            Some(&conversation),
            ts(200),
        )
        .unwrap();
        assert_eq!(
            plan.conversation.unwrap().current_node_id.as_deref(),
            Some("pinned")
        );
    }
}
