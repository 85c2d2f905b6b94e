// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message admission state machine.
//!
//! The pipeline decides, for every inbound message, whether to drop it,
//! buffer it for later, or forward it to response generation. It owns all
//! admission state (allow-list, conversation memory, burst tracker, offline
//! queue) plus the readiness flag, and is driven by exactly one event loop,
//! so state is never touched concurrently and the per-sender invariants
//! hold without extra locking.
//!
//! Readiness writes go through [`AdmissionPipeline::transition`] only; the
//! not-ready to ready edge is therefore the single place the offline drain
//! can fire.

use std::sync::Arc;
use std::time::Duration;

use mynah_config::model::MynahConfig;
use mynah_core::{
    ChatTransport, DocumentExtractor, GenerationRequest, GeneratorOutcome, InboundEvent,
    MediaRef, MynahError, Readiness, Reply, ResponseGenerator, SenderId, TransportEvent,
};
use tokio::sync::watch;
use tracing::{debug, error, info, trace, warn};

use crate::allowlist::AllowList;
use crate::burst::BurstTracker;
use crate::memory::ConversationMemory;
use crate::offline::{OfflineQueue, QueuedMessage};
use crate::replies;

/// Prompt used when a buffered message had no text body.
const EMPTY_PAYLOAD_PROMPT: &str = "Hello";

/// Admission state machine with two states, `NotReady` and `Ready`.
///
/// Constructed once at process start and driven by the agent loop; the
/// transport, generator, and extractor collaborators are injected so tests
/// can run the whole pipeline against fakes.
pub struct AdmissionPipeline {
    transport: Arc<dyn ChatTransport>,
    generator: Arc<dyn ResponseGenerator>,
    extractor: Arc<dyn DocumentExtractor>,
    allow_list: AllowList,
    memory: ConversationMemory,
    burst: BurstTracker,
    queue: OfflineQueue,
    readiness: Readiness,
    readiness_tx: watch::Sender<Readiness>,
    agent_name: String,
}

impl AdmissionPipeline {
    /// Creates a pipeline in the `NotReady` state.
    ///
    /// The returned watch receiver mirrors every readiness change and feeds
    /// operator surfaces such as the health endpoint.
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        generator: Arc<dyn ResponseGenerator>,
        extractor: Arc<dyn DocumentExtractor>,
        config: &MynahConfig,
    ) -> (Self, watch::Receiver<Readiness>) {
        let (readiness_tx, readiness_rx) = watch::channel(Readiness::NotReady);
        let pipeline = Self {
            transport,
            generator,
            extractor,
            allow_list: AllowList::from_config(&config.allowlist),
            memory: ConversationMemory::new(
                config.admission.memory_max_turns,
                config.admission.context_turns,
            ),
            burst: BurstTracker::new(
                Duration::from_secs(config.admission.burst_window_secs),
                config.admission.burst_threshold,
            ),
            queue: OfflineQueue::new(config.admission.offline_queue_depth),
            readiness: Readiness::NotReady,
            readiness_tx,
            agent_name: config.agent.name.clone(),
        };
        (pipeline, readiness_rx)
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    /// Moves the state machine to `next`.
    ///
    /// The not-ready to ready edge drains the offline queue exactly once;
    /// the reverse edge only changes how subsequent messages are routed.
    /// Same-state updates are ignored.
    pub async fn transition(&mut self, next: Readiness) {
        if self.readiness == next {
            return;
        }
        let prev = self.readiness;
        self.readiness = next;
        self.readiness_tx.send_replace(next);
        info!(from = %prev, to = %next, "readiness changed");

        if prev == Readiness::NotReady && next == Readiness::Ready {
            self.drain_offline_queue().await;
        }
    }

    /// Routes one transport event through the state machine.
    ///
    /// Errors returned here are failures the per-message handling could not
    /// absorb (a welcome or apology send failing); the agent loop reacts by
    /// forcing the pipeline offline so messages queue instead of vanishing.
    pub async fn handle_event(&mut self, event: TransportEvent) -> Result<(), MynahError> {
        match event {
            TransportEvent::ReadinessChanged(next) => {
                self.transition(next).await;
                Ok(())
            }
            TransportEvent::Inbound(msg) => self.handle_inbound(msg).await,
        }
    }

    /// Admission decision for a single inbound message.
    pub async fn handle_inbound(&mut self, msg: InboundEvent) -> Result<(), MynahError> {
        if msg.is_broadcast {
            trace!(sender = %msg.sender, "dropping broadcast message");
            return Ok(());
        }

        // A message we sent ourselves approves its recipient, so the bot can
        // reply to anyone its operator messages first. Never answered.
        if msg.is_self {
            if !msg.is_group() {
                self.allow_list.approve(&msg.sender);
            }
            return Ok(());
        }

        match self.readiness {
            Readiness::NotReady => self.handle_offline(msg).await,
            Readiness::Ready => self.handle_live(msg).await,
        }
    }

    /// Not-ready routing: buffer what we can, throttle bursty individuals.
    async fn handle_offline(&mut self, msg: InboundEvent) -> Result<(), MynahError> {
        let sender = msg.sender.clone();

        // No auto-approval while offline. Unknown senders are dropped.
        if !self.allow_list.is_allowed(&sender) {
            debug!(sender = %sender, "dropping offline message from unknown sender");
            return Ok(());
        }

        if !msg.is_group() && self.burst.is_bursting(&sender, self.readiness) {
            // An existing queue entry means this sender was already told to
            // slow down during this offline episode.
            if !self.queue.has_pending(&sender) {
                if let Err(e) = self
                    .transport
                    .send_text(&sender, replies::throttle_notice())
                    .await
                {
                    warn!(sender = %sender, error = %e, "failed to send throttle notice");
                }
            }
            debug!(sender = %sender, "dropping bursty offline message");
            return Ok(());
        }

        let payload = msg.text_or_empty().to_string();
        if let Err(e) = self.queue.enqueue(&sender, payload, msg.is_group()) {
            warn!(sender = %sender, error = %e, "offline queue full, dropping message");
        }
        Ok(())
    }

    /// Ready routing: approve, welcome, then answer.
    async fn handle_live(&mut self, msg: InboundEvent) -> Result<(), MynahError> {
        let sender = msg.sender.clone();

        let was_new = self.allow_list.auto_approve(&sender);
        if !self.allow_list.is_allowed(&sender) {
            debug!(sender = %sender, "dropping message from non-allowed sender");
            return Ok(());
        }

        if was_new {
            let welcome = if msg.is_group() {
                replies::welcome_group(&self.agent_name)
            } else {
                replies::welcome_individual(&self.agent_name)
            };
            self.transport.send_text(&sender, &welcome).await?;
        }

        let text = msg.text.as_deref().map(str::trim).unwrap_or("");
        if text.is_empty() {
            if let Some(media) = msg.media.as_ref().filter(|m| m.is_document()) {
                self.summarize_document(&sender, media, msg.is_group()).await;
            } else {
                trace!(sender = %sender, "dropping empty message without document media");
            }
            return Ok(());
        }

        info!(sender = %sender, is_group = msg.is_group(), "handling inbound message");
        self.respond(&sender, text, msg.is_group(), msg.group_name.clone())
            .await
    }

    /// Generates and sends one reply, converting any generation or send
    /// failure into the bilingual apology. The conversation turn is recorded
    /// only after generation succeeds, so a failed call leaves memory
    /// exactly as it was.
    async fn respond(
        &mut self,
        sender: &SenderId,
        text: &str,
        is_group: bool,
        group_name: Option<String>,
    ) -> Result<(), MynahError> {
        if let Err(e) = self.transport.send_typing(sender).await {
            debug!(sender = %sender, error = %e, "failed to send typing indicator");
        }

        let request = GenerationRequest {
            text: text.to_string(),
            context: self.memory.render_context(sender),
            is_group,
            group_name,
        };

        let result = match self.generator.generate(request).await {
            Ok(GeneratorOutcome::Reply(reply)) => {
                if let Reply::Text(output) = &reply {
                    self.memory.append(sender, text, output);
                }
                self.send_reply(sender, &reply).await
            }
            Ok(GeneratorOutcome::ClearConversation { confirmation }) => {
                self.memory.clear(sender);
                self.transport
                    .send_text(sender, &confirmation)
                    .await
                    .map(|_| ())
            }
            Ok(GeneratorOutcome::Advisory(note)) => {
                self.transport.send_text(sender, &note).await.map(|_| ())
            }
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            warn!(sender = %sender, error = %e, "reply failed, sending apology");
            self.transport.send_text(sender, replies::apology()).await?;
        }
        Ok(())
    }

    /// Media-only message path: fetch the document, extract its text, and
    /// reply with a truncated summary. Never touches conversation memory.
    /// All failures here are answered or logged, never propagated.
    async fn summarize_document(&mut self, sender: &SenderId, media: &MediaRef, is_group: bool) {
        let bytes = match self.transport.fetch_media(media).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(sender = %sender, media = %media.id, error = %e, "failed to fetch document");
                return;
            }
        };

        let reply = match self.extractor.extract(&bytes).await {
            Ok(text) => replies::document_summary(&text, is_group),
            Err(e) => {
                warn!(sender = %sender, media = %media.id, error = %e, "document extraction failed");
                replies::extraction_failed().to_string()
            }
        };

        if let Err(e) = self.transport.send_text(sender, &reply).await {
            warn!(sender = %sender, error = %e, "failed to send document summary");
        }
    }

    /// Replays every buffered sender once: one back-online notice, then one
    /// reply generated from the most recent buffered payload. Older entries
    /// are acknowledged by the notice count but not individually answered.
    /// The queue is left empty regardless of per-sender failures.
    async fn drain_offline_queue(&mut self) {
        let drained = self.queue.take_all();
        if drained.is_empty() {
            debug!("offline queue empty, nothing to drain");
            return;
        }

        info!(senders = drained.len(), "draining offline queue");
        for (sender, entries) in drained {
            if let Err(e) = self.replay_sender(&sender, &entries).await {
                error!(sender = %sender, error = %e, "failed to replay offline messages");
            }
        }
        info!("offline queue drained");
    }

    async fn replay_sender(
        &mut self,
        sender: &SenderId,
        entries: &[QueuedMessage],
    ) -> Result<(), MynahError> {
        let Some(last) = entries.last() else {
            return Ok(());
        };

        self.transport
            .send_text(sender, &replies::back_online_notice(entries.len()))
            .await?;

        let text = if last.payload.is_empty() {
            EMPTY_PAYLOAD_PROMPT
        } else {
            last.payload.as_str()
        };
        let request = GenerationRequest {
            text: text.to_string(),
            context: self.memory.render_context(sender),
            is_group: last.is_group,
            group_name: None,
        };

        match self.generator.generate(request).await? {
            GeneratorOutcome::Reply(reply) => {
                if let Reply::Text(output) = &reply {
                    self.memory.append(sender, text, output);
                }
                self.send_reply(sender, &reply).await?;
            }
            GeneratorOutcome::ClearConversation { confirmation } => {
                self.memory.clear(sender);
                self.transport.send_text(sender, &confirmation).await?;
            }
            GeneratorOutcome::Advisory(note) => {
                self.transport.send_text(sender, &note).await?;
            }
        }
        Ok(())
    }

    /// Emits a reply outward. Image files are removed after a successful
    /// send since they live in the process temp directory.
    async fn send_reply(&self, to: &SenderId, reply: &Reply) -> Result<(), MynahError> {
        match reply {
            Reply::Text(text) => {
                self.transport.send_text(to, text).await?;
            }
            Reply::Image { path, caption } => {
                self.transport.send_media(to, path, caption).await?;
                if let Err(e) = tokio::fs::remove_file(path).await {
                    debug!(path = %path.display(), error = %e, "failed to remove sent image");
                }
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    #[cfg(test)]
    pub(crate) fn queue_depth(&self, identity: &SenderId) -> usize {
        self.queue.depth(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mynah_test_utils::events::{broadcast_text, inbound_media, inbound_text, self_text};
    use mynah_test_utils::{MockExtractor, MockGenerator, MockTransport, SentMessage};

    struct Fixture {
        transport: Arc<MockTransport>,
        generator: Arc<MockGenerator>,
        extractor: Arc<MockExtractor>,
        pipeline: AdmissionPipeline,
        readiness_rx: watch::Receiver<Readiness>,
    }

    fn fixture_with(config: MynahConfig) -> Fixture {
        let transport = Arc::new(MockTransport::new());
        let generator = Arc::new(MockGenerator::new());
        let extractor = Arc::new(MockExtractor::with_text("extracted text"));
        let (pipeline, readiness_rx) = AdmissionPipeline::new(
            transport.clone(),
            generator.clone(),
            extractor.clone(),
            &config,
        );
        Fixture {
            transport,
            generator,
            extractor,
            pipeline,
            readiness_rx,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MynahConfig::default())
    }

    fn pre_approved(users: &[&str]) -> MynahConfig {
        let mut config = MynahConfig::default();
        config.allowlist.pre_approved_users =
            users.iter().map(|u| u.to_string()).collect();
        config
    }

    async fn texts_sent(transport: &MockTransport) -> Vec<String> {
        transport
            .sent_messages()
            .await
            .into_iter()
            .filter_map(|m| match m {
                SentMessage::Text { text, .. } => Some(text),
                SentMessage::Media { .. } => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn live_message_generates_reply_and_records_turn() {
        let mut f = fixture_with(pre_approved(&["U1"]));
        f.generator.push_text("hi there").await;
        f.pipeline.transition(Readiness::Ready).await;

        f.pipeline
            .handle_event(TransportEvent::Inbound(inbound_text("U1", "hello")))
            .await
            .unwrap();

        let sent = texts_sent(&f.transport).await;
        assert_eq!(sent, ["hi there"]);

        let requests = f.generator.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].text, "hello");
        assert_eq!(requests[0].context, "");
        assert!(!requests[0].is_group);

        let key = SenderId::from("U1");
        let log = f.pipeline.memory().get(&key);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].input, "hello");
        assert_eq!(log[0].output, "hi there");
    }

    #[tokio::test]
    async fn second_message_sees_rendered_context() {
        let mut f = fixture_with(pre_approved(&["U1"]));
        f.generator.push_text("hi there").await;
        f.generator.push_text("still here").await;
        f.pipeline.transition(Readiness::Ready).await;

        f.pipeline
            .handle_inbound(inbound_text("U1", "hello"))
            .await
            .unwrap();
        f.pipeline
            .handle_inbound(inbound_text("U1", "you there?"))
            .await
            .unwrap();

        let requests = f.generator.requests().await;
        assert!(requests[1].context.contains("Previous conversation context:"));
        assert!(requests[1].context.contains("User: hello\nAI: hi there\n"));
    }

    #[tokio::test]
    async fn first_contact_gets_welcome_before_reply() {
        let mut f = fixture();
        f.generator.push_text("hi there").await;
        f.pipeline.transition(Readiness::Ready).await;

        f.pipeline
            .handle_inbound(inbound_text("94771234567@c.us", "hello"))
            .await
            .unwrap();

        let sent = texts_sent(&f.transport).await;
        assert_eq!(sent.len(), 2);
        assert!(sent[0].contains("personal AI assistant"));
        assert_eq!(sent[1], "hi there");
    }

    #[tokio::test]
    async fn new_group_gets_group_welcome() {
        let mut f = fixture();
        f.generator.push_text("hi all").await;
        f.pipeline.transition(Readiness::Ready).await;

        f.pipeline
            .handle_inbound(inbound_text("120363040000000001@g.us", "hello bot"))
            .await
            .unwrap();

        let sent = texts_sent(&f.transport).await;
        assert_eq!(sent.len(), 2);
        assert!(sent[0].contains("your new AI assistant"));
        assert_eq!(sent[1], "hi all");
    }

    #[tokio::test]
    async fn unknown_sender_is_dropped_when_auto_approval_is_off() {
        let mut config = MynahConfig::default();
        config.allowlist.auto_approve_individuals = false;
        let mut f = fixture_with(config);
        f.pipeline.transition(Readiness::Ready).await;

        f.pipeline
            .handle_inbound(inbound_text("94771234567@c.us", "hello"))
            .await
            .unwrap();

        assert_eq!(f.transport.sent_count().await, 0);
        assert!(f.generator.requests().await.is_empty());
    }

    #[tokio::test]
    async fn broadcast_messages_are_ignored() {
        let mut f = fixture_with(pre_approved(&["U1"]));
        f.pipeline.transition(Readiness::Ready).await;

        f.pipeline
            .handle_inbound(broadcast_text("U1", "status update"))
            .await
            .unwrap();

        assert_eq!(f.transport.sent_count().await, 0);
        assert!(f.generator.requests().await.is_empty());
    }

    #[tokio::test]
    async fn self_message_approves_recipient_without_reply() {
        let mut config = MynahConfig::default();
        config.allowlist.auto_approve_individuals = false;
        let mut f = fixture_with(config);
        f.pipeline.transition(Readiness::Ready).await;

        // Operator messages someone first; the bot may now answer them.
        f.pipeline
            .handle_inbound(self_text("94771234567@c.us", "hey, use my bot"))
            .await
            .unwrap();
        assert_eq!(f.transport.sent_count().await, 0);

        f.generator.push_text("hi there").await;
        f.pipeline
            .handle_inbound(inbound_text("94771234567@c.us", "hello"))
            .await
            .unwrap();
        // Approved via the self message, so no welcome, just the reply.
        assert_eq!(texts_sent(&f.transport).await, ["hi there"]);
    }

    #[tokio::test]
    async fn offline_messages_queue_and_drain_collapses_to_one_reply() {
        let mut f = fixture_with(pre_approved(&["U1"]));
        f.generator.push_text("caught up").await;

        for text in ["first", "second", "third"] {
            f.pipeline
                .handle_inbound(inbound_text("U1", text))
                .await
                .unwrap();
        }
        assert_eq!(f.pipeline.queue_depth(&SenderId::from("U1")), 3);
        assert_eq!(f.transport.sent_count().await, 0);

        f.pipeline.transition(Readiness::Ready).await;

        let sent = texts_sent(&f.transport).await;
        assert_eq!(sent.len(), 2);
        assert!(sent[0].contains("Processing your 3 messages now!"));
        assert_eq!(sent[1], "caught up");

        // Only the most recent payload reaches the generator.
        let requests = f.generator.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].text, "third");

        assert_eq!(f.pipeline.queue_depth(&SenderId::from("U1")), 0);
    }

    #[tokio::test]
    async fn single_buffered_message_uses_singular_notice() {
        let mut f = fixture_with(pre_approved(&["U1"]));
        f.generator.push_text("hi").await;

        f.pipeline
            .handle_inbound(inbound_text("U1", "hello"))
            .await
            .unwrap();
        f.pipeline.transition(Readiness::Ready).await;

        let sent = texts_sent(&f.transport).await;
        assert!(sent[0].contains("Processing your message now!"));
    }

    #[tokio::test]
    async fn drain_runs_exactly_once_per_ready_transition() {
        let mut f = fixture_with(pre_approved(&["U1"]));
        f.generator.push_text("reply one").await;
        f.generator.push_text("reply two").await;

        f.pipeline
            .handle_inbound(inbound_text("U1", "before first drain"))
            .await
            .unwrap();
        f.pipeline.transition(Readiness::Ready).await;
        f.pipeline.transition(Readiness::NotReady).await;
        f.pipeline
            .handle_inbound(inbound_text("U1", "before second drain"))
            .await
            .unwrap();
        f.pipeline.transition(Readiness::Ready).await;

        let requests = f.generator.requests().await;
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].text, "before first drain");
        assert_eq!(requests[1].text, "before second drain");

        // Two notices and two replies, nothing more.
        assert_eq!(f.transport.sent_count().await, 4);
    }

    #[tokio::test]
    async fn repeated_ready_events_do_not_drain_twice() {
        let mut f = fixture_with(pre_approved(&["U1"]));
        f.generator.push_text("once").await;

        f.pipeline
            .handle_inbound(inbound_text("U1", "hello"))
            .await
            .unwrap();
        f.pipeline.transition(Readiness::Ready).await;
        f.pipeline.transition(Readiness::Ready).await;

        assert_eq!(f.generator.requests().await.len(), 1);
        assert_eq!(f.transport.sent_count().await, 2);
    }

    #[tokio::test]
    async fn unknown_sender_is_dropped_while_offline() {
        let mut config = MynahConfig::default();
        config.allowlist.auto_approve_individuals = false;
        let mut f = fixture_with(config);

        f.pipeline
            .handle_inbound(inbound_text("94771234567@c.us", "hello"))
            .await
            .unwrap();

        assert_eq!(
            f.pipeline.queue_depth(&SenderId::from("94771234567@c.us")),
            0
        );
        assert_eq!(f.transport.sent_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn bursting_sender_with_queued_messages_is_not_warned() {
        let mut f = fixture_with(pre_approved(&["U1"]));

        // Three messages buffer normally; the fourth crosses the burst
        // threshold but the existing queue entry suppresses the notice.
        for i in 0..4 {
            f.pipeline
                .handle_inbound(inbound_text("U1", &format!("msg {i}")))
                .await
                .unwrap();
        }

        assert_eq!(f.transport.sent_count().await, 0);
        assert_eq!(f.pipeline.queue_depth(&SenderId::from("U1")), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn bursting_sender_with_empty_queue_is_warned_once_and_dropped() {
        let mut f = fixture_with(pre_approved(&["U1"]));
        f.generator.push_text("drained").await;

        // Build up arrivals during a first offline episode, drain, then go
        // offline again inside the same burst window.
        for i in 0..3 {
            f.pipeline
                .handle_inbound(inbound_text("U1", &format!("msg {i}")))
                .await
                .unwrap();
        }
        f.pipeline.transition(Readiness::Ready).await;
        f.pipeline.transition(Readiness::NotReady).await;
        f.transport.clear_sent().await;

        f.pipeline
            .handle_inbound(inbound_text("U1", "one more"))
            .await
            .unwrap();

        let sent = texts_sent(&f.transport).await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("I'm currently offline"));
        // Warned messages are dropped, not buffered.
        assert_eq!(f.pipeline.queue_depth(&SenderId::from("U1")), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn groups_are_never_burst_checked_offline() {
        let mut config = MynahConfig::default();
        config.allowlist.pre_approved_groups = vec!["120363040000000001@g.us".into()];
        let mut f = fixture_with(config);

        for i in 0..6 {
            f.pipeline
                .handle_inbound(inbound_text(
                    "120363040000000001@g.us",
                    &format!("msg {i}"),
                ))
                .await
                .unwrap();
        }

        assert_eq!(f.transport.sent_count().await, 0);
        assert_eq!(
            f.pipeline
                .queue_depth(&SenderId::from("120363040000000001@g.us")),
            6
        );
    }

    #[tokio::test]
    async fn full_queue_drops_silently() {
        let mut config = pre_approved(&["U1"]);
        config.admission.offline_queue_depth = 2;
        let mut f = fixture_with(config);

        for text in ["one", "two", "three"] {
            f.pipeline
                .handle_inbound(inbound_text("U1", text))
                .await
                .unwrap();
        }

        assert_eq!(f.pipeline.queue_depth(&SenderId::from("U1")), 2);
        assert_eq!(f.transport.sent_count().await, 0);
    }

    #[tokio::test]
    async fn generation_failure_sends_apology_and_leaves_memory_untouched() {
        let mut f = fixture_with(pre_approved(&["U1"]));
        let key = SenderId::from("U1");
        f.pipeline.transition(Readiness::Ready).await;

        f.generator.push_text("hi there").await;
        f.pipeline
            .handle_inbound(inbound_text("U1", "hello"))
            .await
            .unwrap();
        assert_eq!(f.pipeline.memory().len(&key), 1);

        f.generator.push_failure("backend unavailable").await;
        f.pipeline
            .handle_inbound(inbound_text("U1", "are you broken?"))
            .await
            .unwrap();

        let sent = texts_sent(&f.transport).await;
        assert_eq!(sent.last().unwrap(), replies::apology());

        let log = f.pipeline.memory().get(&key);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].input, "hello");
        assert_eq!(log[0].output, "hi there");
    }

    #[tokio::test]
    async fn reply_send_failure_also_gets_the_apology() {
        let mut f = fixture_with(pre_approved(&["U1"]));
        f.generator.push_text("hi there").await;
        f.pipeline.transition(Readiness::Ready).await;

        f.transport.fail_next_send().await;
        f.pipeline
            .handle_inbound(inbound_text("U1", "hello"))
            .await
            .unwrap();

        let sent = texts_sent(&f.transport).await;
        assert_eq!(sent, [replies::apology()]);
    }

    #[tokio::test]
    async fn clear_directive_empties_memory_without_recording_a_turn() {
        let mut f = fixture_with(pre_approved(&["U1"]));
        let key = SenderId::from("U1");
        f.pipeline.transition(Readiness::Ready).await;

        f.generator.push_text("hi there").await;
        f.pipeline
            .handle_inbound(inbound_text("U1", "hello"))
            .await
            .unwrap();

        f.generator
            .push_outcome(GeneratorOutcome::ClearConversation {
                confirmation: "🧹 Chat memory cleared! / චැට් මතකය මකා දමා ඇත!".into(),
            })
            .await;
        f.pipeline
            .handle_inbound(inbound_text("U1", "/clear"))
            .await
            .unwrap();

        assert_eq!(f.pipeline.memory().len(&key), 0);
        let sent = texts_sent(&f.transport).await;
        assert!(sent.last().unwrap().contains("Chat memory cleared!"));
    }

    #[tokio::test]
    async fn advisory_reply_is_sent_but_never_recorded() {
        let mut f = fixture_with(pre_approved(&["U1"]));
        f.pipeline.transition(Readiness::Ready).await;

        f.generator
            .push_outcome(GeneratorOutcome::Advisory(
                "please give a longer prompt".into(),
            ))
            .await;
        f.pipeline
            .handle_inbound(inbound_text("U1", "/generate image x"))
            .await
            .unwrap();

        assert_eq!(
            texts_sent(&f.transport).await,
            ["please give a longer prompt"]
        );
        assert_eq!(f.pipeline.memory().len(&SenderId::from("U1")), 0);
    }

    #[tokio::test]
    async fn image_reply_sends_media_and_skips_memory() {
        let mut f = fixture_with(pre_approved(&["U1"]));
        f.pipeline.transition(Readiness::Ready).await;

        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("generated.png");
        std::fs::write(&image_path, b"png bytes").unwrap();

        f.generator
            .push_outcome(GeneratorOutcome::Reply(Reply::Image {
                path: image_path.clone(),
                caption: "🎨 a bird".into(),
            }))
            .await;
        f.pipeline
            .handle_inbound(inbound_text("U1", "/generate image a bird"))
            .await
            .unwrap();

        let sent = f.transport.sent_messages().await;
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            SentMessage::Media { caption, .. } => assert_eq!(caption, "🎨 a bird"),
            SentMessage::Text { .. } => panic!("expected a media send"),
        }
        // Sent images are deleted from the temp directory.
        assert!(!image_path.exists());
        assert_eq!(f.pipeline.memory().len(&SenderId::from("U1")), 0);
    }

    #[tokio::test]
    async fn document_only_message_replies_with_truncated_summary() {
        let transport = Arc::new(MockTransport::new());
        transport.add_media("media-1", b"%PDF-1.4 fake".to_vec()).await;
        let generator = Arc::new(MockGenerator::new());
        let extractor = Arc::new(MockExtractor::with_text(&"long text ".repeat(200)));
        let (mut pipeline, _rx) = AdmissionPipeline::new(
            transport.clone(),
            generator.clone(),
            extractor.clone(),
            &pre_approved(&["U1"]),
        );
        pipeline.transition(Readiness::Ready).await;

        let media = MediaRef {
            id: "media-1".into(),
            mime_type: "application/pdf".into(),
            filename: Some("notes.pdf".into()),
        };
        pipeline
            .handle_inbound(inbound_media("U1", media))
            .await
            .unwrap();

        let sent = transport.sent_messages().await;
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            SentMessage::Text { text, .. } => {
                assert!(text.contains("I've analyzed your PDF:"));
                assert!(text.ends_with("..."));
            }
            SentMessage::Media { .. } => panic!("expected a text send"),
        }
        assert_eq!(extractor.call_count(), 1);
        assert!(generator.requests().await.is_empty());
        assert_eq!(pipeline.memory().len(&SenderId::from("U1")), 0);
    }

    #[tokio::test]
    async fn unreadable_document_gets_extraction_failed_notice() {
        let transport = Arc::new(MockTransport::new());
        transport.add_media("media-1", b"not a pdf".to_vec()).await;
        let generator = Arc::new(MockGenerator::new());
        let extractor = Arc::new(MockExtractor::failing());
        let (mut pipeline, _rx) = AdmissionPipeline::new(
            transport.clone(),
            generator,
            extractor,
            &pre_approved(&["U1"]),
        );
        pipeline.transition(Readiness::Ready).await;

        let media = MediaRef {
            id: "media-1".into(),
            mime_type: "application/pdf".into(),
            filename: None,
        };
        pipeline
            .handle_inbound(inbound_media("U1", media))
            .await
            .unwrap();

        let sent = transport.sent_messages().await;
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            SentMessage::Text { text, .. } => {
                assert_eq!(text, replies::extraction_failed());
            }
            SentMessage::Media { .. } => panic!("expected a text send"),
        }
    }

    #[tokio::test]
    async fn non_document_media_is_dropped_silently() {
        let mut f = fixture_with(pre_approved(&["U1"]));
        f.pipeline.transition(Readiness::Ready).await;

        let media = MediaRef {
            id: "media-1".into(),
            mime_type: "image/jpeg".into(),
            filename: Some("photo.jpg".into()),
        };
        f.pipeline
            .handle_inbound(inbound_media("U1", media))
            .await
            .unwrap();

        assert_eq!(f.transport.sent_count().await, 0);
        assert_eq!(f.extractor.call_count(), 0);
    }

    #[tokio::test]
    async fn readiness_watch_mirrors_transitions() {
        let mut f = fixture();
        assert_eq!(*f.readiness_rx.borrow(), Readiness::NotReady);

        f.pipeline.transition(Readiness::Ready).await;
        assert_eq!(*f.readiness_rx.borrow(), Readiness::Ready);
        assert_eq!(f.pipeline.readiness(), Readiness::Ready);

        f.pipeline.transition(Readiness::NotReady).await;
        assert_eq!(*f.readiness_rx.borrow(), Readiness::NotReady);
    }

    #[tokio::test]
    async fn empty_buffered_payload_falls_back_to_greeting_prompt() {
        let mut f = fixture_with(pre_approved(&["U1"]));
        f.generator.push_text("hello!").await;

        let mut msg = inbound_text("U1", "");
        msg.text = None;
        f.pipeline.handle_inbound(msg).await.unwrap();
        f.pipeline.transition(Readiness::Ready).await;

        let requests = f.generator.requests().await;
        assert_eq!(requests[0].text, "Hello");
    }

    #[tokio::test]
    async fn drain_failure_for_one_sender_does_not_stop_the_pass() {
        let mut f = fixture_with(pre_approved(&["U1", "U2"]));

        f.pipeline
            .handle_inbound(inbound_text("U1", "first sender"))
            .await
            .unwrap();
        f.pipeline
            .handle_inbound(inbound_text("U2", "second sender"))
            .await
            .unwrap();

        // First notice send fails; the second sender still gets replayed.
        f.transport.fail_next_send().await;
        f.generator.push_text("made it").await;
        f.pipeline.transition(Readiness::Ready).await;

        let sent = texts_sent(&f.transport).await;
        assert_eq!(sent.len(), 2);
        assert!(sent[0].contains("Processing your message now!"));
        assert_eq!(sent[1], "made it");
        assert_eq!(f.generator.requests().await.len(), 1);
    }
}
