use std::sync::Arc;

use colloquy_wire::{
    ByteStream, ExchangeReply, ExchangeRequest, ExchangeTransport, RecordDecoder, StreamRecord,
    Turn, WireError,
};
use futures::StreamExt;

use crate::{
    CancelHandle, CancelToken, ConnectionState, ErrorLatch, HistoryLedger, NoopObserver,
    SessionConfig, SessionError, SessionObserver,
};

/// How a `send_turn` call ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The response was fully consumed and committed to history.
    Completed,
    /// The in-flight token was triggered; no completion, no error.
    Cancelled,
    /// Blank input; nothing was sent.
    Skipped,
}

enum TurnBody {
    Completed(String),
    Cancelled,
}

enum RecordFlow {
    Continue,
    Done,
}

/// Client-side owner of one logical conversation with the service.
///
/// Constructed once per owning view for one session identifier; the owning
/// view holds it exclusively and drives every operation. Cross-task
/// cancellation goes through [`CancelHandle`].
pub struct SessionManager {
    session_id: String,
    transport: Arc<dyn ExchangeTransport>,
    observer: Arc<dyn SessionObserver>,
    config: SessionConfig,
    state: ConnectionState,
    connect_in_flight: bool,
    connect_attempted: bool,
    latch: ErrorLatch,
    history: HistoryLedger,
    stage: u32,
    loading: bool,
    token: CancelToken,
}

impl SessionManager {
    pub fn new(
        session_id: impl Into<String>,
        transport: Arc<dyn ExchangeTransport>,
        config: SessionConfig,
    ) -> Self {
        Self::with_observer(session_id, transport, config, Arc::new(NoopObserver))
    }

    pub fn with_observer(
        session_id: impl Into<String>,
        transport: Arc<dyn ExchangeTransport>,
        config: SessionConfig,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        let stage = config.initial_stage;
        Self {
            session_id: session_id.into(),
            transport,
            observer,
            config,
            state: ConnectionState::Disconnected,
            connect_in_flight: false,
            connect_attempted: false,
            latch: ErrorLatch::new(),
            history: HistoryLedger::new(),
            stage,
            loading: false,
            token: CancelToken::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the tripped error latch, if any.
    pub fn error(&self) -> Option<&str> {
        self.latch.message()
    }

    /// Last workflow stage reported by the server.
    pub fn stage(&self) -> u32 {
        self.stage
    }

    pub fn history(&self) -> Vec<Turn> {
        self.history.all()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn clear_error(&mut self) {
        self.latch.clear();
    }

    /// Abort the in-flight exchange, if any. Never trips the latch and
    /// never fires the error observer.
    pub fn cancel(&self) {
        self.token.trigger();
    }

    /// Trigger for cancelling from another task while the owner is inside
    /// `send_turn`.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.token.handle()
    }

    /// Establish the logical connection, idempotently. A no-op when already
    /// connected, while a handshake is in flight, or while the error latch
    /// is tripped. Exactly one success or one failure notification per
    /// attempt, never both.
    pub async fn connect(&mut self) -> Result<(), SessionError> {
        if self.connect_in_flight || self.state == ConnectionState::Connected {
            return Ok(());
        }
        if self.latch.is_tripped() {
            return Ok(());
        }

        self.connect_in_flight = true;
        let result = self.handshake().await;
        self.connect_in_flight = false;

        match result {
            Ok(()) => Ok(()),
            Err(error) => {
                self.fail(&error);
                Err(error)
            }
        }
    }

    /// Auto-connect entry point. Performs the handshake at most once per
    /// manager instance regardless of how many times the owning view
    /// invokes it.
    pub async fn connect_once(&mut self) -> Result<(), SessionError> {
        if self.connect_attempted {
            return Ok(());
        }
        self.connect_attempted = true;
        self.connect().await
    }

    /// Clear the error latch and attempt a fresh handshake. The only retry
    /// path besides a new `send_turn`; nothing retries automatically.
    pub async fn retry(&mut self) -> Result<(), SessionError> {
        self.latch.clear();
        self.connect().await
    }

    /// Send one user turn. Blank content is a silent no-op. When not yet
    /// connected, one fresh handshake is attempted first (clearing the
    /// latch optimistically); if it fails the call aborts without sending.
    /// The user turn is appended speculatively and rolled back on failure.
    pub async fn send_turn<C, F>(
        &mut self,
        content: &str,
        mut on_chunk: C,
        on_complete: F,
    ) -> Result<TurnOutcome, SessionError>
    where
        C: FnMut(&str),
        F: FnOnce(&str),
    {
        let content = content.trim();
        if content.is_empty() {
            return Ok(TurnOutcome::Skipped);
        }

        // A send is an explicit user action: it starts a fresh failure
        // episode and earns one fresh handshake before giving up.
        self.latch.clear();
        if self.state != ConnectionState::Connected {
            self.connect().await?;
        }

        self.token.arm();
        self.history.append(Turn::user(content));
        self.loading = true;
        let result = self.exchange_turn(content, &mut on_chunk).await;
        self.loading = false;

        match result {
            Ok(TurnBody::Completed(full)) => {
                self.history.append(Turn::assistant(full.clone()));
                on_complete(&full);
                Ok(TurnOutcome::Completed)
            }
            Ok(TurnBody::Cancelled) => Ok(TurnOutcome::Cancelled),
            Err(error) => {
                // Roll back the speculative user turn; chunks already
                // delivered through `on_chunk` stand.
                self.history.pop();
                self.fail(&error);
                Err(error)
            }
        }
    }

    async fn handshake(&mut self) -> Result<(), SessionError> {
        self.transition_to(ConnectionState::Connecting)?;

        let request =
            ExchangeRequest::handshake(self.session_id.clone(), self.config.identity.clone());
        let transport = self.transport.clone();
        let reply = transport.exchange(request).await?;

        let response = match reply {
            ExchangeReply::Complete(response) => response,
            ExchangeReply::Incremental(_) => {
                return Err(WireError::MalformedBody(
                    "handshake answered with an incremental body".to_string(),
                )
                .into());
            }
        };

        if let Some(message) = response.error_message {
            return Err(SessionError::Server(message));
        }

        if let Some(backlog) = response.messages
            && !backlog.is_empty()
        {
            self.history.extend(backlog.clone());
            self.observer.on_initial_messages(&backlog);
        }

        // Zero is a valid stage; only absence is skipped.
        if let Some(stage) = response.stage {
            self.set_stage(stage);
        }

        self.transition_to(ConnectionState::Connected)?;
        self.latch.clear();
        Ok(())
    }

    async fn exchange_turn<C>(
        &mut self,
        content: &str,
        on_chunk: &mut C,
    ) -> Result<TurnBody, SessionError>
    where
        C: FnMut(&str),
    {
        let request = ExchangeRequest::turn(
            self.session_id.clone(),
            content,
            self.config.identity.clone(),
            self.stage,
        );

        let reply = {
            let transport = self.transport.clone();
            let exchange = transport.exchange(request);
            tokio::pin!(exchange);
            tokio::select! {
                reply = &mut exchange => reply?,
                _ = self.token.cancelled() => return Ok(TurnBody::Cancelled),
            }
        };

        match reply {
            ExchangeReply::Complete(response) => {
                if let Some(message) = response.error_message {
                    return Err(SessionError::Server(message));
                }
                if let Some(stage) = response.stage {
                    self.set_stage(stage);
                }
                let full = response.response_content.unwrap_or_default();
                // Delivered once through `on_chunk` so both paths stay
                // callback-compatible.
                on_chunk(&full);
                Ok(TurnBody::Completed(full))
            }
            ExchangeReply::Incremental(stream) => self.consume_stream(stream, on_chunk).await,
        }
    }

    async fn consume_stream<C>(
        &mut self,
        mut stream: ByteStream,
        on_chunk: &mut C,
    ) -> Result<TurnBody, SessionError>
    where
        C: FnMut(&str),
    {
        let mut decoder = RecordDecoder::new();
        let mut full = String::new();

        loop {
            let next = tokio::select! {
                chunk = stream.next() => chunk,
                _ = self.token.cancelled() => return Ok(TurnBody::Cancelled),
            };
            let Some(chunk) = next else {
                break;
            };
            let bytes = chunk?;
            let text = String::from_utf8_lossy(&bytes).into_owned();
            for record in decoder.push(&text) {
                match self.apply_record(&record, &mut full, on_chunk)? {
                    RecordFlow::Continue => {}
                    RecordFlow::Done => return Ok(TurnBody::Completed(full)),
                }
            }
        }

        // The channel may close without an explicit done record; any
        // trailing partial line is decoded best-effort.
        if let Some(record) = decoder.finish() {
            self.apply_record(&record, &mut full, on_chunk)?;
        }
        Ok(TurnBody::Completed(full))
    }

    fn apply_record<C>(
        &mut self,
        record: &StreamRecord,
        full: &mut String,
        on_chunk: &mut C,
    ) -> Result<RecordFlow, SessionError>
    where
        C: FnMut(&str),
    {
        // An error field wins over everything else in the same record,
        // including a done flag.
        if let Some(message) = record.error_text() {
            return Err(SessionError::Server(message.to_string()));
        }
        if let Some(stage) = record.stage {
            self.set_stage(stage);
        }
        if let Some(message) = &record.message {
            full.push_str(message);
            on_chunk(message);
        }
        if record.done {
            return Ok(RecordFlow::Done);
        }
        Ok(RecordFlow::Continue)
    }

    fn set_stage(&mut self, stage: u32) {
        self.stage = stage;
        self.observer.on_stage_change(stage);
    }

    fn transition_to(&mut self, next: ConnectionState) -> Result<(), SessionError> {
        if !self.state.can_transition_to(&next) {
            return Err(SessionError::InvalidStateTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }

    /// Confirmed failure: drop back to disconnected and notify exactly once
    /// per latch episode.
    fn fail(&mut self, error: &SessionError) {
        if self.state == ConnectionState::Connecting {
            self.state = ConnectionState::Disconnected;
        }
        let message = error.user_message();
        if self.latch.trip(message.clone()) {
            self.observer.on_error(&message);
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        // Teardown of the owning view must abort any exchange still racing
        // a detached cancel handle.
        self.token.trigger();
    }
}
