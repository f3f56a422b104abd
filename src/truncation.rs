//! Output length bound.

/// Progress of a bounded rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncationState {
    /// Below the limit, or no limit at all.
    Streaming,
    /// The limit was crossed. Open spans run on to their ends but nothing
    /// new is opened.
    Closing,
    /// Spans closed and notice written. No more input is read.
    Finished,
}

/// Tracks whether the rendered text has reached `max_length` characters.
///
/// Offsets passed in are global, so the limit is anchored at the offset the
/// call started from.
#[derive(Debug, Clone)]
pub struct TruncationController {
    limit: Option<usize>,
    state: TruncationState,
}

impl TruncationController {
    pub fn new(max_length: Option<usize>, start_offset: usize) -> Self {
        Self {
            limit: max_length.map(|max| start_offset.saturating_add(max)),
            state: TruncationState::Streaming,
        }
    }

    /// Global offset past which no new span is opened.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Caps `offset` at the limit.
    pub fn clamp(&self, offset: usize) -> usize {
        self.limit.map_or(offset, |limit| offset.min(limit))
    }

    pub fn state(&self) -> TruncationState {
        self.state
    }

    pub fn is_streaming(&self) -> bool {
        self.state == TruncationState::Streaming
    }

    pub fn is_finished(&self) -> bool {
        self.state == TruncationState::Finished
    }

    /// Whether the output was cut short.
    pub fn triggered(&self) -> bool {
        self.state != TruncationState::Streaming
    }

    pub fn begin_closing(&mut self) {
        if self.state == TruncationState::Streaming {
            self.state = TruncationState::Closing;
        }
    }

    pub fn finish(&mut self) {
        self.state = TruncationState::Finished;
    }
}
