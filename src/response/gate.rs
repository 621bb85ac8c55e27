use crate::headers::Header;

/// Status line and headers waiting to be flushed.
#[derive(Debug)]
pub(crate) struct Head {
    pub status: String,
    pub headers: Vec<Header>,
    pub declared: Option<u64>,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Pending(Head),
    Flushed,
}

/// Tracks the response phase and the body length budget.
#[derive(Debug)]
pub(crate) struct OutputGate {
    phase: Phase,
    declared: Option<u64>,
    emitted: u64,
}

impl OutputGate {
    pub const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            declared: None,
            emitted: 0,
        }
    }

    pub const fn is_started(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    pub const fn is_flushed(&self) -> bool {
        matches!(self.phase, Phase::Flushed)
    }

    /// Declared length, known once the head is flushed.
    pub const fn declared(&self) -> Option<u64> {
        self.declared
    }

    pub const fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Cache a head, replacing any pending one.
    ///
    /// Must not be called once flushed.
    pub fn start(&mut self, head: Head) {
        debug_assert!(!self.is_flushed());
        self.phase = Phase::Pending(head);
    }

    pub fn pending(&self) -> Option<&Head> {
        match &self.phase {
            Phase::Pending(head) => Some(head),
            _ => None,
        }
    }

    /// Mark the pending head as flushed, adopting its declared length.
    pub fn commit(&mut self) {
        if let Phase::Pending(head) = std::mem::replace(&mut self.phase, Phase::Flushed) {
            self.declared = head.declared;
        }
    }

    /// Account for a chunk of `len` bytes, returns how many of them may
    /// physically be written.
    ///
    /// The emitted counter always advances by the full `len`.
    pub fn admit(&mut self, len: usize) -> usize {
        let admitted = match self.declared {
            Some(declared) => {
                let left = declared.saturating_sub(self.emitted);
                usize::try_from(left).map_or(len, |left| left.min(len))
            }
            None => len,
        };
        self.emitted = self.emitted.saturating_add(len as u64);
        admitted
    }

    /// Returns `true` if a declared length is set and has been reached.
    pub const fn is_complete(&self) -> bool {
        match self.declared {
            Some(declared) => self.emitted >= declared,
            None => false,
        }
    }
}
