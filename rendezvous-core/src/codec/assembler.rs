use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("assembled message exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

/// Reassembles text messages that a transport delivers in several fragments.
///
/// Decoding must only ever see a complete message, so fragments are buffered until one
/// flagged `fin` arrives.
#[derive(Debug)]
pub struct FrameAssembler {
    buffer: String,
    limit: usize,
    // set after an overflow until the rest of that message has gone by
    discarding: bool,
}

impl FrameAssembler {
    pub fn new(limit: usize) -> Self {
        Self {
            buffer: String::new(),
            limit,
            discarding: false,
        }
    }

    /// Feeds one fragment. Returns the whole message once `fin` is seen.
    ///
    /// On overflow the partial buffer is dropped, and so is every later fragment of the
    /// same message up to and including its `fin` fragment.
    pub fn push(&mut self, fragment: &str, fin: bool) -> Result<Option<String>, FrameError> {
        if self.discarding {
            self.discarding = !fin;
            return Ok(None);
        }

        if self.buffer.len() + fragment.len() > self.limit {
            self.buffer.clear();
            self.discarding = !fin;
            return Err(FrameError::TooLarge { limit: self.limit });
        }

        if fin && self.buffer.is_empty() {
            return Ok(Some(fragment.to_owned()));
        }

        self.buffer.push_str(fragment);
        if fin {
            Ok(Some(std::mem::take(&mut self.buffer)))
        } else {
            Ok(None)
        }
    }

    pub fn is_pending(&self) -> bool {
        self.discarding || !self.buffer.is_empty()
    }
}
