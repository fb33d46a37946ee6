//! Go-to-frame prompt.
//!
//! A single-line numeric entry. While it is open the player treats it as a
//! focused text field, so the transport shortcuts are not routed.

#[derive(Debug, Clone, PartialEq)]
pub struct GotoDialog {
    pub input: String,
    pub max_frame: u64,
}

impl GotoDialog {
    pub fn new(max_frame: u64) -> Self {
        Self {
            input: String::new(),
            max_frame,
        }
    }

    pub fn push_char(&mut self, c: char) {
        // Frame numbers only, capped well below u64 overflow
        if c.is_ascii_digit() && self.input.len() < 12 {
            self.input.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
    }

    /// Frame to jump to, clamped to the last frame of the clip.
    pub fn target_frame(&self) -> Option<u64> {
        self.input
            .parse::<u64>()
            .ok()
            .map(|frame| frame.min(self.max_frame))
    }
}
