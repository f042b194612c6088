use crate::splitter::{self, Passage};

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
    /// Back to the neutral, untyped look
    Reset,
}

/// Classification of a single passage position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    pub index: usize,
    pub outcome: Outcome,
}

/// Result of comparing the current input against the last confirmed length
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diff {
    pub previous_len: usize,
    pub new_len: usize,
    pub results: Vec<Classification>,
    pub completed: bool,
    /// All previously typed input was deleted
    pub full_reset: bool,
}

impl Diff {
    pub fn added(&self) -> usize {
        self.new_len.saturating_sub(self.previous_len)
    }

    pub fn removed(&self) -> usize {
        self.previous_len.saturating_sub(self.new_len)
    }

    pub fn is_unchanged(&self) -> bool {
        self.new_len == self.previous_len
    }
}

/// Classify the positions touched since the previous pass.
///
/// Growth compares each new unit with the passage; positions past the end of
/// the passage are always `Incorrect`. Shrinking resets the removed
/// positions. Reaching the passage length completes the session whether or
/// not the tail is correct.
pub fn classify(passage: &Passage, previous_len: usize, current_input: &str) -> Diff {
    let units = splitter::split(current_input);
    let new_len = units.len();

    let mut diff = Diff {
        previous_len,
        new_len,
        ..Diff::default()
    };

    if new_len == previous_len {
        // composition states that do not change the unit count
        return diff;
    }

    if new_len > previous_len {
        diff.results = units[previous_len..]
            .iter()
            .map(|typed| {
                let outcome = match passage.get(typed.index) {
                    Some(expected) if expected.codepoint == typed.codepoint => Outcome::Correct,
                    _ => Outcome::Incorrect,
                };
                Classification {
                    index: typed.index,
                    outcome,
                }
            })
            .collect();
    } else {
        diff.results = (new_len..previous_len)
            .map(|index| Classification {
                index,
                outcome: Outcome::Reset,
            })
            .collect();
    }

    diff.full_reset = new_len == 0 && previous_len > 0;
    diff.completed = !diff.full_reset && new_len >= passage.len();

    diff
}
