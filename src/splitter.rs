use std::sync::Arc;

/// One codepoint of passage or input text, the unit every comparison works on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayUnit {
    pub codepoint: char,
    pub index: usize,
}

/// Split `text` into display units, one per Unicode scalar value.
///
/// Characters outside the basic multilingual plane (emoji, rare CJK) occupy
/// exactly one unit.
pub fn split(text: &str) -> Vec<DisplayUnit> {
    text.chars()
        .enumerate()
        .map(|(index, codepoint)| DisplayUnit { codepoint, index })
        .collect()
}

/// Number of display units in `text`
pub fn unit_count(text: &str) -> usize {
    text.chars().count()
}

/// The fixed target text of a session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Passage {
    text: Arc<str>,
    units: Arc<[DisplayUnit]>,
}

impl Passage {
    pub fn new(text: impl Into<String>) -> Self {
        let text: String = text.into();
        let units = split(&text);
        Self {
            text: text.into(),
            units: units.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DisplayUnit> {
        self.units.get(index)
    }

    pub fn units(&self) -> &[DisplayUnit] {
        &self.units
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Default for Passage {
    fn default() -> Self {
        Passage::new("")
    }
}

impl From<&str> for Passage {
    fn from(text: &str) -> Self {
        Passage::new(text)
    }
}
