use serde::{Deserialize, Serialize};

/// Labels to process: from `start` (inclusive) up to `stop` (exclusive), in
/// the contest's own order.
///
/// Labels are matched by equality, not compared. A missing `start` selects
/// nothing; a missing `stop` runs to the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRange {
    pub start: String,
    pub stop: Option<String>,
}

impl LabelRange {
    pub fn new(start: impl Into<String>, stop: Option<String>) -> Self {
        Self {
            start: start.into(),
            stop,
        }
    }

    /// Picks the labels in range from an ordered label sequence.
    pub fn select<'a, I>(&self, labels: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        labels
            .into_iter()
            .skip_while(|label| *label != self.start)
            .take_while(|label| Some(*label) != self.stop.as_deref())
            .collect()
    }
}

impl Default for LabelRange {
    fn default() -> Self {
        Self::new("A", None)
    }
}
