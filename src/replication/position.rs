//! Event-stream positions.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::errors::{ReplicationError, ReplicationResult};

/// A point in a producer's append-only event log: the log file name plus a
/// byte offset into it, optionally tagged with the producer's server id.
///
/// Positions are immutable once constructed; they are only compared and
/// formatted. Comparison is lexicographic on `(stream, offset)` and is only
/// defined between positions of the same producer: when both producer ids
/// are set and differ, [`compare`](Self::compare) fails and the `<`/`>`
/// operators report the positions as incomparable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Position {
    producer: Option<u64>,
    stream: String,
    offset: u64,
}

impl Position {
    /// Create a position in `stream` at `offset` for a producer.
    pub fn new(producer: Option<u64>, stream: impl Into<String>, offset: u64) -> Self {
        Self {
            producer,
            stream: stream.into(),
            offset,
        }
    }

    /// The explicit "no position yet" value.
    pub fn unset() -> Self {
        Self::default()
    }

    /// True for the empty/default position, distinguishable from any
    /// concrete position.
    pub fn is_unset(&self) -> bool {
        self.stream.is_empty() || self.offset == 0
    }

    /// Producer id the position belongs to, when known.
    pub fn producer(&self) -> Option<u64> {
        self.producer
    }

    /// Name of the event-log file.
    pub fn stream(&self) -> &str {
        &self.stream
    }

    /// Byte offset within the file.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Compare two positions of the same producer lexicographically.
    ///
    /// Fails with [`ReplicationError::MismatchedProducer`] when both
    /// producer ids are set and differ; an unset producer id on either side
    /// is compatible with anything.
    pub fn compare(&self, other: &Position) -> ReplicationResult<Ordering> {
        if let (Some(left), Some(right)) = (self.producer, other.producer) {
            if left != right {
                return Err(ReplicationError::MismatchedProducer { left, right });
            }
        }
        Ok(self
            .stream
            .cmp(&other.stream)
            .then(self.offset.cmp(&other.offset)))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.compare(other) {
            // Equal coordinates under different producer tags are still
            // distinct positions; report them as incomparable rather than
            // contradicting equality.
            Ok(Ordering::Equal) if self.producer != other.producer => None,
            Ok(ordering) => Some(ordering),
            Err(_) => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unset() {
            return write!(f, "<unset>");
        }
        match self.producer {
            Some(id) => write!(f, "{id}/{}:{}", self.stream, self.offset),
            None => write!(f, "{}:{}", self.stream, self.offset),
        }
    }
}

impl FromStr for Position {
    type Err = ReplicationError;

    /// Parse the textual form produced by `Display`:
    /// `[producer/]stream:offset`, or `<unset>` for the empty position.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let malformed = || ReplicationError::MalformedPosition {
            input: input.to_string(),
        };
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed == "<unset>" {
            return Ok(Position::unset());
        }
        let (producer, rest) = match trimmed.split_once('/') {
            Some((producer, rest)) => (Some(producer.parse().map_err(|_| malformed())?), rest),
            None => (None, trimmed),
        };
        let (stream, offset) = rest.rsplit_once(':').ok_or_else(|| malformed())?;
        if stream.is_empty() {
            return Err(malformed());
        }
        let offset = offset.parse().map_err(|_| malformed())?;
        Ok(Position::new(producer, stream, offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_lexicographic_on_stream_then_offset() {
        let p1 = Position::new(Some(1), "f1", 100);
        let p2 = Position::new(Some(1), "f1", 200);
        let p3 = Position::new(Some(1), "f2", 1);
        assert!(p1 < p2);
        assert!(p2 < p3);
        assert!(p1 < p3);
    }

    #[test]
    fn test_different_producers_are_incomparable() {
        let left = Position::new(Some(1), "f1", 100);
        let right = Position::new(Some(2), "f1", 200);
        assert!(matches!(
            left.compare(&right),
            Err(ReplicationError::MismatchedProducer { left: 1, right: 2 })
        ));
        assert_eq!(left.partial_cmp(&right), None);
    }

    #[test]
    fn test_unset_producer_is_compatible() {
        let tagged = Position::new(Some(1), "f1", 100);
        let untagged = Position::new(None, "f1", 200);
        assert_eq!(tagged.compare(&untagged).unwrap(), Ordering::Less);
    }

    #[test]
    fn test_unset_position_renders_distinctly() {
        assert_eq!(Position::unset().to_string(), "<unset>");
        assert!(Position::new(Some(1), "", 0).is_unset());
        assert_eq!(
            Position::new(Some(7), "bin.000001", 4711).to_string(),
            "7/bin.000001:4711"
        );
        assert_eq!(
            Position::new(None, "bin.000001", 4711).to_string(),
            "bin.000001:4711"
        );
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for position in [
            Position::unset(),
            Position::new(Some(7), "bin.000001", 4711),
            Position::new(None, "bin.000002", 150),
        ] {
            let parsed: Position = position.to_string().parse().unwrap();
            assert_eq!(parsed, position);
        }
    }

    #[test]
    fn test_malformed_text_is_rejected() {
        for input in ["bin.000001", "x/y:z", ":10", "seven/bin:1"] {
            assert!(matches!(
                input.parse::<Position>(),
                Err(ReplicationError::MalformedPosition { .. })
            ));
        }
    }
}
