use std::ops::Add;

/// Represents a region of source code, used for error reporting. Positions are byte offsets
/// relative to the start of the source file they correspond to. Retrieving source code lines
/// using a span that is generated from a different source file has undefined behavior.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Span {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Joining two spans yields the smallest span covering both.
impl Add for Span {
    type Output = Span;

    fn add(self, rhs: Span) -> Span {
        Span::new(self.start.min(rhs.start), self.end.max(rhs.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_covers_both() {
        let joined = Span::new(4, 6) + Span::new(1, 2);
        assert_eq!(joined, Span::new(1, 6));
        assert_eq!(joined.len(), 5);
        assert!(Span::new(3, 3).is_empty());
    }
}
