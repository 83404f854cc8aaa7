use crate::{Term, VariableId};

/// The four term positions of a (possibly origin-carrying) triple pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermPosition {
    Subject,
    Predicate,
    Object,
    Graph,
}

impl TermPosition {
    pub const ALL: [TermPosition; 4] = [
        TermPosition::Subject,
        TermPosition::Predicate,
        TermPosition::Object,
        TermPosition::Graph,
    ];
}

/// One triple pattern of the query's flat triple array.
#[derive(Debug, Clone, PartialEq)]
pub struct TriplePattern {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    /// The graph term this triple is matched against, stamped from the
    /// innermost enclosing GRAPH pattern.
    pub origin: Option<Term>,
}

impl TriplePattern {
    pub fn new(subject: impl Into<Term>, predicate: impl Into<Term>, object: impl Into<Term>) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<Term>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn term(&self, position: TermPosition) -> Option<&Term> {
        match position {
            TermPosition::Subject => Some(&self.subject),
            TermPosition::Predicate => Some(&self.predicate),
            TermPosition::Object => Some(&self.object),
            TermPosition::Graph => self.origin.as_ref(),
        }
    }

    pub fn term_mut(&mut self, position: TermPosition) -> Option<&mut Term> {
        match position {
            TermPosition::Subject => Some(&mut self.subject),
            TermPosition::Predicate => Some(&mut self.predicate),
            TermPosition::Object => Some(&mut self.object),
            TermPosition::Graph => self.origin.as_mut(),
        }
    }

    /// The variables this triple references, in term-position order.
    pub fn variables(&self) -> impl Iterator<Item = VariableId> + '_ {
        TermPosition::ALL
            .into_iter()
            .filter_map(|position| self.term(position).and_then(Term::variable_id))
    }
}

/// A contiguous, inclusive column range of the flat triple array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripleSlice {
    pub start: usize,
    pub end: usize,
}

impl TripleSlice {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "triple slice columns out of order");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        false // an inclusive range always covers at least one column
    }

    pub fn columns(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }

    pub fn contains(&self, column: usize) -> bool {
        self.start <= column && column <= self.end
    }

    /// Widens the slice to the convex hull of both slices. Spans absorbed
    /// from a non-adjacent sibling may extend across columns neither side
    /// owned; the surviving pattern covers them all.
    pub fn widen(&mut self, other: TripleSlice) {
        self.start = self.start.min(other.start);
        self.end = self.end.max(other.end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen_covers_gaps() {
        let mut slice = TripleSlice::new(4, 5);
        slice.widen(TripleSlice::new(0, 1));
        assert_eq!(slice, TripleSlice::new(0, 5));
        assert_eq!(slice.len(), 6);
    }
}
