use rdf_prepare_algebra::{TermPosition, VariableId};
use std::fmt;

/// The per-cell flags of the term-role matrix.
///
/// For each term position a cell records whether the variable's appearance
/// there is a binding occurrence (`Bound*`, the position that introduces the
/// variable) or a reference to an already-bound variable (`Use*`, a position
/// the executor constrains). At most one of the two flags per position is
/// ever set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleFlags(u8);

impl RoleFlags {
    const BOUND_SUBJECT: u8 = 1 << 0;
    const BOUND_PREDICATE: u8 = 1 << 1;
    const BOUND_OBJECT: u8 = 1 << 2;
    const BOUND_GRAPH: u8 = 1 << 3;
    const USE_SUBJECT: u8 = 1 << 4;
    const USE_PREDICATE: u8 = 1 << 5;
    const USE_OBJECT: u8 = 1 << 6;
    const USE_GRAPH: u8 = 1 << 7;

    fn bound_bit(position: TermPosition) -> u8 {
        match position {
            TermPosition::Subject => Self::BOUND_SUBJECT,
            TermPosition::Predicate => Self::BOUND_PREDICATE,
            TermPosition::Object => Self::BOUND_OBJECT,
            TermPosition::Graph => Self::BOUND_GRAPH,
        }
    }

    fn use_bit(position: TermPosition) -> u8 {
        match position {
            TermPosition::Subject => Self::USE_SUBJECT,
            TermPosition::Predicate => Self::USE_PREDICATE,
            TermPosition::Object => Self::USE_OBJECT,
            TermPosition::Graph => Self::USE_GRAPH,
        }
    }

    pub fn bound_at(self, position: TermPosition) -> bool {
        self.0 & Self::bound_bit(position) != 0
    }

    pub fn used_at(self, position: TermPosition) -> bool {
        self.0 & Self::use_bit(position) != 0
    }

    pub fn binds_any(self) -> bool {
        self.0 & 0x0f != 0
    }

    pub fn uses_any(self) -> bool {
        self.0 & 0xf0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RoleFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for position in TermPosition::ALL {
            let c = if self.bound_at(position) {
                'b'
            } else if self.used_at(position) {
                'u'
            } else {
                '-'
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// The per-triple term-role matrix: one row per triple of the flat array,
/// one column per variable.
#[derive(Debug, Clone)]
pub struct TermRoleMap {
    width: usize,
    cells: Vec<RoleFlags>,
}

impl TermRoleMap {
    pub fn new(variable_count: usize, triple_count: usize) -> Self {
        Self {
            width: variable_count,
            cells: vec![RoleFlags::default(); variable_count * triple_count],
        }
    }

    pub fn get(&self, column: usize, variable: VariableId) -> RoleFlags {
        self.cells
            .get(column * self.width + variable.index())
            .copied()
            .unwrap_or_default()
    }

    pub(crate) fn mark_bound(
        &mut self,
        column: usize,
        variable: VariableId,
        position: TermPosition,
    ) {
        self.mark(column, variable, RoleFlags::bound_bit(position));
    }

    pub(crate) fn mark_use(
        &mut self,
        column: usize,
        variable: VariableId,
        position: TermPosition,
    ) {
        self.mark(column, variable, RoleFlags::use_bit(position));
    }

    fn mark(&mut self, column: usize, variable: VariableId, bit: u8) {
        let index = column * self.width + variable.index();
        if let Some(cell) = self.cells.get_mut(index) {
            cell.0 |= bit;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_and_use_bits_are_disjoint() {
        let mut map = TermRoleMap::new(2, 2);
        map.mark_bound(0, VariableId(0), TermPosition::Subject);
        map.mark_use(1, VariableId(0), TermPosition::Subject);
        let first = map.get(0, VariableId(0));
        let second = map.get(1, VariableId(0));
        assert!(first.bound_at(TermPosition::Subject));
        assert!(!first.used_at(TermPosition::Subject));
        assert!(second.used_at(TermPosition::Subject));
        assert!(!second.binds_any() && second.uses_any());
        assert_eq!(first.to_string(), "b---");
        assert_eq!(second.to_string(), "u---");
    }
}
