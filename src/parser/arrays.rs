//! Per-function registry of declared arrays, used for static bounds checks

use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

/// A declared array and its element count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayInfo {
    pub size: usize,
}

/// A declaration the architecture cannot express: every array name maps to
/// one VHDL array type and one signal per function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationConflict {
    Resized {
        name: String,
        previous: usize,
        size: usize,
    },
    ScalarAndArray {
        name: String,
    },
}

impl fmt::Display for DeclarationConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationConflict::Resized {
                name,
                previous,
                size,
            } => write!(
                f,
                "Array '{}' redeclared with size {} (previously {})",
                name, size, previous
            ),
            DeclarationConflict::ScalarAndArray { name } => {
                write!(f, "'{}' declared both as a scalar and as an array", name)
            }
        }
    }
}

/// Arrays declared in the function currently being parsed, plus the scalar
/// names they must not collide with.
///
/// Cleared when a new function starts, so names from one function never
/// leak into the checks of another.
#[derive(Debug, Default)]
pub struct ArrayTable {
    arrays: FxHashMap<String, ArrayInfo>,
    scalars: FxHashSet<String>,
}

impl ArrayTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.arrays.clear();
        self.scalars.clear();
    }

    /// Register an array. Redeclaring it with the same size is allowed.
    pub fn declare(&mut self, name: &str, size: usize) -> Result<(), DeclarationConflict> {
        if self.scalars.contains(name) {
            return Err(DeclarationConflict::ScalarAndArray {
                name: name.to_string(),
            });
        }
        match self.arrays.get(name) {
            Some(info) if info.size != size => Err(DeclarationConflict::Resized {
                name: name.to_string(),
                previous: info.size,
                size,
            }),
            Some(_) => Ok(()),
            None => {
                self.arrays.insert(name.to_string(), ArrayInfo { size });
                Ok(())
            }
        }
    }

    /// Register a scalar local or parameter
    pub fn declare_scalar(&mut self, name: &str) -> Result<(), DeclarationConflict> {
        if self.arrays.contains_key(name) {
            return Err(DeclarationConflict::ScalarAndArray {
                name: name.to_string(),
            });
        }
        self.scalars.insert(name.to_string());
        Ok(())
    }

    pub fn size_of(&self, name: &str) -> Option<usize> {
        self.arrays.get(name).map(|info| info.size)
    }

    /// `true` when `index` is a valid position in the named array.
    /// Unknown names are never out of bounds; they cannot be checked.
    pub fn in_bounds(&self, name: &str, index: i64) -> bool {
        match self.size_of(name) {
            Some(size) => index >= 0 && (index as u64) < size as u64,
            None => true,
        }
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let mut table = ArrayTable::new();
        table.declare("a", 3).unwrap();

        assert!(table.in_bounds("a", 0));
        assert!(table.in_bounds("a", 2));
        assert!(!table.in_bounds("a", 3));
        assert!(!table.in_bounds("a", -1));
        assert!(table.in_bounds("unknown", 100));
    }

    #[test]
    fn test_clear_forgets_arrays() {
        let mut table = ArrayTable::new();
        table.declare("buf", 8).unwrap();
        table.declare_scalar("n").unwrap();
        assert_eq!(table.size_of("buf"), Some(8));

        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.size_of("buf"), None);
        // the scalar is forgotten too
        assert!(table.declare("n", 2).is_ok());
    }

    #[test]
    fn test_conflicting_declarations() {
        let mut table = ArrayTable::new();
        table.declare("a", 2).unwrap();
        assert!(table.declare("a", 2).is_ok());

        let err = table.declare("a", 4).unwrap_err();
        assert_eq!(err.to_string(), "Array 'a' redeclared with size 4 (previously 2)");
        // the first size still decides the bounds
        assert_eq!(table.size_of("a"), Some(2));

        table.declare_scalar("x").unwrap();
        assert!(table.declare_scalar("x").is_ok());
        assert_eq!(
            table.declare("x", 3),
            Err(DeclarationConflict::ScalarAndArray {
                name: "x".to_string()
            })
        );
        assert!(table.declare_scalar("a").is_err());
    }
}
