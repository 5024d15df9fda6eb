//! Constant pool shared by every function of a program.

use std::fmt;

use quill_core::CompilationError;
use rustc_hash::FxHashMap;

use super::instruction::ConstId;

/// Most constants a program can address.
pub const MAX_CONSTANTS: usize = u32::MAX as usize;

/// Values stored in the constant pool.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Constant {
    /// Tag byte used by the program encoding.
    pub fn tag(&self) -> u8 {
        match self {
            Constant::Null => 0,
            Constant::Bool(_) => 1,
            Constant::Int(_) => 2,
            Constant::Float(_) => 3,
            Constant::String(_) => 4,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Null => f.write_str("null"),
            Constant::Bool(b) => write!(f, "{b}"),
            Constant::Int(i) => write!(f, "{i}"),
            Constant::Float(x) => write!(f, "{x:?}"),
            Constant::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<i64> for Constant {
    fn from(value: i64) -> Self {
        Constant::Int(value)
    }
}

impl From<&str> for Constant {
    fn from(value: &str) -> Self {
        Constant::String(value.to_owned())
    }
}

/// Hashable mirror of [`Constant`]. Floats are keyed by bit pattern, so
/// `0.0` and `-0.0` stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ConstantKey {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    String(String),
}

impl From<&Constant> for ConstantKey {
    fn from(constant: &Constant) -> Self {
        match constant {
            Constant::Null => ConstantKey::Null,
            Constant::Bool(b) => ConstantKey::Bool(*b),
            Constant::Int(i) => ConstantKey::Int(*i),
            Constant::Float(x) => ConstantKey::Float(x.to_bits()),
            Constant::String(s) => ConstantKey::String(s.clone()),
        }
    }
}

/// Constant pool with deduplication.
///
/// Indices are handed out in first-insertion order, which keeps compilation
/// output identical across runs.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    constants: Vec<Constant>,
    index: FxHashMap<ConstantKey, ConstId>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constant or return the index of an equal one.
    pub fn add(&mut self, constant: Constant) -> Result<ConstId, CompilationError> {
        let key = ConstantKey::from(&constant);
        if let Some(&id) = self.index.get(&key) {
            return Ok(id);
        }

        if self.constants.len() >= MAX_CONSTANTS {
            return Err(CompilationError::TooManyConstants {
                limit: MAX_CONSTANTS,
            });
        }

        let id = ConstId(self.constants.len() as u32);
        self.constants.push(constant);
        self.index.insert(key, id);
        Ok(id)
    }

    pub fn get(&self, id: ConstId) -> Option<&Constant> {
        self.constants.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    /// Consume the pool, keeping only the constants in index order.
    pub fn into_constants(self) -> Vec<Constant> {
        self.constants
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduplicates_equal_constants() {
        let mut pool = ConstantPool::new();
        let a = pool.add(Constant::Int(404)).unwrap();
        let b = pool.add(Constant::from("not found")).unwrap();
        let c = pool.add(Constant::Int(404)).unwrap();

        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn int_and_float_do_not_alias() {
        let mut pool = ConstantPool::new();
        let i = pool.add(Constant::Int(1)).unwrap();
        let f = pool.add(Constant::Float(1.0)).unwrap();
        assert_ne!(i, f);
    }

    #[test]
    fn signed_zeros_are_distinct() {
        let mut pool = ConstantPool::new();
        let a = pool.add(Constant::Float(0.0)).unwrap();
        let b = pool.add(Constant::Float(-0.0)).unwrap();
        assert_ne!(a, b);
        assert_eq!(pool.add(Constant::Float(0.0)).unwrap(), a);
    }

    #[test]
    fn display_quotes_strings() {
        assert_eq!(Constant::from("hi").to_string(), "\"hi\"");
        assert_eq!(Constant::Int(-3).to_string(), "-3");
        assert_eq!(Constant::Float(1.5).to_string(), "1.5");
        assert_eq!(Constant::Null.to_string(), "null");
    }
}
