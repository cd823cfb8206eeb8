use crate::error::{Error, ErrorType, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Named integer registers. A register comes into existence on its first
/// write; reading one that was never written is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registers {
    items: BTreeMap<String, i64>,
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: i64) {
        match self.items.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.items.insert(name.to_owned(), value);
            }
        }
    }

    pub fn find(&self, name: &str) -> Result<i64> {
        self.items.get(name).copied().ok_or_else(|| {
            Error::new(
                ErrorType::UninitializedRegister,
                format!("Register '{}' is not initialized, registers: {}", name, self),
            )
        })
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.items.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.items.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, "}}")
    }
}
