use super::Result;
use std::collections::HashMap;

/// Ordered set of names for hidden states or observation symbols
#[derive(Debug, Clone, PartialEq)]
pub struct Alphabet {
    names: Vec<String>,
    lookup: HashMap<String, usize>,
}

impl Alphabet {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Result<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut lookup = HashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            if lookup.insert(name.clone(), index).is_some() {
                return Err(format!("Duplicate name in alphabet: {}", name));
            }
        }
        Ok(Self { names, lookup })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(|s| s.as_str())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}
