//! The element registry: element records and the prime-key assignment that makes reaction keys a
//! unique factorization of their reactant multiset.

use std::collections::HashMap;

use crate::error::LoadError;

/// The name every engine pre-registers at key 2; empty cells are semantically solvent-filled.
pub const SOLVENT_NAME: &str = "Solvent";

/// An immutable species record plus its live atom count.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub symbol: char,
    pub color: u32,
    pub charge: i32,
    pub start_concentration: f64,
    /// Distinct prime, assigned at registration time in creation order starting from 2.
    pub key: u64,
    /// Number of atoms currently on the grid with this element type.
    pub count: u64,
}

impl Element {
    pub fn is_solvent(&self) -> bool {
        self.name == SOLVENT_NAME
    }
}

/// Name- and key-indexed collection of [`Element`]s, with solvent pre-registered at key 2.
#[derive(Debug, Clone)]
pub struct ElementRegistry {
    elements: Vec<Element>,
    by_name: HashMap<String, usize>,
    by_key: HashMap<u64, usize>,
    last_prime: u64,
}

impl ElementRegistry {
    pub fn new() -> Self {
        let mut registry = ElementRegistry {
            elements: Vec::new(),
            by_name: HashMap::new(),
            by_key: HashMap::new(),
            last_prime: 1,
        };
        registry
            .add(SOLVENT_NAME, 'S', 0, 0, 0.0)
            .expect("solvent is the first registration and cannot collide");
        registry
    }

    /// Registers a new element, assigning it the next unused prime key.
    ///
    /// Fails if `name` is already registered.
    pub fn add(
        &mut self,
        name: &str,
        symbol: char,
        color: u32,
        charge: i32,
        start_concentration: f64,
    ) -> Result<u64, LoadError> {
        if self.by_name.contains_key(name) {
            return Err(LoadError::DuplicateElement {
                name: name.to_string(),
            });
        }
        let key = self.next_prime();
        let idx = self.elements.len();
        self.elements.push(Element {
            name: name.to_string(),
            symbol,
            color,
            charge,
            start_concentration,
            key,
            count: 0,
        });
        self.by_name.insert(name.to_string(), idx);
        self.by_key.insert(key, idx);
        Ok(key)
    }

    /// The smallest prime greater than every key handed out so far.
    fn next_prime(&mut self) -> u64 {
        let mut candidate = self.last_prime + 1;
        loop {
            let mut divisor = 2u64;
            let mut prime = true;
            while divisor * divisor <= candidate {
                if candidate % divisor == 0 {
                    prime = false;
                    break;
                }
                divisor += 1;
            }
            if prime {
                break;
            }
            candidate += 1;
        }
        self.last_prime = candidate;
        candidate
    }

    pub fn solvent_key(&self) -> u64 {
        self.elements[0].key
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<&Element> {
        self.by_name.get(name).map(|&i| &self.elements[i])
    }

    pub fn lookup_by_key(&self, key: u64) -> Option<&Element> {
        self.by_key.get(&key).map(|&i| &self.elements[i])
    }

    /// Adjusts the live atom count for `key` by `delta`, which may be negative.
    ///
    /// No-op for a key that isn't registered; reaction commit logic relies on this being callable
    /// for a solvent key without special-casing it.
    pub fn adjust_count(&mut self, key: u64, delta: i64) {
        if let Some(&idx) = self.by_key.get(&key) {
            let element = &mut self.elements[idx];
            element.count = (element.count as i64 + delta).max(0) as u64;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Iterates non-solvent elements, in registration order — the order census rows use.
    pub fn iter_reportable(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| !e.is_solvent())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Default for ElementRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn solvent_is_preregistered_at_key_two() {
        let registry = ElementRegistry::new();
        assert_eq!(registry.solvent_key(), 2);
        assert_eq!(registry.lookup_by_key(2).unwrap().name, SOLVENT_NAME);
    }

    #[test_case(0, 3; "first added element gets key 3")]
    #[test_case(1, 5; "second added element gets key 5")]
    #[test_case(2, 7; "third added element gets key 7")]
    #[test_case(3, 11; "fourth added element gets key 11")]
    fn keys_are_assigned_in_prime_order(nth: usize, expected_key: u64) {
        let mut registry = ElementRegistry::new();
        let mut last = 0;
        for i in 0..=nth {
            last = registry
                .add(&format!("E{i}"), 'X', 0, 0, 0.0)
                .expect("fresh name");
        }
        assert_eq!(last, expected_key);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut registry = ElementRegistry::new();
        registry.add("A", 'A', 0, 0, 0.5).unwrap();
        let err = registry.add("A", 'A', 0, 0, 0.5).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateElement { name } if name == "A"));
    }

    #[test]
    fn adjust_count_never_goes_negative() {
        let mut registry = ElementRegistry::new();
        let key = registry.add("A", 'A', 0, 0, 0.5).unwrap();
        registry.adjust_count(key, -5);
        assert_eq!(registry.lookup_by_key(key).unwrap().count, 0);
        registry.adjust_count(key, 3);
        registry.adjust_count(key, -1);
        assert_eq!(registry.lookup_by_key(key).unwrap().count, 2);
    }

    #[test]
    fn reportable_iteration_excludes_solvent() {
        let mut registry = ElementRegistry::new();
        registry.add("A", 'A', 0, 0, 0.5).unwrap();
        registry.add("B", 'B', 0, 0, 0.5).unwrap();
        let names: Vec<_> = registry.iter_reportable().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
