//! The reaction table: reactant multisets keyed by the product of their element primes, with up
//! to two product alternatives per key.

use std::collections::HashMap;

use crate::error::LoadError;

/// A reaction record, keyed by the product of its reactants' element primes.
///
/// `reactants` and `first_products`/`second_products` are always padded (with the solvent key) to
/// equal length by the loader before `ReactionTable::add` is called; this type does not pad on its
/// own, since padding needs the solvent key from the element registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    pub reactants: Vec<u64>,
    pub key: u64,
    pub first_products: Vec<u64>,
    pub first_prob: f64,
    pub second_products: Option<Vec<u64>>,
    pub second_prob: Option<f64>,
}

impl Reaction {
    /// Product of the reactant keys; unique per distinct reactant multiset since every element
    /// key is a distinct prime.
    pub fn key_of(reactants: &[u64]) -> u64 {
        reactants.iter().product()
    }

    pub fn products(&self, alternative: bool) -> Option<&[u64]> {
        if alternative {
            self.second_products.as_deref()
        } else {
            Some(&self.first_products)
        }
    }

    pub fn prob(&self, alternative: bool) -> Option<f64> {
        if alternative {
            self.second_prob
        } else {
            Some(self.first_prob)
        }
    }
}

/// Key-indexed collection of [`Reaction`]s.
#[derive(Debug, Clone, Default)]
pub struct ReactionTable {
    reactions: HashMap<u64, Reaction>,
}

impl ReactionTable {
    pub fn new() -> Self {
        ReactionTable {
            reactions: HashMap::new(),
        }
    }

    /// Registers a reaction. If no reaction shares this reactant multiset, it becomes the first
    /// alternative. If one does and has no second alternative yet, this becomes the second. If
    /// both alternatives are already populated, fails.
    pub fn add(
        &mut self,
        reactants: Vec<u64>,
        products: Vec<u64>,
        prob: f64,
    ) -> Result<(), LoadError> {
        let key = Reaction::key_of(&reactants);
        match self.reactions.get_mut(&key) {
            None => {
                self.reactions.insert(
                    key,
                    Reaction {
                        reactants,
                        key,
                        first_products: products,
                        first_prob: prob,
                        second_products: None,
                        second_prob: None,
                    },
                );
                Ok(())
            }
            Some(existing) if existing.second_products.is_none() => {
                existing.second_products = Some(products);
                existing.second_prob = Some(prob);
                Ok(())
            }
            Some(_) => Err(LoadError::DuplicateReaction { line: 0 }),
        }
    }

    pub fn lookup(&self, key: u64) -> Option<&Reaction> {
        self.reactions.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reaction> {
        self.reactions.values()
    }

    pub fn len(&self) -> usize {
        self.reactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reactions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_reaction_for_a_key_becomes_the_first_alternative() {
        let mut table = ReactionTable::new();
        table.add(vec![3], vec![5], 0.5).unwrap();
        let rxn = table.lookup(3).unwrap();
        assert_eq!(rxn.first_products, vec![5]);
        assert_eq!(rxn.first_prob, 0.5);
        assert!(rxn.second_products.is_none());
    }

    #[test]
    fn second_declaration_for_same_key_becomes_second_alternative() {
        let mut table = ReactionTable::new();
        table.add(vec![3], vec![5], 0.5).unwrap();
        table.add(vec![3], vec![7], 0.25).unwrap();
        let rxn = table.lookup(3).unwrap();
        assert_eq!(rxn.second_products, Some(vec![7]));
        assert_eq!(rxn.second_prob, Some(0.25));
    }

    #[test]
    fn third_declaration_for_same_key_is_an_error() {
        let mut table = ReactionTable::new();
        table.add(vec![3], vec![5], 0.5).unwrap();
        table.add(vec![3], vec![7], 0.25).unwrap();
        let err = table.add(vec![3], vec![11], 0.1).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateReaction { .. }));
    }

    #[test]
    fn second_order_key_is_product_of_both_reactants() {
        assert_eq!(Reaction::key_of(&[3, 5]), 15);
        assert_eq!(Reaction::key_of(&[5, 3]), 15);
    }

    #[test]
    fn products_and_prob_select_by_alternative_flag() {
        let mut table = ReactionTable::new();
        table.add(vec![3], vec![5], 0.5).unwrap();
        table.add(vec![3], vec![7], 0.25).unwrap();
        let rxn = table.lookup(3).unwrap();
        assert_eq!(rxn.products(false), Some(&[5][..]));
        assert_eq!(rxn.products(true), Some(&[7][..]));
        assert_eq!(rxn.prob(false), Some(0.5));
        assert_eq!(rxn.prob(true), Some(0.25));
    }
}
