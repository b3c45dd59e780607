//! Some utility functions

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::item::{Importance, Item};


/// A debug utility that pretty-prints a list of items
pub fn print_item_list(items: &[Item]) {
    for item in items {
        print_item(item);
    }
}

pub fn print_item(item: &Item) {
    let completion = if item.is_done() { "✓" } else { " " };
    let importance = match item.importance() {
        Importance::Important => "!",
        Importance::Regular => " ",
        Importance::Unimportant => "↓",
    };
    let deadline = item.deadline()
        .map(|d| format!(" (due {})", d))
        .unwrap_or_default();
    println!("    {}{} {}{}\t{}", completion, importance, item.text(), deadline, item.id());
}


/// Compare keys of two hashmaps for equality
pub fn keys_are_the_same<T, U, V>(left: &HashMap<T, U>, right: &HashMap<T, V>) -> bool
where
    T: Hash + Eq + Clone + std::fmt::Display,
{
    if left.len() != right.len() {
        log::debug!("Count of keys mismatch: {} and {}", left.len(), right.len());
        return false;
    }

    let keys_l: HashSet<T> = left.keys().cloned().collect();
    let keys_r: HashSet<T> = right.keys().cloned().collect();
    let result = keys_l == keys_r;
    if result == false {
        log::debug!("Keys of a map mismatch");
        for key in keys_l {
            log::debug!("   left: {}", key);
        }
        log::debug!("RIGHT:");
        for key in keys_r {
            log::debug!("  right: {}", key);
        }
    }
    result
}
