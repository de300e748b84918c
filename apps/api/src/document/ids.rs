//! Item identifiers: `c` followed by 25 lowercase alphanumerics.
//!
//! Every place that needs an item id goes through `generate_item_id`, and every
//! place that validates one goes through `is_item_id`.

use std::collections::HashSet;

use rand::Rng;

const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ID_BODY_LEN: usize = 25;

pub fn generate_item_id() -> String {
    let mut rng = rand::thread_rng();
    let mut id = String::with_capacity(ID_BODY_LEN + 1);
    id.push('c');
    for _ in 0..ID_BODY_LEN {
        id.push(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char);
    }
    id
}

pub fn is_item_id(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next() == Some('c')
        && candidate.len() == ID_BODY_LEN + 1
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// Tracks ids already used in one document so none is handed out twice.
#[derive(Debug, Default)]
pub struct ItemIds {
    used: HashSet<String>,
}

impl ItemIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps `candidate` when it is well-formed and unused, otherwise mints a fresh id.
    pub fn claim(&mut self, candidate: Option<&str>) -> String {
        if let Some(id) = candidate {
            if is_item_id(id) && self.used.insert(id.to_string()) {
                return id.to_string();
            }
        }
        self.fresh()
    }

    pub fn fresh(&mut self) -> String {
        loop {
            let id = generate_item_id();
            if self.used.insert(id.clone()) {
                return id;
            }
        }
    }
}
