//! Named clipboard slots.
//!
//! `'1'..'9'` form the anonymous ring (new anonymous content lands in `'1'`
//! after a rotation), `'a'..'z'` are named slots, `'.'` is special. Any
//! other name is a programming bug and panics at the call site.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct CutBuffers {
    slots: HashMap<u8, Vec<u8>>,
}

fn validate(name: u8) {
    let ok = name == b'.' || name.is_ascii_lowercase() || (b'1'..=b'9').contains(&name);
    if !ok {
        panic!("invalid cut buffer: {:?}", name as char);
    }
}

impl CutBuffers {
    pub fn new() -> CutBuffers {
        CutBuffers::default()
    }

    /// Write the anonymous cut buffer `'1'`, rotating `'1'..'9'` first.
    pub fn update_anon(&mut self, data: Vec<u8>) {
        for i in (b'2'..=b'9').rev() {
            if let Some(prev) = self.slots.get(&(i - 1)).cloned() {
                self.slots.insert(i, prev);
            } else {
                self.slots.remove(&i);
            }
        }
        self.slots.insert(b'1', data);
    }

    pub fn set(&mut self, name: u8, data: Vec<u8>) {
        validate(name);
        self.slots.insert(name, data);
    }

    pub fn append(&mut self, name: u8, data: &[u8]) {
        validate(name);
        self.slots.entry(name).or_default().extend_from_slice(data);
    }

    pub fn get(&self, name: u8) -> Option<&[u8]> {
        validate(name);
        self.slots.get(&name).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anon_ring_rotates() {
        let mut cb = CutBuffers::new();
        cb.update_anon(b"first".to_vec());
        cb.update_anon(b"second".to_vec());
        cb.update_anon(b"third".to_vec());
        assert_eq!(cb.get(b'1'), Some(&b"third"[..]));
        assert_eq!(cb.get(b'2'), Some(&b"second"[..]));
        assert_eq!(cb.get(b'3'), Some(&b"first"[..]));
        assert_eq!(cb.get(b'4'), None);
    }

    #[test]
    fn named_slots_set_append_get() {
        let mut cb = CutBuffers::new();
        cb.set(b'a', b"abc".to_vec());
        cb.append(b'a', b"def");
        assert_eq!(cb.get(b'a'), Some(&b"abcdef"[..]));
        cb.set(b'.', b"dot".to_vec());
        assert_eq!(cb.get(b'.'), Some(&b"dot"[..]));
    }

    #[test]
    #[should_panic(expected = "invalid cut buffer")]
    fn invalid_name_panics() {
        let mut cb = CutBuffers::new();
        cb.set(b'0', b"x".to_vec());
    }
}
