use oxidize_text_core::{DataError, DataResult};
use std::collections::HashMap;

/// An ordered, duplicate-free collection of strings.
///
/// Each string's index is its position in insertion order. When an unknown token is
/// designated, [`StringStore::forward`] maps every absent string to it instead of failing.
#[derive(Debug, Clone, Default)]
pub struct StringStore {
    itos: Vec<String>,
    stoi: HashMap<String, usize>,
    pad: Option<usize>,
    unk: Option<usize>,
}

impl StringStore {
    pub fn new() -> Self {
        StringStore::default()
    }

    /// Store holding `initials` in order, with `unk_token` as the unknown token.
    ///
    /// `unk_token` is appended when it is not one of `initials`.
    pub fn with_initials<I, T>(initials: I, unk_token: Option<&str>) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut store = StringStore::new();
        for s in initials {
            store.add(s);
        }
        if let Some(unk) = unk_token {
            store.unk = Some(store.add(unk));
        }
        store
    }

    /// Store starting with the reserved tokens: `pad` first, then `unk`.
    pub fn with_reserved(pad: Option<&str>, unk: Option<&str>) -> Self {
        let mut store = StringStore::new();
        if let Some(pad) = pad {
            store.pad = Some(store.add(pad));
        }
        if let Some(unk) = unk {
            store.unk = Some(store.add(unk));
        }
        store
    }

    /// Add a string, returning its index. Adding an existing string is a no-op.
    pub fn add(&mut self, s: impl Into<String>) -> usize {
        let s = s.into();
        if let Some(&idx) = self.stoi.get(&s) {
            return idx;
        }
        let idx = self.itos.len();
        self.stoi.insert(s.clone(), idx);
        self.itos.push(s);
        idx
    }

    /// Index of `token`, falling back to the unknown token's index.
    pub fn forward(&self, token: &str) -> DataResult<usize> {
        match self.stoi.get(token) {
            Some(&idx) => Ok(idx),
            None => self.unk.ok_or_else(|| DataError::TokenNotFound {
                token: token.to_string(),
            }),
        }
    }

    /// String stored at `index`.
    pub fn backward(&self, index: usize) -> DataResult<&str> {
        self.itos
            .get(index)
            .map(String::as_str)
            .ok_or(DataError::IndexOutOfRange {
                index,
                len: self.itos.len(),
            })
    }

    /// Index of `token` only if it is literally present.
    pub fn get_index(&self, token: &str) -> Option<usize> {
        self.stoi.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.stoi.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.itos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.itos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.itos.iter().map(String::as_str)
    }

    pub fn pad_index(&self) -> Option<usize> {
        self.pad
    }

    pub fn unk_index(&self) -> Option<usize> {
        self.unk
    }

    pub fn unk_token(&self) -> Option<&str> {
        self.unk.map(|i| self.itos[i].as_str())
    }

    pub fn tokens(&self) -> &[String] {
        &self.itos
    }
}

impl PartialEq for StringStore {
    fn eq(&self, other: &Self) -> bool {
        self.itos == other.itos && self.unk == other.unk
    }
}

impl Eq for StringStore {}

impl<'a> IntoIterator for &'a StringStore {
    type Item = &'a str;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, String>, fn(&'a String) -> &'a str>;

    fn into_iter(self) -> Self::IntoIter {
        self.itos.iter().map(String::as_str as fn(&'a String) -> &'a str)
    }
}
