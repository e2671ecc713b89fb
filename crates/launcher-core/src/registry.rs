//! Handlers retained from the most recent application listing.
//!
//! `launchFile` with an `applicationPath` resolves the path back to a native
//! handler through this registry. The registry owns its handlers: clearing it
//! or dropping it releases them.

use crate::encoding::WideString;

/// A listed handler together with the identity it was listed under.
#[derive(Debug)]
pub struct RegisteredHandler<H> {
    identity: WideString,
    handler: H,
}

impl<H> RegisteredHandler<H> {
    pub fn new(identity: WideString, handler: H) -> Self {
        Self { identity, handler }
    }

    pub fn identity(&self) -> &WideString {
        &self.identity
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}

/// Result of resolving an application identity.
#[derive(Debug)]
pub enum HandlerLookup<'a, H> {
    Found(&'a H),
    NotFound,
}

/// Single-owner list of handlers from the latest listing.
#[derive(Debug)]
pub struct HandlerRegistry<H> {
    entries: Vec<RegisteredHandler<H>>,
}

impl<H> Default for HandlerRegistry<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<H> HandlerRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Release every retained handler. Returns how many were released.
    pub fn clear(&mut self) -> usize {
        let released = self.entries.len();
        self.entries.clear();
        released
    }

    pub fn push(&mut self, identity: WideString, handler: H) {
        self.entries.push(RegisteredHandler::new(identity, handler));
    }

    /// Exact match on the native-encoded identity. The first match wins.
    pub fn lookup(&self, identity: &WideString) -> HandlerLookup<'_, H> {
        self.entries
            .iter()
            .find(|entry| entry.identity == *identity)
            .map_or(HandlerLookup::NotFound, |entry| {
                HandlerLookup::Found(&entry.handler)
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredHandler<H>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Tracked {
        id: u32,
        released: Rc<Cell<u32>>,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.released.set(self.released.get() + 1);
        }
    }

    fn wide(s: &str) -> WideString {
        WideString::from_utf8(s).unwrap()
    }

    #[test]
    fn test_lookup_exact_match() {
        let released = Rc::new(Cell::new(0));
        let mut registry = HandlerRegistry::new();
        registry.push(
            wide("C:\\Windows\\notepad.exe"),
            Tracked {
                id: 1,
                released: released.clone(),
            },
        );

        match registry.lookup(&wide("C:\\Windows\\notepad.exe")) {
            HandlerLookup::Found(h) => assert_eq!(h.id, 1),
            HandlerLookup::NotFound => panic!("expected a match"),
        }
        assert!(matches!(
            registry.lookup(&wide("c:\\windows\\notepad.exe")),
            HandlerLookup::NotFound
        ));
    }

    #[test]
    fn test_empty_registry_finds_nothing() {
        let registry: HandlerRegistry<()> = HandlerRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(registry.lookup(&wide("x")), HandlerLookup::NotFound));
    }

    #[test]
    fn test_clear_releases_handlers() {
        let released = Rc::new(Cell::new(0));
        let mut registry = HandlerRegistry::new();
        for id in 0..3 {
            registry.push(
                wide(&format!("app{}", id)),
                Tracked {
                    id,
                    released: released.clone(),
                },
            );
        }
        assert_eq!(registry.clear(), 3);
        assert_eq!(released.get(), 3);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_drop_releases_handlers() {
        let released = Rc::new(Cell::new(0));
        {
            let mut registry = HandlerRegistry::new();
            registry.push(
                wide("app"),
                Tracked {
                    id: 7,
                    released: released.clone(),
                },
            );
        }
        assert_eq!(released.get(), 1);
    }
}
