use fxhash::FxHashMap;

/// Identity of an animation state: a 32-bit hash of its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub u32);

impl StateId {
    /// Hash a name without caching it.
    pub fn of(name: &str) -> Self {
        StateId(fxhash::hash32(name))
    }
}

/// Per-character name→id cache, filled the first time a name is seen.
#[derive(Clone, Debug, Default)]
pub struct StateNameCache {
    ids: FxHashMap<String, StateId>,
}

impl StateNameCache {
    pub fn id(&mut self, name: &str) -> StateId {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = StateId::of(name);
        self.ids.insert(name.to_string(), id);
        id
    }

    /// Reverse lookup over names seen so far.
    pub fn name(&self, id: StateId) -> Option<&str> {
        self.ids
            .iter()
            .find_map(|(name, cached)| (*cached == id).then_some(name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
