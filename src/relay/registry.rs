use std::collections::HashSet;

use crate::fizzy::Id;

/// User ids of every active configured agent.
///
/// Built once after all identities are resolved; read-only afterwards, so it
/// is shared by plain reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotUserRegistry {
    ids: HashSet<Id>,
}

impl BotUserRegistry {
    pub fn new<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = Id>,
    {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
