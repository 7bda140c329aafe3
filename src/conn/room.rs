use std::collections::HashSet;
use uuid::Uuid;

/// A chat with at least one live member.
///
/// Members are referenced by user id; the hub owns the clients themselves.
#[derive(Debug)]
pub struct Room {
    id: Uuid,
    members: HashSet<Uuid>,
}

impl Room {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            members: HashSet::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Return false if the user was already a member
    pub fn join(&mut self, user_id: Uuid) -> bool {
        self.members.insert(user_id)
    }

    /// Return false if the user was not a member
    pub fn leave(&mut self, user_id: &Uuid) -> bool {
        self.members.remove(user_id)
    }

    #[cfg(test)]
    pub fn contains(&self, user_id: &Uuid) -> bool {
        self.members.contains(user_id)
    }

    pub fn members(&self) -> impl Iterator<Item = &Uuid> {
        self.members.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
