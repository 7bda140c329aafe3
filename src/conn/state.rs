use super::client::Client;
use super::room::Room;
use crate::api::HubStatusResponse;
use crate::core::Error;
use std::collections::{hash_map::Entry, HashMap};
use uuid::Uuid;

/// The registries behind the hub's lock.
///
/// Every method leaves the registries consistent:
/// - a client's `room_id`, if any, names a room that lists the client
/// - a client sits in at most one room
/// - a room exists only while it has members
#[derive(Default)]
pub struct HubState {
    clients: HashMap<Uuid, ClientState>,
    rooms: HashMap<Uuid, Room>,
}

struct ClientState {
    client: Client,
    room_id: Option<Uuid>,
}

impl HubState {
    /// Insert a client, returning the stale client it replaced
    pub fn register_client(&mut self, client: Client) -> Option<Client> {
        let user_id = client.user_id();
        let state = ClientState {
            client,
            room_id: None,
        };

        let Some(stale) = self.clients.insert(user_id, state) else {
            tracing::debug!("client {} added to hub", user_id);
            return None;
        };
        if let Some(room_id) = stale.room_id {
            detach(&mut self.rooms, &user_id, room_id);
        }
        tracing::debug!("client {} replaced a stale connection", user_id);
        Some(stale.client)
    }

    /// Remove the client if it is still the registered connection for its user
    pub fn unregister_client(&mut self, client: &Client) -> bool {
        let user_id = client.user_id();

        let state = match self.clients.entry(user_id) {
            Entry::Occupied(o) if o.get().client.id() == client.id() => o.remove(),
            _ => return false,
        };

        if let Some(room_id) = state.room_id {
            detach(&mut self.rooms, &user_id, room_id);
        }
        tracing::debug!("client {} removed from hub", user_id);
        true
    }

    pub fn is_user_in(&self, user_id: &Uuid, room_id: &Uuid) -> bool {
        self.clients
            .get(user_id)
            .and_then(|cs| cs.room_id)
            .is_some_and(|id| id == *room_id)
    }

    /// Move the client into the room, creating the room if needed
    pub fn join_room(&mut self, client: &Client, room_id: Uuid) -> Result<(), Error> {
        let user_id = client.user_id();
        let state = self
            .clients
            .get_mut(&user_id)
            .filter(|cs| cs.client.id() == client.id())
            .ok_or(Error::ClientNotFound)?;

        match state.room_id {
            Some(id) if id == room_id => return Ok(()),
            Some(id) => detach(&mut self.rooms, &user_id, id),
            None => {}
        }

        let room = self.rooms.entry(room_id).or_insert_with(|| {
            tracing::debug!("chat {} created", room_id);
            Room::new(room_id)
        });
        room.join(user_id);
        state.room_id = Some(room_id);
        tracing::debug!("client {} connected to chat {}", user_id, room_id);

        Ok(())
    }

    /// Take the client out of its room, returning the room id
    pub fn leave_room(&mut self, client: &Client) -> Result<Uuid, Error> {
        let user_id = client.user_id();
        let state = self
            .clients
            .get_mut(&user_id)
            .filter(|cs| cs.client.id() == client.id())
            .ok_or(Error::ClientNotFound)?;
        let room_id = state.room_id.take().ok_or(Error::NotInRoom)?;

        detach(&mut self.rooms, &user_id, room_id);
        Ok(room_id)
    }

    pub fn client(&self, user_id: &Uuid) -> Option<Client> {
        self.clients.get(user_id).map(|cs| cs.client.clone())
    }

    pub fn user_room(&self, user_id: &Uuid) -> Option<Uuid> {
        self.clients.get(user_id).and_then(|cs| cs.room_id)
    }

    /// Clients currently in the room
    pub fn members(&self, room_id: &Uuid) -> Result<Vec<Client>, Error> {
        let room = self.rooms.get(room_id).ok_or(Error::ChatNotFound)?;

        let clients = room
            .members()
            .filter_map(|user_id| self.clients.get(user_id))
            .map(|cs| cs.client.clone())
            .collect();
        Ok(clients)
    }

    pub fn status(&self) -> HubStatusResponse {
        HubStatusResponse {
            num_clients: self.clients.len(),
            num_rooms: self.rooms.len(),
        }
    }
}

/// Drop the user from the room and delete the room once it is empty
fn detach(rooms: &mut HashMap<Uuid, Room>, user_id: &Uuid, room_id: Uuid) {
    if let Entry::Occupied(mut o) = rooms.entry(room_id) {
        o.get_mut().leave(user_id);
        if o.get().is_empty() {
            let room = o.remove();
            tracing::debug!("chat {} removed as it has no clients", room.id());
        } else {
            tracing::debug!("client {} left chat {}", user_id, room_id);
        }
    }
}

// ============================== // tests // ============================== //

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn client(user_id: Uuid) -> Client {
        let (tx, _rx) = mpsc::channel(1);
        Client::new(user_id, tx)
    }

    impl HubState {
        fn assert_consistent(&self) {
            for (user_id, cs) in &self.clients {
                assert_eq!(cs.client.user_id(), *user_id);
                if let Some(room_id) = cs.room_id {
                    let room = self.rooms.get(&room_id).expect("dangling room reference");
                    assert!(room.contains(user_id));
                }
                let joined = self.rooms.values().filter(|r| r.contains(user_id)).count();
                assert!(joined <= 1, "client {} is in {} rooms", user_id, joined);
            }
            for (room_id, room) in &self.rooms {
                assert_eq!(room.id(), *room_id);
                assert!(!room.is_empty(), "empty room {} is visible", room_id);
                for member in room.members() {
                    let cs = self.clients.get(member).expect("member not registered");
                    assert_eq!(cs.room_id, Some(*room_id));
                }
            }
        }
    }

    #[test]
    fn join_unknown_user() {
        let mut state = HubState::default();
        let res = state.join_room(&client(Uuid::new_v4()), Uuid::new_v4());

        assert!(matches!(res, Err(Error::ClientNotFound)));
        assert_eq!(state.status().num_rooms, 0);
        state.assert_consistent();
    }

    #[test]
    fn leave_without_room() {
        let mut state = HubState::default();
        let c1 = client(Uuid::new_v4());
        state.register_client(c1.clone());

        assert!(matches!(state.leave_room(&c1), Err(Error::NotInRoom)));
        assert!(matches!(
            state.leave_room(&client(Uuid::new_v4())),
            Err(Error::ClientNotFound)
        ));
        assert_eq!(state.status().num_clients, 1);
        state.assert_consistent();
    }

    #[test]
    fn join_then_leave_deletes_room() {
        let mut state = HubState::default();
        let (u1, r1) = (Uuid::new_v4(), Uuid::new_v4());
        let c1 = client(u1);
        state.register_client(c1.clone());

        state.join_room(&c1, r1).unwrap();
        state.assert_consistent();
        assert!(state.is_user_in(&u1, &r1));
        assert_eq!(state.status().num_rooms, 1);

        assert_eq!(state.leave_room(&c1).unwrap(), r1);
        state.assert_consistent();
        assert!(!state.is_user_in(&u1, &r1));
        assert_eq!(state.user_room(&u1), None);
        assert!(matches!(state.members(&r1), Err(Error::ChatNotFound)));
    }

    #[test]
    fn joining_another_room_leaves_the_first() {
        let mut state = HubState::default();
        let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
        let (r1, r2) = (Uuid::new_v4(), Uuid::new_v4());
        let (c1, c2) = (client(u1), client(u2));
        state.register_client(c1.clone());
        state.register_client(c2.clone());

        state.join_room(&c1, r1).unwrap();
        state.join_room(&c2, r1).unwrap();
        state.join_room(&c1, r2).unwrap();
        state.assert_consistent();

        assert!(state.is_user_in(&u1, &r2));
        assert!(!state.is_user_in(&u1, &r1));
        assert_eq!(state.members(&r1).unwrap().len(), 1);

        // rejoining the same room is a no-op
        state.join_room(&c2, r1).unwrap();
        assert_eq!(state.members(&r1).unwrap().len(), 1);

        state.join_room(&c2, r2).unwrap();
        state.assert_consistent();
        assert!(matches!(state.members(&r1), Err(Error::ChatNotFound)));
        assert_eq!(state.members(&r2).unwrap().len(), 2);
    }

    #[test]
    fn unregister_removes_membership() {
        let mut state = HubState::default();
        let (u1, r1) = (Uuid::new_v4(), Uuid::new_v4());
        let (c1, c2) = (client(u1), client(Uuid::new_v4()));
        state.register_client(c1.clone());
        state.register_client(c2.clone());
        state.join_room(&c1, r1).unwrap();
        state.join_room(&c2, r1).unwrap();

        assert!(state.unregister_client(&c1));
        state.assert_consistent();
        assert!(state.client(&u1).is_none());
        assert_eq!(state.members(&r1).unwrap().len(), 1);

        // idempotent
        assert!(!state.unregister_client(&c1));
        state.assert_consistent();
    }

    #[test]
    fn stale_connection_is_replaced() {
        let mut state = HubState::default();
        let (u1, r1) = (Uuid::new_v4(), Uuid::new_v4());
        let old = client(u1);
        let new = client(u1);

        assert!(state.register_client(old.clone()).is_none());
        state.join_room(&old, r1).unwrap();

        let stale = state.register_client(new.clone()).expect("stale client");
        assert_eq!(stale.id(), old.id());
        state.assert_consistent();
        assert_eq!(state.status().num_rooms, 0);

        // the superseded session must not remove its replacement
        assert!(!state.unregister_client(&old));
        assert_eq!(state.client(&u1).map(|c| c.id()), Some(new.id()));
    }

    #[test]
    fn stale_connection_cannot_move_its_replacement() {
        let mut state = HubState::default();
        let (u1, r1, r2) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let old = client(u1);
        let new = client(u1);
        state.register_client(old.clone());
        state.register_client(new.clone());
        state.join_room(&new, r1).unwrap();

        assert!(matches!(state.leave_room(&old), Err(Error::ClientNotFound)));
        assert!(matches!(state.join_room(&old, r2), Err(Error::ClientNotFound)));
        state.assert_consistent();
        assert_eq!(state.user_room(&u1), Some(r1));
        assert_eq!(state.status().num_rooms, 1);
    }

    #[test]
    fn random_join_leave_sequence_stays_consistent() {
        let mut state = HubState::default();
        let users: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let rooms: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let clients: Vec<Client> = users.iter().map(|&u| client(u)).collect();
        for c in &clients {
            state.register_client(c.clone());
        }

        for step in 0..200usize {
            let user = &clients[(step * 7 + 3) % clients.len()];
            match step % 4 {
                0 | 1 => {
                    let _ = state.join_room(user, rooms[(step * 5) % rooms.len()]);
                }
                2 => {
                    let _ = state.leave_room(user);
                }
                _ => {
                    let c = &clients[(step * 3) % clients.len()];
                    if state.unregister_client(c) {
                        state.register_client(c.clone());
                    }
                }
            }
            state.assert_consistent();
        }
    }
}
