use crate::render;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use yuletide_core::{
    ChannelId, GuildId, MessageHandle, Notice, Platform, PlatformError, PlatformResult, RoleId,
    UserId,
};

#[derive(Debug, Default)]
struct ConsoleState {
    next_message: u64,
    next_role: u64,
    live: HashSet<MessageHandle>,
    roles: HashMap<(GuildId, String), RoleId>,
    members: HashSet<(GuildId, RoleId, UserId)>,
}

/// Platform that prints messages to stdout and keeps roles in memory
pub struct ConsolePlatform {
    state: Mutex<ConsoleState>,
    deny_grants: bool,
}

impl ConsolePlatform {
    pub fn new(deny_grants: bool) -> Self {
        Self {
            state: Mutex::new(ConsoleState::default()),
            deny_grants,
        }
    }

    /// Marks users as already holding the role named `role_name`
    pub fn preload_role_holders(&self, guild: GuildId, role_name: &str, users: &[UserId]) {
        let mut state = self.state.lock();
        let role = role_for(&mut state, guild, role_name);
        for user in users {
            state.members.insert((guild, role, *user));
        }
    }
}

fn role_for(state: &mut ConsoleState, guild: GuildId, name: &str) -> RoleId {
    if let Some(role) = state.roles.get(&(guild, name.to_string())) {
        return *role;
    }

    state.next_role += 1;
    let role = RoleId(state.next_role);
    state.roles.insert((guild, name.to_string()), role);
    tracing::info!("Created role '{}' ({}) in guild {}", name, role, guild);
    role
}

#[async_trait]
impl Platform for ConsolePlatform {
    async fn send(&self, channel: ChannelId, notice: Notice) -> PlatformResult<MessageHandle> {
        let handle = {
            let mut state = self.state.lock();
            state.next_message += 1;
            let handle = MessageHandle {
                channel,
                message: state.next_message,
            };
            state.live.insert(handle);
            handle
        };

        println!("#{} [{}] {}", channel, handle.message, render::notice(&notice));
        Ok(handle)
    }

    async fn delete(&self, handle: MessageHandle) -> PlatformResult<()> {
        if !self.state.lock().live.remove(&handle) {
            return Err(PlatformError::NotFound(format!(
                "message {}",
                handle.message
            )));
        }

        println!("#{} [{}] (removed)", handle.channel, handle.message);
        Ok(())
    }

    async fn grant_role(&self, guild: GuildId, user: UserId, role: RoleId) -> PlatformResult<()> {
        if self.deny_grants {
            return Err(PlatformError::PermissionDenied(
                "missing Manage Roles permission".to_string(),
            ));
        }

        self.state.lock().members.insert((guild, role, user));
        Ok(())
    }

    async fn has_role(&self, guild: GuildId, user: UserId, role: RoleId) -> PlatformResult<bool> {
        Ok(self.state.lock().members.contains(&(guild, role, user)))
    }

    async fn find_or_create_role(&self, guild: GuildId, name: &str) -> PlatformResult<RoleId> {
        Ok(role_for(&mut self.state.lock(), guild, name))
    }
}
