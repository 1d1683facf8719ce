use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashSet, VecDeque};
use yuletide_core::{
    ChannelId, GuildId, MessageHandle, Notice, Platform, PlatformError, PlatformResult,
    RandomSource, RoleId, UserId, WinnerStore, YuletideError,
};

pub const SEASONAL_ROLE: RoleId = RoleId(900);

#[derive(Debug, Clone, PartialEq)]
pub enum GrantBehavior {
    Succeed,
    Deny,
    Fail,
}

#[derive(Debug)]
struct MockState {
    next_message: u64,
    live: HashSet<MessageHandle>,
    sent: Vec<(ChannelId, Notice)>,
    deleted: Vec<MessageHandle>,
    members: HashSet<UserId>,
    grant: GrantBehavior,
    broken_channels: HashSet<ChannelId>,
    role_lookups: u32,
    role_lookup_fails: bool,
}

/// In-memory platform that records every round trip
#[derive(Debug)]
pub struct MockPlatform {
    state: Mutex<MockState>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_message: 1,
                live: HashSet::new(),
                sent: Vec::new(),
                deleted: Vec::new(),
                members: HashSet::new(),
                grant: GrantBehavior::Succeed,
                broken_channels: HashSet::new(),
                role_lookups: 0,
                role_lookup_fails: false,
            }),
        }
    }

    pub fn set_grant(&self, behavior: GrantBehavior) {
        self.state.lock().grant = behavior;
    }

    pub fn fail_role_lookups(&self) {
        self.state.lock().role_lookup_fails = true;
    }

    pub fn break_channel(&self, channel: ChannelId) {
        self.state.lock().broken_channels.insert(channel);
    }

    pub fn repair_channel(&self, channel: ChannelId) {
        self.state.lock().broken_channels.remove(&channel);
    }

    pub fn give_role(&self, user: UserId) {
        self.state.lock().members.insert(user);
    }

    pub fn holds_role(&self, user: UserId) -> bool {
        self.state.lock().members.contains(&user)
    }

    /// Removes a message behind the bot's back
    pub fn vanish(&self, handle: MessageHandle) {
        self.state.lock().live.remove(&handle);
    }

    pub fn sent(&self) -> Vec<(ChannelId, Notice)> {
        self.state.lock().sent.clone()
    }

    pub fn gifts_sent(&self) -> usize {
        self.state
            .lock()
            .sent
            .iter()
            .filter(|(_, notice)| matches!(notice, Notice::Gift { .. }))
            .count()
    }

    pub fn deleted(&self) -> Vec<MessageHandle> {
        self.state.lock().deleted.clone()
    }

    pub fn live_messages(&self) -> usize {
        self.state.lock().live.len()
    }

    pub fn role_lookups(&self) -> u32 {
        self.state.lock().role_lookups
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn send(&self, channel: ChannelId, notice: Notice) -> PlatformResult<MessageHandle> {
        let mut state = self.state.lock();
        if state.broken_channels.contains(&channel) {
            return Err(PlatformError::NotFound(format!("channel {}", channel)));
        }

        let handle = MessageHandle {
            channel,
            message: state.next_message,
        };
        state.next_message += 1;
        state.live.insert(handle);
        state.sent.push((channel, notice));
        Ok(handle)
    }

    async fn delete(&self, handle: MessageHandle) -> PlatformResult<()> {
        let mut state = self.state.lock();
        if !state.live.remove(&handle) {
            return Err(PlatformError::NotFound(format!("message {}", handle.message)));
        }
        state.deleted.push(handle);
        Ok(())
    }

    async fn grant_role(&self, _guild: GuildId, user: UserId, _role: RoleId) -> PlatformResult<()> {
        let mut state = self.state.lock();
        match state.grant {
            GrantBehavior::Succeed => {
                state.members.insert(user);
                Ok(())
            }
            GrantBehavior::Deny => Err(PlatformError::PermissionDenied(
                "role is above the bot in the hierarchy".to_string(),
            )),
            GrantBehavior::Fail => Err(PlatformError::Other("gateway timeout".to_string())),
        }
    }

    async fn has_role(&self, _guild: GuildId, user: UserId, _role: RoleId) -> PlatformResult<bool> {
        Ok(self.state.lock().members.contains(&user))
    }

    async fn find_or_create_role(&self, _guild: GuildId, _name: &str) -> PlatformResult<RoleId> {
        let mut state = self.state.lock();
        state.role_lookups += 1;
        if state.role_lookup_fails {
            return Err(PlatformError::Other("guild unavailable".to_string()));
        }
        Ok(SEASONAL_ROLE)
    }
}

/// Replays a fixed list of samples and panics when a draw was not expected
#[derive(Debug, Default)]
pub struct ScriptedRandom {
    samples: VecDeque<f64>,
}

impl ScriptedRandom {
    pub fn new(samples: &[f64]) -> Self {
        Self {
            samples: samples.iter().copied().collect(),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn unit(&mut self) -> f64 {
        self.samples.pop_front().expect("unexpected draw")
    }

    fn index(&mut self, _len: usize) -> usize {
        0
    }

    fn between(&mut self, low: u64, _high: u64) -> u64 {
        low
    }
}

/// Store whose disk is always full
#[derive(Debug, Default)]
pub struct FailingStore;

#[async_trait]
impl WinnerStore for FailingStore {
    async fn load_winners(&self) -> yuletide_core::Result<BTreeSet<UserId>> {
        Err(YuletideError::internal("disk unavailable"))
    }

    async fn save_winners(&self, _winners: &BTreeSet<UserId>) -> yuletide_core::Result<()> {
        Err(YuletideError::internal("disk full"))
    }
}
