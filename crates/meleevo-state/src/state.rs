/// Number of player slots the trainer watches (the agent and its opponent).
pub const PLAYER_COUNT: usize = 2;

/// The phase the game process is currently in.
///
/// Transitions are driven entirely by menu-id events from the live process;
/// the training loop never forces a transition, it only reacts to the value
/// most recently observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    CharacterSelect,
    StageSelect,
    Game,
    PostGame,
}

impl Menu {
    /// Maps the raw in-memory menu id to a phase. Ids match what the game
    /// stores at the watched menu address.
    #[must_use]
    pub fn from_raw(value: u32) -> Option<Self> {
        match value & 0xFF {
            0 => Some(Menu::CharacterSelect),
            1 => Some(Menu::StageSelect),
            2 => Some(Menu::Game),
            4 => Some(Menu::PostGame),
            _ => None,
        }
    }
}

/// Attributes tracked for one player slot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Player {
    pub character: u32,
    pub action_state: u32,
    pub percent: f32,
    pub stock: u32,
    pub facing: f32,
    pub pos_x: f32,
    pub pos_y: f32,
}

/// Mutable record of everything the trainer can observe about the live game.
///
/// There is exactly one of these per training run. It is updated only through
/// [`StateManager::apply`], which dispatches watcher events in arrival order;
/// agents and the evolution engine read it but never write to it.
///
/// [`StateManager::apply`]: crate::StateManager::apply
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    frame: u32,
    menu: Menu,
    players: [Player; PLAYER_COUNT],
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            frame: 0,
            menu: Menu::CharacterSelect,
            players: [Player::default(); PLAYER_COUNT],
        }
    }

    /// Frame counter of the live process. Monotonically non-decreasing while
    /// an episode is running.
    #[must_use]
    pub fn frame(&self) -> u32 {
        self.frame
    }

    #[must_use]
    pub fn menu(&self) -> Menu {
        self.menu
    }

    #[must_use]
    pub fn player(&self, slot: usize) -> &Player {
        &self.players[slot]
    }

    pub(crate) fn set_frame(&mut self, frame: u32) {
        self.frame = frame;
    }

    pub(crate) fn set_menu(&mut self, menu: Menu) {
        self.menu = menu;
    }

    pub(crate) fn player_mut(&mut self, slot: usize) -> &mut Player {
        &mut self.players[slot]
    }
}
