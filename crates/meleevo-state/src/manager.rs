use crate::{
    event::RawEvent,
    state::{GameState, Menu, PLAYER_COUNT},
};

/// Global frame counter address.
const FRAME_ADDRESS: u32 = 0x0047_9D60;
/// Current menu id address.
const MENU_ADDRESS: u32 = 0x0047_9D30;
/// First player data block; subsequent players follow at a fixed stride.
const PLAYER_BASE: u32 = 0x0045_3080;
const PLAYER_STRIDE: u32 = 0x0000_0E90;

/// Per-player attribute offsets within a player block.
const OFFSET_CHARACTER: u32 = 0x04;
const OFFSET_POS_X: u32 = 0x10;
const OFFSET_POS_Y: u32 = 0x14;
const OFFSET_PERCENT: u32 = 0x60;
const OFFSET_ACTION_STATE: u32 = 0x70;
const OFFSET_FACING: u32 = 0x8C;
const OFFSET_STOCK: u32 = 0x90;

const PLAYER_OFFSETS: [u32; 7] = [
    OFFSET_CHARACTER,
    OFFSET_POS_X,
    OFFSET_POS_Y,
    OFFSET_PERCENT,
    OFFSET_ACTION_STATE,
    OFFSET_FACING,
    OFFSET_STOCK,
];

/// An event that could not be applied to the game state.
///
/// These are recoverable: the caller skips the event and the state simply
/// does not advance on that tick.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum EventApplyError {
    #[display("event for unwatched address {address}")]
    UnknownAddress { address: String },
    #[display("unparseable value {value:?} at {address}")]
    BadValue { address: String, value: String },
    #[display("unknown menu id {value:#x}")]
    UnknownMenu { value: u32 },
}

/// Maps watched memory addresses to [`GameState`] mutations.
///
/// The manager owns the address layout in both directions: [`locations`]
/// produces the list the memory watcher is told to stream, and [`apply`]
/// dispatches each streamed event back into the state. Events must be applied
/// in arrival order; the manager never reorders or buffers them.
///
/// [`locations`]: StateManager::locations
/// [`apply`]: StateManager::apply
#[derive(Debug, Default, Clone)]
pub struct StateManager {}

impl StateManager {
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }

    /// Address list for the watcher, one 8-hex-digit address per entry.
    #[must_use]
    pub fn locations(&self) -> Vec<String> {
        let mut locations = vec![format_address(FRAME_ADDRESS), format_address(MENU_ADDRESS)];
        for slot in 0..PLAYER_COUNT {
            let base = player_base(slot);
            for offset in PLAYER_OFFSETS {
                locations.push(format_address(base + offset));
            }
        }
        locations
    }

    /// Applies one watcher event to the state.
    ///
    /// Malformed events leave the state untouched and are reported so the
    /// caller can log and skip them.
    pub fn apply(&self, state: &mut GameState, event: &RawEvent) -> Result<(), EventApplyError> {
        let address = parse_word(&event.address).ok_or_else(|| EventApplyError::BadValue {
            address: event.address.clone(),
            value: event.value.clone(),
        })?;
        let value = parse_word(&event.value).ok_or_else(|| EventApplyError::BadValue {
            address: event.address.clone(),
            value: event.value.clone(),
        })?;

        match address {
            FRAME_ADDRESS => {
                state.set_frame(value);
                return Ok(());
            }
            MENU_ADDRESS => {
                let menu = Menu::from_raw(value)
                    .ok_or(EventApplyError::UnknownMenu { value })?;
                state.set_menu(menu);
                return Ok(());
            }
            _ => {}
        }

        for slot in 0..PLAYER_COUNT {
            let base = player_base(slot);
            if !(base..base + PLAYER_STRIDE).contains(&address) {
                continue;
            }
            let player = state.player_mut(slot);
            match address - base {
                OFFSET_CHARACTER => player.character = value,
                OFFSET_POS_X => player.pos_x = f32::from_bits(value),
                OFFSET_POS_Y => player.pos_y = f32::from_bits(value),
                OFFSET_PERCENT => player.percent = f32::from_bits(value),
                OFFSET_ACTION_STATE => player.action_state = value,
                OFFSET_FACING => player.facing = f32::from_bits(value),
                OFFSET_STOCK => player.stock = value,
                _ => {
                    return Err(EventApplyError::UnknownAddress {
                        address: event.address.clone(),
                    });
                }
            }
            return Ok(());
        }

        Err(EventApplyError::UnknownAddress {
            address: event.address.clone(),
        })
    }
}

fn player_base(slot: usize) -> u32 {
    // PLAYER_COUNT is 2, the cast cannot truncate.
    #[expect(clippy::cast_possible_truncation)]
    let slot = slot as u32;
    PLAYER_BASE + PLAYER_STRIDE * slot
}

fn format_address(address: u32) -> String {
    format!("{address:08X}")
}

fn parse_word(hex: &str) -> Option<u32> {
    if hex.is_empty() || hex.len() > 8 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}
