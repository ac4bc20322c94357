//! Player intents and the events they produce.
//!
//! Intents address the board by canonical coordinate, which is what a
//! renderer or a remote client has at hand. Events are appended to the game
//! log and render as human-readable lines through `Display`.

use crate::board::Resource;
use crate::hex::{CornerCoord, HexCoord, SideCoord};
use crate::pieces::PlayerId;
use crate::player::ResourceHand;
use serde::{Deserialize, Serialize};
use std::fmt;

/// All possible actions a player can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Roll the dice (once per turn, before building)
    RollDice,
    /// Place a settlement; free during setup
    PlaceSettlement(CornerCoord),
    /// Upgrade one of your settlements to a city
    PlaceCity(CornerCoord),
    /// Place a road; free during setup, where it must touch the new settlement
    PlaceRoad(SideCoord),
    /// Move the robber after rolling a 7
    MoveRobber(HexCoord),
    /// Take a random card from a player next to the robber
    StealFrom(PlayerId),
    /// End your turn
    EndTurn,
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    PlayerJoined {
        player: PlayerId,
        name: String,
    },

    GameStarted {
        players: usize,
    },

    /// Both setup rounds are done and normal play begins
    SetupComplete,

    /// Yield of the second setup settlement
    StartingResources {
        player: PlayerId,
        resources: ResourceHand,
    },

    DiceRolled {
        player: PlayerId,
        roll: (u8, u8),
        total: u8,
    },

    /// Resources were distributed after a dice roll
    ResourcesDistributed {
        distributions: Vec<(PlayerId, ResourceHand)>,
    },

    /// A player lost half their hand after a 7
    CardsDiscarded {
        player: PlayerId,
        discarded: ResourceHand,
    },

    RobberMoved {
        player: PlayerId,
        from: Option<HexCoord>,
        to: HexCoord,
    },

    ResourceStolen {
        thief: PlayerId,
        victim: PlayerId,
        resource: Option<Resource>,
    },

    SettlementBuilt {
        player: PlayerId,
        location: CornerCoord,
    },

    /// A settlement was upgraded to a city
    CityBuilt {
        player: PlayerId,
        location: CornerCoord,
    },

    RoadBuilt {
        player: PlayerId,
        location: SideCoord,
    },

    /// Longest road changed hands
    LongestRoadChanged {
        previous: Option<PlayerId>,
        current: Option<PlayerId>,
        length: u32,
    },

    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
        turn: u32,
    },

    GameWon {
        player: PlayerId,
        victory_points: u32,
    },
}

struct Seat(Option<PlayerId>);

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(p) => write!(f, "player {p}"),
            None => f.write_str("nobody"),
        }
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::PlayerJoined { player, name } => {
                write!(f, "{name} joined as player {player}")
            }
            GameEvent::GameStarted { players } => {
                write!(f, "Game started with {players} players")
            }
            GameEvent::SetupComplete => f.write_str("Setup complete, player 0 to roll"),
            GameEvent::StartingResources { player, resources } => {
                write!(f, "Player {player} receives {resources}")
            }
            GameEvent::DiceRolled { player, roll, total } => {
                write!(f, "Player {player} rolled {} + {} = {total}", roll.0, roll.1)
            }
            GameEvent::ResourcesDistributed { distributions } => {
                if distributions.is_empty() {
                    return f.write_str("Nothing was produced");
                }
                let parts: Vec<String> = distributions
                    .iter()
                    .map(|(p, hand)| format!("player {p} gets {hand}"))
                    .collect();
                write!(f, "Production: {}", parts.join("; "))
            }
            GameEvent::CardsDiscarded { player, discarded } => {
                write!(f, "Player {player} discards {discarded}")
            }
            GameEvent::RobberMoved { player, from, to } => match from {
                Some(from) => write!(f, "Player {player} moved the robber from {from} to {to}"),
                None => write!(f, "Player {player} placed the robber on {to}"),
            },
            GameEvent::ResourceStolen {
                thief,
                victim,
                resource,
            } => match resource {
                Some(r) => write!(f, "Player {thief} stole 1 {r} from player {victim}"),
                None => write!(f, "Player {thief} found nothing to steal from player {victim}"),
            },
            GameEvent::SettlementBuilt { player, location } => {
                write!(f, "Player {player} built a settlement at {location}")
            }
            GameEvent::CityBuilt { player, location } => {
                write!(f, "Player {player} built a city at {location}")
            }
            GameEvent::RoadBuilt { player, location } => {
                write!(f, "Player {player} built a road at {location}")
            }
            GameEvent::LongestRoadChanged {
                previous,
                current,
                length,
            } => write!(
                f,
                "Longest road ({length}) passes from {} to {}",
                Seat(*previous),
                Seat(*current)
            ),
            GameEvent::TurnEnded {
                player,
                next_player,
                turn,
            } => write!(f, "Player {player} ended their turn; turn {turn}, player {next_player} to play"),
            GameEvent::GameWon {
                player,
                victory_points,
            } => write!(f, "Player {player} wins with {victory_points} points"),
        }
    }
}
