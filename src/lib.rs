use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

pub mod beam;
pub mod config;
pub mod devices;
pub mod error;
pub mod events;
pub mod pacer;
pub mod path;
pub mod patterns;
pub mod rhythm;
pub mod session;
pub mod stats;
pub mod units;

pub mod testing;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    pub fn is_left(self) -> bool {
        matches!(self, HandSide::Left)
    }
}
