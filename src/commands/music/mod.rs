pub mod play;
pub mod queue;

pub mod utils;

use crate::{CommandResult, Context};
