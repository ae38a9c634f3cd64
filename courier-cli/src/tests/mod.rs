//! Shared test harness modules for the courier CLI.

use super::*;

mod helpers;
mod search_unit;
