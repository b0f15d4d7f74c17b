//! Application orchestration: state, navigation, operations and input handling.

pub mod event;
pub mod forms;
pub mod handler;
pub mod listing;
pub mod nav;
pub mod ops;
pub mod settings;
pub mod state;
