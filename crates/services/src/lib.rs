pub mod copy_feedback;
pub mod mention_index;
pub mod settings_api;
pub mod settings_flow;
