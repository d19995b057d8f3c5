pub mod commands;
pub mod trace_init;
pub mod user_dict;
