pub mod action_factory;
pub mod app_launch_action;
pub mod banner_action;
pub mod system_process_launcher;
