pub(crate) mod call_recording_controller;
pub(crate) mod health_check_controller;
pub(crate) mod webhook_controller;
