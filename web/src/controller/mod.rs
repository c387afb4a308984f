pub(crate) mod health_check_controller;
pub(crate) mod home_controller;
pub(crate) mod oauth_controller;
pub(crate) mod verification_controller;
pub(crate) mod video_controller;
pub(crate) mod webhook_controller;
