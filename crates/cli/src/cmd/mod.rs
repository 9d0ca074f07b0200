mod assets;
mod deploy;
mod inject;
mod uid;

pub use assets::cmd_assets;
pub use deploy::{DeployArgs, cmd_deploy};
pub use inject::cmd_inject;
pub use uid::cmd_uid;
