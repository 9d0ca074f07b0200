//! Runtime remote resolution: the plugin injected into bundles and its model.

pub mod placeholder;
pub mod resolver;
pub mod template;

pub use placeholder::{InjectError, Placeholder, Substitution};
pub use resolver::{OverrideStore, RemoteEntry, RemoteResolver, Rewrite, SessionOverrides, UrlSource};
pub use template::{RuntimePluginTemplate, inject_remote_map};
