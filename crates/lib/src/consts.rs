/// Application name used in user-facing messages and the `DEBUG` namespace.
pub const APP_NAME: &str = "zephyr";

/// File name of the runtime manifest emitted next to the build output.
pub const MANIFEST_FILENAME: &str = "zephyr-manifest.json";

/// Format version written into every runtime manifest.
pub const MANIFEST_FORMAT_VERSION: &str = "1.0.0";

pub const DEFAULT_API_URL: &str = "https://api.zephyr-cloud.io";
pub const DEFAULT_UPLOAD_CONCURRENCY: usize = 8;
pub const DEFAULT_UPLOAD_BATCH_SIZE: usize = 1;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Version requested for a remote that does not declare one.
pub const DEFAULT_REMOTE_VERSION: &str = "latest";

/// Version recorded for a shared dependency nobody declares a version for.
pub const FALLBACK_SHARED_VERSION: &str = "0.0.0";

pub const DEFAULT_LIBRARY_TYPE: &str = "self";

pub const ENV_API_URL: &str = "ZE_API";
pub const ENV_EDGE_URL: &str = "ZE_EDGE_URL";
pub const ENV_SECRET_TOKEN: &str = "ZE_SECRET_TOKEN";
pub const ENV_UPLOAD_CONCURRENCY: &str = "ZE_UPLOAD_CONCURRENCY";
pub const ENV_UPLOAD_BATCH_SIZE: &str = "ZE_UPLOAD_BATCH_SIZE";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "ZE_HTTP_TIMEOUT_SECS";
pub const ENV_FAIL_ON_UNRESOLVED: &str = "ZE_FAIL_ON_UNRESOLVED";
pub const ENV_BUILD_TARGET: &str = "ZE_BUILD_TARGET";
pub const ENV_CI: &str = "CI";

/// Prefix of build-time environment variables forwarded to the runtime.
pub const PUBLIC_ENV_PREFIX: &str = "ZE_PUBLIC_";

/// Token replaced with the serialized remote map inside emitted bundles.
pub const REMOTES_MAP_PLACEHOLDER: &str = "__ZEPHYR_REMOTES_MAP__";

/// Token replaced with the manifest URL (or `null`) inside emitted bundles.
pub const MANIFEST_URL_PLACEHOLDER: &str = "__ZEPHYR_MANIFEST_URL__";

/// `package.json` field holding pinned remote versions.
pub const ZEPHYR_DEPENDENCIES_FIELD: &str = "zephyr:dependencies";

pub const USER_AGENT: &str = concat!("zephyr-lib/", env!("CARGO_PKG_VERSION"));
