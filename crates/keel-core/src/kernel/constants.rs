/// Separator between the segments of a nested component name
pub const PATH_SEPARATOR: &str = ".";

/// Name `System::configure` registers the configuration component under
pub const CONFIG_COMPONENT: &str = "config";

/// Prefix of generated system names
pub const DEFAULT_SYSTEM_PREFIX: &str = "system";

/// Number of random hex digits appended to generated system names
pub const GENERATED_NAME_DIGITS: usize = 8;

/// Log target used by the default trace sink
pub const TRACE_TARGET: &str = "keel::trace";
