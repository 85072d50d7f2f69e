//! Capability names the engine itself relies on

pub const CHILDREN_ATTRIBUTE: &str = "AXChildren";
pub const ROLE_ATTRIBUTE: &str = "AXRole";
pub const SUBROLE_ATTRIBUTE: &str = "AXSubrole";
pub const FOCUSED_ATTRIBUTE: &str = "AXFocused";

/// Prefix carried by role and capability constants.
pub const CONSTANT_PREFIX: &str = "AX";
