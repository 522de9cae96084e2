//! Standard audit and temporal column names.
//!
//! The schema and domain-model generators must emit exactly the same audit
//! columns with exactly the same names; sharing these constants makes
//! divergence unrepresentable. The temporal triple always appears together,
//! never individually.

/// Load timestamp column, present on every generated table.
pub const LOAD_DATE: &str = "LoadDate";

/// Record provenance column, present on every generated table.
pub const RECORD_SOURCE: &str = "RecordSource";

/// Start of a validity interval (temporal tracking only).
pub const VALID_FROM: &str = "ValidFrom";

/// End of a validity interval, nullable (temporal tracking only).
pub const VALID_TO: &str = "ValidTo";

/// Current-version flag (temporal tracking only).
pub const IS_CURRENT: &str = "IsCurrent";

/// The three temporal columns, in emission order.
pub const TEMPORAL_COLUMNS: [&str; 3] = [VALID_FROM, VALID_TO, IS_CURRENT];
