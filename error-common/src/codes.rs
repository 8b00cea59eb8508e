// Error codes implementation
// Standardized error codes carried in API error bodies

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
    pub const MISSING_REQUIRED_FIELD: &str = "VALIDATION_1002";
    pub const INVALID_FORMAT: &str = "VALIDATION_1003";
}

pub mod authentication {
    pub const MISSING_IDENTITY: &str = "AUTH_2001";
}

pub mod resource {
    pub const NOT_FOUND: &str = "RESOURCE_3001";
}

pub mod database {
    pub const CONNECTION_FAILED: &str = "DB_4001";
    pub const QUERY_FAILED: &str = "DB_4002";
    pub const CONSTRAINT_VIOLATION: &str = "DB_4003";
}

pub mod system {
    pub const INTERNAL: &str = "SYS_5001";
}
