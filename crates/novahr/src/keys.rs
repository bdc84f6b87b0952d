//! Storage keys for every collection.

/// Employee collection.
pub const EMPLOYEES: &str = "nh_employees";

/// Leave request collection.
pub const LEAVE: &str = "nh_leave";

/// Document collection.
pub const DOCUMENTS: &str = "nh_documents";

/// Activity feed, most recent first.
pub const ACTIVITY: &str = "nh_activity";

/// Department list.
pub const DEPARTMENTS: &str = "nh_departments";

/// Leave type list.
pub const LEAVE_TYPES: &str = "nh_leave_types";

/// Document type list.
pub const DOCUMENT_TYPES: &str = "nh_document_types";

/// Every key the application writes.
pub const ALL: &[&str] = &[
    EMPLOYEES,
    LEAVE,
    DOCUMENTS,
    ACTIVITY,
    DEPARTMENTS,
    LEAVE_TYPES,
    DOCUMENT_TYPES,
];
