pub mod student;
pub mod types;

/// Name of the external collection holding Hotmart students.
pub const STUDENTS_TABLE: &str = "alunas_hotmart";

/// Rows returned per page when the caller does not ask for a size.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// `status_acesso` value marking a student with active access.
pub const ACTIVE_ACCESS_STATUS: &str = "ativo";
