/// Application-level error carrying the process exit code.
///
/// Exit codes:
/// - `2` usage / configuration / malformed dataset
/// - `3` key or namespace not found in the store
/// - `4` filesystem or other resource failure
/// - `5` rendering failure
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub const USAGE: u8 = 2;
    pub const NOT_FOUND: u8 = 3;
    pub const RESOURCE: u8 = 4;
    pub const RENDER: u8 = 5;

    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// A path that does not resolve in the data store.
    pub fn not_found(key: &str) -> Self {
        Self::new(Self::NOT_FOUND, format!("Key '{key}' not found in dataset."))
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn is_not_found(&self) -> bool {
        self.exit_code == Self::NOT_FOUND
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
