pub type KilnResult<T> = Result<T, KilnError>;

/// Every fallible operation in the crate returns this. Parameter-validation failures and backend
/// failures are reported the same way.
#[derive(Debug, Clone)]
pub enum KilnError {
    StringError(String),
    /// Shader source failed to preprocess, parse or validate. Contains the formatted diagnostic.
    ShaderCompileError(String),
    /// The operation names an extension point that has no implementation yet
    Unimplemented(&'static str),
}

impl std::error::Error for KilnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            KilnError::StringError(_) => None,
            KilnError::ShaderCompileError(_) => None,
            KilnError::Unimplemented(_) => None,
        }
    }
}

impl core::fmt::Display for KilnError {
    fn fmt(
        &self,
        fmt: &mut core::fmt::Formatter,
    ) -> core::fmt::Result {
        match *self {
            KilnError::StringError(ref e) => e.fmt(fmt),
            KilnError::ShaderCompileError(ref e) => write!(fmt, "shader compilation failed: {}", e),
            KilnError::Unimplemented(ref e) => write!(fmt, "not implemented: {}", e),
        }
    }
}

impl From<&str> for KilnError {
    fn from(str: &str) -> Self {
        KilnError::StringError(str.to_string())
    }
}

impl From<String> for KilnError {
    fn from(string: String) -> Self {
        KilnError::StringError(string)
    }
}
