use credentials::ParameterSet;

pub const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Cheap parameters so property loops stay fast in debug builds.
pub fn fast_params() -> ParameterSet {
    ParameterSet::new(64, 1, 1, 16, 32).expect("valid test parameters")
}
