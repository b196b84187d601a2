//! Fixed test identities
//!
//! Client ids, secrets and the issuer used across token authority tests.

/// Issuer identity of the test directory.
pub const TEST_ISSUER: &str = "Test-Issuer";

// Regular client with a scope
pub const TEST_CLIENT_ID: &str = "cl1";
pub const TEST_CLIENT_SECRET: &str = "secret1";
pub const TEST_CLIENT_SCOPE: &str = "sc";

/// bcrypt (cost 10) of [`TEST_CLIENT_SECRET`].
pub const TEST_CLIENT_SECRET_HASH: &str =
    "$2a$10$85r4AxaXGAzh7G1nCsm7MOYmDfyORw/IuXu33OLY6rvtLEKkVI03G";

// Administrator client without a scope
pub const TEST_ADMIN_CLIENT_ID: &str = "cl2";
pub const TEST_ADMIN_CLIENT_SECRET: &str = "secret2";

/// bcrypt (cost 10) of [`TEST_ADMIN_CLIENT_SECRET`].
pub const TEST_ADMIN_CLIENT_SECRET_HASH: &str =
    "$2a$10$a/JANxkdgbJtc0i36ZEk.eVxoUaMdvMhr/k4fpjL5kTbAeZJFpeIm";

// Audiences
pub const TEST_AUDIENCE: &str = "orders-api";
