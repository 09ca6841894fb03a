//! Test fixtures and constants.

/// Role assumed in chained-profile fixtures.
pub const ROLE_ARN: &str = "arn:aws:iam::123456789012:role/Admin";

/// A key id shaped like a real KMS key ARN.
pub const KEY_ARN: &str = "arn:aws:kms:us-east-1:123456789012:key/12345678-1234-1234-1234-123456789012";

/// Config file whose `[profile P]` only sets a region.
pub const CONFIG_REGION_ONLY: &str = "[profile P]\nregion = eu-west-1\n";

/// Credentials file with a complete chain for `P` and static keys for `base`.
pub const CREDENTIALS_CHAIN: &str = "\
[P]
role_arn = arn:aws:iam::123456789012:role/Admin
source_profile = base

[base]
aws_access_key_id = AKIDEXAMPLE
aws_secret_access_key = wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY
";

/// Secrets used across envelope tests.
pub const STANDARD_SECRETS: &[(&str, &str)] = &[
    ("DATABASE_URL", "postgres://localhost/mydb"),
    ("API_KEY", "sk-test-12345"),
    ("JWT_SECRET", "super-secret-jwt-token"),
    ("EMPTY", ""),
    ("UNICODE", "こんにちは世界 🚀"),
];
