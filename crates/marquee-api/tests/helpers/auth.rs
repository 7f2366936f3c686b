/// Master API key configured for every test app
pub const TEST_MASTER_API_KEY: &str = "test-master-api-key-at-least-32-characters-long";

pub fn bearer() -> String {
    format!("Bearer {}", TEST_MASTER_API_KEY)
}
