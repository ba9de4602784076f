//! Developer identity supplied once at process start

use std::path::PathBuf;

/// The Apple-issued identity triple used to mint developer tokens.
///
/// `team_id` is the 10-character issuer registered claim; `key_id`
/// identifies which signing key from the developer portal is in use
/// (also 10 characters). Both are validated at signing time.
/// `private_key_path` points at the PKCS#8 `.p8` file holding the
/// EC P-256 private key.
#[derive(Debug, Clone)]
pub struct DeveloperCredentials {
    pub team_id: String,
    pub key_id: String,
    pub private_key_path: PathBuf,
}

impl DeveloperCredentials {
    pub fn new(
        team_id: impl Into<String>,
        key_id: impl Into<String>,
        private_key_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            team_id: team_id.into(),
            key_id: key_id.into(),
            private_key_path: private_key_path.into(),
        }
    }
}
