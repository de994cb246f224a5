/// Settings for `ApnsRouter`
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct ApnsSettings {
    /// PKCS#8 token signing key: either the PEM content itself or a path to
    /// the `.p8` file
    pub key: String,
    /// Identifier of the signing key
    pub key_id: String,
    /// Developer team identifier
    pub team_id: String,
    /// Bundle id of the receiving application
    pub topic: String,
    /// Use the APNS sandbox environment
    pub sandbox: bool,
    /// Maximum serialized notification size in bytes
    pub max_data: usize,
}

impl Default for ApnsSettings {
    fn default() -> Self {
        Self {
            key: String::new(),
            key_id: String::new(),
            team_id: String::new(),
            topic: "org.pushbridge.mobile".to_string(),
            sandbox: false,
            max_data: 4096,
        }
    }
}
