//! Contract configuration

/// Key layout used by the contract
///
/// Asset keys are `key_prefix` followed by a non-negative integer. Listing
/// scans `[scan_start, scan_end)` in raw byte order, so with the defaults
/// `CAR10` sorts between `CAR1` and `CAR2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractConfig {
    /// Prefix of every asset key
    pub key_prefix: String,
    /// Inclusive start of the listing scan
    pub scan_start: String,
    /// Exclusive end of the listing scan
    pub scan_end: String,
}

impl ContractConfig {
    /// Create a new configuration builder
    pub fn builder() -> ContractConfigBuilder {
        ContractConfigBuilder::default()
    }

    /// Key of the asset with the given index (`CAR0`, `CAR1`, ...)
    pub fn key_for(&self, index: usize) -> String {
        format!("{}{}", self.key_prefix, index)
    }
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            key_prefix: "CAR".to_string(),
            scan_start: "CAR0".to_string(),
            scan_end: "CAR999".to_string(),
        }
    }
}

/// Builder for ContractConfig
#[derive(Debug, Default)]
pub struct ContractConfigBuilder {
    key_prefix: Option<String>,
    scan_start: Option<String>,
    scan_end: Option<String>,
}

impl ContractConfigBuilder {
    /// Set the key prefix. Unless set explicitly, the scan range follows it
    /// (`<prefix>0` .. `<prefix>999`).
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Set the listing scan range
    pub fn scan_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.scan_start = Some(start.into());
        self.scan_end = Some(end.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> ContractConfig {
        let prefix = self.key_prefix.unwrap_or_else(|| "CAR".to_string());
        ContractConfig {
            scan_start: self.scan_start.unwrap_or_else(|| format!("{}0", prefix)),
            scan_end: self.scan_end.unwrap_or_else(|| format!("{}999", prefix)),
            key_prefix: prefix,
        }
    }
}
