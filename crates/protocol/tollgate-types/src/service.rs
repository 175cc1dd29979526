//! Service identifiers and directory descriptors.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::address::Address;
use crate::amount::{Amount, Currency};
use crate::error::{TypesError, TypesResult};

/// Maximum length of a service identifier.
pub const MAX_SERVICE_ID_LEN: usize = 128;

/// Identifier of a paid service in the directory (e.g. `tavily_search`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceId(String);

impl ServiceId {
    /// Validate and wrap a service identifier.
    ///
    /// Allowed characters: ASCII alphanumerics, `_`, `-` and `.`. The first
    /// character may not be `.`, which rules out `.` and `..`.
    pub fn new(id: impl Into<String>) -> TypesResult<Self> {
        let id = id.into();
        if id.is_empty() || id.len() > MAX_SERVICE_ID_LEN || id.starts_with('.') {
            return Err(TypesError::InvalidServiceId(id));
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(TypesError::InvalidServiceId(id));
        }
        Ok(Self(id))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ServiceId {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ServiceId {
    type Error = TypesError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ServiceId> for String {
    fn from(id: ServiceId) -> Self {
        id.0
    }
}

impl std::str::FromStr for ServiceId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved directory entry: where to call a service and what it costs.
///
/// Immutable once resolved for a given request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Service identifier.
    pub service_id: ServiceId,

    /// Endpoint invoked after payment.
    pub endpoint: Url,

    /// Price per call.
    pub price: Amount,

    /// Currency the price is quoted in.
    pub currency: Currency,

    /// Account that receives the payment.
    pub payee: Address,
}

impl ServiceDescriptor {
    /// Create a new descriptor.
    pub fn new(
        service_id: ServiceId,
        endpoint: Url,
        price: Amount,
        currency: Currency,
        payee: Address,
    ) -> Self {
        Self {
            service_id,
            endpoint,
            price,
            currency,
            payee,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_id_validation() {
        assert!(ServiceId::new("tavily_search").is_ok());
        assert!(ServiceId::new("gpt-researcher.v2").is_ok());
        assert!(ServiceId::new("").is_err());
        assert!(ServiceId::new("has space").is_err());
        assert!(ServiceId::new("../etc").is_err());
        assert!(ServiceId::new(".").is_err());
        assert!(ServiceId::new("..").is_err());
        assert!(ServiceId::new(".hidden").is_err());
        assert!(ServiceId::new("v2.search.").is_ok());
        assert!(ServiceId::new("x".repeat(MAX_SERVICE_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_service_id_serde() {
        let id: ServiceId = serde_json::from_str("\"tavily_search\"").unwrap();
        assert_eq!(id.as_str(), "tavily_search");
        assert!(serde_json::from_str::<ServiceId>("\"bad id\"").is_err());
    }

    #[test]
    fn test_descriptor_json() {
        let descriptor = ServiceDescriptor::new(
            ServiceId::new("tavily_search").unwrap(),
            Url::parse("https://services.example/tavily").unwrap(),
            Amount::parse("0.01").unwrap(),
            Currency::Usdc,
            Address([9u8; 20]),
        );
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["price"], "0.01");
        assert_eq!(json["currency"], "USDC");
        let back: ServiceDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back, descriptor);
    }
}
