//! Single-writer access control for the audit ledger.

use crate::error::LedgerError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ownership {
    owner: Option<String>,
}

impl Ownership {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
        }
    }

    pub(crate) fn from_stored(owner: Option<String>) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn is_renounced(&self) -> bool {
        self.owner.is_none()
    }

    /// Fails with `Unauthorized` unless `caller` is the current owner.
    pub fn authorize(&self, caller: &str) -> Result<(), LedgerError> {
        match &self.owner {
            Some(owner) if owner == caller => Ok(()),
            _ => Err(LedgerError::not_owner(caller)),
        }
    }

    /// Hand write privilege to `new_owner`. Returns the previous owner.
    pub fn transfer(&mut self, caller: &str, new_owner: &str) -> Result<String, LedgerError> {
        self.authorize(caller)?;
        if new_owner.trim().is_empty() {
            return Err(LedgerError::Validation(
                "new owner must not be empty".to_string(),
            ));
        }
        let previous = self.owner.replace(new_owner.to_string());
        Ok(previous.unwrap_or_default())
    }

    /// Drop write privilege for good. Returns the previous owner.
    pub fn renounce(&mut self, caller: &str) -> Result<String, LedgerError> {
        self.authorize(caller)?;
        Ok(self.owner.take().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_owner_is_authorized() {
        let ownership = Ownership::new("alice");
        assert!(ownership.authorize("alice").is_ok());
        assert!(matches!(
            ownership.authorize("bob"),
            Err(LedgerError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_transfer_moves_privilege() {
        let mut ownership = Ownership::new("alice");
        let previous = ownership.transfer("alice", "bob").unwrap();

        assert_eq!(previous, "alice");
        assert_eq!(ownership.owner(), Some("bob"));
        assert!(ownership.authorize("alice").is_err());
        assert!(ownership.authorize("bob").is_ok());
    }

    #[test]
    fn test_transfer_requires_owner() {
        let mut ownership = Ownership::new("alice");
        assert!(matches!(
            ownership.transfer("mallory", "mallory"),
            Err(LedgerError::Unauthorized(_))
        ));
        assert_eq!(ownership.owner(), Some("alice"));
    }

    #[test]
    fn test_transfer_to_empty_owner_rejected() {
        let mut ownership = Ownership::new("alice");
        assert!(matches!(
            ownership.transfer("alice", "  "),
            Err(LedgerError::Validation(_))
        ));
        assert_eq!(ownership.owner(), Some("alice"));
    }

    #[test]
    fn test_renounce_is_permanent() {
        let mut ownership = Ownership::new("alice");
        ownership.renounce("alice").unwrap();

        assert!(ownership.is_renounced());
        assert!(ownership.authorize("alice").is_err());
        assert!(ownership.transfer("alice", "alice").is_err());
        assert!(ownership.renounce("alice").is_err());
        // An empty caller must not match a renounced owner.
        assert!(ownership.authorize("").is_err());
    }
}
