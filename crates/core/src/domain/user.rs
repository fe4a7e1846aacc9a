use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registered shop coordinates, in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShopLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl ShopLocation {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(DomainError::InvalidCoordinates { latitude, longitude });
        }
        Ok(Self { latitude, longitude })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub shop_name: String,
    pub location: Option<ShopLocation>,
}

impl User {
    /// A generation can only run for a shop with known coordinates.
    pub fn require_location(&self) -> Result<ShopLocation, DomainError> {
        self.location.ok_or(DomainError::MissingLocation { user_id: self.id.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::{ShopLocation, User, UserId};
    use crate::errors::DomainError;

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(ShopLocation::new(48.85, 2.35).is_ok());
        assert_eq!(
            ShopLocation::new(91.0, 2.35),
            Err(DomainError::InvalidCoordinates { latitude: 91.0, longitude: 2.35 })
        );
        assert!(ShopLocation::new(45.0, f64::NAN).is_err());
    }

    #[test]
    fn user_without_location_reports_missing_location() {
        let user = User { id: UserId(3), shop_name: "Chez Léa".to_owned(), location: None };

        assert_eq!(user.require_location(), Err(DomainError::MissingLocation { user_id: 3 }));
    }
}
