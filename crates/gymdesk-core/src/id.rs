//! Typed ID wrappers for domain entities.
//!
//! Every table key is a UUID v7 so that ids sort by creation time. The
//! wrappers keep a `ClassId` from being passed where a `UserId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;
use uuid::Uuid;

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new time-ordered ID.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wraps an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parses an ID from its hyphenated string form.
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s)?))
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

typed_id!(
    /// Identifies a row of the users table (admins, trainers and members alike).
    UserId
);
typed_id!(
    /// Identifies a trainer profile.
    TrainerId
);
typed_id!(
    /// Identifies a membership record.
    MembershipId
);
typed_id!(
    /// Identifies a scheduled class.
    ClassId
);
typed_id!(
    /// Identifies a member's enrollment in a class.
    EnrollmentId
);
typed_id!(
    /// Identifies an attendance mark.
    AttendanceId
);
typed_id!(
    /// Identifies a payment.
    PaymentId
);
typed_id!(
    /// Identifies a workout plan.
    WorkoutPlanId
);
typed_id!(
    /// Identifies a meal plan.
    MealPlanId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let id1 = UserId::new();
        let id2 = UserId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_ids_are_time_ordered() {
        let first = ClassId::new();
        let second = ClassId::new();
        assert!(first < second);
    }

    #[test]
    fn test_id_parsing() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id = PaymentId::parse(uuid_str).unwrap();
        assert_eq!(id.to_string(), uuid_str);
        assert_eq!(uuid_str.parse::<PaymentId>().unwrap(), id);
        assert!(EnrollmentId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = TrainerId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"550e8400-e29b-41d4-a716-446655440000\"");
    }
}
