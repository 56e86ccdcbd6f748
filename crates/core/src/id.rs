//! Strongly-typed identifiers used across the domain.
//!
//! All identifiers are UUID newtypes. Domain crates declare their own record
//! identifiers with [`uuid_newtype!`](crate::uuid_newtype).

/// Declare a UUID-backed identifier newtype.
///
/// Generates `new()` (UUIDv7, time-ordered), `from_uuid`, `as_uuid`, `Display`,
/// `FromStr` (errors as [`DomainError::InvalidId`](crate::DomainError)) and the
/// `Uuid` conversions.
#[macro_export]
macro_rules! uuid_newtype {
    ($(#[$meta:meta])* $vis:vis struct $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        $vis struct $t($crate::__private::uuid::Uuid);

        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($crate::__private::uuid::Uuid::now_v7())
            }

            pub fn from_uuid(uuid: $crate::__private::uuid::Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &$crate::__private::uuid::Uuid {
                &self.0
            }
        }

        // Serialized transparently as the inner UUID.
        impl $crate::__private::serde::Serialize for $t {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                $crate::__private::serde::Serialize::serialize(&self.0, serializer)
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $t {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                <$crate::__private::uuid::Uuid as $crate::__private::serde::Deserialize>::deserialize(deserializer)
                    .map(Self)
            }
        }

        impl ::core::fmt::Display for $t {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$crate::__private::uuid::Uuid> for $t {
            fn from(value: $crate::__private::uuid::Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for $crate::__private::uuid::Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl ::core::str::FromStr for $t {
            type Err = $crate::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = $crate::__private::uuid::Uuid::parse_str(s)
                    .map_err(|e| $crate::DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

uuid_newtype!(
    /// Identifier of a tenant (multi-tenant boundary).
    pub struct TenantId, "TenantId"
);

uuid_newtype!(
    /// Identifier of a user (actor identity).
    pub struct UserId, "UserId"
);

uuid_newtype!(
    /// Identifier of an event-sourced aggregate stream.
    pub struct AggregateId, "AggregateId"
);
