//! Typed string keys for compile-time type safety.
//!
//! Teams, users and pull requests are identified by caller-chosen strings.
//! `Key<T>` wraps such a string with a phantom entity marker so that a
//! `UserId` cannot be passed where a `PullRequestId` was expected.
//!
//! # Example
//!
//! ```rust
//! use assignment::{PullRequestId, UserId};
//!
//! let author = UserId::from("u1");
//! let pr = PullRequestId::from("pr-1001");
//! assert_eq!(author.as_str(), "u1");
//!
//! // This would be a compile error:
//! // let wrong: PullRequestId = author;
//! # let _ = pr;
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

/// A typed wrapper around `String`.
///
/// Keys compare by exact string value; they are never trimmed or case-folded.
#[repr(transparent)]
pub struct Key<T>(String, PhantomData<fn() -> T>);

// ============================================================================
// Core implementations
// ============================================================================

impl<T> Key<T> {
    #[inline]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into(), PhantomData)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Standard trait implementations
// ============================================================================

impl<T> Clone for Key<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone(), PhantomData)
    }
}

/// The empty key. Used where a join found no row.
impl<T> Default for Key<T> {
    fn default() -> Self {
        Self(String::new(), PhantomData)
    }
}

impl<T> Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let type_name = std::any::type_name::<T>()
            .rsplit("::")
            .next()
            .unwrap_or("?");
        f.debug_tuple(&format!("Key<{}>", type_name))
            .field(&self.0)
            .finish()
    }
}

impl<T> Display for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<T> PartialEq for Key<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for Key<T> {}

impl<T> PartialOrd for Key<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Key<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> Hash for Key<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> AsRef<str> for Key<T> {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<T> Borrow<str> for Key<T> {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl<T> From<String> for Key<T> {
    #[inline]
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T> From<&str> for Key<T> {
    #[inline]
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T> From<Key<T>> for String {
    #[inline]
    fn from(key: Key<T>) -> Self {
        key.0
    }
}

impl<T> FromStr for Key<T> {
    type Err = Infallible;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

// ============================================================================
// Serde support
// ============================================================================

impl<T> Serialize for Key<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Key<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

// ============================================================================
// sqlx support (postgres feature)
// ============================================================================

#[cfg(feature = "postgres")]
mod postgres {
    use super::Key;
    use sqlx::encode::IsNull;
    use sqlx::error::BoxDynError;
    use sqlx::postgres::{PgArgumentBuffer, PgHasArrayType, PgTypeInfo, PgValueRef, Postgres};
    use sqlx::{Decode, Encode, Type};

    impl<T> Type<Postgres> for Key<T> {
        fn type_info() -> PgTypeInfo {
            <String as Type<Postgres>>::type_info()
        }

        fn compatible(ty: &PgTypeInfo) -> bool {
            <String as Type<Postgres>>::compatible(ty)
        }
    }

    impl<T> PgHasArrayType for Key<T> {
        fn array_type_info() -> PgTypeInfo {
            <String as PgHasArrayType>::array_type_info()
        }

        fn array_compatible(ty: &PgTypeInfo) -> bool {
            <String as PgHasArrayType>::array_compatible(ty)
        }
    }

    impl<T> Encode<'_, Postgres> for Key<T> {
        fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
            <String as Encode<Postgres>>::encode_by_ref(&self.0, buf)
        }
    }

    impl<T> Decode<'_, Postgres> for Key<T> {
        fn decode(value: PgValueRef<'_>) -> Result<Self, BoxDynError> {
            <String as Decode<Postgres>>::decode(value).map(Self::new)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
