//! BARE (Binary Application Record Encoding) records.
//!
//! Re-exports the codec from [bare_core] together with the
//! `#[derive(BareRecord)]` macro.
//!
//! ```
//! use bare::{BareRecord, Data, Uint};
//!
//! #[derive(Debug, PartialEq, BareRecord)]
//! enum UserRole {
//!     Admin,
//!     User,
//!     Guest,
//! }
//!
//! #[derive(Debug, PartialEq, BareRecord)]
//! struct Session {
//!     token: Data,
//!     expires: Uint,
//! }
//!
//! #[derive(Debug, PartialEq, BareRecord)]
//! struct User {
//!     id: Uint,
//!     name: String,
//!     role: UserRole,
//!     session: Option<Session>,
//! }
//!
//! let user = User {
//!     id: Uint(42),
//!     name: "Jane Doe".to_string(),
//!     role: UserRole::Guest,
//!     session: None,
//! };
//!
//! let bytes = bare::to_bytes(&user).unwrap();
//! assert_eq!(bytes, [42, 8, b'J', b'a', b'n', b'e', b' ', b'D', b'o', b'e', 2, 0]);
//! assert_eq!(bare::from_bytes::<User>(&bytes).unwrap(), user);
//! ```

extern crate self as bare;

pub use bare_core::*;
pub use bare_macros::BareRecord;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, BareRecord)]
    enum Shape {
        Circle(Uint),
        Square(Uint),
        #[bare(rename = "NOTHING")]
        Empty,
    }

    #[test]
    fn test_derived_union_in_crate() {
        let bytes = to_bytes(&Shape::Square(Uint(3))).unwrap();
        assert_eq!(bytes, [1, 3]);
        assert_eq!(from_bytes::<Shape>(&bytes).unwrap(), Shape::Square(Uint(3)));

        let bytes = to_bytes(&Shape::Empty).unwrap();
        assert_eq!(bytes, [2]);
        assert_eq!(from_bytes::<Shape>(&bytes).unwrap(), Shape::Empty);

        match Shape::schema() {
            Schema::Union(u) => assert_eq!(u.variants[2].name, "NOTHING"),
            other => panic!("unexpected schema {:?}", other),
        }
    }
}
