// Entity Models
//
// Plain value holders edited by the forms. Identity is an integer id that the
// store assigns on first save; a missing id means the record is new.

pub mod department;
pub mod seller;

pub use department::Department;
pub use seller::Seller;

/// Max characters accepted by a name field while typing
pub const NAME_MAX_LENGTH: usize = 30;
