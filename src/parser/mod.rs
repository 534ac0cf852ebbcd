pub mod date;
pub mod staff;
pub mod title;

pub use date::{parse_date, parse_date_range};
pub use staff::{Role, RoleTable, credit};
pub use title::{ParsedTitle, parse_title};
