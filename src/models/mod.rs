pub mod record;
pub mod show_list;
pub mod staff;

pub use record::{EndDate, Field, Kind, Record, Season};
pub use show_list::ShowList;
pub use staff::Staff;
