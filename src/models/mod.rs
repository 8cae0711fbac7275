pub mod money;
pub mod schedule;
pub mod seat;
pub mod ticket;
pub mod user;

pub use money::Money;
pub use schedule::{ScheduleDay, ScheduleItem, ScheduleListing, ShowingRef};
pub use seat::{Seat, SeatGroup, SeatKey};
pub use ticket::{CinemaInfo, MovieInfo, Ticket};
pub use user::SessionUser;
