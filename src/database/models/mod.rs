pub mod account;
pub mod reservation;

pub use account::{Account, AccountInfo};
pub use reservation::{NewReservation, Reservation, ReservationPatch};
