pub mod inspect;
pub mod relax;
pub mod watch;
