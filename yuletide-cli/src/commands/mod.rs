pub mod info;
pub mod run;
pub mod settings;
pub mod winners;

pub use info::show_info;
pub use run::{run_session, RunArgs};
pub use settings::{configure, ConfigArgs};
pub use winners::{list_winners, WinnersArgs};
