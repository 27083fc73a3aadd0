pub mod io;
pub mod logging;
pub mod text;
pub mod time;
