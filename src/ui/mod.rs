//! Terminal UI: the presentation layer that relays column choices into a
//! play session and shows the board, results and per-tier statistics.

mod app;
mod game_view;

pub use app::App;
