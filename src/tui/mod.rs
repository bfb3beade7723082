pub mod app;
pub mod cards;
pub mod events;
pub mod theme;
pub mod widgets;
