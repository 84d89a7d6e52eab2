pub mod backtest;
pub mod calendar;
pub mod config;
pub mod frequency;
pub mod grids;
pub mod links;
pub mod window;
