// Domain layer - Core types shared by every other layer
pub mod chart;
pub mod forecast;
pub mod meta;
pub mod notification;
pub mod time;
pub mod tunnel;
