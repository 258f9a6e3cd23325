pub mod basemap;
pub mod blend;
pub mod brightness;
pub mod channels;
pub mod consts;
pub mod dispatch;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod pipeline;
pub mod probe;
pub mod register;
pub mod tools;
