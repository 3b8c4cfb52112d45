// Time-series pipeline: discovery & load, then join / bucket / ratio.
// Every stage is a pure function of its inputs; nothing here touches rendering.

pub mod discovery;
pub mod load;
pub mod table;
pub mod join;
pub mod bucket;
pub mod ratio;
