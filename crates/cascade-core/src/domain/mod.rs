pub mod errors;
pub mod level;
pub mod line;

pub use errors::{CascadeError, CascadeErrorCategory, CascadeFault, CascadeResult, ParserResult};
pub use level::{AngularMomentum, Level, LevelKey, LevelList, Parity};
pub use line::{
    DatasetId, LevelState, LineArena, LineDataset, LineRate, LineRecord, LineRef, Process,
};
