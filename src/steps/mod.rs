pub mod descriptor;
pub mod step;
pub mod store;

pub use descriptor::describe;
pub use step::{Interaction, Step, StepId, WINDOW_TAG};
pub use store::StepStore;
