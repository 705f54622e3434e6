//! Runtime components: pools, engines, session store, and the conversation machine.

pub mod bank;
pub mod feedback;
pub mod machine;
pub mod markup;
pub mod pool;
pub mod quiz;
pub mod riddle;
pub mod round;
pub mod source;
pub mod store;
pub mod transport;
