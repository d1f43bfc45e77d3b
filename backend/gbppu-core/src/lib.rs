//! Cycle-accurate emulation core for the original Game Boy's PPU (pixel processing unit)
//!
//! The core is a dataflow pipeline stepped once per T-cycle ("dot"). Every component is a small
//! record of state with a step function; the scheduler in [`ppu`] invokes them in dependency
//! order and routes the single shared memory port between the OAM scanner and the pixel
//! pipeline. Memory itself is an external collaborator answering reads one dot late; a reference
//! implementation lives in [`bus`].

pub mod api;
pub mod bus;
pub mod graphics;
pub mod ppu;
