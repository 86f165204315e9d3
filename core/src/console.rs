//! Console traits
//!
//! A console plugs into the core runtime through two types: its input layout
//! and its FFI state. The FFI state is owned by the wasmtime store next to the
//! core [`GameState`](crate::wasm::GameState) and is reached from host
//! functions through the `Caller`.

use bytemuck::{Pod, Zeroable};

/// Trait for console input types
///
/// Must be POD so input registers can be captured into rollback snapshots
/// with bytemuck.
pub trait ConsoleInput:
    Clone
    + Copy
    + Default
    + PartialEq
    + Pod
    + Zeroable
    + serde::Serialize
    + serde::de::DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Digital button bitmask (bit N = button N held)
    fn buttons(&self) -> u32;
}

/// Console FFI state driven by the game lifecycle
///
/// [`GameInstance`](crate::wasm::GameInstance) calls these hooks; consoles
/// override the ones they need.
pub trait ConsoleFfiState: Default + Send + 'static {
    /// Called exactly once, before the first `update()` or `render()` runs.
    ///
    /// After this returns `Ok`, the console must treat everything created
    /// during `init()` as immutable. Returning an error aborts startup.
    fn on_seal(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called at the start of every `render()` pass, including replays.
    fn begin_render(&mut self) {}
}

// Unit type implementation for tests and consoles without FFI state
impl ConsoleFfiState for () {}
