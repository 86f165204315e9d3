//! Game instance implementation for loaded WASM modules

use anyhow::{Context, Result};
use wasmtime::{Instance, Linker, Module, Store, TypedFunc};

use super::engine::WasmEngine;
use super::state::{DEFAULT_RAM_LIMIT, GameState, MAX_PLAYERS, WasmGameContext};
use crate::console::{ConsoleFfiState, ConsoleInput};

/// A loaded and instantiated game
///
/// Lifecycle: `init()` runs with the console state open for asset loading.
/// The first `update()` or `render()` seals the console state; from then on
/// only guest linear memory and the host sidecar change between ticks.
pub struct GameInstance<I: ConsoleInput, S: ConsoleFfiState> {
    store: Store<WasmGameContext<I, S>>,
    /// Kept alive so exported functions and memory stay valid.
    #[allow(dead_code)]
    instance: Instance,
    init_fn: Option<TypedFunc<(), ()>>,
    update_fn: Option<TypedFunc<(), ()>>,
    render_fn: Option<TypedFunc<(), ()>>,
}

impl<I: ConsoleInput, S: ConsoleFfiState> GameInstance<I, S> {
    /// Create a new game instance with the fallback RAM limit (4MB)
    pub fn new(
        engine: &WasmEngine,
        module: &Module,
        linker: &Linker<WasmGameContext<I, S>>,
    ) -> Result<Self> {
        Self::with_ram_limit(engine, module, linker, DEFAULT_RAM_LIMIT)
    }

    /// Create a new game instance whose linear memory is capped at `ram_limit` bytes
    pub fn with_ram_limit(
        engine: &WasmEngine,
        module: &Module,
        linker: &Linker<WasmGameContext<I, S>>,
        ram_limit: usize,
    ) -> Result<Self> {
        WasmEngine::validate_module_memory(module, ram_limit)?;

        let mut store = Store::new(engine.engine(), WasmGameContext::with_ram_limit(ram_limit));
        store.limiter(|ctx| &mut ctx.limits);

        let instance = linker
            .instantiate(&mut store, module)
            .context("Failed to instantiate WASM module")?;

        if let Some(memory) = instance.get_memory(&mut store, "memory") {
            store.data_mut().game.memory = Some(memory);
        }

        let init_fn = instance.get_typed_func::<(), ()>(&mut store, "init").ok();
        let update_fn = instance.get_typed_func::<(), ()>(&mut store, "update").ok();
        let render_fn = instance.get_typed_func::<(), ()>(&mut store, "render").ok();

        Ok(Self {
            store,
            instance,
            init_fn,
            update_fn,
            render_fn,
        })
    }

    /// Call the game's init function
    ///
    /// Init may only run before the console state is sealed.
    pub fn init(&mut self) -> Result<()> {
        anyhow::ensure!(
            !self.store.data().game.sealed,
            "init() called after the first update()/render()"
        );

        self.store.data_mut().game.in_init = true;
        let result = match &self.init_fn {
            Some(init) => init.call(&mut self.store, ()),
            None => Ok(()),
        };
        self.store.data_mut().game.in_init = false;

        result.map_err(|e| {
            tracing::error!("WASM init() failed: {:#}", e);
            anyhow::anyhow!("WASM init() failed: {:#}", e)
        })
    }

    /// Seal the console state if this is the first update/render
    ///
    /// Idempotent. Fails if the console refuses to seal (for example because
    /// an init-time asset load failed).
    pub fn seal(&mut self) -> Result<()> {
        if self.store.data().game.sealed {
            return Ok(());
        }
        let ctx = self.store.data_mut();
        ctx.game.in_init = false;
        ctx.ffi.on_seal().context("Failed to seal console state")?;
        ctx.game.sealed = true;
        // Snapshots copy the whole memory; its size must not change from here on
        ctx.limits.freeze();
        tracing::info!("console state sealed");
        Ok(())
    }

    /// Returns true once the console state has been sealed
    pub fn is_sealed(&self) -> bool {
        self.store.data().game.sealed
    }

    /// Call the game's update function
    pub fn update(&mut self, delta_time: f32) -> Result<()> {
        self.seal()?;
        {
            let state = &mut self.store.data_mut().game;
            state.delta_time = delta_time;
            state.elapsed_time += delta_time;
            state.tick_count += 1;
        }
        if let Some(update) = &self.update_fn {
            update.call(&mut self.store, ()).map_err(|e| {
                let tick = self.store.data().game.tick_count;
                tracing::error!("WASM update() failed at tick {}: {:#}", tick, e);
                anyhow::anyhow!("WASM update() failed at tick {}: {:#}", tick, e)
            })?;
        }
        // Rotate input state
        let state = &mut self.store.data_mut().game;
        state.input_prev = state.input_curr;
        Ok(())
    }

    /// Call the game's render function
    ///
    /// Render-scoped console state is reset before the guest runs.
    pub fn render(&mut self) -> Result<()> {
        self.seal()?;
        self.store.data_mut().ffi.begin_render();
        if let Some(render) = &self.render_fn {
            render.call(&mut self.store, ()).map_err(|e| {
                tracing::error!("WASM render() failed: {:#}", e);
                anyhow::anyhow!("WASM render() failed: {:#}", e)
            })?;
        }
        Ok(())
    }

    /// Save entire WASM linear memory to a vector
    ///
    /// Guest memory is the snapshotted partition. Games do not implement
    /// serialization; the whole memory is saved for rollback.
    pub fn save_state(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.save_state_into(&mut buffer)?;
        Ok(buffer)
    }

    /// Save entire WASM linear memory into a reusable buffer
    ///
    /// The buffer is cleared and overwritten in full.
    pub fn save_state_into(&mut self, buffer: &mut Vec<u8>) -> Result<()> {
        let memory = self
            .store
            .data()
            .game
            .memory
            .context("No memory export found")?;
        buffer.clear();
        buffer.extend_from_slice(memory.data(&self.store));
        Ok(())
    }

    /// Load entire WASM linear memory from a snapshot
    ///
    /// Inverse of `save_state()`. The snapshot must match the current memory
    /// size, which holds for every snapshot taken after seal because growth
    /// is frozen there.
    pub fn load_state(&mut self, snapshot: &[u8]) -> Result<()> {
        let memory = self
            .store
            .data()
            .game
            .memory
            .context("No memory export found")?;
        let mem_data = memory.data_mut(&mut self.store);
        anyhow::ensure!(
            snapshot.len() == mem_data.len(),
            "Snapshot size mismatch: {} vs {}",
            snapshot.len(),
            mem_data.len()
        );
        mem_data.copy_from_slice(snapshot);
        Ok(())
    }

    /// Get mutable reference to the store
    pub fn store_mut(&mut self) -> &mut Store<WasmGameContext<I, S>> {
        &mut self.store
    }

    /// Get reference to the store
    pub fn store(&self) -> &Store<WasmGameContext<I, S>> {
        &self.store
    }

    /// Get mutable reference to game state
    pub fn state_mut(&mut self) -> &mut GameState<I> {
        &mut self.store.data_mut().game
    }

    /// Get reference to game state
    pub fn state(&self) -> &GameState<I> {
        &self.store.data().game
    }

    /// Get mutable reference to console-specific FFI state
    pub fn console_state_mut(&mut self) -> &mut S {
        &mut self.store.data_mut().ffi
    }

    /// Get reference to console-specific FFI state
    pub fn console_state(&self) -> &S {
        &self.store.data().ffi
    }

    /// Set input for a player
    pub fn set_input(&mut self, player: usize, input: I) {
        if player < MAX_PLAYERS {
            self.store.data_mut().game.input_curr[player] = input;
        }
    }

    /// Configure the session's player count and local player mask
    ///
    /// Call before `init()`.
    pub fn configure_session(&mut self, player_count: u32, local_player_mask: u32) {
        let state = &mut self.store.data_mut().game;
        state.player_count = player_count.clamp(1, MAX_PLAYERS as u32);
        state.local_player_mask = local_player_mask;
    }
}
