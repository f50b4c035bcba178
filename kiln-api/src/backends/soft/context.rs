use crate::{
    KilnClearFlags, KilnFormat, KilnMapPolicy, KilnPrimitiveTopology, KilnShaderStage,
    KilnViewport,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Identifies an object created by a soft device. Handles are never reused within a device.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SoftHandle(pub u64);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SoftVertexBufferBinding {
    pub buffer: SoftHandle,
    pub stride: u32,
    pub offset: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SoftIndexBufferBinding {
    pub buffer: SoftHandle,
    pub format: KilnFormat,
    pub offset: u32,
}

/// One call made against the immediate context
#[derive(Clone, Debug, PartialEq)]
pub enum SoftCommand {
    ClearState,
    Flush,
    OmSetRenderTargets {
        render_targets: Vec<SoftHandle>,
        depth_stencil: Option<SoftHandle>,
    },
    ClearRenderTargetView {
        view: SoftHandle,
        color: [f32; 4],
    },
    ClearDepthStencilView {
        view: SoftHandle,
        flags: KilnClearFlags,
        depth: f32,
        stencil: u8,
    },
    Map {
        buffer: SoftHandle,
        subresource: u32,
        policy: KilnMapPolicy,
    },
    Unmap {
        buffer: SoftHandle,
        subresource: u32,
    },
    SetConstantBuffers {
        stage: KilnShaderStage,
        buffers: Vec<Option<SoftHandle>>,
    },
    IaSetInputLayout {
        layout: Option<SoftHandle>,
    },
    IaSetVertexBuffers {
        bindings: Vec<SoftVertexBufferBinding>,
    },
    IaSetIndexBuffer {
        binding: Option<SoftIndexBufferBinding>,
    },
    IaSetPrimitiveTopology {
        topology: KilnPrimitiveTopology,
    },
    SetShader {
        stage: KilnShaderStage,
        shader: Option<SoftHandle>,
    },
    OmSetBlendState {
        state: Option<SoftHandle>,
    },
    OmSetDepthStencilState {
        state: Option<SoftHandle>,
    },
    RsSetState {
        state: Option<SoftHandle>,
    },
    RsSetViewports {
        viewports: Vec<KilnViewport>,
    },
    SetShaderResources {
        stage: KilnShaderStage,
        start_slot: u32,
        views: Vec<SoftHandle>,
    },
    SetSamplers {
        stage: KilnShaderStage,
        samplers: Vec<Option<SoftHandle>>,
    },
    Draw {
        vertex_count: u32,
        start_vertex: u32,
    },
    DrawIndexed {
        index_count: u32,
        start_index: u32,
        base_vertex: i32,
    },
    DrawInstanced {
        vertex_count_per_instance: u32,
        instance_count: u32,
        start_vertex: u32,
        start_instance: u32,
    },
    DrawIndexedInstanced {
        index_count_per_instance: u32,
        instance_count: u32,
        start_index: u32,
        base_vertex: i32,
        start_instance: u32,
    },
    Present {
        swap_chain: SoftHandle,
        sync_interval: u32,
    },
    SetFullscreenState {
        swap_chain: SoftHandle,
        fullscreen: bool,
    },
}

struct SoftContextState {
    commands: VecDeque<SoftCommand>,
    capacity: usize,
    total_recorded: u64,
}

/// The immediate context of a soft device. Every backend call is appended to a bounded log that
/// can be inspected to see exactly what reached the "driver".
#[derive(Clone)]
pub struct SoftContext {
    state: Arc<Mutex<SoftContextState>>,
}

impl std::fmt::Debug for SoftContext {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("SoftContext")
            .field("logged", &state.commands.len())
            .field("total_recorded", &state.total_recorded)
            .finish()
    }
}

impl SoftContext {
    pub(crate) fn new(capacity: usize) -> Self {
        SoftContext {
            state: Arc::new(Mutex::new(SoftContextState {
                commands: VecDeque::with_capacity(capacity.min(1024)),
                capacity: capacity.max(1),
                total_recorded: 0,
            })),
        }
    }

    // A panic while the log was locked leaves it consistent, so poisoning is ignored
    fn lock(&self) -> MutexGuard<SoftContextState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn record(
        &self,
        command: SoftCommand,
    ) {
        log::trace!("soft context: {:?}", command);
        let mut state = self.lock();
        if state.commands.len() >= state.capacity {
            state.commands.pop_front();
        }
        state.commands.push_back(command);
        state.total_recorded += 1;
    }

    /// Snapshot of the logged commands, oldest first
    pub fn commands(&self) -> Vec<SoftCommand> {
        self.lock().commands.iter().cloned().collect()
    }

    pub fn count_commands<F: Fn(&SoftCommand) -> bool>(
        &self,
        predicate: F,
    ) -> usize {
        self.lock().commands.iter().filter(|x| predicate(x)).count()
    }

    pub fn last_command(&self) -> Option<SoftCommand> {
        self.lock().commands.back().cloned()
    }

    pub fn clear_commands(&self) {
        self.lock().commands.clear();
    }

    /// Includes commands that have since been dropped from the log
    pub fn total_recorded(&self) -> u64 {
        self.lock().total_recorded
    }
}
