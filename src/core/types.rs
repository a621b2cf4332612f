//! Core type definitions

/// Tick counter type
pub type Tick = u32;

/// Task identifier, the slot index assigned at registration
pub type TaskId = u8;

/// Task state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TaskState {
    /// Task will be polled on the next dispatch pass
    Ready = 0,
    /// Task is currently inside `poll`
    Running = 1,
    /// Task is sleeping until its wake tick is reached
    Blocked = 2,
    /// Task is excluded from dispatch until resumed
    Suspended = 3,
}

/// Frame direction relative to this node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    Tx = 0,
    Rx = 1,
}
