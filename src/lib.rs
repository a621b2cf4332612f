//! Cooperative multitasking framework with CAN bus transport
//!
//! A small kernel for microcontroller test applications providing:
//! - Cooperative run-to-completion scheduling over a fixed task arena
//! - A CAN communication task with bus-off recovery and frame queuing
//! - A non-blocking log channel drained by a serial logger task
//! - HAL contracts with host-side mock implementations

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

// ============ Critical Section ============

#[cfg(target_arch = "arm")]
mod cs_impl {
    use cortex_m::interrupt;
    use cortex_m::register::primask;
    use critical_section::{set_impl, Impl, RawRestoreState};

    struct SingleCoreCriticalSection;
    set_impl!(SingleCoreCriticalSection);

    unsafe impl Impl for SingleCoreCriticalSection {
        unsafe fn acquire() -> RawRestoreState {
            let was_active = primask::read().is_active();
            interrupt::disable();
            was_active
        }

        unsafe fn release(was_active: RawRestoreState) {
            if was_active {
                unsafe { interrupt::enable() }
            }
        }
    }
}

// ============ Modules ============

pub mod log;
mod lang_items;

pub mod core;
pub mod hal;
pub mod can;
pub mod tasks;

// ============ Re-exports ============

pub use core::config;
pub use core::config::*;
pub use core::critical;
pub use core::error;
pub use core::error::{Error, Result};
pub use core::queue;
pub use core::sched;
pub use core::sched::Scheduler;
pub use core::task;
pub use core::task::{Control, Task, TaskDescriptor};
pub use core::time;
pub use core::types;
pub use core::types::*;

pub use can::CanFrame;
pub use tasks::logger::{LogChannel, LogLevel};

#[cfg(feature = "pac")]
pub use stm32_metapac as pac;
