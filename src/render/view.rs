//! Bridge to the presentation layer
//!
//! The simulation never talks to a renderer directly. It asks a
//! [`ViewBridge`] for a handle when an agent is created, asks it to play
//! one-shot animations (identified by an [`EffectTicket`]) and releases the
//! handle when the agent is destroyed. Completed animations come back as
//! tickets through [`ViewBridge::poll_completed`].

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ecs::Component;

/// Opaque handle to a visual node owned by the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewHandle(pub u64);

/// Identifies one pending one-shot effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectTicket(pub u64);

impl fmt::Display for EffectTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ticket-{}", self.0)
    }
}

/// Link between an agent and its visual node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderHandle {
    pub handle: ViewHandle,
    /// Entity type the node was created for (used when recycling it)
    pub type_name: String,
}

impl Component for RenderHandle {
    const NAME: &'static str = "RenderHandle";
}

pub trait ViewBridge {
    /// Create a visual node for a new agent, if the view wants one
    fn acquire(&mut self, type_name: &str, asset_path: Option<&str>) -> Option<ViewHandle>;

    /// Start a one-shot animation
    ///
    /// Returns `false` if the animation could not be played; the caller then
    /// treats the effect as completed immediately.
    fn play_animation(&mut self, handle: ViewHandle, name: &str, ticket: EffectTicket) -> bool;

    /// Hand a node back to the view (pooling is the view's business)
    fn release(&mut self, handle: ViewHandle, type_name: &str);

    /// Tickets whose animation finished since the last poll
    fn poll_completed(&mut self) -> Vec<EffectTicket> {
        Vec::new()
    }
}

/// Headless view: no nodes, so every attack lands immediately
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl ViewBridge for NullView {
    fn acquire(&mut self, _type_name: &str, _asset_path: Option<&str>) -> Option<ViewHandle> {
        None
    }

    fn play_animation(&mut self, _handle: ViewHandle, _name: &str, _ticket: EffectTicket) -> bool {
        false
    }

    fn release(&mut self, _handle: ViewHandle, _type_name: &str) {}
}

/// Headless view whose animations finish a fixed number of polls later
#[derive(Debug, Default)]
pub struct DelayedView {
    delay_polls: u32,
    next_handle: u64,
    live: AHashSet<ViewHandle>,
    playing: Vec<(EffectTicket, u32)>,
    released: Vec<ViewHandle>,
    played: u64,
}

impl DelayedView {
    pub fn new(delay_polls: u32) -> Self {
        Self {
            delay_polls,
            ..Self::default()
        }
    }

    pub fn live_handles(&self) -> usize {
        self.live.len()
    }

    /// Handles released so far, in release order
    pub fn released(&self) -> &[ViewHandle] {
        &self.released
    }

    pub fn in_flight(&self) -> usize {
        self.playing.len()
    }

    /// Total animations started
    pub fn played(&self) -> u64 {
        self.played
    }
}

impl ViewBridge for DelayedView {
    fn acquire(&mut self, _type_name: &str, _asset_path: Option<&str>) -> Option<ViewHandle> {
        self.next_handle += 1;
        let handle = ViewHandle(self.next_handle);
        self.live.insert(handle);
        Some(handle)
    }

    fn play_animation(&mut self, handle: ViewHandle, name: &str, ticket: EffectTicket) -> bool {
        if !self.live.contains(&handle) {
            tracing::warn!(?handle, animation = name, "animation requested on unknown node");
            return false;
        }
        self.playing.push((ticket, self.delay_polls));
        self.played += 1;
        true
    }

    fn release(&mut self, handle: ViewHandle, _type_name: &str) {
        if self.live.remove(&handle) {
            self.released.push(handle);
        }
    }

    fn poll_completed(&mut self) -> Vec<EffectTicket> {
        let mut done = Vec::new();
        self.playing.retain_mut(|(ticket, remaining)| {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                done.push(*ticket);
                false
            } else {
                true
            }
        });
        done
    }
}
