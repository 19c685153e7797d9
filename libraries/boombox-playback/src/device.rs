//! Device Routing Hub
//!
//! Owns the playback sources and the shared processing chain, and keeps
//! exactly one source plugged into the chain at a time. Components are
//! wired input-to-output in registration order once at construction; a
//! plug-in swaps only the edge between the active source's node and the
//! head of the chain.
//!
//! Routing changes are announced on the device's own event bus as
//! [`DeviceEvent`]s; each source carries its own [`SourceEvent`] stream,
//! reachable through [`Device::on`] with a dotted target such as
//! `"deck.play"`.

use std::sync::{Arc, Mutex};

use boombox_core::events::{DeviceEvent, SourceEvent};
use boombox_core::graph::{AudioComponent, AudioGraph, NodeRef};
use boombox_core::session::MediaAction;
use boombox_core::source::Source;
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::{PlaybackError, Result};

const BUS_CHANNEL_CAPACITY: usize = 16;

/// A subscription handed out by [`Device::on`]
///
/// A dotted target selects a source's stream; the part after the dot
/// names the event of interest, but delivery is always the source's full
/// stream and filtering is the subscriber's concern. A bare target
/// subscribes to the device bus.
pub enum Subscription {
    /// Routing announcements from the device itself
    Bus(broadcast::Receiver<DeviceEvent>),
    /// The full event stream of one source
    Source(broadcast::Receiver<SourceEvent>),
}

/// Playback source router over a shared processing chain
pub struct Device {
    sources: Vec<(String, Box<dyn Source>)>,
    components: Vec<(String, Box<dyn AudioComponent>)>,
    graph: Arc<Mutex<dyn AudioGraph>>,
    active: Option<String>,
    chain_in: Option<NodeRef>,
    chain_out: Option<NodeRef>,
    events: broadcast::Sender<DeviceEvent>,
}

impl Device {
    /// Build the device, wire the chain, and plug in the default source
    pub fn new(
        sources: Vec<(String, Box<dyn Source>)>,
        components: Vec<(String, Box<dyn AudioComponent>)>,
        graph: Arc<Mutex<dyn AudioGraph>>,
        default_source: &str,
    ) -> Result<Self> {
        let (events, _) = broadcast::channel(BUS_CHANNEL_CAPACITY);
        let mut chain_in = None;
        let mut chain_out = None;
        if let Ok(mut g) = graph.lock() {
            for (_, component) in &components {
                if chain_in.is_none() {
                    chain_in = Some(component.input());
                }
                if let Some(out) = chain_out {
                    g.connect(out, component.input());
                }
                chain_out = Some(component.output());
            }
        }
        let mut device = Self {
            sources,
            components,
            graph,
            active: None,
            chain_in,
            chain_out,
            events,
        };
        device.plug_in(default_source)?;
        Ok(device)
    }

    /// Name of the currently plugged-in source
    pub fn active_source(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Look up a source by name
    pub fn source(&self, name: &str) -> Result<&dyn Source> {
        self.sources
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s.as_ref())
            .ok_or_else(|| PlaybackError::SourceNotFound(name.to_string()))
    }

    /// Look up a source by name, mutably
    pub fn source_mut(&mut self, name: &str) -> Result<&mut (dyn Source + 'static)> {
        self.sources
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s.as_mut())
            .ok_or_else(|| PlaybackError::SourceNotFound(name.to_string()))
    }

    /// Look up a processing component by name
    pub fn component(&self, name: &str) -> Result<&dyn AudioComponent> {
        self.components
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.as_ref())
            .ok_or_else(|| PlaybackError::ComponentNotFound(name.to_string()))
    }

    /// Subscribe to the device's routing announcements
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.events.subscribe()
    }

    /// Subscribe to the device bus or, with a dotted target, to a source
    pub fn on(&self, target: &str) -> Result<Subscription> {
        match target.split_once('.') {
            Some((name, _)) => Ok(Subscription::Source(self.source(name)?.subscribe())),
            None => Ok(Subscription::Bus(self.events.subscribe())),
        }
    }

    /// Plug a source into the processing chain, unplugging the active one
    pub fn plug_in(&mut self, name: &str) -> Result<()> {
        if !self.sources.iter().any(|(n, _)| n == name) {
            return Err(PlaybackError::SourceNotFound(name.to_string()));
        }
        let old = self.active.take();
        if let Some(old_name) = &old {
            debug!(from = %old_name, to = %name, "switching source");
            let node = {
                let source = self.source_mut(old_name)?;
                source.plug_out();
                source.node()
            };
            self.unwire(node);
            self.emit(DeviceEvent::PlugOut {
                old_source: old_name.clone(),
                new_source: Some(name.to_string()),
            });
        }
        let node = {
            let source = self.source_mut(name)?;
            source.plug_in();
            source.node()
        };
        self.active = Some(name.to_string());
        self.wire(node);
        self.emit(DeviceEvent::PlugIn {
            old_source: old,
            new_source: name.to_string(),
        });
        Ok(())
    }

    /// Unplug the active source without engaging another one
    ///
    /// The chain stays wired; the next plug-in rewires over it.
    pub fn plug_out(&mut self) {
        if let Some(old_name) = self.active.take() {
            if let Ok(source) = self.source_mut(&old_name) {
                source.plug_out();
            }
            self.emit(DeviceEvent::PlugOut {
                old_source: old_name,
                new_source: None,
            });
        }
    }

    /// Forward a hardware or session media action to the active source
    pub fn media_action(&mut self, action: MediaAction) {
        if let Some(name) = self.active.clone() {
            if let Ok(source) = self.source_mut(&name) {
                source.media_action(action);
            }
        }
    }

    fn wire(&mut self, node: NodeRef) {
        if let Ok(mut graph) = self.graph.lock() {
            let destination = graph.destination();
            match self.chain_in {
                Some(chain_in) => graph.connect(node, chain_in),
                None => graph.connect(node, destination),
            }
            if let Some(chain_out) = self.chain_out {
                graph.connect(chain_out, destination);
            }
        }
    }

    fn unwire(&mut self, node: NodeRef) {
        if let Ok(mut graph) = self.graph.lock() {
            let destination = graph.destination();
            match self.chain_in {
                Some(chain_in) => graph.disconnect(node, chain_in),
                None => graph.disconnect(node, destination),
            }
            if let Some(chain_out) = self.chain_out {
                graph.disconnect(chain_out, destination);
            }
        }
    }

    fn emit(&self, event: DeviceEvent) {
        let _ = self.events.send(event);
    }
}
