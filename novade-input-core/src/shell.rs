//! Shell protocol clients (panels, docks, backgrounds) that track outputs.

use tracing::debug;

use crate::context::Core;
use crate::types::{Geometry, OutputId};

/// A bound shell protocol client. The host runtime implements this on top
/// of the client's protocol resource.
pub trait ShellClient {
    fn output_created(&mut self, output: OutputId, geometry: Geometry);
    fn output_destroyed(&mut self, output: OutputId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShellClientId(u64);

impl Core {
    /// Registers a freshly bound shell client.
    ///
    /// The client is told about existing outputs on the next
    /// [`Core::dispatch_idle`], once its bind handshake has completed.
    pub fn bind_shell_client(&mut self, client: Box<dyn ShellClient>) -> ShellClientId {
        let id = ShellClientId(self.next_shell_client);
        self.next_shell_client += 1;
        self.pending_shell_clients.insert(id, client);
        self.defer(move |core| core.finish_shell_bind(id));
        id
    }

    fn finish_shell_bind(&mut self, id: ShellClientId) {
        let Some(mut client) = self.pending_shell_clients.remove(&id) else {
            return;
        };
        for output in self.outputs.values() {
            client.output_created(output.id(), output.geometry());
        }
        debug!(client = id.0, outputs = self.outputs.len(), "Shell client announced");
        self.shell_clients.insert(id, client);
    }

    /// Forgets a shell client. Returns `false` if it was not bound.
    pub fn unbind_shell_client(&mut self, id: ShellClientId) -> bool {
        self.shell_clients.remove(&id).is_some() || self.pending_shell_clients.remove(&id).is_some()
    }

    pub(crate) fn announce_output_created(&mut self, output: OutputId, geometry: Geometry) {
        for client in self.shell_clients.values_mut() {
            client.output_created(output, geometry);
        }
    }

    pub(crate) fn announce_output_destroyed(&mut self, output: OutputId) {
        for client in self.shell_clients.values_mut() {
            client.output_destroyed(output);
        }
    }
}
