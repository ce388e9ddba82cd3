use crate::binding::{bind, BindingSpec, BindingTable};
use crate::client::TaskTracker;
use crate::error::Result;
use crate::taxonomy::Taxonomy;

/// Everything one operation needs: the remote client, the taxonomy
/// snapshot, the bindings derived from it and the device label appended to
/// comments.
pub struct Session<C: TaskTracker> {
    pub client: C,
    pub taxonomy: Taxonomy,
    pub bindings: BindingTable,
    pub device: String,
}

impl<C: TaskTracker> Session<C> {
    /// Bind `spec` against `taxonomy` and assemble a session.
    ///
    /// Fails only when the root project is absent from the snapshot.
    pub fn open(
        client: C,
        taxonomy: Taxonomy,
        spec: &BindingSpec,
        device: impl Into<String>,
    ) -> Result<Self> {
        let bindings = bind(&taxonomy, spec)?;
        Ok(Self {
            client,
            taxonomy,
            bindings,
            device: device.into(),
        })
    }

    /// `"<text> ~<device>"`, the signature every automated comment carries.
    pub fn signed(&self, text: &str) -> String {
        format!("{text} ~{}", self.device)
    }
}
