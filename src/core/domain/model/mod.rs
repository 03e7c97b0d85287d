pub mod api_response;
pub mod director_connection;
pub mod stemcell;
pub mod task;
pub mod vm_status;

/// Projection from a wire-format record to the domain model handed to callers.
///
/// Implemented once per record type that can appear in a task result stream.
pub trait ToModel {
    /// The domain type produced by the projection.
    type Model;

    fn to_model(self) -> Self::Model;
}
